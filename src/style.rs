use iced::{button, container, Background, Color, Vector};

const BACKGROUND: Color = Color {
    r: 0x0B as f32 / 255.0,
    g: 0x10 as f32 / 255.0,
    b: 0x1E as f32 / 255.0,
    a: 1.0,
};

const ACTIVE: Color = Color {
    r: 0x2C as f32 / 255.0,
    g: 0x4A as f32 / 255.0,
    b: 0x7A as f32 / 255.0,
    a: 1.0,
};

const HOVERED: Color = Color {
    r: 0x3A as f32 / 255.0,
    g: 0x61 as f32 / 255.0,
    b: 0x9E as f32 / 255.0,
    a: 1.0,
};

pub struct Container;

impl container::StyleSheet for Container {
    fn style(&self) -> container::Style {
        container::Style {
            background: Some(Background::Color(BACKGROUND)),
            text_color: Some(Color::WHITE),
            ..container::Style::default()
        }
    }
}

pub struct Button;

impl button::StyleSheet for Button {
    fn active(&self) -> button::Style {
        button::Style {
            background: Some(Background::Color(ACTIVE)),
            border_radius: 3.0,
            text_color: Color::WHITE,
            ..button::Style::default()
        }
    }

    fn hovered(&self) -> button::Style {
        button::Style {
            background: Some(Background::Color(HOVERED)),
            text_color: Color::WHITE,
            ..self.active()
        }
    }

    fn pressed(&self) -> button::Style {
        button::Style {
            border_width: 1.0,
            border_color: Color::WHITE,
            shadow_offset: Vector::new(0.0, 1.0),
            ..self.hovered()
        }
    }
}
