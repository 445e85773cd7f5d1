use iced::canvas::{path, Frame, Path, Stroke};
use iced::{Color, Point, Size};

use subatomic::{Bitmap, Colour, DrawCommand, Position};

/// Images are approximated with at most this many filled cells along each axis.
const MAX_IMAGE_CELLS: u32 = 64;

/// Replay a recorded frame onto an iced canvas frame.
pub fn paint(frame: &mut Frame, commands: &[DrawCommand]) {
    for command in commands {
        match command {
            DrawCommand::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                anti_clockwise,
                colour,
            } => {
                let (start_angle, end_angle) = if *anti_clockwise {
                    (*end_angle, *start_angle)
                } else {
                    (*start_angle, *end_angle)
                };
                let arc = Path::new(|builder| {
                    builder.arc(path::Arc {
                        center: point(*center),
                        radius: *radius,
                        start_angle,
                        end_angle,
                    });
                    builder.close();
                });
                frame.fill(&arc, color(*colour));
            }
            DrawCommand::Rectangle {
                top_left,
                width,
                height,
                colour,
            } => {
                let rectangle = Path::rectangle(point(*top_left), Size::new(*width, *height));
                frame.fill(&rectangle, color(*colour));
            }
            DrawCommand::Polygon { vertices, colour } => {
                if let Some((first, rest)) = vertices.split_first() {
                    let polygon = Path::new(|builder| {
                        builder.move_to(point(*first));
                        for vertex in rest {
                            builder.line_to(point(*vertex));
                        }
                        builder.close();
                    });
                    frame.fill(&polygon, color(*colour));
                }
            }
            DrawCommand::Line {
                from,
                to,
                thickness,
                colour,
            } => {
                let line = Path::line(point(*from), point(*to));
                frame.stroke(
                    &line,
                    Stroke {
                        color: color(*colour),
                        width: *thickness,
                        ..Stroke::default()
                    },
                );
            }
            DrawCommand::Image {
                bitmap,
                top_left,
                width,
                height,
                alpha,
            } => paint_bitmap(frame, bitmap, *top_left, *width, *height, *alpha),
        }
    }
}

/// The canvas has no image primitive, so sample the bitmap on a coarse grid and fill one
/// rectangle per cell.
fn paint_bitmap(
    frame: &mut Frame,
    bitmap: &Bitmap,
    top_left: Position,
    width: f32,
    height: f32,
    alpha: f32,
) {
    if bitmap.width == 0 || bitmap.height == 0 || width <= 0.0 || height <= 0.0 {
        return;
    }

    let columns = bitmap.width.min(MAX_IMAGE_CELLS);
    let rows = bitmap.height.min(MAX_IMAGE_CELLS);
    let cell = Size::new(width / columns as f32, height / rows as f32);

    for row in 0..rows {
        for column in 0..columns {
            let x = (column * bitmap.width + bitmap.width / 2) / columns;
            let y = (row * bitmap.height + bitmap.height / 2) / rows;
            let [r, g, b, a] = bitmap.pixel(x, y);
            if a == 0 {
                continue;
            }

            let mut fill = Color::from_rgb8(r, g, b);
            fill.a = a as f32 / 255.0 * alpha;
            let origin = Point::new(
                top_left.x + column as f32 * cell.width,
                top_left.y + row as f32 * cell.height,
            );
            frame.fill(&Path::rectangle(origin, cell), fill);
        }
    }
}

fn point(position: Position) -> Point {
    Point::new(position.x, position.y)
}

fn color(colour: Colour) -> Color {
    Color::from_rgba8(colour.r, colour.g, colour.b, colour.a)
}
