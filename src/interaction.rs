use crate::geometry::Position;

/// A click that has not been consumed by a frame yet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Click {
    pub position: Position,
    /// Host clock reading, in milliseconds.
    pub time: f64,
}

/// Pointer state fed by host events and read by the frame loop.
///
/// Raw event coordinates are surface-relative logical pixels; they are multiplied by the device
/// pixel ratio so they share the particles' coordinate space. Events and frames never run
/// concurrently, so the fields are plain values.
#[derive(Clone, Debug)]
pub struct InteractionListener {
    device_pixel_ratio: f32,
    hover_position: Option<Position>,
    click: Option<Click>,
    last_click_time: Option<f64>,
}

impl Default for InteractionListener {
    fn default() -> Self {
        InteractionListener::new(1.0)
    }
}

impl InteractionListener {
    pub fn new(device_pixel_ratio: f32) -> Self {
        InteractionListener {
            device_pixel_ratio,
            hover_position: None,
            click: None,
            last_click_time: None,
        }
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.device_pixel_ratio = ratio;
    }

    fn scale(&self, x: f32, y: f32) -> Position {
        Position::new(x * self.device_pixel_ratio, y * self.device_pixel_ratio)
    }

    pub fn on_pointer_enter(&mut self, x: f32, y: f32) {
        self.hover_position = Some(self.scale(x, y));
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.hover_position = Some(self.scale(x, y));
    }

    pub fn on_pointer_leave(&mut self) {
        self.hover_position = None;
    }

    pub fn on_click(&mut self, x: f32, y: f32, time: f64) {
        self.click = Some(Click {
            position: self.scale(x, y),
            time,
        });
        self.last_click_time = Some(time);
    }

    /// Forget all pointer state.
    pub fn reset(&mut self) {
        self.hover_position = None;
        self.click = None;
        self.last_click_time = None;
    }

    pub fn hover_position(&self) -> Option<Position> {
        self.hover_position
    }

    pub fn last_click_time(&self) -> Option<f64> {
        self.last_click_time
    }

    /// The pending click, if any. Each click is handed out once.
    pub fn take_click(&mut self) -> Option<Click> {
        self.click.take()
    }
}
