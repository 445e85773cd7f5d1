//! Drawing surface abstraction.
//!
//! Everything is in absolute pixel coordinates matching particle positions and sizes. Any
//! device-pixel-ratio scaling is applied once by the host when the surface is created, never per
//! draw call.

use std::sync::Arc;

use crate::colour::Colour;
use crate::error::GeometryError;
use crate::geometry::{polygon_vertices, Position};

/// A decoded RGBA8 image.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA bytes, `width * height * 4` long.
    pub pixels: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Bitmap {
            width,
            height,
            pixels,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

/// Primitive drawing operations.
///
/// Implementors supply the raw primitives; the `draw_*` methods layer the centring, angle and
/// polygon conventions on top.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    /// Erase the entire surface.
    fn clear(&mut self);

    fn set_fill_colour(&mut self, colour: Colour);
    fn set_stroke_colour(&mut self, colour: Colour);
    fn set_global_alpha(&mut self, alpha: f32);

    fn save_state(&mut self);
    fn restore_state(&mut self);

    /// Fill an arc. Angles are in radians.
    fn fill_arc(
        &mut self,
        center: Position,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        anti_clockwise: bool,
    );

    /// Fill an axis-aligned rectangle given its top-left corner.
    fn fill_rect(&mut self, top_left: Position, width: f32, height: f32);

    fn fill_polygon(&mut self, vertices: &[Position]);

    fn stroke_line(&mut self, from: Position, to: Position, thickness: f32);

    /// Draw `bitmap` scaled into the rectangle at `top_left`.
    fn blit(&mut self, bitmap: &Arc<Bitmap>, top_left: Position, width: f32, height: f32);

    /// Run `f` with the current drawing state saved, restoring it afterwards.
    fn with_save<F>(&mut self, f: F)
    where
        Self: Sized,
        F: FnOnce(&mut Self),
    {
        self.save_state();
        f(self);
        self.restore_state();
    }

    fn draw_arc(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        start_angle_deg: f32,
        end_angle_deg: f32,
        anti_clockwise: bool,
    ) {
        self.fill_arc(
            Position::new(x, y),
            radius,
            start_angle_deg.to_radians(),
            end_angle_deg.to_radians(),
            anti_clockwise,
        );
    }

    /// Rectangle centred on `(x, y)`.
    fn draw_rectangle(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.fill_rect(
            Position::new(x - width / 2.0, y - height / 2.0),
            width,
            height,
        );
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, thickness: f32) {
        self.stroke_line(Position::new(x1, y1), Position::new(x2, y2), thickness);
    }

    /// See [`polygon_vertices`] for how the outline is traced. `vertex_angle_deg` defaults to
    /// `360 / sides`.
    #[allow(clippy::too_many_arguments)]
    fn draw_regular_polygon(
        &mut self,
        x: f32,
        y: f32,
        circumradius: f32,
        side_length: f32,
        sides: u32,
        rotation_deg: f32,
        vertex_angle_deg: Option<f32>,
    ) -> Result<(), GeometryError> {
        if sides < 3 {
            return Err(GeometryError::TooFewSides(sides));
        }

        let vertex_angle = vertex_angle_deg.unwrap_or(360.0 / sides as f32);
        let vertices = polygon_vertices(
            x,
            y,
            circumradius,
            side_length,
            sides,
            rotation_deg,
            vertex_angle,
        )?;
        self.fill_polygon(&vertices);
        Ok(())
    }

    /// Image centred on `(x, y)`, at its natural size unless a size is given.
    fn draw_image(
        &mut self,
        x: f32,
        y: f32,
        bitmap: &Arc<Bitmap>,
        width: Option<f32>,
        height: Option<f32>,
    ) {
        let width = width.unwrap_or(bitmap.width as f32);
        let height = height.unwrap_or(bitmap.height as f32);
        self.blit(
            bitmap,
            Position::new(x - width / 2.0, y - height / 2.0),
            width,
            height,
        );
    }
}

/// A recorded draw call. Colours already have the global alpha applied.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Arc {
        center: Position,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        anti_clockwise: bool,
        colour: Colour,
    },
    Rectangle {
        top_left: Position,
        width: f32,
        height: f32,
        colour: Colour,
    },
    Polygon {
        vertices: Vec<Position>,
        colour: Colour,
    },
    Line {
        from: Position,
        to: Position,
        thickness: f32,
        colour: Colour,
    },
    Image {
        bitmap: Arc<Bitmap>,
        top_left: Position,
        width: f32,
        height: f32,
        alpha: f32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct DrawState {
    fill: Colour,
    stroke: Colour,
    alpha: f32,
}

impl Default for DrawState {
    fn default() -> Self {
        DrawState {
            fill: Colour::new(0, 0, 0, 1.0),
            stroke: Colour::new(0, 0, 0, 1.0),
            alpha: 1.0,
        }
    }
}

/// A surface that records every draw call since the last `clear`.
///
/// The host replays the list onto whatever it actually paints with; tests inspect it directly.
#[derive(Clone, Debug, Default)]
pub struct DisplayList {
    width: f32,
    height: f32,
    state: DrawState,
    stack: Vec<DrawState>,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new(width: f32, height: f32) -> Self {
        DisplayList {
            width,
            height,
            ..DisplayList::default()
        }
    }

    /// Re-derive the pixel dimensions after the host resized.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    fn fill(&self) -> Colour {
        let fill = self.state.fill;
        fill.with_alpha(fill.a * self.state.alpha)
    }

    fn stroke(&self) -> Colour {
        let stroke = self.state.stroke;
        stroke.with_alpha(stroke.a * self.state.alpha)
    }
}

impl Surface for DisplayList {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self) {
        self.commands.clear();
    }

    fn set_fill_colour(&mut self, colour: Colour) {
        self.state.fill = colour;
    }

    fn set_stroke_colour(&mut self, colour: Colour) {
        self.state.stroke = colour;
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha;
    }

    fn save_state(&mut self) {
        self.stack.push(self.state);
    }

    fn restore_state(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn fill_arc(
        &mut self,
        center: Position,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        anti_clockwise: bool,
    ) {
        let colour = self.fill();
        self.commands.push(DrawCommand::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            anti_clockwise,
            colour,
        });
    }

    fn fill_rect(&mut self, top_left: Position, width: f32, height: f32) {
        let colour = self.fill();
        self.commands.push(DrawCommand::Rectangle {
            top_left,
            width,
            height,
            colour,
        });
    }

    fn fill_polygon(&mut self, vertices: &[Position]) {
        let colour = self.fill();
        self.commands.push(DrawCommand::Polygon {
            vertices: vertices.to_vec(),
            colour,
        });
    }

    fn stroke_line(&mut self, from: Position, to: Position, thickness: f32) {
        let colour = self.stroke();
        self.commands.push(DrawCommand::Line {
            from,
            to,
            thickness,
            colour,
        });
    }

    fn blit(&mut self, bitmap: &Arc<Bitmap>, top_left: Position, width: f32, height: f32) {
        self.commands.push(DrawCommand::Image {
            bitmap: Arc::clone(bitmap),
            top_left,
            width,
            height,
            alpha: self.state.alpha,
        });
    }
}
