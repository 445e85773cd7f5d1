use std::fmt;
use std::sync::Arc;

use crate::colour::Colour;
use crate::error::GeometryError;
use crate::geometry::{side_length, OscillatingAnimation, Position, Velocity};
use crate::surface::{Bitmap, Surface};

/// Remaining distance, in pixels, at which a particle seeking a target counts as arrived.
pub const ARRIVAL_THRESHOLD: f32 = 1.0;

/// Turn between star edges. Tracing a pentagon this way skips every other vertex.
const STAR_VERTEX_ANGLE: f32 = 144.0;

/// An image backing an image particle. `bitmap` is `None` when the source failed to load, in
/// which case the particle is never drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageHandle {
    pub src: String,
    pub bitmap: Option<Arc<Bitmap>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Circle,
    Square,
    Triangle,
    Polygon { sides: u32 },
    Star,
    Image(ImageHandle),
}

type ArrivalCallback = Box<dyn FnOnce(&mut Particle)>;

struct Seek {
    target: Position,
    on_arrival: Option<ArrivalCallback>,
}

impl fmt::Debug for Seek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seek")
            .field("target", &self.target)
            .finish()
    }
}

/// One on-screen shape.
#[derive(Debug)]
pub struct Particle {
    pub shape: Shape,
    pub position: Position,
    /// Radius for circles, circumradius for polygons, percentage of natural size for images.
    pub size: f32,
    /// Size the particle was generated with.
    pub base_size: f32,
    pub colour: Colour,
    pub velocity: Velocity,
    /// Velocity the particle was generated with, restored after interactions displace it.
    pub starting_velocity: Velocity,
    pub size_animation: Option<OscillatingAnimation>,
    pub opacity_animation: Option<OscillatingAnimation>,
    seek: Option<Seek>,
}

impl Particle {
    pub fn new(
        shape: Shape,
        position: Position,
        size: f32,
        colour: Colour,
        velocity: Velocity,
    ) -> Result<Self, GeometryError> {
        if let Shape::Polygon { sides } = shape {
            if sides < 3 {
                return Err(GeometryError::TooFewSides(sides));
            }
        }

        Ok(Particle {
            shape,
            position,
            size,
            base_size: size,
            colour,
            velocity,
            starting_velocity: velocity,
            size_animation: None,
            opacity_animation: None,
            seek: None,
        })
    }

    pub fn is_animated(&self) -> bool {
        self.size_animation.is_some() || self.opacity_animation.is_some()
    }

    pub fn is_seeking(&self) -> bool {
        self.seek.is_some()
    }

    pub fn target(&self) -> Option<Position> {
        self.seek.as_ref().map(|seek| seek.target)
    }

    /// Head towards `target`, covering `speed` percent of the current offset per second.
    /// `on_arrival` runs once, after the starting velocity has been restored.
    pub fn move_to_position<F>(&mut self, target: Position, speed: f32, on_arrival: F)
    where
        F: FnOnce(&mut Particle) + 'static,
    {
        let scale = speed / 100.0;
        self.velocity = Velocity::new(
            (target.x - self.position.x) * scale,
            (target.y - self.position.y) * scale,
        );
        self.seek = Some(Seek {
            target,
            on_arrival: Some(Box::new(on_arrival)),
        });
    }

    /// Finish a pending move once the particle is within [`ARRIVAL_THRESHOLD`] of its target or
    /// has overshot it. Returns whether the move completed on this call.
    pub fn check_move_to_position(&mut self) -> bool {
        let target = match &self.seek {
            Some(seek) => seek.target,
            None => return false,
        };

        let dx = target.x - self.position.x;
        let dy = target.y - self.position.y;
        let overshot = dx * self.velocity.x + dy * self.velocity.y <= 0.0;
        if self.position.distance_to(&target) > ARRIVAL_THRESHOLD && !overshot {
            return false;
        }

        let mut seek = match self.seek.take() {
            Some(seek) => seek,
            None => return false,
        };
        self.velocity = self.starting_velocity;
        if let Some(on_arrival) = seek.on_arrival.take() {
            on_arrival(self);
        }
        true
    }

    /// Draw the particle in its current state.
    pub fn draw<S: Surface>(&self, surface: &mut S) -> Result<(), GeometryError> {
        let Position { x, y } = self.position;

        match &self.shape {
            Shape::Circle => {
                surface.set_fill_colour(self.colour);
                surface.draw_arc(x, y, self.size, 0.0, 360.0, false);
            }
            Shape::Square => {
                let side = side_length(self.size, 4);
                surface.set_fill_colour(self.colour);
                surface.draw_rectangle(x, y, side, side);
            }
            Shape::Triangle => {
                surface.set_fill_colour(self.colour);
                surface.draw_regular_polygon(x, y, self.size, side_length(self.size, 3), 3, 0.0, None)?;
            }
            Shape::Polygon { sides } => {
                surface.set_fill_colour(self.colour);
                surface.draw_regular_polygon(
                    x,
                    y,
                    self.size,
                    side_length(self.size, *sides),
                    *sides,
                    0.0,
                    None,
                )?;
            }
            Shape::Star => {
                // Pentagram chords span two pentagon edges.
                let chord = (2.0 * self.size * (2.0 * std::f32::consts::PI / 5.0).sin()).round();
                surface.set_fill_colour(self.colour);
                surface.draw_regular_polygon(x, y, self.size, chord, 5, 0.0, Some(STAR_VERTEX_ANGLE))?;
            }
            Shape::Image(handle) => {
                let bitmap = match &handle.bitmap {
                    Some(bitmap) => bitmap,
                    None => return Ok(()),
                };
                let width = bitmap.width as f32 * self.size / 100.0;
                let height = bitmap.height as f32 * self.size / 100.0;
                let alpha = self.colour.a;
                surface.with_save(|surface| {
                    surface.set_global_alpha(alpha);
                    surface.draw_image(x, y, bitmap, Some(width), Some(height));
                });
            }
        }

        Ok(())
    }
}
