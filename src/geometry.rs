use rand::Rng;
use serde::Deserialize;

use crate::config::MovementConfig;
use crate::error::GeometryError;

/// A point in surface pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Position { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// A random position inside a `width` x `height` area such that a particle of radius `size`
    /// centred on it stays inside the area. Offending coordinates are shifted back in rather than
    /// resampled.
    pub fn random_within<R: Rng + ?Sized>(width: f32, height: f32, size: f32, rng: &mut R) -> Self {
        let x = rng.gen::<f32>() * width;
        let y = rng.gen::<f32>() * height;
        Position::new(shift_inside(x, width, size), shift_inside(y, height, size))
    }
}

fn shift_inside(v: f32, extent: f32, size: f32) -> f32 {
    if extent < 2.0 * size {
        return extent / 2.0;
    }
    if v + size > extent {
        extent - size
    } else if v - size < 0.0 {
        size
    } else {
        v
    }
}

/// Pixels per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Velocity { x, y }
    }

    /// Velocity for a freshly generated particle. Random movement jitters each axis of the unit
    /// direction by up to ±1 before scaling by the speed.
    pub fn from_movement<R: Rng + ?Sized>(movement: &MovementConfig, rng: &mut R) -> Self {
        if !movement.enabled {
            return Velocity::ZERO;
        }

        let (mut x, mut y) = movement.direction.unit_vector();
        if movement.random {
            x += 2.0 * rng.gen::<f32>() - 1.0;
            y += 2.0 * rng.gen::<f32>() - 1.0;
        }

        Velocity::new(x * movement.speed, y * movement.speed)
    }
}

/// Base movement direction. Screen coordinates, so `Top` is negative y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    None,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    TopLeft,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::None
    }
}

impl Direction {
    pub fn unit_vector(self) -> (f32, f32) {
        use std::f32::consts::FRAC_1_SQRT_2 as D;
        match self {
            Direction::None => (0.0, 0.0),
            Direction::Top => (0.0, -1.0),
            Direction::TopRight => (D, -D),
            Direction::Right => (1.0, 0.0),
            Direction::BottomRight => (D, D),
            Direction::Bottom => (0.0, 1.0),
            Direction::BottomLeft => (-D, D),
            Direction::Left => (-1.0, 0.0),
            Direction::TopLeft => (-D, -D),
        }
    }
}

/// Ping-pong state for a value that oscillates between `min` and `max`.
///
/// The animated value itself lives on the particle (its size or its colour alpha). `reverse`
/// means the value is currently rising.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscillatingAnimation {
    /// Units per second.
    pub speed: f32,
    pub min: f32,
    pub max: f32,
    pub reverse: bool,
}

impl OscillatingAnimation {
    pub fn new(speed: f32, min: f32, max: f32) -> Self {
        OscillatingAnimation {
            speed,
            min,
            max,
            reverse: false,
        }
    }

    /// Advance `value` by one step of `delta_time` seconds and return the new value.
    ///
    /// The direction flips once the value reaches a bound. A step that crosses a bound stops on
    /// it; the result is never negative.
    pub fn step(&mut self, value: f32, delta_time: f32) -> f32 {
        if value <= self.min {
            self.reverse = true;
        } else if value >= self.max {
            self.reverse = false;
        }

        let delta = self.speed * delta_time;
        let next = if self.reverse {
            let next = value + delta;
            if value <= self.max && next > self.max {
                self.max
            } else {
                next
            }
        } else {
            let next = value - delta;
            if value >= self.min && next < self.min {
                self.min
            } else {
                next
            }
        };

        next.max(0.0)
    }
}

/// Side length of a regular polygon with the given circumradius, rounded to whole pixels.
pub fn side_length(circumradius: f32, sides: u32) -> f32 {
    (2.0 * circumradius * (std::f32::consts::PI / sides as f32).sin()).round()
}

/// Vertices of a closed polygon traced edge by edge.
///
/// The first vertex sits `circumradius` directly above the centre (before `rotation_deg` is
/// applied). Each edge is `side_length` long and the heading turns by `vertex_angle_deg` after
/// every edge, so `360 / sides` traces a regular polygon and larger turns trace stars.
pub fn polygon_vertices(
    x: f32,
    y: f32,
    circumradius: f32,
    side_length: f32,
    sides: u32,
    rotation_deg: f32,
    vertex_angle_deg: f32,
) -> Result<Vec<Position>, GeometryError> {
    if sides < 3 {
        return Err(GeometryError::TooFewSides(sides));
    }

    let rotation = rotation_deg.to_radians();
    let turn = vertex_angle_deg.to_radians();

    // Screen angles: 0 points right, positive turns clockwise since y grows downwards.
    let start_angle = rotation - std::f32::consts::FRAC_PI_2;
    let mut point = Position::new(
        x + circumradius * start_angle.cos(),
        y + circumradius * start_angle.sin(),
    );
    let mut heading = rotation + turn / 2.0;

    let mut vertices = Vec::with_capacity(sides as usize);
    for _ in 0..sides {
        vertices.push(point);
        point = Position::new(
            point.x + side_length * heading.cos(),
            point.y + side_length * heading.sin(),
        );
        heading += turn;
    }

    Ok(vertices)
}
