//! Per-frame particle updates.
//!
//! All distances here are pixels. Time steps are seconds.

use rand::Rng;

use crate::config::LinkConfig;
use crate::geometry::Position;
use crate::particle::Particle;
use crate::surface::Surface;

/// Upper bound of the random per-frame damping used by [`Manipulator::attract`].
const ATTRACT_DAMPING: f32 = 0.5;

/// Updates particles against a surface of a fixed size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Manipulator {
    width: f32,
    height: f32,
}

impl Manipulator {
    pub fn new(width: f32, height: f32) -> Self {
        Manipulator { width, height }
    }

    pub fn for_surface<S: Surface + ?Sized>(surface: &S) -> Self {
        Manipulator::new(surface.width(), surface.height())
    }

    /// The `(min_x, max_x, min_y, max_y)` range a particle of `size` may occupy under the edge
    /// policy.
    fn bounds(&self, size: f32, bounce: bool) -> (f32, f32, f32, f32) {
        if bounce {
            (size, self.width - size, size, self.height - size)
        } else {
            (-size, self.width + size, -size, self.height + size)
        }
    }

    /// Integrate the velocity over `delta_time`.
    ///
    /// With `bounce` the particle stays `size` inside every edge and reflects off it. Without,
    /// it may travel `size` past an edge before reappearing `size` past the opposite one. A
    /// particle gliding to a target stops on the edge instead of wrapping.
    pub fn move_particle(&self, particle: &mut Particle, delta_time: f32, bounce: bool) {
        if delta_time == 0.0 {
            return;
        }

        let (min_x, max_x, min_y, max_y) = self.bounds(particle.size, bounce);
        let seeking = particle.is_seeking();

        let mut x = particle.position.x + particle.velocity.x * delta_time;
        let mut y = particle.position.y + particle.velocity.y * delta_time;

        if x > max_x || x < min_x {
            let past_max = x > max_x;
            if bounce {
                x = if past_max { max_x } else { min_x };
                particle.velocity.x = -particle.velocity.x;
            } else if seeking {
                x = if past_max { max_x } else { min_x };
            } else {
                x = if past_max { min_x } else { max_x };
            }
        }

        if y > max_y || y < min_y {
            let past_max = y > max_y;
            if bounce {
                y = if past_max { max_y } else { min_y };
                particle.velocity.y = -particle.velocity.y;
            } else if seeking {
                y = if past_max { max_y } else { min_y };
            } else {
                y = if past_max { min_y } else { max_y };
            }
        }

        particle.position = Position::new(x, y);
    }

    /// Push a particle closer than `distance` out to exactly `distance` from the pointer.
    pub fn repulse(&self, particle: &mut Particle, pointer: Position, distance: f32) {
        let current = particle.position.distance_to(&pointer);
        if current >= distance || current == 0.0 {
            return;
        }

        particle.position = ray_point(pointer, particle.position, distance / current);
    }

    /// Like [`repulse`](Self::repulse) but glides to the boundary at `speed` percent per second,
    /// getting its starting velocity back on arrival. The target is kept within the range the
    /// edge policy allows.
    pub fn click_repulse(
        &self,
        particle: &mut Particle,
        pointer: Position,
        distance: f32,
        speed: f32,
        bounce: bool,
    ) {
        let current = particle.position.distance_to(&pointer);
        if current >= distance || current == 0.0 {
            return;
        }

        let (min_x, max_x, min_y, max_y) = self.bounds(particle.size, bounce);
        let target = ray_point(pointer, particle.position, distance / current);
        let target = Position::new(
            target.x.max(min_x).min(max_x),
            target.y.max(min_y).min(max_y),
        );
        particle.move_to_position(target, speed, |_| ());
    }

    /// Grow (or shrink) a particle towards `size` the closer it is to the pointer. Outside the
    /// radius a particle without its own size animation relaxes back to its base size.
    pub fn bubble(&self, particle: &mut Particle, pointer: Position, distance: f32, size: f32) {
        let current = particle.position.distance_to(&pointer);
        if current >= distance {
            if particle.size_animation.is_none() {
                particle.size = particle.base_size;
            }
            return;
        }

        let falloff = 1.0 - current / distance;
        particle.size = particle.base_size + (size - particle.base_size) * falloff;
    }

    /// Pull a particle within `distance` towards the pointer by a random fraction of the gap.
    pub fn attract<R: Rng + ?Sized>(
        &self,
        particle: &mut Particle,
        pointer: Position,
        distance: f32,
        rng: &mut R,
    ) {
        let current = particle.position.distance_to(&pointer);
        if current >= distance || current == 0.0 {
            return;
        }

        let damping = rng.gen_range(0.0..=ATTRACT_DAMPING);
        particle.position = Position::new(
            particle.position.x + (pointer.x - particle.position.x) * damping,
            particle.position.y + (pointer.y - particle.position.y) * damping,
        );
    }

    /// Stroke a line from the particle to `other` when they are within the link distance. The
    /// line fades linearly from the link colour's alpha to nothing at the boundary.
    pub fn link<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        particle: &Particle,
        other: Position,
        link: &LinkConfig,
    ) {
        let current = particle.position.distance_to(&other);
        if current >= link.distance {
            return;
        }

        let opacity = link.colour.a * (1.0 - current / link.distance);
        surface.set_stroke_colour(link.colour.with_alpha(opacity));
        surface.draw_line(
            particle.position.x,
            particle.position.y,
            other.x,
            other.y,
            link.thickness,
        );
    }

    pub fn animate_size(&self, particle: &mut Particle, delta_time: f32) {
        if let Some(animation) = particle.size_animation.as_mut() {
            particle.size = animation.step(particle.size, delta_time);
        }
    }

    pub fn animate_opacity(&self, particle: &mut Particle, delta_time: f32) {
        if let Some(animation) = particle.opacity_animation.as_mut() {
            particle.colour.a = animation.step(particle.colour.a, delta_time);
        }
    }
}

/// `origin + (point - origin) * scale`
fn ray_point(origin: Position, point: Position, scale: f32) -> Position {
    Position::new(
        origin.x + (point.x - origin.x) * scale,
        origin.y + (point.y - origin.y) * scale,
    )
}
