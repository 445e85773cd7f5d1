use log::{info, warn};
use rand::Rng;

use crate::assets::AssetStore;
use crate::config::{AnimationConfig, Config, ShapeConfig, ShapeKind};
use crate::error::GeometryError;
use crate::geometry::{OscillatingAnimation, Position, Velocity};
use crate::particle::{ImageHandle, Particle, Shape};

/// Builds the initial particle population for a surface of the given size.
pub struct ParticleGenerator<'a> {
    config: &'a Config,
    width: f32,
    height: f32,
    assets: Option<&'a AssetStore>,
}

impl<'a> ParticleGenerator<'a> {
    pub fn new(config: &'a Config, width: f32, height: f32) -> Self {
        ParticleGenerator {
            config,
            width,
            height,
            assets: None,
        }
    }

    /// Images for image shape groups are looked up here.
    pub fn with_assets(mut self, assets: &'a AssetStore) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Particle>, GeometryError> {
        let mut particles = Vec::new();
        for shape in &self.config.shapes {
            particles.extend(self.generate_for_shape(shape, rng)?);
        }

        info!(
            "generated {} particles in {} shape group(s)",
            particles.len(),
            self.config.shapes.len()
        );
        Ok(particles)
    }

    /// Exactly `shape.count` particles for one shape group.
    pub fn generate_for_shape<R: Rng + ?Sized>(
        &self,
        shape: &ShapeConfig,
        rng: &mut R,
    ) -> Result<Vec<Particle>, GeometryError> {
        let variant = self.shape_variant(&shape.kind);

        let mut particles = Vec::with_capacity(shape.count);
        while particles.len() < shape.count {
            let position = Position::random_within(self.width, self.height, shape.size, rng);
            let velocity = Velocity::from_movement(&self.config.movement, rng);
            let mut particle =
                Particle::new(variant.clone(), position, shape.size, shape.colour, velocity)?;

            if let Some(animation) = &shape.opacity_animation {
                particle.opacity_animation = Some(oscillation(animation, &mut *rng));
            }
            if let Some(animation) = &shape.size_animation {
                particle.size_animation = Some(oscillation(animation, &mut *rng));
            }

            particles.push(particle);
        }

        Ok(particles)
    }

    fn shape_variant(&self, kind: &ShapeKind) -> Shape {
        match kind {
            ShapeKind::Circle => Shape::Circle,
            ShapeKind::Square => Shape::Square,
            ShapeKind::Triangle => Shape::Triangle,
            ShapeKind::Polygon { sides } => Shape::Polygon { sides: *sides },
            ShapeKind::Star => Shape::Star,
            ShapeKind::Image { src } => {
                let bitmap = match self.assets.map(|assets| assets.get(src)) {
                    Some(Ok(bitmap)) => Some(bitmap),
                    Some(Err(e)) => {
                        warn!("image particles for `{}` will not be drawn: {}", src, e);
                        None
                    }
                    None => {
                        warn!("no assets available, image particles for `{}` will not be drawn", src);
                        None
                    }
                };
                Shape::Image(ImageHandle {
                    src: src.clone(),
                    bitmap,
                })
            }
        }
    }
}

/// A fresh animation state for one particle. Unsynced groups scale the speed randomly per
/// particle so they drift out of phase.
fn oscillation<R: Rng + ?Sized>(animation: &AnimationConfig, rng: &mut R) -> OscillatingAnimation {
    let mut speed = animation.speed;
    if !animation.synced {
        speed *= rng.gen::<f32>();
    }
    OscillatingAnimation::new(speed, animation.min, animation.max)
}
