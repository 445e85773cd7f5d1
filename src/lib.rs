//! A configurable field of animated 2D particles.
//!
//! Settings resolve into a [`Config`](config::Config), the [`ParticleGenerator`] builds the
//! population from it, and an [`AnimationLoop`] moves, animates and draws the particles onto a
//! [`Surface`] once per host frame.

pub mod animation_loop;
pub mod assets;
pub mod colour;
pub mod config;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod interaction;
pub mod manipulator;
pub mod particle;
pub mod surface;

pub use animation_loop::{AnimationLoop, FrameHost, FrameRequest, LoopState};
pub use assets::AssetStore;
pub use colour::Colour;
pub use config::{resolve, Config, Settings};
pub use error::{AssetError, ColourError, ConfigError, Error, GeometryError};
pub use generator::ParticleGenerator;
pub use geometry::{OscillatingAnimation, Position, Velocity};
pub use manipulator::Manipulator;
pub use particle::{Particle, Shape};
pub use surface::{Bitmap, DisplayList, DrawCommand, Surface};
