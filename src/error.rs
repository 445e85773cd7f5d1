//! Error types for subatomic.

use std::sync::Arc;

use thiserror::Error;

/// A hex colour or opacity that cannot be turned into an RGBA colour.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ColourError {
    /// The string is not a 3- or 6-digit hex colour.
    #[error("invalid hex colour `{0}`")]
    BadHex(String),

    /// Opacity must lie in [0, 1].
    #[error("opacity {0} is outside [0, 1]")]
    OpacityOutOfRange(f32),
}

/// Errors raised while resolving user settings into a [`Config`](crate::config::Config).
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// At least one shape group is required.
    #[error("config must provide at least one shape to render")]
    NoShapes,

    /// Shape type is not one of the supported variants.
    #[error("unknown shape type `{0}`")]
    UnknownShapeType(String),

    /// A shape group opacity outside [0, 1].
    #[error("shape opacity {0} is outside [0, 1]")]
    OpacityOutOfRange(f32),

    /// An oscillating animation with bad bounds.
    #[error("{setting}: min {min} must be >= 0 and <= max {max}")]
    InvalidAnimation {
        /// Which setting was rejected.
        setting: &'static str,
        /// Configured minimum.
        min: f32,
        /// Configured (or inherited) maximum.
        max: f32,
    },

    /// Movement speed outside the accepted range.
    #[error("movement speed {0} is outside [0, {max}]", max = crate::config::MAX_SPEED)]
    SpeedOutOfRange(f32),

    /// Hover repulse and hover attract cannot both be set.
    #[error("config should not set both on_hover.repulse and on_hover.attract")]
    ConflictingHover,

    /// An image shape group without a source.
    #[error("cannot generate an image particle without a src")]
    MissingImageSource,

    /// Colour settings that do not parse.
    #[error(transparent)]
    Colour(#[from] ColourError),

    /// The settings file is not valid JSON for [`Settings`](crate::config::Settings).
    #[error("failed to parse settings: {0}")]
    Parse(String),
}

/// Errors raised when building or drawing geometry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// Polygons need at least three sides.
    #[error("cannot draw a shape with {0} sides, at least 3 are required")]
    TooFewSides(u32),
}

/// Errors raised per asset source by the asset loader.
#[derive(Debug, Clone, Error)]
pub enum AssetError {
    /// Reading the source failed.
    #[error("error loading image from src `{src}`: {source}")]
    Io {
        /// Source key.
        src: String,
        /// Underlying error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The bytes could not be decoded as an image.
    #[error("error decoding image from src `{src}`: {source}")]
    Decode {
        /// Source key.
        src: String,
        /// Underlying error.
        #[source]
        source: Arc<image::ImageError>,
    },

    /// Source format has no decoder.
    #[error("unsupported image format for src `{0}`")]
    Unsupported(String),

    /// Queried before the source finished loading.
    #[error("image with src `{0}` has not been loaded yet")]
    NotLoaded(String),
}

/// Any error produced by this crate.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Geometry error.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Asset error.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Reading a settings file failed.
    #[error("failed to read settings: {0}")]
    Io(#[source] Arc<std::io::Error>),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(Arc::new(e))
    }
}
