//! User settings and their resolution into a complete [`Config`].
//!
//! [`Settings`] is what users write (JSON, every field optional). [`resolve`] validates it and
//! produces a new, fully-defaulted [`Config`]; nothing downstream re-validates.
//!
//! Interaction distances in settings are centipixels: `10000` means 100 pixels. The resolved
//! config only carries pixel distances.

use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::colour::Colour;
use crate::error::{ConfigError, Error};
use crate::geometry::Direction;

/// Upper bound for the movement speed in pixels per second.
pub const MAX_SPEED: f32 = 5000.0;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub shapes: Vec<ShapeSettings>,
    pub movement: Option<MovementSettings>,
    pub link: Option<LinkSettings>,
    pub on_hover: Option<HoverSettings>,
    pub on_click: Option<ClickSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            shapes: vec![ShapeSettings {
                count: Some(60),
                ..ShapeSettings::default()
            }],
            movement: None,
            link: Some(LinkSettings::default()),
            on_hover: Some(HoverSettings {
                repulse: Some(RepulseSettings::default()),
                ..HoverSettings::default()
            }),
            on_click: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ShapeSettings {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(alias = "number")]
    pub count: Option<usize>,
    pub colour: Option<String>,
    pub opacity: Option<f32>,
    pub size: Option<f32>,
    pub opacity_animation: Option<AnimationSettings>,
    pub size_animation: Option<AnimationSettings>,
    /// Polygon side count.
    pub sides: Option<u32>,
    /// Image source.
    pub src: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Units per second.
    pub speed: f32,
    pub min: f32,
    /// Defaults to the shape's own opacity or size.
    pub max: Option<f32>,
    pub synced: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Straight,
    Random,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    pub enabled: Option<bool>,
    pub direction: Option<Direction>,
    pub speed: Option<f32>,
    #[serde(rename = "type")]
    pub kind: Option<MovementKind>,
    pub bounce: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LinkSettings {
    pub distance: f32,
    pub thickness: f32,
    pub colour: String,
    pub opacity: f32,
}

impl Default for LinkSettings {
    fn default() -> Self {
        LinkSettings {
            distance: 15000.0,
            thickness: 1.0,
            colour: "#ffffff".to_string(),
            opacity: 0.4,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct HoverSettings {
    pub repulse: Option<RepulseSettings>,
    pub attract: Option<AttractSettings>,
    pub bubble: Option<BubbleSettings>,
    pub link: Option<LinkSettings>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RepulseSettings {
    pub distance: f32,
}

impl Default for RepulseSettings {
    fn default() -> Self {
        RepulseSettings { distance: 10000.0 }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AttractSettings {
    pub distance: f32,
}

impl Default for AttractSettings {
    fn default() -> Self {
        AttractSettings { distance: 20000.0 }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BubbleSettings {
    pub distance: f32,
    pub size: f32,
}

impl Default for BubbleSettings {
    fn default() -> Self {
        BubbleSettings {
            distance: 10000.0,
            size: 10.0,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ClickSettings {
    pub repulse: Option<ClickRepulseSettings>,
    pub create: Option<CreateSettings>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClickRepulseSettings {
    pub distance: f32,
    /// Percentage of the remaining distance covered per second.
    pub speed: f32,
}

impl Default for ClickRepulseSettings {
    fn default() -> Self {
        ClickRepulseSettings {
            distance: 15000.0,
            speed: 400.0,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateSettings {
    pub count: usize,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Read settings from `path`. A missing file yields the default settings.
pub async fn load(path: impl AsRef<Path>) -> Result<Config, Error> {
    let path = path.as_ref();
    let settings = match tokio::fs::read_to_string(path).await {
        Ok(json) => Settings::from_json(&json)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("{} not found, using default settings", path.display());
            Settings::default()
        }
        Err(e) => return Err(e.into()),
    };
    Ok(resolve(&settings)?)
}

// Resolved configuration.

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub shapes: Vec<ShapeConfig>,
    pub movement: MovementConfig,
    /// Links between pairs of particles.
    pub link: Option<LinkConfig>,
    pub on_hover: HoverConfig,
    pub on_click: ClickConfig,
}

impl Config {
    /// Sources of every image shape group, deduplicated.
    pub fn image_sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = Vec::new();
        for shape in &self.shapes {
            if let ShapeKind::Image { src } = &shape.kind {
                if !sources.contains(src) {
                    sources.push(src.clone());
                }
            }
        }
        sources
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
    Circle,
    Square,
    Triangle,
    Polygon { sides: u32 },
    Star,
    Image { src: String },
}

impl ShapeKind {
    fn parse(name: &str, shape: &ShapeSettings) -> Result<Self, ConfigError> {
        Ok(match name {
            "circle" => ShapeKind::Circle,
            "square" | "edge" => ShapeKind::Square,
            "triangle" => ShapeKind::Triangle,
            "polygon" => ShapeKind::Polygon {
                sides: shape.sides.unwrap_or(5),
            },
            "star" => ShapeKind::Star,
            "image" => ShapeKind::Image {
                src: shape.src.clone().ok_or(ConfigError::MissingImageSource)?,
            },
            other => return Err(ConfigError::UnknownShapeType(other.to_string())),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShapeConfig {
    pub kind: ShapeKind,
    pub count: usize,
    /// Colour with the group opacity as its alpha.
    pub colour: Colour,
    pub size: f32,
    pub opacity_animation: Option<AnimationConfig>,
    pub size_animation: Option<AnimationConfig>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationConfig {
    pub speed: f32,
    pub min: f32,
    pub max: f32,
    pub synced: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementConfig {
    pub enabled: bool,
    pub direction: Direction,
    /// Pixels per second.
    pub speed: f32,
    pub random: bool,
    pub bounce: bool,
}

impl Default for MovementConfig {
    fn default() -> Self {
        MovementConfig {
            enabled: true,
            direction: Direction::None,
            speed: 60.0,
            random: true,
            bounce: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkConfig {
    /// Pixels.
    pub distance: f32,
    pub thickness: f32,
    /// Colour with the base link opacity as its alpha.
    pub colour: Colour,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HoverConfig {
    pub repulse: Option<RepulseConfig>,
    pub attract: Option<AttractConfig>,
    pub bubble: Option<BubbleConfig>,
    pub link: Option<LinkConfig>,
}

impl HoverConfig {
    pub fn is_empty(&self) -> bool {
        self.repulse.is_none()
            && self.attract.is_none()
            && self.bubble.is_none()
            && self.link.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RepulseConfig {
    pub distance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttractConfig {
    pub distance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BubbleConfig {
    pub distance: f32,
    /// Size reached at the pointer itself.
    pub size: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClickConfig {
    pub repulse: Option<ClickRepulseConfig>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClickRepulseConfig {
    pub distance: f32,
    pub speed: f32,
}

/// Convert a centipixel distance setting to pixels.
pub fn centipixels(value: f32) -> f32 {
    value / 100.0
}

const DEFAULT_SHAPE: &str = "circle";
const DEFAULT_COUNT: usize = 10;
const DEFAULT_COLOUR: &str = "#ffffff";
const DEFAULT_OPACITY: f32 = 1.0;
const DEFAULT_SIZE: f32 = 3.0;

pub fn resolve(settings: &Settings) -> Result<Config, ConfigError> {
    if settings.shapes.is_empty() {
        return Err(ConfigError::NoShapes);
    }

    let shapes = settings
        .shapes
        .iter()
        .map(resolve_shape)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Config {
        shapes,
        movement: resolve_movement(settings.movement.as_ref())?,
        link: settings.link.as_ref().map(resolve_link).transpose()?,
        on_hover: resolve_hover(settings.on_hover.as_ref())?,
        on_click: resolve_click(settings.on_click.as_ref()),
    })
}

fn resolve_shape(shape: &ShapeSettings) -> Result<ShapeConfig, ConfigError> {
    let kind = ShapeKind::parse(shape.kind.as_deref().unwrap_or(DEFAULT_SHAPE), shape)?;

    let opacity = shape.opacity.unwrap_or(DEFAULT_OPACITY);
    if !(0.0..=1.0).contains(&opacity) {
        return Err(ConfigError::OpacityOutOfRange(opacity));
    }

    let size = shape.size.unwrap_or(DEFAULT_SIZE);
    let colour = Colour::from_hex(shape.colour.as_deref().unwrap_or(DEFAULT_COLOUR), opacity)?;

    let opacity_animation = shape
        .opacity_animation
        .as_ref()
        .map(|a| resolve_animation(a, opacity, "shape.opacity_animation"))
        .transpose()?;
    if let Some(animation) = &opacity_animation {
        if animation.max > 1.0 {
            return Err(ConfigError::OpacityOutOfRange(animation.max));
        }
    }
    let size_animation = shape
        .size_animation
        .as_ref()
        .map(|a| resolve_animation(a, size, "shape.size_animation"))
        .transpose()?;

    Ok(ShapeConfig {
        kind,
        count: shape.count.unwrap_or(DEFAULT_COUNT),
        colour,
        size,
        opacity_animation,
        size_animation,
    })
}

fn resolve_animation(
    animation: &AnimationSettings,
    value: f32,
    setting: &'static str,
) -> Result<AnimationConfig, ConfigError> {
    let max = animation.max.unwrap_or(value);
    if animation.min < 0.0 || animation.min > max {
        return Err(ConfigError::InvalidAnimation {
            setting,
            min: animation.min,
            max,
        });
    }

    Ok(AnimationConfig {
        speed: animation.speed,
        min: animation.min,
        max,
        synced: animation.synced,
    })
}

fn resolve_movement(movement: Option<&MovementSettings>) -> Result<MovementConfig, ConfigError> {
    let defaults = MovementConfig::default();
    let movement = match movement {
        Some(movement) => movement,
        None => return Ok(defaults),
    };

    let speed = movement.speed.unwrap_or(defaults.speed);
    if !(0.0..=MAX_SPEED).contains(&speed) {
        return Err(ConfigError::SpeedOutOfRange(speed));
    }

    Ok(MovementConfig {
        enabled: movement.enabled.unwrap_or(defaults.enabled),
        direction: movement.direction.unwrap_or(defaults.direction),
        speed,
        random: movement
            .kind
            .map(|kind| kind == MovementKind::Random)
            .unwrap_or(defaults.random),
        bounce: movement.bounce.unwrap_or(defaults.bounce),
    })
}

fn resolve_link(link: &LinkSettings) -> Result<LinkConfig, ConfigError> {
    Ok(LinkConfig {
        distance: centipixels(link.distance),
        thickness: link.thickness,
        colour: Colour::from_hex(&link.colour, link.opacity)?,
    })
}

fn resolve_hover(hover: Option<&HoverSettings>) -> Result<HoverConfig, ConfigError> {
    let hover = match hover {
        Some(hover) => hover,
        None => return Ok(HoverConfig::default()),
    };

    if hover.repulse.is_some() && hover.attract.is_some() {
        return Err(ConfigError::ConflictingHover);
    }

    Ok(HoverConfig {
        repulse: hover.repulse.as_ref().map(|r| RepulseConfig {
            distance: centipixels(r.distance),
        }),
        attract: hover.attract.as_ref().map(|a| AttractConfig {
            distance: centipixels(a.distance),
        }),
        bubble: hover.bubble.as_ref().map(|b| BubbleConfig {
            distance: centipixels(b.distance),
            size: b.size,
        }),
        link: hover.link.as_ref().map(resolve_link).transpose()?,
    })
}

fn resolve_click(click: Option<&ClickSettings>) -> ClickConfig {
    let click = match click {
        Some(click) => click,
        None => return ClickConfig::default(),
    };

    if click.create.is_some() {
        warn!("on_click.create is not supported and will be ignored");
    }

    ClickConfig {
        repulse: click.repulse.as_ref().map(|r| ClickRepulseConfig {
            distance: centipixels(r.distance),
            speed: r.speed,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(kind: &str) -> ShapeSettings {
        ShapeSettings {
            kind: Some(kind.to_string()),
            ..ShapeSettings::default()
        }
    }

    fn settings(shapes: Vec<ShapeSettings>) -> Settings {
        Settings {
            shapes,
            movement: None,
            link: None,
            on_hover: None,
            on_click: None,
        }
    }

    #[test]
    fn fills_shape_defaults() {
        let config = resolve(&settings(vec![ShapeSettings::default()])).unwrap();
        let shape = &config.shapes[0];

        assert_eq!(shape.kind, ShapeKind::Circle);
        assert_eq!(shape.count, 10);
        assert_eq!(shape.colour, Colour::new(255, 255, 255, 1.0));
        assert_eq!(shape.size, 3.0);
        assert_eq!(config.movement, MovementConfig::default());
        assert!(config.on_hover.is_empty());
        assert!(config.link.is_none());
    }

    #[test]
    fn requires_a_shape() {
        assert!(matches!(
            resolve(&settings(vec![])),
            Err(ConfigError::NoShapes)
        ));
    }

    #[test]
    fn rejects_unknown_shape_type() {
        match resolve(&settings(vec![shape("hexagon")])) {
            Err(ConfigError::UnknownShapeType(name)) => assert_eq!(name, "hexagon"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_opacity_out_of_range() {
        let mut s = shape("circle");
        s.opacity = Some(1.2);
        assert!(matches!(
            resolve(&settings(vec![s])),
            Err(ConfigError::OpacityOutOfRange(_))
        ));
    }

    #[test]
    fn animation_max_defaults_to_shape_value() {
        let mut s = shape("star");
        s.opacity = Some(0.8);
        s.opacity_animation = Some(AnimationSettings {
            speed: 1.0,
            min: 0.1,
            ..AnimationSettings::default()
        });
        let config = resolve(&settings(vec![s])).unwrap();
        assert_eq!(config.shapes[0].opacity_animation.unwrap().max, 0.8);
    }

    #[test]
    fn rejects_bad_animation_bounds() {
        let mut s = shape("circle");
        s.size_animation = Some(AnimationSettings {
            speed: 1.0,
            min: 5.0,
            max: Some(2.0),
            synced: false,
        });
        assert!(matches!(
            resolve(&settings(vec![s])),
            Err(ConfigError::InvalidAnimation { min, max, .. }) if min == 5.0 && max == 2.0
        ));

        let mut s = shape("circle");
        s.size_animation = Some(AnimationSettings {
            speed: 1.0,
            min: -1.0,
            max: None,
            synced: false,
        });
        assert!(resolve(&settings(vec![s])).is_err());
    }

    #[test]
    fn rejects_opacity_animation_above_one() {
        let mut s = shape("circle");
        s.opacity_animation = Some(AnimationSettings {
            speed: 1.0,
            min: 0.1,
            max: Some(3.0),
            synced: false,
        });
        assert!(matches!(
            resolve(&settings(vec![s])),
            Err(ConfigError::OpacityOutOfRange(max)) if max == 3.0
        ));

        let mut s = shape("circle");
        s.opacity_animation = Some(AnimationSettings {
            speed: 1.0,
            min: 1.5,
            max: Some(2.0),
            synced: false,
        });
        assert!(resolve(&settings(vec![s])).is_err());

        // Size animations are not bound to [0, 1].
        let mut s = shape("circle");
        s.size_animation = Some(AnimationSettings {
            speed: 1.0,
            min: 1.0,
            max: Some(3.0),
            synced: false,
        });
        assert!(resolve(&settings(vec![s])).is_ok());
    }

    #[test]
    fn rejects_conflicting_hover() {
        let mut config = settings(vec![shape("circle")]);
        config.on_hover = Some(HoverSettings {
            repulse: Some(RepulseSettings::default()),
            attract: Some(AttractSettings::default()),
            ..HoverSettings::default()
        });
        assert!(matches!(
            resolve(&config),
            Err(ConfigError::ConflictingHover)
        ));
    }

    #[test]
    fn rejects_excessive_speed() {
        let mut config = settings(vec![shape("circle")]);
        config.movement = Some(MovementSettings {
            speed: Some(MAX_SPEED + 1.0),
            ..MovementSettings::default()
        });
        assert!(matches!(
            resolve(&config),
            Err(ConfigError::SpeedOutOfRange(_))
        ));
    }

    #[test]
    fn image_needs_a_source() {
        assert!(matches!(
            resolve(&settings(vec![shape("image")])),
            Err(ConfigError::MissingImageSource)
        ));
    }

    #[test]
    fn distances_are_centipixels() {
        let mut config = settings(vec![shape("circle")]);
        config.on_hover = Some(HoverSettings {
            repulse: Some(RepulseSettings { distance: 5000.0 }),
            bubble: Some(BubbleSettings {
                distance: 250.0,
                size: 8.0,
            }),
            ..HoverSettings::default()
        });
        config.link = Some(LinkSettings {
            distance: 100.0,
            ..LinkSettings::default()
        });

        let config = resolve(&config).unwrap();
        assert_eq!(config.on_hover.repulse.unwrap().distance, 50.0);
        assert_eq!(config.on_hover.bubble.unwrap().distance, 2.5);
        assert_eq!(config.on_hover.bubble.unwrap().size, 8.0);
        assert_eq!(config.link.unwrap().distance, 1.0);
    }

    #[test]
    fn parses_json() {
        let json = r##"{
            "shapes": [
                { "type": "polygon", "number": 4, "sides": 6, "colour": "#0f0", "opacity": 0.5 },
                { "type": "image", "src": "assets/atom.png", "size": 50 }
            ],
            "movement": { "direction": "top-left", "speed": 20, "type": "straight", "bounce": true },
            "on_hover": { "attract": { "distance": 3000 } },
            "on_click": { "repulse": {} }
        }"##;

        let config = resolve(&Settings::from_json(json).unwrap()).unwrap();

        assert_eq!(config.shapes[0].kind, ShapeKind::Polygon { sides: 6 });
        assert_eq!(config.shapes[0].count, 4);
        assert_eq!(config.shapes[0].colour, Colour::new(0, 255, 0, 0.5));
        assert_eq!(config.image_sources(), vec!["assets/atom.png".to_string()]);
        assert_eq!(
            config.movement,
            MovementConfig {
                enabled: true,
                direction: Direction::TopLeft,
                speed: 20.0,
                random: false,
                bounce: true,
            }
        );
        assert_eq!(config.on_hover.attract.unwrap().distance, 30.0);
        assert_eq!(
            config.on_click.repulse,
            Some(ClickRepulseConfig {
                distance: 150.0,
                speed: 400.0
            })
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            Settings::from_json("{ \"shapes\": 3 }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn default_settings_resolve() {
        let config = resolve(&Settings::default()).unwrap();
        assert_eq!(config.shapes[0].count, 60);
        assert!(config.on_hover.repulse.is_some());
    }
}
