mod painter;
mod style;

use std::cell::Cell;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use log::{error, info};
use rand::thread_rng;

use iced::button::{self, Button};
use iced::canvas::{self, event, Cache, Canvas, Cursor, Event, Frame, Geometry};
use iced::time;
use iced::{
    mouse, Align, Application, Clipboard, Color, Column, Command, Container, Element,
    HorizontalAlignment, Length, Point, Rectangle, Row, Settings, Size, Subscription, Text,
    VerticalAlignment,
};

use subatomic::{
    AnimationLoop, AssetStore, Config, DisplayList, Error, FrameHost, FrameRequest, Particle,
    ParticleGenerator, Surface,
};

const DEFAULT_SETTINGS: &str = "subatomic.json";

/// Roughly one display refresh.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// How often the canvas bounds are checked for a resize.
const LAYOUT_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Clone, Debug)]
enum Message {
    ConfigLoaded(Result<Config, Error>),
    AssetsLoaded(AssetStore),
    Frame,
    Layout,
    TogglePlay,
    Regenerate,
    PointerMoved(Point),
    PointerLeft,
    Clicked(Point),
}

/// Frame scheduling on top of the application's timer subscription.
///
/// A requested frame is delivered by the next `Message::Frame`; the subscription only runs
/// while a request is pending.
struct Ticker {
    epoch: Instant,
    next_request: u64,
    pending: Option<FrameRequest>,
}

impl Ticker {
    fn new() -> Self {
        Ticker {
            epoch: Instant::now(),
            next_request: 0,
            pending: None,
        }
    }
}

impl FrameHost for Ticker {
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn request_frame(&mut self) -> FrameRequest {
        self.next_request += 1;
        let request = FrameRequest(self.next_request);
        self.pending = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

#[derive(Default)]
struct Controls {
    play_button: button::State,
    regenerate_button: button::State,
}

struct Subatomic {
    settings_path: PathBuf,
    config: Option<Config>,
    assets: Option<AssetStore>,
    field: Option<AnimationLoop<Ticker>>,
    scene: Scene,
    is_playing: bool,
    failure: Option<String>,
    controls: Controls,
}

impl Subatomic {
    /// A fresh random population, once settings, images and canvas size are all known.
    fn generate(&mut self) -> Option<Vec<Particle>> {
        let (config, assets, size) = match (&self.config, &self.assets, self.scene.size()) {
            (Some(config), Some(assets), Some(size)) => (config, assets, size),
            _ => return None,
        };

        let generated = ParticleGenerator::new(config, size.width, size.height)
            .with_assets(assets)
            .generate(&mut thread_rng());
        match generated {
            Ok(particles) => Some(particles),
            Err(e) => {
                self.fail(e.into());
                None
            }
        }
    }

    fn spawn_field(&mut self) {
        let particles = match self.generate() {
            Some(particles) => particles,
            None => return,
        };
        let (config, size) = match (&self.config, self.scene.size()) {
            (Some(config), Some(size)) => (config.clone(), size),
            _ => return,
        };

        let mut field = AnimationLoop::new(Ticker::new(), config, particles);
        self.scene.surface.resize(size.width, size.height);
        let started = if self.is_playing {
            field.start(&mut self.scene.surface)
        } else {
            field.visibility_changed(false, &mut self.scene.surface)
        };
        self.field = Some(field);
        self.scene.cache.clear();
        if let Err(e) = started {
            self.fail(e.into());
        }
    }

    fn resize(&mut self) {
        let size = match self.scene.size() {
            Some(size) => size,
            None => return,
        };
        if self.scene.surface.width() == size.width && self.scene.surface.height() == size.height {
            return;
        }

        info!("canvas resized to {}x{}", size.width, size.height);
        self.scene.surface.resize(size.width, size.height);
        match &mut self.field {
            None => self.spawn_field(),
            Some(field) if self.is_playing => {
                let result = field.start(&mut self.scene.surface);
                self.scene.cache.clear();
                self.report(result);
            }
            Some(_) => {}
        }
    }

    fn fail(&mut self, e: Error) {
        error!("{}", e);
        self.failure = Some(e.to_string());
    }

    fn report(&mut self, result: Result<(), subatomic::GeometryError>) {
        if let Err(e) = result {
            self.fail(e.into());
        }
    }

    fn status(&self) -> String {
        if let Some(failure) = &self.failure {
            return failure.clone();
        }
        match (&self.config, &self.field) {
            (None, _) => format!("Loading {}", self.settings_path.display()),
            (Some(_), None) => String::from("Loading images"),
            (Some(_), Some(field)) => format!("{} particles", field.particles().len()),
        }
    }
}

impl Application for Subatomic {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Flags = PathBuf;

    fn new(settings_path: PathBuf) -> (Self, Command<Message>) {
        let load = subatomic::config::load(settings_path.clone());
        (
            Self {
                settings_path,
                config: None,
                assets: None,
                field: None,
                scene: Scene::default(),
                is_playing: true,
                failure: None,
                controls: Controls::default(),
            },
            Command::perform(load, Message::ConfigLoaded),
        )
    }

    fn title(&self) -> String {
        String::from("Subatomic")
    }

    fn subscription(&self) -> Subscription<Message> {
        let layout = time::every(LAYOUT_INTERVAL).map(|_| Message::Layout);
        match &self.field {
            Some(field) if field.host().pending.is_some() => Subscription::batch(vec![
                layout,
                time::every(FRAME_INTERVAL).map(|_| Message::Frame),
            ]),
            _ => layout,
        }
    }

    fn update(&mut self, message: Self::Message, _clipboard: &mut Clipboard) -> Command<Message> {
        match message {
            Message::ConfigLoaded(Ok(config)) => {
                let sources = config.image_sources();
                self.config = Some(config);
                return Command::perform(AssetStore::load(sources), Message::AssetsLoaded);
            }
            Message::ConfigLoaded(Err(e)) => self.fail(e),
            Message::AssetsLoaded(assets) => {
                self.assets = Some(assets);
                self.spawn_field();
            }
            Message::Layout => self.resize(),
            Message::Frame => {
                if let Some(field) = &mut self.field {
                    let result = field.on_frame(&mut self.scene.surface);
                    self.scene.cache.clear();
                    self.report(result);
                }
            }
            Message::TogglePlay => {
                self.is_playing = !self.is_playing;
                if let Some(field) = &mut self.field {
                    let result = field.visibility_changed(self.is_playing, &mut self.scene.surface);
                    self.scene.cache.clear();
                    self.report(result);
                }
            }
            Message::Regenerate => {
                self.failure = None;
                if self.field.is_none() {
                    self.spawn_field();
                } else if let Some(particles) = self.generate() {
                    if let Some(field) = &mut self.field {
                        field.replace_particles(particles);
                        let result = if self.is_playing {
                            field.start(&mut self.scene.surface)
                        } else {
                            Ok(())
                        };
                        self.scene.cache.clear();
                        self.report(result);
                    }
                }
            }
            Message::PointerMoved(position) => {
                if let Some(field) = &mut self.field {
                    let result = field.pointer_moved(position.x, position.y, &mut self.scene.surface);
                    self.scene.cache.clear();
                    self.report(result);
                }
            }
            Message::PointerLeft => {
                if let Some(field) = &mut self.field {
                    let result = field.pointer_left(&mut self.scene.surface);
                    self.scene.cache.clear();
                    self.report(result);
                }
            }
            Message::Clicked(position) => {
                if let Some(field) = &mut self.field {
                    let result = field.clicked(position.x, position.y, &mut self.scene.surface);
                    self.scene.cache.clear();
                    self.report(result);
                }
            }
        }
        Command::none()
    }

    fn view(&mut self) -> Element<Message> {
        self.scene.status = self.status();

        let controls = Row::new()
            .spacing(10)
            .align_items(Align::Center)
            .push(
                Button::new(
                    &mut self.controls.play_button,
                    Text::new(if self.is_playing { "Pause" } else { "Play" }),
                )
                .on_press(Message::TogglePlay)
                .style(style::Button),
            )
            .push(
                Button::new(&mut self.controls.regenerate_button, Text::new("Regenerate"))
                    .on_press(Message::Regenerate)
                    .style(style::Button),
            );

        let content = Column::new()
            .spacing(10)
            .padding(10)
            .align_items(Align::Center)
            .push(
                Canvas::new(&mut self.scene)
                    .width(Length::Fill)
                    .height(Length::Fill),
            )
            .push(controls);

        Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(style::Container)
            .into()
    }
}

/// The canvas program: replays the last recorded frame and turns mouse events into messages.
#[derive(Default)]
struct Scene {
    surface: DisplayList,
    cache: Cache,
    status: String,
    /// Last bounds seen while drawing, picked up by `Message::Layout`.
    bounds: Cell<Option<Size>>,
    hovering: bool,
}

impl Scene {
    fn size(&self) -> Option<Size> {
        self.bounds.get()
    }
}

impl canvas::Program<Message> for Scene {
    fn update(
        &mut self,
        event: Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (event::Status, Option<Message>) {
        let position = cursor.position_in(&bounds);
        match event {
            Event::Mouse(mouse::Event::CursorMoved { .. })
            | Event::Mouse(mouse::Event::CursorEntered) => match position {
                Some(position) => {
                    self.hovering = true;
                    (event::Status::Captured, Some(Message::PointerMoved(position)))
                }
                None if self.hovering => {
                    self.hovering = false;
                    (event::Status::Ignored, Some(Message::PointerLeft))
                }
                None => (event::Status::Ignored, None),
            },
            Event::Mouse(mouse::Event::CursorLeft) if self.hovering => {
                self.hovering = false;
                (event::Status::Ignored, Some(Message::PointerLeft))
            }
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => match position {
                Some(position) => (event::Status::Captured, Some(Message::Clicked(position))),
                None => (event::Status::Ignored, None),
            },
            _ => (event::Status::Ignored, None),
        }
    }

    fn draw(&self, bounds: Rectangle, _cursor: Cursor) -> Vec<Geometry> {
        self.bounds.set(Some(bounds.size()));

        let field = self.cache.draw(bounds.size(), |frame| {
            painter::paint(frame, self.surface.commands());
        });

        let overlay = {
            let mut frame = Frame::new(bounds.size());
            frame.fill_text(canvas::Text {
                content: self.status.clone(),
                color: Color::WHITE,
                size: 14.0,
                position: Point::new(frame.width(), frame.height()),
                horizontal_alignment: HorizontalAlignment::Right,
                vertical_alignment: VerticalAlignment::Bottom,
                ..Default::default()
            });
            frame.into_geometry()
        };

        vec![field, overlay]
    }
}

fn main() -> iced::Result {
    env_logger::init();

    let settings_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS));
    info!("reading settings from {}", settings_path.display());

    Subatomic::run(Settings {
        antialiasing: true,
        ..Settings::with_flags(settings_path)
    })
}
