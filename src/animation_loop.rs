//! Frame scheduling.
//!
//! The loop owns the particles and runs one render pass per host frame: clear the surface, then
//! update and draw each particle in turn. Scheduling, the clock and visibility changes come from
//! the host through [`FrameHost`].

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::Config;
use crate::error::GeometryError;
use crate::interaction::InteractionListener;
use crate::manipulator::Manipulator;
use crate::particle::Particle;
use crate::surface::Surface;

/// Handle for a scheduled frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRequest(pub u64);

/// The host environment's clock and frame scheduler.
pub trait FrameHost {
    /// Milliseconds on a monotonic clock.
    fn now(&self) -> f64;

    /// Ask for [`AnimationLoop::on_frame`] to be called on the next frame.
    fn request_frame(&mut self) -> FrameRequest;

    fn cancel_frame(&mut self, request: FrameRequest);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Halted,
}

pub struct AnimationLoop<H: FrameHost> {
    host: H,
    config: Config,
    particles: Vec<Particle>,
    interaction: InteractionListener,
    rng: StdRng,
    state: LoopState,
    pending: Option<FrameRequest>,
    last_frame_start: f64,
    hidden: bool,
}

impl<H: FrameHost> AnimationLoop<H> {
    pub fn new(host: H, config: Config, particles: Vec<Particle>) -> Self {
        AnimationLoop {
            host,
            config,
            particles,
            interaction: InteractionListener::default(),
            rng: StdRng::from_entropy(),
            state: LoopState::Idle,
            pending: None,
            last_frame_start: 0.0,
            hidden: false,
        }
    }

    /// Seed the randomness used by interactions.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Swap in a new population, e.g. after the host regenerated it.
    pub fn replace_particles(&mut self, particles: Vec<Particle>) {
        self.particles = particles;
    }

    pub fn interaction(&self) -> &InteractionListener {
        &self.interaction
    }

    /// Render a frame and keep rendering until halted.
    ///
    /// A field with no movement, no animations and nothing in flight renders once and halts
    /// straight away.
    pub fn start<S: Surface>(&mut self, surface: &mut S) -> Result<(), GeometryError> {
        if let Some(request) = self.pending.take() {
            self.host.cancel_frame(request);
        }
        if self.state != LoopState::Running {
            debug!("animation loop {:?} -> Running", self.state);
        }
        self.state = LoopState::Running;
        self.frame(surface)
    }

    /// Called by the host when a requested frame fires. Frames that were cancelled, or arrive
    /// while the loop is not running, are ignored.
    pub fn on_frame<S: Surface>(&mut self, surface: &mut S) -> Result<(), GeometryError> {
        if self.state != LoopState::Running || self.pending.take().is_none() {
            return Ok(());
        }
        self.frame(surface)
    }

    /// Stop scheduling frames. Safe to call repeatedly.
    pub fn halt(&mut self) {
        if let Some(request) = self.pending.take() {
            self.host.cancel_frame(request);
        }
        if self.state == LoopState::Running {
            debug!("animation loop Running -> Halted");
            self.state = LoopState::Halted;
        }
        self.last_frame_start = 0.0;
    }

    /// Hidden hosts halt; visible hosts resume.
    pub fn visibility_changed<S: Surface>(
        &mut self,
        visible: bool,
        surface: &mut S,
    ) -> Result<(), GeometryError> {
        self.hidden = !visible;
        if visible {
            self.start(surface)
        } else {
            self.halt();
            Ok(())
        }
    }

    /// Forward a pointer move and make sure a halted field reacts to it.
    pub fn pointer_moved<S: Surface>(
        &mut self,
        x: f32,
        y: f32,
        surface: &mut S,
    ) -> Result<(), GeometryError> {
        self.interaction.on_pointer_move(x, y);
        self.wake(surface, !self.config.on_hover.is_empty())
    }

    pub fn pointer_left<S: Surface>(&mut self, surface: &mut S) -> Result<(), GeometryError> {
        self.interaction.on_pointer_leave();
        self.wake(surface, !self.config.on_hover.is_empty())
    }

    pub fn clicked<S: Surface>(
        &mut self,
        x: f32,
        y: f32,
        surface: &mut S,
    ) -> Result<(), GeometryError> {
        let now = self.host.now();
        self.interaction.on_click(x, y, now);
        self.wake(surface, self.config.on_click.repulse.is_some())
    }

    /// Render once more if the loop stopped because the field was static. A loop halted by the
    /// host (visibility) stays halted.
    fn wake<S: Surface>(&mut self, surface: &mut S, relevant: bool) -> Result<(), GeometryError> {
        if relevant && !self.hidden && self.state != LoopState::Running {
            self.start(surface)
        } else {
            Ok(())
        }
    }

    fn needs_frames(&self) -> bool {
        self.config.movement.enabled
            || self
                .particles
                .iter()
                .any(|p| p.is_animated() || p.is_seeking())
    }

    fn frame<S: Surface>(&mut self, surface: &mut S) -> Result<(), GeometryError> {
        let frame_start = self.host.now();
        let delta_time = if self.last_frame_start > 0.0 {
            ((frame_start - self.last_frame_start) / 1000.0) as f32
        } else {
            0.0
        };

        let result = self.render(surface, delta_time);
        if result.is_err() {
            self.halt();
            return result;
        }

        if self.needs_frames() {
            self.pending = Some(self.host.request_frame());
            self.last_frame_start = frame_start;
        } else {
            self.halt();
        }
        result
    }

    /// One pass over every particle: move, interact, animate, link, draw.
    pub fn render<S: Surface>(&mut self, surface: &mut S, delta_time: f32) -> Result<(), GeometryError> {
        surface.clear();

        let manipulator = Manipulator::for_surface(&*surface);
        let movement = self.config.movement;
        let hover = self.interaction.hover_position();
        let click = self.interaction.take_click();
        let on_hover = self.config.on_hover;
        let on_click = self.config.on_click;
        let link = self.config.link;

        for index in 0..self.particles.len() {
            let (drawn, rest) = self.particles.split_at_mut(index);
            let particle = &mut rest[0];

            if movement.enabled || particle.is_seeking() {
                manipulator.move_particle(particle, delta_time, movement.bounce);
                particle.check_move_to_position();
            }

            if let Some(pointer) = hover {
                if let Some(repulse) = on_hover.repulse {
                    manipulator.repulse(particle, pointer, repulse.distance);
                }
                if let Some(attract) = on_hover.attract {
                    manipulator.attract(particle, pointer, attract.distance, &mut self.rng);
                }
                if let Some(bubble) = on_hover.bubble {
                    manipulator.bubble(particle, pointer, bubble.distance, bubble.size);
                }
            } else if on_hover.bubble.is_some() && particle.size_animation.is_none() {
                particle.size = particle.base_size;
            }

            if let (Some(click), Some(repulse)) = (click, on_click.repulse) {
                manipulator.click_repulse(
                    particle,
                    click.position,
                    repulse.distance,
                    repulse.speed,
                    movement.bounce,
                );
            }

            manipulator.animate_size(particle, delta_time);
            manipulator.animate_opacity(particle, delta_time);

            if let Some(link) = &link {
                for other in drawn.iter() {
                    manipulator.link(surface, particle, other.position, link);
                }
            }
            if let (Some(pointer), Some(link)) = (hover, &on_hover.link) {
                manipulator.link(surface, particle, pointer, link);
            }

            particle.draw(surface)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour::Colour;
    use crate::config::{
        resolve, AnimationSettings, ClickRepulseSettings, ClickSettings, HoverSettings,
        LinkSettings, MovementSettings, RepulseSettings, Settings, ShapeSettings,
    };
    use crate::geometry::{Position, Velocity};
    use crate::particle::Shape;
    use crate::surface::{DisplayList, DrawCommand};

    /// Host with a hand-driven clock.
    #[derive(Default)]
    struct FakeHost {
        now: f64,
        next: u64,
        pending: Option<FrameRequest>,
        cancelled: Vec<FrameRequest>,
    }

    impl FrameHost for FakeHost {
        fn now(&self) -> f64 {
            self.now
        }

        fn request_frame(&mut self) -> FrameRequest {
            self.next += 1;
            let request = FrameRequest(self.next);
            self.pending = Some(request);
            request
        }

        fn cancel_frame(&mut self, request: FrameRequest) {
            if self.pending == Some(request) {
                self.pending = None;
            }
            self.cancelled.push(request);
        }
    }

    fn settings(movement: bool) -> Settings {
        Settings {
            shapes: vec![ShapeSettings {
                kind: Some("circle".to_string()),
                count: Some(1),
                size: Some(5.0),
                ..ShapeSettings::default()
            }],
            movement: Some(MovementSettings {
                enabled: Some(movement),
                ..MovementSettings::default()
            }),
            link: None,
            on_hover: None,
            on_click: None,
        }
    }

    fn circle(x: f32, y: f32, velocity: Velocity) -> Particle {
        Particle::new(Shape::Circle, Position::new(x, y), 5.0, Colour::WHITE, velocity).unwrap()
    }

    fn arcs(surface: &DisplayList) -> usize {
        surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Arc { .. }))
            .count()
    }

    fn lines(surface: &DisplayList) -> usize {
        surface
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count()
    }

    #[test]
    fn static_field_renders_once_then_halts() {
        let config = resolve(&settings(false)).unwrap();
        let particles = vec![circle(50.0, 50.0, Velocity::ZERO)];
        let mut surface = DisplayList::new(100.0, 100.0);
        let mut animation = AnimationLoop::new(FakeHost::default(), config, particles);

        assert_eq!(animation.state(), LoopState::Idle);
        animation.start(&mut surface).unwrap();

        assert_eq!(animation.state(), LoopState::Halted);
        assert_eq!(animation.host().pending, None);
        assert_eq!(arcs(&surface), 1);
    }

    #[test]
    fn first_frame_has_zero_delta() {
        let config = resolve(&settings(true)).unwrap();
        let particles = vec![circle(50.0, 50.0, Velocity::new(100.0, 0.0))];
        let mut surface = DisplayList::new(200.0, 100.0);
        let mut host = FakeHost::default();
        host.now = 5000.0;
        let mut animation = AnimationLoop::new(host, config, particles);

        animation.start(&mut surface).unwrap();
        assert_eq!(animation.particles()[0].position.x, 50.0);
        assert_eq!(animation.state(), LoopState::Running);
        assert!(animation.host().pending.is_some());

        animation.host_mut().now = 5100.0;
        animation.on_frame(&mut surface).unwrap();
        assert!((animation.particles()[0].position.x - 60.0).abs() < 1e-3);
    }

    #[test]
    fn halt_resets_delta_and_ignores_stale_frames() {
        let config = resolve(&settings(true)).unwrap();
        let particles = vec![circle(50.0, 50.0, Velocity::new(100.0, 0.0))];
        let mut surface = DisplayList::new(200.0, 100.0);
        let mut host = FakeHost::default();
        host.now = 1000.0;
        let mut animation = AnimationLoop::new(host, config, particles);

        animation.start(&mut surface).unwrap();
        animation.halt();
        animation.halt();
        assert_eq!(animation.state(), LoopState::Halted);
        assert_eq!(animation.host().pending, None);
        assert_eq!(animation.host().cancelled.len(), 1);

        animation.host_mut().now = 9000.0;
        animation.on_frame(&mut surface).unwrap();
        assert_eq!(animation.particles()[0].position.x, 50.0);

        // Restarting after a long gap does not jump.
        animation.start(&mut surface).unwrap();
        assert_eq!(animation.particles()[0].position.x, 50.0);
    }

    #[test]
    fn visibility_drives_halt_and_start() {
        let config = resolve(&settings(true)).unwrap();
        let particles = vec![circle(50.0, 50.0, Velocity::new(10.0, 0.0))];
        let mut surface = DisplayList::new(200.0, 100.0);
        let mut animation = AnimationLoop::new(FakeHost::default(), config, particles);

        animation.start(&mut surface).unwrap();
        animation.visibility_changed(false, &mut surface).unwrap();
        assert_eq!(animation.state(), LoopState::Halted);

        // Pointer events do not resume a hidden field.
        animation.pointer_moved(1.0, 1.0, &mut surface).unwrap();
        assert_eq!(animation.state(), LoopState::Halted);

        animation.visibility_changed(true, &mut surface).unwrap();
        assert_eq!(animation.state(), LoopState::Running);
    }

    #[test]
    fn animated_particles_keep_a_static_field_running() {
        let mut s = settings(false);
        s.shapes[0].opacity_animation = Some(AnimationSettings {
            speed: 1.0,
            min: 0.2,
            ..AnimationSettings::default()
        });
        let config = resolve(&s).unwrap();
        let mut particle = circle(50.0, 50.0, Velocity::ZERO);
        particle.opacity_animation = Some(crate::geometry::OscillatingAnimation::new(1.0, 0.2, 1.0));
        let mut surface = DisplayList::new(100.0, 100.0);
        let mut animation = AnimationLoop::new(FakeHost::default(), config, vec![particle]);

        animation.start(&mut surface).unwrap();
        assert_eq!(animation.state(), LoopState::Running);
    }

    #[test]
    fn hover_repulse_applies_while_pointer_is_tracked() {
        let mut s = settings(false);
        s.on_hover = Some(HoverSettings {
            repulse: Some(RepulseSettings { distance: 2000.0 }),
            ..HoverSettings::default()
        });
        let config = resolve(&s).unwrap();
        let mut surface = DisplayList::new(100.0, 100.0);
        let mut animation = AnimationLoop::new(
            FakeHost::default(),
            config,
            vec![circle(50.0, 50.0, Velocity::ZERO)],
        );

        animation.start(&mut surface).unwrap();
        assert_eq!(animation.state(), LoopState::Halted);

        // Static field wakes up for the pointer and renders the pushed particle.
        animation.pointer_moved(45.0, 50.0, &mut surface).unwrap();
        let p = &animation.particles()[0];
        assert!((p.position.distance_to(&Position::new(45.0, 50.0)) - 20.0).abs() < 1e-3);
        assert_eq!(arcs(&surface), 1);
    }

    #[test]
    fn click_repulse_glides_particles_away() {
        let mut s = settings(false);
        s.on_click = Some(ClickSettings {
            repulse: Some(ClickRepulseSettings {
                distance: 3000.0,
                speed: 500.0,
            }),
            create: None,
        });
        let config = resolve(&s).unwrap();
        let mut surface = DisplayList::new(200.0, 200.0);
        let mut host = FakeHost::default();
        host.now = 1.0;
        let mut animation = AnimationLoop::new(
            host,
            config,
            vec![circle(100.0, 100.0, Velocity::ZERO)],
        );

        animation.start(&mut surface).unwrap();
        animation.clicked(90.0, 100.0, &mut surface).unwrap();
        assert!(animation.particles()[0].is_seeking());
        assert_eq!(animation.state(), LoopState::Running);

        for frame in 1..=40 {
            animation.host_mut().now = 1.0 + frame as f64 * 16.0;
            animation.on_frame(&mut surface).unwrap();
        }

        let p = &animation.particles()[0];
        assert!(!p.is_seeking());
        assert_eq!(p.velocity, Velocity::ZERO);
        assert!((p.position.x - 120.0).abs() < 1.5);
        assert_eq!(animation.state(), LoopState::Halted);
    }

    #[test]
    fn click_repulse_near_a_wrapping_edge_settles() {
        let mut s = settings(false);
        s.on_click = Some(ClickSettings {
            repulse: Some(ClickRepulseSettings {
                distance: 20000.0,
                speed: 400.0,
            }),
            create: None,
        });
        let config = resolve(&s).unwrap();
        assert!(!config.movement.bounce);
        let mut surface = DisplayList::new(200.0, 100.0);
        let mut host = FakeHost::default();
        host.now = 1.0;
        let mut animation = AnimationLoop::new(
            host,
            config,
            vec![circle(190.0, 50.0, Velocity::ZERO)],
        );

        animation.start(&mut surface).unwrap();
        animation.clicked(180.0, 50.0, &mut surface).unwrap();
        assert!(animation.particles()[0].is_seeking());

        for frame in 1..=2000 {
            if animation.state() != LoopState::Running {
                break;
            }
            animation.host_mut().now = 1.0 + frame as f64 * 16.0;
            animation.on_frame(&mut surface).unwrap();
        }

        let p = &animation.particles()[0];
        assert!(!p.is_seeking());
        assert_eq!(p.velocity, Velocity::ZERO);
        assert!(p.position.x >= 190.0 && p.position.x <= 205.0);
        assert_eq!(animation.state(), LoopState::Halted);
    }

    #[test]
    fn clicks_are_stamped_with_the_host_clock() {
        let config = resolve(&settings(false)).unwrap();
        let mut surface = DisplayList::new(100.0, 100.0);
        let mut host = FakeHost::default();
        host.now = 4321.0;
        let mut animation = AnimationLoop::new(
            host,
            config,
            vec![circle(50.0, 50.0, Velocity::ZERO)],
        );

        animation.clicked(10.0, 20.0, &mut surface).unwrap();
        assert_eq!(animation.interaction().last_click_time(), Some(4321.0));
    }

    #[test]
    fn replaced_particles_are_drawn_on_restart() {
        let config = resolve(&settings(false)).unwrap();
        let mut surface = DisplayList::new(100.0, 100.0);
        let mut animation = AnimationLoop::new(
            FakeHost::default(),
            config,
            vec![circle(50.0, 50.0, Velocity::ZERO)],
        );
        animation.start(&mut surface).unwrap();
        assert_eq!(arcs(&surface), 1);

        animation.replace_particles(vec![
            circle(10.0, 10.0, Velocity::ZERO),
            circle(30.0, 30.0, Velocity::ZERO),
        ]);
        animation.start(&mut surface).unwrap();
        assert_eq!(arcs(&surface), 2);
        assert_eq!(animation.particles()[1].position, Position::new(30.0, 30.0));
    }

    #[test]
    fn links_nearby_particles() {
        let mut s = settings(false);
        s.link = Some(LinkSettings {
            distance: 3000.0,
            ..LinkSettings::default()
        });
        let config = resolve(&s).unwrap();
        let particles = vec![
            circle(10.0, 10.0, Velocity::ZERO),
            circle(20.0, 10.0, Velocity::ZERO),
            circle(90.0, 90.0, Velocity::ZERO),
        ];
        let mut surface = DisplayList::new(100.0, 100.0);
        let mut animation = AnimationLoop::new(FakeHost::default(), config, particles);

        animation.start(&mut surface).unwrap();
        assert_eq!(lines(&surface), 1);
        assert_eq!(arcs(&surface), 3);
    }

    #[test]
    fn hover_link_connects_to_pointer() {
        let mut s = settings(false);
        s.on_hover = Some(HoverSettings {
            link: Some(LinkSettings {
                distance: 5000.0,
                ..LinkSettings::default()
            }),
            ..HoverSettings::default()
        });
        let config = resolve(&s).unwrap();
        let mut surface = DisplayList::new(100.0, 100.0);
        let mut animation = AnimationLoop::new(
            FakeHost::default(),
            config,
            vec![circle(50.0, 50.0, Velocity::ZERO)],
        )
        .with_seed(1);

        animation.pointer_moved(60.0, 50.0, &mut surface).unwrap();
        assert_eq!(lines(&surface), 1);

        animation.pointer_left(&mut surface).unwrap();
        assert_eq!(lines(&surface), 0);
    }
}
