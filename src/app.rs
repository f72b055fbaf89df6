use std::time::{Instant, SystemTime};

use anyhow::{Context as _, Result};
use glam::vec2;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, MouseScrollDelta, VirtualKeyCode},
    window::Window,
};

use crate::{
    assets,
    clock::Clock,
    config::Args,
    config::Color,
    controls::{self, ColorSlot, Command, Theme},
    entity::{Appearance, Camera, Scene},
    orbit::OrbitControls,
    particles::{MorphController, MorphError, ParticleSystem},
    renderer::Renderer,
    viewport::Viewport,
    window::HasSize,
};

/// Mutable state shared by the frame loop and the event handlers.
#[derive(Debug, Clone)]
pub struct Context {
    pub scene: Scene,
    pub viewport: Viewport,
    pub orbit: OrbitControls,
    pub clock: Clock,
    pub morph: MorphController,
    theme: Theme,
    labels: Vec<String>,
}

impl Context {
    pub fn new(
        viewport: Viewport,
        appearance: Appearance,
        morph: MorphController,
        labels: Vec<String>,
    ) -> Self {
        let camera = Camera {
            aspect_ratio: viewport.aspect_ratio(),
            ..Default::default()
        };
        let orbit = OrbitControls::new(&camera);
        let scene = Scene {
            camera,
            appearance,
            resolution: viewport.resolution(),
            progress: morph.progress(),
            morph_pair: morph.pair(),
        };

        Self {
            scene,
            viewport,
            orbit,
            clock: Clock::new(),
            morph,
            theme: Theme::default(),
            labels,
        }
    }

    pub fn apply(&mut self, command: Command) -> Result<(), MorphError> {
        debug!("Applying {:?}", command);
        match command {
            Command::MorphTo(target) => {
                self.morph.morph_to(target, self.clock.elapsed())?;
            }
            Command::SetDuration(duration) => {
                self.morph.set_duration(duration);
            }
            Command::NudgeDuration(steps) => {
                self.morph.nudge_duration(steps);
            }
            Command::SetClearColor(color) => self.set_color(ColorSlot::Clear, color),
            Command::SetPrimaryColor(color) => self.set_color(ColorSlot::Primary, color),
            Command::SetSecondaryColor(color) => self.set_color(ColorSlot::Secondary, color),
            Command::CycleColor(slot) => {
                let next = slot.next_color(self.theme.get(slot));
                self.set_color(slot, next);
            }
        }
        self.sync_morph();
        Ok(())
    }

    fn set_color(&mut self, slot: ColorSlot, color: Color) {
        *self.theme.get_mut(slot) = color;
        let appearance = &mut self.scene.appearance;
        let linear = match slot {
            ColorSlot::Clear => &mut appearance.clear_color,
            ColorSlot::Primary => &mut appearance.primary_color,
            ColorSlot::Secondary => &mut appearance.secondary_color,
        };
        *linear = color.to_linear();
        info!("{:?} color set to {}", slot, color);
    }

    /// Empty viewports (minimized windows) keep the last resolution and aspect.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        debug!("Viewport {:?}", viewport);
        if viewport.is_empty() {
            return;
        }
        self.scene.camera.aspect_ratio = viewport.aspect_ratio();
        self.scene.resolution = viewport.resolution();
    }

    /// One frame of simulation: clock, morph blend, damped camera.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        self.clock.update_at(now);
        debug!("Frame delta {:.4}s", self.clock.delta());
        self.morph.update(self.clock.elapsed());
        self.orbit.update(&mut self.scene.camera);
        self.sync_morph();
    }

    fn sync_morph(&mut self) {
        self.scene.progress = self.morph.progress();
        self.scene.morph_pair = self.morph.pair();
    }

    pub fn label(&self, index: usize) -> String {
        controls::shape_label(index, &self.labels)
    }

    /// Window title doubling as the read-only progress display.
    pub fn title(&self) -> String {
        let pair = self.morph.pair();
        format!(
            "{} -> {} | progress {:.2} | duration {}s",
            self.label(pair.current),
            self.label(pair.target),
            self.morph.progress(),
            self.morph.duration()
        )
    }
}

pub struct App {
    window: Window,
    context: Context,
    renderer: Renderer,
    title: String,
}

impl App {
    pub async fn new(window: Window, args: &Args) -> Result<Self> {
        let shapes = assets::load_shapes(&args.model)?;

        let seed = args.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default()
        });
        info!("Seeded RNG with {}", seed);
        let mut rng = Pcg64Mcg::seed_from_u64(seed);

        let clouds: Vec<_> = shapes.iter().map(|shape| shape.cloud.clone()).collect();
        let particle_system =
            ParticleSystem::new(&clouds, &mut rng).context("Failed to normalize shapes")?;
        info!(
            "{} shapes normalized to {} particles",
            particle_system.sets.len(),
            particle_system.max_count()
        );

        let morph = MorphController::new(
            particle_system.sets.len(),
            particle_system.initial_target(),
            args.duration,
        );
        let appearance = Appearance {
            particle_size: args.particle_size,
            ..Default::default()
        };
        let viewport = Viewport::from_physical(window.size(), window.scale_factor());
        let labels = shapes.into_iter().map(|shape| shape.name).collect();

        let mut context = Context::new(viewport, appearance, morph, labels);
        for command in args.commands() {
            context.apply(command)?;
        }

        let renderer = Renderer::new(
            &window,
            &particle_system,
            &context.scene,
            viewport.framebuffer_size(),
        )
        .await?;

        let mut app = Self {
            window,
            context,
            renderer,
            title: String::new(),
        };
        app.update_title();
        Ok(app)
    }

    pub fn on_resize(&mut self, size: PhysicalSize<u32>) {
        let scale_factor = self.window.scale_factor();
        self.apply_viewport(Viewport::from_physical(size.into(), scale_factor));
    }

    pub fn on_scale_factor_changed(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        self.apply_viewport(Viewport::from_physical(size.into(), scale_factor));
    }

    fn apply_viewport(&mut self, viewport: Viewport) {
        self.context.resize(viewport);
        self.renderer.resize(viewport.framebuffer_size());
    }

    pub fn on_mouse_input(&mut self, state: ElementState, button: MouseButton) {
        if button != MouseButton::Left {
            return;
        }
        match state {
            ElementState::Pressed => self.context.orbit.begin_drag(),
            ElementState::Released => self.context.orbit.end_drag(),
        }
    }

    pub fn on_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        let height = self.window.inner_size().height as f32;
        self.context
            .orbit
            .cursor_moved(vec2(position.x as f32, position.y as f32), height);
    }

    pub fn on_mouse_scroll(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => y as f32 / 60.,
        };
        self.context.orbit.scroll(lines);
    }

    pub fn on_key_up(&mut self, keycode: VirtualKeyCode) {
        let command = match controls::command_for_key(keycode) {
            Some(command) => command,
            None => return,
        };
        if let Err(e) = self.context.apply(command) {
            warn!("Ignoring {:?}: {}", command, e);
        }
    }

    pub fn render(&mut self) -> Result<()> {
        self.context.tick();
        if !self.context.viewport.is_empty() {
            self.renderer.render(&self.context.scene)?;
        }
        self.update_title();
        Ok(())
    }

    fn update_title(&mut self) {
        let title = self.context.title();
        if title != self.title {
            self.window.set_title(&format!("shifting-sand | {}", title));
            self.title = title;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::Vec2;

    use super::*;

    fn context(set_count: usize) -> Context {
        Context::new(
            Viewport::new(800., 600., 2.),
            Appearance::default(),
            MorphController::new(set_count, 3, 3.),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
        )
    }

    #[test]
    fn starts_blending_first_into_fourth_shape() {
        let context = context(4);
        assert_eq!(context.scene.morph_pair.current, 0);
        assert_eq!(context.scene.morph_pair.target, 3);
        assert_eq!(context.scene.progress, 0.);
        assert_eq!(context.scene.resolution, Vec2::new(1600., 1200.));
    }

    #[test]
    fn morph_command_runs_to_completion() {
        let mut context = context(4);
        let start = Instant::now();
        context.clock = Clock::starting_at(start);

        context.apply(Command::SetDuration(1.)).unwrap();
        context.apply(Command::MorphTo(2)).unwrap();
        assert_eq!(context.scene.morph_pair.target, 2);

        context.tick_at(start + Duration::from_millis(500));
        assert_eq!(context.scene.progress, 0.5);

        context.tick_at(start + Duration::from_millis(1000));
        assert_eq!(context.scene.progress, 1.);
        assert_eq!(context.morph.active_index(), 2);
    }

    #[test]
    fn second_morph_overrides_the_first() {
        let mut context = context(4);
        let start = Instant::now();
        context.clock = Clock::starting_at(start);

        context.apply(Command::MorphTo(1)).unwrap();
        context.tick_at(start + Duration::from_secs(1));
        context.apply(Command::MorphTo(2)).unwrap();
        for second in 2..=10 {
            context.tick_at(start + Duration::from_secs(second));
        }
        assert_eq!(context.morph.active_index(), 2);
        assert_eq!(context.scene.progress, 1.);
    }

    #[test]
    fn invalid_morph_is_rejected() {
        let mut context = context(2);
        assert!(context.apply(Command::MorphTo(3)).is_err());
        assert_eq!(context.scene.morph_pair.target, 1);
    }

    #[test]
    fn duration_change_resets_progress() {
        let mut context = context(4);
        let start = Instant::now();
        context.clock = Clock::starting_at(start);
        context.apply(Command::MorphTo(1)).unwrap();
        context.tick_at(start + Duration::from_secs(1));
        assert!(context.scene.progress > 0.);

        context.apply(Command::NudgeDuration(2)).unwrap();
        assert_eq!(context.morph.duration(), 3.5);
        assert_eq!(context.scene.progress, 0.);
    }

    #[test]
    fn color_commands_update_the_appearance() {
        let mut context = context(4);
        context
            .apply(Command::SetPrimaryColor(Color::new(255, 255, 255)))
            .unwrap();
        context
            .apply(Command::SetClearColor(Color::new(0, 0, 0)))
            .unwrap();
        assert!((context.scene.appearance.primary_color - glam::Vec3::ONE).length() < 1e-5);
        assert_eq!(context.scene.appearance.clear_color, glam::Vec3::ZERO);
    }

    #[test]
    fn color_keys_cycle_the_theme_while_running() {
        let mut context = context(4);
        let key = |keycode| controls::command_for_key(keycode).unwrap();

        context.apply(key(VirtualKeyCode::P)).unwrap();
        assert_eq!(context.theme.primary, controls::PRIMARY_PALETTE[1]);
        assert_eq!(
            context.scene.appearance.primary_color,
            controls::PRIMARY_PALETTE[1].to_linear()
        );

        context.apply(key(VirtualKeyCode::B)).unwrap();
        context.apply(key(VirtualKeyCode::S)).unwrap();
        assert_eq!(
            context.scene.appearance.clear_color,
            controls::CLEAR_PALETTE[1].to_linear()
        );
        assert_eq!(
            context.scene.appearance.secondary_color,
            controls::SECONDARY_PALETTE[1].to_linear()
        );

        context
            .apply(Command::SetPrimaryColor(Color::new(1, 2, 3)))
            .unwrap();
        context.apply(key(VirtualKeyCode::P)).unwrap();
        assert_eq!(context.theme.primary, controls::PRIMARY_PALETTE[0]);
    }

    #[test]
    fn minimized_viewport_keeps_last_resolution() {
        let mut context = context(4);
        context.resize(Viewport::new(0., 0., 2.));
        assert!(context.viewport.is_empty());
        assert_eq!(context.scene.resolution, Vec2::new(1600., 1200.));
        assert_eq!(context.scene.camera.aspect_ratio, 800. / 600.);
        assert!(context.scene.resolution.min_element() > 0.);
    }

    #[test]
    fn resize_updates_resolution_and_aspect() {
        let mut context = context(4);
        context.resize(Viewport::new(1024., 256., 1.5));
        assert_eq!(context.scene.resolution, Vec2::new(1024. * 1.5, 256. * 1.5));
        assert_eq!(context.scene.camera.aspect_ratio, 4.);
    }

    #[test]
    fn title_shows_labels_and_progress() {
        let context = context(4);
        assert_eq!(
            context.title(),
            "Donut -> Text | progress 0.00 | duration 3s"
        );
    }
}
