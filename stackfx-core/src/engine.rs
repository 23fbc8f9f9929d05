/// The mounted engine instance
///
/// Owns the stack, the transition controller, drag state, lights, camera and
/// the frame target. Hosts drive it with [`Engine::tick`] from their own
/// scheduler and forward input through the pointer/scroll entry points.
use std::time::Duration;

use crate::assembly::{MemberInfo, StackAssembly};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::interaction::InteractionState;
use crate::lighting::LightRig;
use crate::listener::{EventHost, ListenerSet};
use crate::parts::{BuildContext, Ingredient, PartSpec};
use crate::projection::Camera;
use crate::raster::Rasterizer;
use crate::texture::RasterBackend;
use crate::transform::Node;
use crate::transition::{MacroState, RequestOutcome, TransitionController};
use crate::trigger::{toggle_target, ScrollTrigger};
use crate::visual::ResourceCount;

/// Pixel size of the mount surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    /// Width/height ratio of one pixel
    pub pixel_aspect: f32,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_aspect: 1.0,
        }
    }

    pub fn with_pixel_aspect(mut self, pixel_aspect: f32) -> Self {
        self.pixel_aspect = pixel_aspect;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStatus {
    pub drawn: bool,
    pub animating: bool,
    pub progress: Option<f32>,
}

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    surface: Surface,
    camera: Camera,
    lights: LightRig,
    stack: StackAssembly,
    transition: TransitionController,
    interaction: InteractionState,
    trigger: ScrollTrigger,
    raster: Rasterizer,
    listeners: ListenerSet,
    elapsed: Duration,
    active: bool,
}

impl Engine {
    /// Mount the default burger stack on `surface`
    pub fn mount(
        surface: Surface,
        config: EngineConfig,
        host: &mut dyn EventHost,
    ) -> Result<Self, EngineError> {
        Self::mount_with(&Ingredient::stack(), surface, config, RasterBackend::Software, host)
    }

    /// Mount an arbitrary ordered set of parts
    pub fn mount_with<P: PartSpec>(
        specs: &[P],
        surface: Surface,
        config: EngineConfig,
        backend: RasterBackend,
        host: &mut dyn EventHost,
    ) -> Result<Self, EngineError> {
        if surface.is_empty() {
            log::warn!(
                "refusing to mount on a {}x{} surface",
                surface.width,
                surface.height
            );
            return Err(EngineError::SurfaceUnavailable {
                width: surface.width,
                height: surface.height,
            });
        }

        let backend = if config.procedural_detail {
            backend
        } else {
            RasterBackend::Unavailable
        };
        let ctx = BuildContext::new(backend, config.detail_seed, config.lathe_segments);
        let mut stack = StackAssembly::build(specs, config.initial_state, &ctx);
        stack.root = Node::at_height(config.root_lift);

        let mut camera = Camera::from_settings(&config.camera, surface.width, surface.height);
        camera.resize(surface.width, surface.height, surface.pixel_aspect);

        let listeners = ListenerSet::attach_all(host)?;

        log::info!(
            "mounted {}x{} surface with {} members",
            surface.width,
            surface.height,
            stack.len()
        );

        Ok(Self {
            transition: TransitionController::new(config.initial_state, &config),
            trigger: ScrollTrigger::new(config.scroll_threshold_px),
            raster: Rasterizer::new(surface.width as usize, surface.height as usize),
            lights: LightRig::studio(),
            interaction: InteractionState::new(),
            elapsed: Duration::ZERO,
            active: true,
            config,
            surface,
            camera,
            stack,
            listeners,
        })
    }

    /// Advance one frame by `delta` and draw it.
    ///
    /// Order within a frame: transition, idle spins, lights, draw.
    pub fn tick(&mut self, delta: Duration) -> FrameStatus {
        if !self.active {
            return FrameStatus::default();
        }

        self.elapsed += delta;
        self.transition.update(self.elapsed, &mut self.stack);

        if !self.transition.is_running() && !self.interaction.is_dragging() {
            let frames = self.config.frame_scale(delta);
            self.stack.root.rotation.rotate(0.0, self.config.idle_spin * frames, 0.0);
            if self.transition.observed() == MacroState::Exploded {
                for member in self.stack.members_mut() {
                    member.node.rotation.rotate(0.0, member.spin_rate * frames, 0.0);
                }
            }
        }

        self.lights.animate(self.elapsed);
        self.render();

        FrameStatus {
            drawn: true,
            animating: self.transition.is_running(),
            progress: self.transition.progress(),
        }
    }

    /// Draw the current pose without advancing time
    pub fn render(&mut self) {
        if !self.active {
            return;
        }
        self.raster.clear();
        let root = self.stack.root.matrix();
        for member in self.stack.members() {
            let model = root * member.node.matrix();
            self.raster
                .render_visual(&member.visual, &model, &self.camera, &self.lights);
        }
    }

    /// Track a new surface size; empty sizes are ignored
    pub fn resize(&mut self, surface: Surface) {
        if !self.active || surface.is_empty() {
            log::debug!("ignoring resize to {}x{}", surface.width, surface.height);
            return;
        }
        log::debug!("resize to {}x{}", surface.width, surface.height);
        self.camera
            .resize(surface.width, surface.height, surface.pixel_aspect);
        self.raster
            .resize(surface.width as usize, surface.height as usize);
        self.surface = surface;
    }

    pub fn request_transition(&mut self, target: MacroState, immediate: bool) -> RequestOutcome {
        if !self.active {
            return RequestOutcome::Ignored;
        }
        self.transition
            .request(target, immediate, self.elapsed, &mut self.stack)
    }

    /// Push the host's scroll offset in pixels
    pub fn on_scroll(&mut self, offset_px: f32) -> Option<RequestOutcome> {
        let target = self.trigger.evaluate(
            offset_px,
            self.transition.observed(),
            self.transition.is_running(),
        )?;
        Some(self.request_transition(target, false))
    }

    /// Flip between assembled and exploded unless a run is in progress
    pub fn toggle(&mut self) -> Option<RequestOutcome> {
        let target = toggle_target(self.transition.observed(), self.transition.is_running())?;
        Some(self.request_transition(target, false))
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if self.active {
            self.interaction.pointer_down(x, y);
        }
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.active
            && self
                .interaction
                .pointer_move(x, y, &mut self.stack.root, &self.config.drag)
    }

    pub fn pointer_up(&mut self) {
        self.interaction.pointer_up();
    }

    pub fn pointer_leave(&mut self) {
        self.interaction.pointer_leave();
    }

    /// Register the "transition running" observer
    pub fn on_animating_change<F>(&mut self, observer: F)
    where
        F: FnMut(bool) + 'static,
    {
        self.transition.set_observer(observer);
    }

    pub fn members(&self) -> Vec<MemberInfo> {
        self.stack.snapshot()
    }

    /// Look up one member by ingredient name
    pub fn member(&self, name: &str) -> Option<MemberInfo> {
        self.stack.member(name).map(MemberInfo::from)
    }

    pub fn stack(&self) -> &StackAssembly {
        &self.stack
    }

    pub fn is_animating(&self) -> bool {
        self.transition.is_running()
    }

    pub fn is_dragging(&self) -> bool {
        self.interaction.is_dragging()
    }

    pub fn macro_state(&self) -> MacroState {
        self.transition.observed()
    }

    pub fn progress(&self) -> Option<f32> {
        self.transition.progress()
    }

    pub fn root(&self) -> &Node {
        &self.stack.root
    }

    pub fn frame(&self) -> &Rasterizer {
        &self.raster
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Generated geometries, materials and textures still alive
    pub fn live_resources(&self) -> ResourceCount {
        self.stack.resources()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Release listeners, the running transition and every generated
    /// resource. Calling it again does nothing.
    pub fn teardown(&mut self, host: &mut dyn EventHost) {
        if !self.active {
            log::debug!("teardown on an inactive engine");
            return;
        }
        self.active = false;
        self.listeners.detach_all(host);
        self.transition.cancel();
        self.transition.clear_observer();
        self.interaction.pointer_leave();
        self.stack.clear();
        self.raster.resize(0, 0);
        log::info!("engine torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::Headless;

    fn quick_config() -> EngineConfig {
        EngineConfig {
            procedural_detail: false,
            lathe_segments: 8,
            ..EngineConfig::default()
        }
    }

    fn engine() -> Engine {
        Engine::mount(Surface::new(48, 32), quick_config(), &mut Headless).unwrap()
    }

    fn frame() -> Duration {
        Duration::from_micros(16_667)
    }

    #[test]
    fn test_zero_surface_is_rejected() {
        let err = Engine::mount(Surface::new(0, 32), quick_config(), &mut Headless).unwrap_err();
        assert_eq!(err, EngineError::SurfaceUnavailable { width: 0, height: 32 });
    }

    #[test]
    fn test_mount_state() {
        let engine = engine();
        assert!(engine.is_active());
        assert_eq!(engine.macro_state(), MacroState::Exploded);
        assert_eq!(engine.root().position.y, 1.0);
        assert_eq!(engine.members().len(), 9);
        assert_eq!(engine.listener_count(), 6);
        assert!(!engine.is_animating());
    }

    #[test]
    fn test_member_lookup() {
        let engine = engine();
        let lettuce = engine.member("Lettuce").unwrap();
        assert_eq!(lettuce.offset, 2.5);
        assert_eq!(lettuce.accent, Ingredient::Lettuce.accent());
        assert_eq!(Some(lettuce), engine.members().into_iter().nth(2));
        assert!(engine.member("Bacon").is_none());
    }

    #[test]
    fn test_tick_draws_the_stack() {
        let mut engine = engine();
        let status = engine.tick(frame());
        assert!(status.drawn);
        assert!(engine.frame().coverage() > 0);
    }

    #[test]
    fn test_idle_spin_when_exploded() {
        let mut engine = engine();
        engine.tick(frame());
        let root_before = engine.root().rotation.y;
        let member_before = engine.stack().members()[0].node.rotation.y;
        engine.tick(frame());
        assert!(engine.root().rotation.y > root_before);
        assert!(engine.stack().members()[0].node.rotation.y > member_before);
        // One reference frame of spin per 1/60 s
        let step = engine.root().rotation.y - root_before;
        assert!((step - 0.002).abs() < 1e-5);
    }

    #[test]
    fn test_no_member_spin_when_assembled() {
        let config = EngineConfig {
            initial_state: MacroState::Assembled,
            ..quick_config()
        };
        let mut engine = Engine::mount(Surface::new(48, 32), config, &mut Headless).unwrap();
        engine.tick(frame());
        engine.tick(frame());
        assert!(engine.root().rotation.y > 0.0);
        for m in engine.stack().members() {
            assert_eq!(m.node.rotation.y, 0.0);
        }
    }

    #[test]
    fn test_no_spin_while_dragging() {
        let mut engine = engine();
        engine.pointer_down(10.0, 10.0);
        engine.tick(frame());
        engine.tick(frame());
        assert_eq!(engine.root().rotation.y, 0.0);
        assert_eq!(engine.stack().members()[0].node.rotation.y, 0.0);
    }

    #[test]
    fn test_no_spin_while_running() {
        let mut engine = engine();
        engine.request_transition(MacroState::Assembled, false);
        engine.tick(frame());
        engine.tick(frame());
        assert_eq!(engine.root().rotation.y, 0.0);
    }

    #[test]
    fn test_transition_runs_to_completion() {
        let mut engine = engine();
        assert_eq!(engine.toggle(), Some(RequestOutcome::Started));
        assert_eq!(engine.toggle(), None);
        let status = engine.tick(Duration::from_millis(600));
        assert!(status.animating);
        engine.tick(Duration::from_millis(600));
        assert!(!engine.is_animating());
        assert_eq!(engine.macro_state(), MacroState::Assembled);
        for m in engine.stack().members() {
            assert_eq!(m.offset(), m.rest_offset);
        }
    }

    #[test]
    fn test_scroll_trigger() {
        let mut engine = engine();
        assert_eq!(engine.on_scroll(50.0), None);
        assert_eq!(engine.on_scroll(150.0), Some(RequestOutcome::Started));
        assert_eq!(engine.on_scroll(10.0), None);
    }

    #[test]
    fn test_resize() {
        let mut engine = engine();
        engine.resize(Surface::new(80, 24).with_pixel_aspect(0.5));
        assert_eq!(engine.frame().width(), 80);
        assert_eq!(engine.frame().height(), 24);
        assert!((engine.camera().aspect - 80.0 * 0.5 / 24.0).abs() < 1e-6);

        engine.resize(Surface::new(0, 0));
        assert_eq!(engine.surface().width, 80);
    }

    #[test]
    fn test_inactive_engine_ignores_input() {
        let mut engine = engine();
        engine.teardown(&mut Headless);
        engine.pointer_down(0.0, 0.0);
        assert!(!engine.pointer_move(100.0, 100.0));
        assert_eq!(
            engine.request_transition(MacroState::Assembled, true),
            RequestOutcome::Ignored
        );
        assert_eq!(engine.tick(frame()), FrameStatus::default());
        assert_eq!(engine.live_resources().total(), 0);
    }
}
