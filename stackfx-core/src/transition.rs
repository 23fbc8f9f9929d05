/// Explode/assemble transition state machine
///
/// The controller interpolates every member's vertical offset between its
/// two resting heights. Progress is derived from elapsed time, so a run
/// always finishes after `duration` no matter how many frames the host
/// manages to draw in between.
use std::f32::consts::{PI, TAU};
use std::fmt;
use std::time::Duration;

use crate::assembly::StackAssembly;
use crate::config::EngineConfig;
use crate::easing::{lerp, Easing};

/// The two macro states of the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MacroState {
    Assembled,
    #[default]
    Exploded,
}

impl MacroState {
    pub fn toggled(self) -> Self {
        match self {
            MacroState::Assembled => MacroState::Exploded,
            MacroState::Exploded => MacroState::Assembled,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MacroState::Assembled => "Assembled",
            MacroState::Exploded => "Exploded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
}

/// What a call to [`TransitionController::request`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A new interpolated run began
    Started,
    /// Members were snapped straight to the target
    Snapped,
    /// A run is in progress and the request was not immediate
    Ignored,
}

/// Result of advancing the controller by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Advance {
    Idle,
    Running { progress: f32, eased: f32 },
    Finished(MacroState),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Run {
    target: MacroState,
    start: Duration,
    progress: f32,
}

type AnimatingObserver = Box<dyn FnMut(bool)>;

pub struct TransitionController {
    duration: Duration,
    easing: Easing,
    wobble_amplitude: f32,
    scale_pulse: f32,
    observed: MacroState,
    run: Option<Run>,
    observer: Option<AnimatingObserver>,
}

impl TransitionController {
    pub fn new(initial: MacroState, config: &EngineConfig) -> Self {
        Self {
            duration: config.transition_duration,
            easing: config.easing,
            wobble_amplitude: config.wobble_amplitude,
            scale_pulse: config.scale_pulse,
            observed: initial,
            run: None,
            observer: None,
        }
    }

    /// Register the "animating" observer; it receives `true` when a run
    /// starts and `false` when the controller returns to idle.
    pub fn set_observer<F>(&mut self, observer: F)
    where
        F: FnMut(bool) + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    fn notify(&mut self, animating: bool) {
        if let Some(observer) = self.observer.as_mut() {
            observer(animating);
        }
    }

    pub fn phase(&self) -> Phase {
        if self.run.is_some() {
            Phase::Running
        } else {
            Phase::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// The externally observed macro state; flips only when a run completes
    /// or an immediate request lands.
    pub fn observed(&self) -> MacroState {
        self.observed
    }

    pub fn target(&self) -> Option<MacroState> {
        self.run.map(|r| r.target)
    }

    pub fn progress(&self) -> Option<f32> {
        self.run.map(|r| r.progress)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Linear progress after `elapsed`, saturating at 1
    pub fn progress_for(&self, elapsed: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Ask for a transition toward `target` at time `now`.
    ///
    /// Immediate requests always win: they cancel any run and snap the stack.
    /// Otherwise a request is only honoured while idle.
    pub fn request(
        &mut self,
        target: MacroState,
        immediate: bool,
        now: Duration,
        stack: &mut StackAssembly,
    ) -> RequestOutcome {
        if immediate {
            let was_running = self.run.take().is_some();
            stack.snap_to(target);
            self.observed = target;
            log::debug!("snapped to {:?}", target);
            if was_running {
                self.notify(false);
            }
            return RequestOutcome::Snapped;
        }

        if let Some(run) = self.run {
            log::debug!(
                "ignoring request for {:?} while running toward {:?}",
                target,
                run.target
            );
            return RequestOutcome::Ignored;
        }

        self.run = Some(Run {
            target,
            start: now,
            progress: 0.0,
        });
        log::debug!("transition {:?} -> {:?} started", self.observed, target);
        self.notify(true);
        RequestOutcome::Started
    }

    /// Drop any run without posing the stack or notifying. Used at teardown.
    pub fn cancel(&mut self) -> bool {
        self.run.take().is_some()
    }

    /// Advance the running transition to time `now` and pose every member.
    pub fn update(&mut self, now: Duration, stack: &mut StackAssembly) -> Advance {
        let Some(mut run) = self.run else {
            return Advance::Idle;
        };

        let progress = self
            .progress_for(now.saturating_sub(run.start))
            .max(run.progress);
        run.progress = progress;

        if progress >= 1.0 {
            self.run = None;
            self.observed = run.target;
            for member in stack.members_mut() {
                member.node.position.y = member.offset_for(run.target);
                member.node.settle();
            }
            log::debug!("transition to {:?} finished", run.target);
            self.notify(false);
            return Advance::Finished(run.target);
        }

        self.run = Some(run);
        let eased = self.easing.apply(progress);
        let wobble = (progress * TAU).sin() * self.wobble_amplitude * (1.0 - progress);
        let scale = 1.0 + (progress * PI).sin() * self.scale_pulse;
        let from = self.observed;

        for member in stack.members_mut() {
            let start = member.offset_for(from);
            let end = member.offset_for(run.target);
            member.node.position.y = lerp(start, end, eased);
            // Tilt on X so the wobble does not fight the Y spin
            member.node.rotation.x = wobble * 0.5;
            member.node.scale = scale;
        }

        Advance::Running { progress, eased }
    }
}

impl fmt::Debug for TransitionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionController")
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("observed", &self.observed)
            .field("run", &self.run)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::{BuildContext, Ingredient};
    use crate::texture::RasterBackend;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> (TransitionController, StackAssembly) {
        let config = EngineConfig::default();
        let ctx = BuildContext::new(RasterBackend::Unavailable, 0, 8);
        let stack = StackAssembly::build(&Ingredient::STACK, MacroState::Exploded, &ctx);
        (TransitionController::new(MacroState::Exploded, &config), stack)
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_starts_idle() {
        let (controller, _) = setup();
        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(controller.progress(), None);
        assert_eq!(controller.observed(), MacroState::Exploded);
    }

    #[test]
    fn test_immediate_override_snaps_to_rest() {
        let (mut controller, mut stack) = setup();
        let outcome = controller.request(MacroState::Exploded, false, ms(0), &mut stack);
        assert_eq!(outcome, RequestOutcome::Started);
        controller.update(ms(300), &mut stack);

        let outcome = controller.request(MacroState::Assembled, true, ms(300), &mut stack);
        assert_eq!(outcome, RequestOutcome::Snapped);
        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(controller.observed(), MacroState::Assembled);
        for m in stack.members() {
            assert_eq!(m.offset(), m.rest_offset);
            assert!(m.node.is_settled());
        }
    }

    #[test]
    fn test_request_while_running_is_ignored() {
        let (mut controller, mut stack) = setup();
        controller.request(MacroState::Assembled, false, ms(100), &mut stack);
        controller.update(ms(400), &mut stack);

        let outcome = controller.request(MacroState::Exploded, false, ms(500), &mut stack);
        assert_eq!(outcome, RequestOutcome::Ignored);
        assert_eq!(controller.target(), Some(MacroState::Assembled));
        // Still timed from the first request
        let advance = controller.update(ms(1300), &mut stack);
        assert_eq!(advance, Advance::Finished(MacroState::Assembled));
    }

    #[test]
    fn test_progress_reaches_one_at_duration() {
        let (controller, _) = setup();
        assert_eq!(controller.progress_for(controller.duration()), 1.0);
        assert_eq!(controller.progress_for(ms(5000)), 1.0);
        assert!((controller.progress_for(ms(600)) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_run_completes_at_target() {
        let (mut controller, mut stack) = setup();
        controller.request(MacroState::Assembled, false, ms(0), &mut stack);

        match controller.update(ms(600), &mut stack) {
            Advance::Running { progress, eased } => {
                assert!((progress - 0.5).abs() < 1e-6);
                assert!((eased - 0.5).abs() < 1e-5);
            }
            other => panic!("unexpected {other:?}"),
        }
        let mid = stack.members()[0].node;
        assert!(mid.scale > 1.09);

        let advance = controller.update(ms(1200), &mut stack);
        assert_eq!(advance, Advance::Finished(MacroState::Assembled));
        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(controller.progress(), None);
        assert_eq!(controller.observed(), MacroState::Assembled);
        for m in stack.members() {
            assert_eq!(m.offset(), m.rest_offset);
            assert!(m.node.is_settled());
        }
    }

    #[test]
    fn test_progress_is_monotonic() {
        let (mut controller, mut stack) = setup();
        controller.request(MacroState::Assembled, false, ms(1000), &mut stack);
        controller.update(ms(1600), &mut stack);
        // A clock that steps backwards does not rewind the run
        controller.update(ms(1100), &mut stack);
        assert!((controller.progress().unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_slow_frames_still_finish_on_time() {
        let (mut controller, mut stack) = setup();
        controller.request(MacroState::Assembled, false, ms(0), &mut stack);
        // A single very late frame lands past the duration
        let advance = controller.update(ms(4000), &mut stack);
        assert_eq!(advance, Advance::Finished(MacroState::Assembled));
    }

    #[test]
    fn test_observer_notified() {
        let (mut controller, mut stack) = setup();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        controller.set_observer(move |animating| sink.borrow_mut().push(animating));

        controller.request(MacroState::Assembled, false, ms(0), &mut stack);
        controller.request(MacroState::Exploded, false, ms(10), &mut stack);
        controller.update(ms(1200), &mut stack);
        // Idle immediate snap has nothing to report
        controller.request(MacroState::Exploded, true, ms(1300), &mut stack);
        assert_eq!(*events.borrow(), vec![true, false]);
    }

    #[test]
    fn test_wobble_decays() {
        let (mut controller, mut stack) = setup();
        controller.request(MacroState::Assembled, false, ms(0), &mut stack);
        controller.update(ms(300), &mut stack);
        let early = stack.members()[0].node.rotation.x.abs();
        controller.update(ms(1140), &mut stack);
        let late = stack.members()[0].node.rotation.x.abs();
        assert!(early > late);
        assert!(early > 0.0);
    }
}
