/// External trigger sources: scroll position and explicit toggles
use crate::transition::MacroState;

/// Maps a vertical scroll offset to a desired macro state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollTrigger {
    pub threshold_px: f32,
}

impl ScrollTrigger {
    pub fn new(threshold_px: f32) -> Self {
        Self { threshold_px }
    }

    /// Exploded above the threshold, assembled at or past it
    pub fn desired(&self, scroll_offset: f32) -> MacroState {
        if scroll_offset < self.threshold_px {
            MacroState::Exploded
        } else {
            MacroState::Assembled
        }
    }

    /// The state to request for this scroll offset, if any.
    ///
    /// Nothing is requested while a run is in progress or when the stack
    /// already rests in the desired state.
    pub fn evaluate(&self, scroll_offset: f32, observed: MacroState, running: bool) -> Option<MacroState> {
        let desired = self.desired(scroll_offset);
        (!running && desired != observed).then_some(desired)
    }
}

impl Default for ScrollTrigger {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Target for an explicit toggle (click or key press)
pub fn toggle_target(observed: MacroState, running: bool) -> Option<MacroState> {
    (!running).then(|| observed.toggled())
}
