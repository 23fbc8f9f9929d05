/// Pointer drag to orbit the whole stack
use crate::config::DragSettings;
use crate::transform::Node;

/// Drag bookkeeping. The yaw/pitch themselves live on the root node.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionState {
    dragging: bool,
    last_x: f32,
    last_y: f32,
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.dragging = true;
        self.last_x = x;
        self.last_y = y;
    }

    /// Rotate `root` by the pointer travel since the last event.
    ///
    /// Horizontal travel yaws freely; vertical travel pitches within the
    /// configured clamp. Returns whether the root moved.
    pub fn pointer_move(&mut self, x: f32, y: f32, root: &mut Node, drag: &DragSettings) -> bool {
        if !self.dragging {
            return false;
        }

        let dx = x - self.last_x;
        let dy = y - self.last_y;
        self.last_x = x;
        self.last_y = y;

        root.rotation
            .rotate(dy * drag.tilt_sensitivity, dx * drag.rotation_sensitivity, 0.0);
        root.rotation.x = root.rotation.x.clamp(drag.min_pitch, drag.max_pitch);
        dx != 0.0 || dy != 0.0
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// The pointer left the surface; treated as a release
    pub fn pointer_leave(&mut self) {
        self.dragging = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_scenario() {
        let drag = DragSettings::default();
        let mut root = Node::at_height(1.0);
        let mut state = InteractionState::new();

        state.pointer_down(100.0, 100.0);
        assert!(state.pointer_move(150.0, 120.0, &mut root, &drag));
        assert!((root.rotation.y - 0.35).abs() < 1e-6);
        assert!((root.rotation.x - 0.1).abs() < 1e-6);

        state.pointer_up();
        assert!(!state.pointer_move(300.0, 300.0, &mut root, &drag));
        assert!((root.rotation.y - 0.35).abs() < 1e-6);
        assert!((root.rotation.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let drag = DragSettings::default();
        let mut root = Node::new();
        let mut state = InteractionState::new();

        state.pointer_down(0.0, 0.0);
        state.pointer_move(0.0, 10_000.0, &mut root, &drag);
        assert_eq!(root.rotation.x, drag.max_pitch);
        state.pointer_move(0.0, -10_000.0, &mut root, &drag);
        assert_eq!(root.rotation.x, drag.min_pitch);
    }

    #[test]
    fn test_move_without_press_is_ignored() {
        let drag = DragSettings::default();
        let mut root = Node::new();
        let mut state = InteractionState::new();
        state.pointer_move(50.0, 50.0, &mut root, &drag);
        assert_eq!(root, Node::new());
    }

    #[test]
    fn test_leave_ends_drag() {
        let mut state = InteractionState::new();
        state.pointer_down(3.0, 4.0);
        assert!(state.is_dragging());
        assert_eq!((state.last_x, state.last_y), (3.0, 4.0));
        state.pointer_leave();
        assert!(!state.is_dragging());
    }
}
