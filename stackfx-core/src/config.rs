/// Engine configuration with the canonical tuning values
use std::time::Duration;

use nalgebra::Point3;

use crate::easing::Easing;
use crate::transition::MacroState;

/// Pointer drag tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSettings {
    /// Yaw radians per pixel of horizontal pointer travel
    pub rotation_sensitivity: f32,
    /// Pitch radians per pixel of vertical pointer travel
    pub tilt_sensitivity: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            rotation_sensitivity: 0.007,
            tilt_sensitivity: 0.005,
            min_pitch: -0.6,
            max_pitch: 0.6,
        }
    }
}

/// Camera placement and lens
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            position: Point3::new(0.0, 1.5, 10.0),
            target: Point3::new(0.0, 1.0, 0.0),
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Complete engine configuration.
///
/// Spin rates are expressed in radians per reference frame; the render driver
/// scales them by `delta * reference_fps` so motion is independent of the
/// host's actual frame rate.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub transition_duration: Duration,
    pub easing: Easing,
    pub wobble_amplitude: f32,
    pub scale_pulse: f32,
    pub drag: DragSettings,
    pub idle_spin: f32,
    pub reference_fps: f32,
    pub scroll_threshold_px: f32,
    pub initial_state: MacroState,
    pub root_lift: f32,
    pub camera: CameraSettings,
    pub lathe_segments: usize,
    pub procedural_detail: bool,
    pub detail_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            transition_duration: Duration::from_millis(1200),
            easing: Easing::InOutBack,
            wobble_amplitude: 0.05,
            scale_pulse: 0.1,
            drag: DragSettings::default(),
            idle_spin: 0.002,
            reference_fps: 60.0,
            scroll_threshold_px: 100.0,
            initial_state: MacroState::Exploded,
            root_lift: 1.0,
            camera: CameraSettings::default(),
            lathe_segments: 24,
            procedural_detail: true,
            detail_seed: 0x5EED_B065,
        }
    }
}

impl EngineConfig {
    /// Number of reference frames covered by `delta`
    pub fn frame_scale(&self, delta: Duration) -> f32 {
        delta.as_secs_f32() * self.reference_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.transition_duration, Duration::from_millis(1200));
        assert_eq!(config.initial_state, MacroState::Exploded);
        assert!(config.drag.min_pitch < config.drag.max_pitch);
    }

    #[test]
    fn test_frame_scale() {
        let config = EngineConfig::default();
        let scale = config.frame_scale(Duration::from_millis(500));
        assert!((scale - 30.0).abs() < 1e-4);
    }
}
