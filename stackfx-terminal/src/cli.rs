/// Command-line overrides for the engine configuration
use clap::Parser;
use stackfx_core::{EngineConfig, MacroState};
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "stackfx-terminal", version, about = "Exploding burger stack in the terminal")]
pub struct Args {
    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// Scroll distance (px) at which the stack assembles
    #[arg(long, default_value_t = 100.0)]
    pub threshold: f32,

    /// Start assembled instead of exploded
    #[arg(long)]
    pub assembled: bool,

    /// Skip procedural surface detail and use flat colours
    #[arg(long)]
    pub no_detail: bool,

    /// Transition duration in milliseconds
    #[arg(long, default_value_t = 1200)]
    pub duration_ms: u64,

    /// Multiplier applied to drag rotation and tilt sensitivity
    #[arg(long, default_value_t = 1.0)]
    pub sensitivity: f32,

    /// Draw in monochrome
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig {
            transition_duration: Duration::from_millis(self.duration_ms),
            scroll_threshold_px: self.threshold,
            procedural_detail: !self.no_detail,
            ..EngineConfig::default()
        };
        if self.assembled {
            config.initial_state = MacroState::Assembled;
        }
        config.drag.rotation_sensitivity *= self.sensitivity;
        config.drag.tilt_sensitivity *= self.sensitivity;
        config
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }
}
