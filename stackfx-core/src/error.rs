/// Error types for the stack engine
use thiserror::Error;

/// Errors surfaced by engine setup and host integration.
///
/// None of these are fatal to the host: a failed mount simply means nothing
/// is drawn, and raster failures are recovered inside the part factory.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("mount surface is unavailable ({width}x{height})")]
    SurfaceUnavailable { width: u32, height: u32 },

    #[error("no 2D raster context available for procedural surface detail")]
    RasterUnavailable,

    #[error("failed to register {kind} listener: {reason}")]
    ListenerRegistration { kind: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::SurfaceUnavailable { width: 0, height: 480 };
        assert_eq!(err.to_string(), "mount surface is unavailable (0x480)");

        let err = EngineError::ListenerRegistration {
            kind: "resize".into(),
            reason: "no window".into(),
        };
        assert!(err.to_string().contains("resize"));
    }
}
