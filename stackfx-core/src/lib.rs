/// stackfx core library - exploding stack engine
///
/// Procedural part visuals, the stack assembly, the explode/assemble
/// transition controller, pointer drag and the software rasterizer. Hosts
/// (terminal, browser) own the clock and the input sources and drive an
/// [`Engine`] through its tick and input entry points.

pub mod assembly;
pub mod config;
pub mod easing;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod lighting;
pub mod listener;
pub mod material;
pub mod parts;
pub mod projection;
pub mod raster;
pub mod texture;
pub mod transform;
pub mod transition;
pub mod trigger;
pub mod visual;

// Re-export commonly used types
pub use assembly::{MemberInfo, StackAssembly, StackMember};
pub use config::{CameraSettings, DragSettings, EngineConfig};
pub use easing::Easing;
pub use engine::{Engine, FrameStatus, Surface};
pub use error::EngineError;
pub use geometry::{Mesh, Triangle, Vertex};
pub use listener::{EventHost, Headless, ListenerKind, ListenerTarget};
pub use material::{Material, Rgb};
pub use parts::{BuildContext, Ingredient, PartSpec};
pub use projection::{Camera, ScreenPoint};
pub use raster::Rasterizer;
pub use texture::{Raster, RasterBackend};
pub use transform::{Node, RotationState, Transform};
pub use transition::{MacroState, Phase, RequestOutcome};
pub use visual::{Piece, ResourceCount, Visual};
