//! Part factory: the stackable ingredients and their procedural visuals.
//!
//! Every ingredient is one variant of the closed [`Ingredient`] set and is
//! used through the [`PartSpec`] trait. A part knows how to build its visual
//! and where it rests in each macro state; it never touches shared state.

mod bun;
mod condiments;
mod patty;
mod produce;

use rand::{rngs::SmallRng, SeedableRng};

use crate::material::Rgb;
use crate::texture::{Raster, RasterBackend};
use crate::visual::Visual;

/// Inputs shared by every visual builder
#[derive(Debug, Clone, Copy)]
pub struct BuildContext {
    pub backend: RasterBackend,
    /// Seed for surface noise; layout never depends on it
    pub seed: u64,
    /// Angular segments for revolved and round primitives
    pub segments: usize,
}

impl BuildContext {
    pub fn new(backend: RasterBackend, seed: u64, segments: usize) -> Self {
        Self {
            backend,
            seed,
            segments: segments.max(6),
        }
    }

    /// Deterministic generator for one named surface
    pub fn rng(&self, salt: &str) -> SmallRng {
        // FNV-1a keeps the stream stable across runs and toolchains
        let hash = salt.bytes().fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
            (h ^ b as u64).wrapping_mul(0x0100_0000_01b3)
        });
        SmallRng::seed_from_u64(self.seed ^ hash)
    }

    /// Allocate a detail canvas, or `None` when no drawing context exists.
    /// Callers then fall back to a flat colour.
    pub fn canvas(&self, part: &str, width: usize, height: usize) -> Option<Raster> {
        match self.backend.allocate(width, height) {
            Ok(raster) => Some(raster),
            Err(err) => {
                log::warn!("{part}: {err}; using flat colour");
                None
            }
        }
    }
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new(RasterBackend::Software, 0, 24)
    }
}

/// A stackable part: visual builder plus placement metadata
pub trait PartSpec {
    /// Unique display label
    fn name(&self) -> &str;

    /// Vertical offset when assembled
    fn rest_offset(&self) -> f32;

    /// Vertical offset when exploded
    fn spread_offset(&self) -> f32;

    /// Idle yaw per reference frame while exploded (radians)
    fn spin_rate(&self) -> f32;

    /// Build a fresh visual. Deterministic for a given context.
    fn build_visual(&self, ctx: &BuildContext) -> Visual;

    /// Colour used for side UI such as ingredient labels
    fn accent(&self) -> Rgb {
        Rgb::WHITE
    }
}

/// The burger's ingredients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ingredient {
    TopBun,
    JonSauce,
    Lettuce,
    RedOnion,
    Tomato,
    Cheese,
    Patty,
    Pickles,
    BottomBun,
}

impl Ingredient {
    /// The canonical stack, top to bottom
    pub const STACK: [Ingredient; 9] = [
        Ingredient::TopBun,
        Ingredient::JonSauce,
        Ingredient::Lettuce,
        Ingredient::RedOnion,
        Ingredient::Tomato,
        Ingredient::Cheese,
        Ingredient::Patty,
        Ingredient::Pickles,
        Ingredient::BottomBun,
    ];

    /// Registry used to assemble the default scene
    pub fn stack() -> Vec<Ingredient> {
        Self::STACK.to_vec()
    }

    /// `(rest, spread, spin)` placement
    fn placement(self) -> (f32, f32, f32) {
        match self {
            Ingredient::TopBun => (0.4, 3.2, 0.003),
            Ingredient::JonSauce => (0.37, 2.8, 0.001),
            Ingredient::Lettuce => (0.35, 2.5, 0.004),
            Ingredient::RedOnion => (0.25, 2.0, 0.006),
            Ingredient::Tomato => (0.15, 1.7, 0.005),
            Ingredient::Cheese => (0.05, 1.3, 0.002),
            Ingredient::Patty => (-0.15, 0.6, 0.003),
            Ingredient::Pickles => (-0.3, -0.1, 0.004),
            Ingredient::BottomBun => (-0.35, -0.5, 0.002),
        }
    }
}

impl PartSpec for Ingredient {
    fn name(&self) -> &str {
        match self {
            Ingredient::TopBun => "Top Bun",
            Ingredient::JonSauce => "Jon Sauce",
            Ingredient::Lettuce => "Lettuce",
            Ingredient::RedOnion => "Red Onion",
            Ingredient::Tomato => "Tomato Slice",
            Ingredient::Cheese => "Melted Cheese",
            Ingredient::Patty => "Beef Patty",
            Ingredient::Pickles => "Pickle Chips",
            Ingredient::BottomBun => "Bottom Bun",
        }
    }

    fn rest_offset(&self) -> f32 {
        self.placement().0
    }

    fn spread_offset(&self) -> f32 {
        self.placement().1
    }

    fn spin_rate(&self) -> f32 {
        self.placement().2
    }

    fn build_visual(&self, ctx: &BuildContext) -> Visual {
        match self {
            Ingredient::TopBun => bun::top_bun(ctx),
            Ingredient::BottomBun => bun::bottom_bun(ctx),
            Ingredient::JonSauce => condiments::sauce(ctx),
            Ingredient::Cheese => condiments::cheese(ctx),
            Ingredient::Lettuce => produce::lettuce(ctx),
            Ingredient::RedOnion => produce::red_onion(ctx),
            Ingredient::Tomato => produce::tomato(ctx),
            Ingredient::Pickles => produce::pickles(ctx),
            Ingredient::Patty => patty::patty(ctx),
        }
    }

    fn accent(&self) -> Rgb {
        match self {
            Ingredient::TopBun | Ingredient::BottomBun => Rgb::hex(0xfacc15),
            Ingredient::JonSauce => Rgb::hex(0xf472b6),
            Ingredient::Lettuce => Rgb::hex(0x4ade80),
            Ingredient::RedOnion => Rgb::hex(0xc084fc),
            Ingredient::Tomato => Rgb::hex(0xf87171),
            Ingredient::Cheese => Rgb::hex(0xeab308),
            Ingredient::Patty => Rgb::hex(0xb45309),
            Ingredient::Pickles => Rgb::hex(0x16a34a),
        }
    }
}
