//! Sauce and cheese

use std::f32::consts::PI;
use std::rc::Rc;

use rand::Rng;

use super::BuildContext;
use crate::geometry::Mesh;
use crate::material::{Material, Rgb};
use crate::transform::RotationState;
use crate::visual::{Piece, Visual};

/// `(x, z, scale)` of each sauce drip
const DRIPS: [(f32, f32, f32); 3] = [(0.3, 0.4, 0.7), (-0.4, -0.2, 0.5), (0.2, -0.5, 0.6)];

const SAUCE_FLATTEN: f32 = 0.15;
const CHEESE_SIZE: f32 = 2.0;
const CHEESE_SEGMENTS: usize = 16;

/// A squashed glossy blob with a few drips hanging under it
pub fn sauce(_ctx: &BuildContext) -> Visual {
    let mut visual = Visual::new();
    let color = Rgb::hex(0xFF6B6B);
    let material = Rc::new(
        Material::phong(color, 100.0, Rgb::WHITE).with_emissive(color.scale(0.1)),
    );

    let blob = Piece::new(Rc::new(Mesh::sphere(0.8, 16, 8)), material.clone())
        .scaled(1.0, SAUCE_FLATTEN, 1.0);
    visual.push(blob);

    // Drips inherit the blob's flattening
    for (x, z, scale) in DRIPS {
        let drip = Piece::new(Rc::new(Mesh::sphere(0.15 * scale, 8, 6)), material.clone())
            .scaled(1.0, 0.3, 1.0)
            .at(x, -0.05, z)
            .scaled(1.0, SAUCE_FLATTEN, 1.0);
        visual.push(drip);
    }

    visual
}

/// A square slice drooping over the patty edge, turned 45 degrees
pub fn cheese(ctx: &BuildContext) -> Visual {
    let mut rng = ctx.rng("cheese/bumps");
    let slice = Mesh::grid(CHEESE_SIZE, CHEESE_SIZE, CHEESE_SEGMENTS, |x, y| {
        let distance = (x * x + y * y).sqrt();
        let droop = if distance > 0.7 { -(distance - 0.7) * 0.3 } else { 0.0 };
        droop + (rng.gen::<f32>() - 0.5) * 0.02
    });

    let material = Material::phong(Rgb::hex(0xffc107), 60.0, Rgb::hex(0x111111));
    let mut visual = Visual::new();
    visual.push(
        Piece::new(Rc::new(slice), Rc::new(material))
            .rotated(RotationState::new(-PI / 2.0, 0.0, PI / 4.0)),
    );
    visual
}
