//! Lettuce, onion, tomato and pickles

use std::f32::consts::{PI, TAU};
use std::rc::Rc;

use nalgebra::Point2;
use rand::Rng;

use super::BuildContext;
use crate::geometry::{ExtrudeOptions, Mesh};
use crate::material::{Material, Rgb};
use crate::texture::Raster;
use crate::transform::RotationState;
use crate::visual::{Piece, Visual};

const LETTUCE_GREEN: u32 = 0x7cb342;
const ONION_RINGS: usize = 3;
const PICKLE_COUNT: usize = 2;

/// Closed outline whose radius ripples `lobes` times around the circle
fn wavy_outline(points: usize, radius: f32, lobes: f32, amplitude: f32) -> Vec<Point2<f32>> {
    (0..points)
        .map(|i| {
            let angle = i as f32 / points as f32 * TAU;
            let r = radius + (angle * lobes).sin() * amplitude;
            Point2::new(angle.cos() * r, angle.sin() * r)
        })
        .collect()
}

/// Ruffled leaf with vein colour and a wrinkle bump map
pub fn lettuce(ctx: &BuildContext) -> Visual {
    let outline = wavy_outline(12, 1.3, 3.0, 0.1);
    let leaf = Mesh::extrude(&outline, ExtrudeOptions::new(0.05).bevel(0.02, 0.02));

    let (color_map, bump_map) = lettuce_textures(ctx).unzip();
    // The colour map carries the leaf green; without it the base colour does
    let base = if color_map.is_some() {
        Rgb::WHITE
    } else {
        Rgb::hex(LETTUCE_GREEN)
    };
    let material = Material::phong(base, 30.0, Rgb::hex(0x111111))
        .with_color_map(color_map)
        .with_bump_map(bump_map, 0.01)
        .with_detail_extent(2.8);

    let mut visual = Visual::new();
    visual.push(
        Piece::new(Rc::new(leaf), Rc::new(material))
            .rotated(RotationState::new(PI / 2.0, 0.0, 0.0)),
    );
    visual
}

/// Colour and bump canvases sharing the same vein strokes
fn lettuce_textures(ctx: &BuildContext) -> Option<(Raster, Raster)> {
    const SIZE: usize = 256;
    let mut color = ctx.canvas("Lettuce", SIZE, SIZE)?;
    let mut bump = ctx.canvas("Lettuce", SIZE, SIZE)?;
    let mut rng = ctx.rng("lettuce/veins");
    let size = SIZE as f32;

    color.fill([0x7c, 0xb3, 0x42, 0xff]);
    bump.fill([128, 128, 128, 255]);

    for _ in 0..3000 {
        let (x, y) = (rng.gen::<f32>() * size, rng.gen::<f32>() * size);
        let radius = rng.gen::<f32>() * 1.2;
        let level = if rng.gen::<bool>() { 135 } else { 121 };
        bump.fill_circle(x, y, radius, [level, level, level, 255]);
    }

    let start = Point2::new(size / 2.0, size / 2.0);
    for _ in 0..15 {
        let end = Point2::new(rng.gen::<f32>() * size, rng.gen::<f32>() * size);
        let c1 = start + nalgebra::Vector2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5) * size;
        let c2 = end + nalgebra::Vector2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5) * size;

        let width = rng.gen::<f32>() * 1.5 + 0.5;
        color.stroke_bezier(start, c1, c2, end, width, [0x9c, 0xcc, 0x65, 0xff]);
        let width = rng.gen::<f32>() * 1.5 + 0.5;
        bump.stroke_bezier(start, c1, c2, end, width, [132, 132, 132, 255]);
    }

    Some((color, bump))
}

/// Three overlapping translucent rings
pub fn red_onion(ctx: &BuildContext) -> Visual {
    let material = Rc::new(
        Material::phong(Rgb::hex(0x9C27B0), 60.0, Rgb::hex(0x111111)).with_opacity(0.9),
    );
    let mut visual = Visual::new();
    for i in 0..ONION_RINGS {
        let offset = i as f32 - 1.0;
        let ring = Mesh::torus(0.5 + i as f32 * 0.15, 0.08, 8, ctx.segments.max(32));
        visual.push(
            Piece::new(Rc::new(ring), material.clone())
                .rotated(RotationState::new(PI / 2.0, 0.0, 0.0))
                .at(offset * 0.3, i as f32 * 0.02, offset * 0.2),
        );
    }
    visual
}

/// A single thick slice
pub fn tomato(ctx: &BuildContext) -> Visual {
    let slice = Mesh::cylinder(1.1, 1.1, 0.2, ctx.segments.max(32));
    let material = Material::phong(Rgb::hex(0xe53935), 80.0, Rgb::hex(0x222222));
    let mut visual = Visual::new();
    visual.push(Piece::new(Rc::new(slice), Rc::new(material)));
    visual
}

/// Two crinkle-cut chips, each with a slight random twist
pub fn pickles(ctx: &BuildContext) -> Visual {
    let outline = wavy_outline(20, 0.35, 6.0, 0.03);
    let chip = Rc::new(Mesh::extrude(&outline, ExtrudeOptions::new(0.06).bevel(0.02, 0.01)));
    let material = Rc::new(Material::phong(Rgb::hex(0x6B8E23), 80.0, Rgb::hex(0x444444)));
    let mut rng = ctx.rng("pickles/twist");

    let mut visual = Visual::new();
    for i in 0..PICKLE_COUNT {
        let twist = rng.gen::<f32>() * PI / 6.0 - PI / 12.0;
        let z = if i == 0 { 0.15 } else { -0.2 };
        visual.push(
            Piece::new(chip.clone(), material.clone())
                .rotated(RotationState::new(PI / 2.0, 0.0, twist))
                .at((i as f32 - 0.5) * 0.6, 0.0, z),
        );
    }
    visual
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::RasterBackend;

    #[test]
    fn test_wavy_outline() {
        let outline = wavy_outline(12, 1.3, 3.0, 0.1);
        assert_eq!(outline.len(), 12);
        for p in &outline {
            let r = p.coords.norm();
            assert!(r >= 1.2 - 1e-5 && r <= 1.4 + 1e-5);
        }
    }

    #[test]
    fn test_lettuce_lies_flat() {
        let size = lettuce(&BuildContext::default()).size();
        assert!(size.y < 0.12);
        assert!(size.x > 2.4);
    }

    #[test]
    fn test_lettuce_flat_fallback_is_green() {
        let ctx = BuildContext::new(RasterBackend::Unavailable, 0, 24);
        let visual = lettuce(&ctx);
        assert_eq!(visual.pieces[0].material.color, Rgb::hex(LETTUCE_GREEN));
        assert!(!visual.has_detail());
    }

    #[test]
    fn test_lettuce_textures_are_paired() {
        let visual = lettuce(&BuildContext::default());
        let material = &visual.pieces[0].material;
        assert!(material.color_map.is_some());
        assert!(material.bump_map.is_some());
        assert_eq!(visual.resources().textures, 2);
    }

    #[test]
    fn test_onion_rings() {
        let visual = red_onion(&BuildContext::default());
        assert_eq!(visual.pieces.len(), ONION_RINGS);
        assert!((visual.pieces[0].material.opacity - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_pickles_share_geometry() {
        let visual = pickles(&BuildContext::default());
        assert_eq!(visual.pieces.len(), PICKLE_COUNT);
        assert_eq!(visual.resources().geometries, 1);
    }

    #[test]
    fn test_tomato_thickness() {
        let size = tomato(&BuildContext::default()).size();
        assert!((size.y - 0.2).abs() < 1e-4);
    }
}
