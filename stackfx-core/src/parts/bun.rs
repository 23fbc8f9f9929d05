//! Top and bottom buns

use std::f32::consts::{PI, TAU};
use std::rc::Rc;

use nalgebra::Point2;
use rand::Rng;

use super::BuildContext;
use crate::geometry::Mesh;
use crate::material::{Material, Rgb};
use crate::texture::{rgba, Raster};
use crate::transform::RotationState;
use crate::visual::{Piece, Visual};

const BUN_RADIUS: f32 = 1.5;
const BOTTOM_BUN_HEIGHT: f32 = 0.45;
const SEED_COUNT: usize = 40;

/// Flattened dome with sesame seeds scattered over the crown
pub fn top_bun(ctx: &BuildContext) -> Visual {
    let mut visual = Visual::new();

    let dome = Mesh::sphere_cap(BUN_RADIUS, ctx.segments, ctx.segments / 2, PI * 0.4);
    let crust = Material::phong(Rgb::hex(0x8B4513), 25.0, Rgb::hex(0x111111));
    visual.push(Piece::new(Rc::new(dome), Rc::new(crust)).scaled(1.0, 0.5, 1.0));

    let seed = Rc::new(Mesh::sphere(0.04, 6, 4));
    let seed_material = Rc::new(Material::phong(Rgb::hex(0xfff8dc), 20.0, Rgb::BLACK));
    let mut rng = ctx.rng("top-bun/seeds");
    for _ in 0..SEED_COUNT {
        let phi = rng.gen::<f32>() * PI * 0.35;
        let theta = rng.gen::<f32>() * TAU;
        let x = BUN_RADIUS * phi.sin() * theta.cos();
        let z = BUN_RADIUS * phi.sin() * theta.sin();
        let y = BUN_RADIUS * phi.cos() * 0.5;
        // Seeds lie flat on the crust, tangent to their ring
        let seed_piece = Piece::new(seed.clone(), seed_material.clone())
            .scaled(1.0, 0.6, 1.8)
            .rotated(RotationState::new(0.0, -theta, 0.0))
            .at(x, y, z);
        visual.push(seed_piece);
    }

    visual
}

/// Lathed bottom bun with a porous cut surface and a rim highlight
pub fn bottom_bun(ctx: &BuildContext) -> Visual {
    let mut visual = Visual::new();
    let r = BUN_RADIUS;
    let h = BOTTOM_BUN_HEIGHT;

    let profile = [
        Point2::new(0.0, 0.0),
        Point2::new(r * 0.98, 0.0),
        Point2::new(r, -h * 0.2),
        Point2::new(r * 0.95, -h * 0.7),
        Point2::new(r * 0.85, -h * 0.98),
        Point2::new(r * 0.8, -h),
        Point2::new(0.0, -h),
    ];
    let crust = Material::phong(Rgb::hex(0xC4844C), 30.0, Rgb::hex(0x333333));
    visual.push(Piece::new(
        Rc::new(Mesh::revolve(&profile, ctx.segments)),
        Rc::new(crust),
    ));

    let crumb = Material::phong(Rgb::hex(0xF5DEB3), 10.0, Rgb::hex(0x222222))
        .with_color_map(crumb_texture(ctx))
        .with_detail_extent(r * 2.0);
    let cut = Piece::new(Rc::new(Mesh::disc(r * 0.98, ctx.segments)), Rc::new(crumb))
        .rotated(RotationState::new(-PI / 2.0, 0.0, 0.0))
        .at(0.0, 0.01, 0.0);
    visual.push(cut);

    let rim_material = Material::phong(Rgb::hex(0xD4A574), 50.0, Rgb::hex(0x444444));
    let rim = Piece::new(
        Rc::new(Mesh::torus(r * 0.98, 0.02, 4, ctx.segments)),
        Rc::new(rim_material),
    )
    .rotated(RotationState::new(-PI / 2.0, 0.0, 0.0))
    .at(0.0, 0.005, 0.0);
    visual.push(rim);

    visual
}

/// Bread crumb: pores plus a few lighter spots
fn crumb_texture(ctx: &BuildContext) -> Option<Raster> {
    const SIZE: usize = 512;
    let mut canvas = ctx.canvas("Bottom Bun", SIZE, SIZE)?;
    let mut rng = ctx.rng("bottom-bun/crumb");
    let extent = SIZE as f32;

    canvas.fill([0xE5, 0xC8, 0xA8, 0xFF]);
    for _ in 0..150 {
        let (x, y) = (rng.gen::<f32>() * extent, rng.gen::<f32>() * extent);
        let radius = rng.gen::<f32>() * 3.0 + 1.0;
        canvas.fill_circle(x, y, radius, rgba(180, 140, 100, rng.gen::<f32>() * 0.5 + 0.3));
    }
    for _ in 0..50 {
        let (x, y) = (rng.gen::<f32>() * extent, rng.gen::<f32>() * extent);
        let radius = rng.gen::<f32>() * 2.0 + 1.0;
        canvas.fill_circle(x, y, radius, rgba(245, 225, 195, rng.gen::<f32>() * 0.3 + 0.2));
    }
    Some(canvas)
}
