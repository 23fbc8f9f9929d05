//! Beef patty

use std::rc::Rc;

use nalgebra::Point2;
use rand::Rng;

use super::BuildContext;
use crate::geometry::Mesh;
use crate::material::{Material, Rgb};
use crate::texture::{rgba, Raster};
use crate::visual::{Piece, Visual};

const PATTY_RADIUS: f32 = 1.3;
const PATTY_HEIGHT: f32 = 0.4;
const TEXTURE_SIZE: usize = 128;

/// Domed lathe profile with a seared, bumpy surface
pub fn patty(ctx: &BuildContext) -> Visual {
    let r = PATTY_RADIUS;
    let h = PATTY_HEIGHT;
    let profile = [
        Point2::new(0.0, -h / 2.0),
        Point2::new(r * 0.8, -h / 2.0),
        Point2::new(r, -h / 4.0),
        Point2::new(r * 0.95, h / 3.0),
        Point2::new(0.0, h / 2.0),
    ];
    let body = Mesh::revolve(&profile, ctx.segments.max(32));

    let (char_map, bump_map) = patty_textures(ctx).unzip();
    let material = Material::phong(Rgb::hex(0x6B4423), 10.0, Rgb::hex(0x111111))
        .with_color_map(char_map)
        .with_bump_map(bump_map, 0.015)
        .with_detail_extent(r * 2.0);

    let mut visual = Visual::new();
    visual.push(Piece::new(Rc::new(body), Rc::new(material)));
    visual
}

/// Char stripes and the bump field, allocated together
fn patty_textures(ctx: &BuildContext) -> Option<(Raster, Raster)> {
    let mut char_map = ctx.canvas("Beef Patty", TEXTURE_SIZE, TEXTURE_SIZE)?;
    let mut bump_map = ctx.canvas("Beef Patty", TEXTURE_SIZE, TEXTURE_SIZE)?;
    char_marks(ctx, &mut char_map);
    meat_bumps(ctx, &mut bump_map);
    Some((char_map, bump_map))
}

/// Grey field with raised and dented specks
fn meat_bumps(ctx: &BuildContext, canvas: &mut Raster) {
    let mut rng = ctx.rng("patty/bumps");
    let size = TEXTURE_SIZE as f32;

    canvas.fill([128, 128, 128, 255]);
    for _ in 0..2000 {
        let (x, y) = (rng.gen::<f32>() * size, rng.gen::<f32>() * size);
        let radius = rng.gen::<f32>() * 1.5;
        let level = if rng.gen::<bool>() { 160 } else { 100 };
        canvas.fill_circle(x, y, radius, [level, level, level, 255]);
    }
}

/// Parallel grill stripes, slightly wobbly, over a neutral base
fn char_marks(ctx: &BuildContext, canvas: &mut Raster) {
    let mut rng = ctx.rng("patty/char");
    let size = TEXTURE_SIZE as f32;

    canvas.fill([255, 255, 255, 255]);
    let stripes = 5;
    for i in 0..stripes {
        let x = (i as f32 + 0.5) / stripes as f32 * size;
        let jitter = |rng: &mut rand::rngs::SmallRng| (rng.gen::<f32>() - 0.5) * 6.0;
        let from = Point2::new(x + jitter(&mut rng), 0.0);
        let c1 = Point2::new(x + jitter(&mut rng), size / 3.0);
        let c2 = Point2::new(x + jitter(&mut rng), size * 2.0 / 3.0);
        let to = Point2::new(x + jitter(&mut rng), size);
        canvas.stroke_bezier(from, c1, c2, to, 4.0, rgba(70, 45, 30, 0.45));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::RasterBackend;
    use std::cell::Cell;

    thread_local! {
        static WARNINGS: Cell<usize> = const { Cell::new(0) };
    }

    /// Counts warnings logged on the current test thread
    struct WarningCounter;

    impl log::Log for WarningCounter {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                WARNINGS.with(|w| w.set(w.get() + 1));
            }
        }

        fn flush(&self) {}
    }

    static COUNTER: WarningCounter = WarningCounter;

    #[test]
    fn test_patty_dimensions() {
        let (min, max) = patty(&BuildContext::default()).bounds().unwrap();
        assert!((max.x - PATTY_RADIUS).abs() < 1e-3);
        assert!((min.y + PATTY_HEIGHT / 2.0).abs() < 1e-4);
        assert!((max.y - PATTY_HEIGHT / 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_char_marks_darken_stripes() {
        let (canvas, _) = patty_textures(&BuildContext::default()).unwrap();
        // The first stripe runs down the first fifth of the canvas
        let darkest = (0..TEXTURE_SIZE / 5)
            .map(|x| canvas.pixel(x, TEXTURE_SIZE / 2)[0])
            .min()
            .unwrap();
        assert!(darkest < 200);
        assert_eq!(canvas.pixel(TEXTURE_SIZE / 5, 0)[0], 255);
    }

    #[test]
    fn test_flat_patty_without_canvas() {
        let visual = patty(&BuildContext::new(RasterBackend::Unavailable, 0, 24));
        assert!(!visual.has_detail());
        assert_eq!(visual.pieces[0].material.color, Rgb::hex(0x6B4423));
    }

    #[test]
    fn test_missing_canvas_warns_once() {
        // Another test may have installed the logger already
        let _ = log::set_logger(&COUNTER);
        log::set_max_level(log::LevelFilter::Warn);

        WARNINGS.with(|w| w.set(0));
        let visual = patty(&BuildContext::new(RasterBackend::Unavailable, 0, 24));
        assert!(!visual.has_detail());
        assert_eq!(WARNINGS.with(Cell::get), 1);
    }
}
