/// Procedural raster canvases for surface detail
///
/// Parts paint pores, veins and speckles into small RGBA canvases which the
/// rasterizer samples as colour or bump maps. Canvas allocation goes through
/// a [`RasterBackend`] so a host without 2D drawing support degrades to flat
/// colour instead of failing.
use nalgebra::Point2;

use crate::error::EngineError;
use crate::material::Rgb;

/// Where procedural canvases come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RasterBackend {
    /// In-memory software canvas
    #[default]
    Software,
    /// No drawing context; every allocation fails
    Unavailable,
}

impl RasterBackend {
    pub fn allocate(self, width: usize, height: usize) -> Result<Raster, EngineError> {
        match self {
            RasterBackend::Software if width > 0 && height > 0 => Ok(Raster::new(width, height)),
            _ => Err(EngineError::RasterUnavailable),
        }
    }
}

/// RGBA colour with 8-bit channels
pub type Rgba = [u8; 4];

/// Build an RGBA value from an RGB triple and a float alpha
pub fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Rgba {
    [r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8]
}

/// An RGBA canvas
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Raster {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        let i = (y * self.width + x) * 4;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]]
    }

    pub fn fill(&mut self, color: Rgba) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// Source-over blend of `color` into one pixel
    fn blend(&mut self, x: usize, y: usize, color: Rgba) {
        let i = (y * self.width + x) * 4;
        let a = color[3] as f32 / 255.0;
        for c in 0..3 {
            let dst = self.pixels[i + c] as f32;
            self.pixels[i + c] = (dst + (color[c] as f32 - dst) * a).round() as u8;
        }
        let dst_a = self.pixels[i + 3] as f32 / 255.0;
        self.pixels[i + 3] = ((a + dst_a * (1.0 - a)) * 255.0).round() as u8;
    }

    /// Blend a filled disc; coordinates outside the canvas are clipped
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        if radius <= 0.0 {
            return;
        }
        let min_x = (cx - radius).floor().max(0.0) as usize;
        let min_y = (cy - radius).floor().max(0.0) as usize;
        let max_x = ((cx + radius).ceil() as usize).min(self.width.saturating_sub(1));
        let max_y = ((cy + radius).ceil() as usize).min(self.height.saturating_sub(1));
        if cx + radius < 0.0 || cy + radius < 0.0 {
            return;
        }

        let r2 = radius * radius;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.blend(x, y, color);
                }
            }
        }
    }

    /// Stroke a cubic bezier by stamping discs along it
    pub fn stroke_bezier(
        &mut self,
        from: Point2<f32>,
        control1: Point2<f32>,
        control2: Point2<f32>,
        to: Point2<f32>,
        line_width: f32,
        color: Rgba,
    ) {
        let length = (control1 - from).norm() + (control2 - control1).norm() + (to - control2).norm();
        let steps = (length.ceil() as usize).max(2);
        let radius = (line_width / 2.0).max(0.5);
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let mt = 1.0 - t;
            let p = from.coords * (mt * mt * mt)
                + control1.coords * (3.0 * mt * mt * t)
                + control2.coords * (3.0 * mt * t * t)
                + to.coords * (t * t * t);
            self.fill_circle(p.x, p.y, radius, color);
        }
    }

    /// Nearest-neighbour lookup with wrapping coordinates
    pub fn sample(&self, u: f32, v: f32) -> Rgb {
        if self.width == 0 || self.height == 0 {
            return Rgb::WHITE;
        }
        let x = (u.rem_euclid(1.0) * self.width as f32) as usize % self.width;
        let y = (v.rem_euclid(1.0) * self.height as f32) as usize % self.height;
        let [r, g, b, _] = self.pixel(x, y);
        Rgb::from_bytes([r, g, b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_backend() {
        assert_eq!(
            RasterBackend::Unavailable.allocate(64, 64),
            Err(EngineError::RasterUnavailable)
        );
        assert!(RasterBackend::Software.allocate(0, 64).is_err());
        assert!(RasterBackend::Software.allocate(8, 8).is_ok());
    }

    #[test]
    fn test_fill_and_opaque_circle() {
        let mut raster = Raster::new(16, 16);
        raster.fill([128, 128, 128, 255]);
        raster.fill_circle(8.0, 8.0, 3.0, [255, 0, 0, 255]);
        assert_eq!(raster.pixel(8, 8), [255, 0, 0, 255]);
        assert_eq!(raster.pixel(0, 0), [128, 128, 128, 255]);
    }

    #[test]
    fn test_translucent_blend() {
        let mut raster = Raster::new(4, 4);
        raster.fill([0, 0, 0, 255]);
        raster.fill_circle(2.0, 2.0, 1.0, rgba(200, 100, 50, 0.5));
        let [r, g, b, a] = raster.pixel(1, 1);
        assert_eq!((r, g, b, a), (100, 50, 25, 255));
    }

    #[test]
    fn test_circle_clipped_at_edges() {
        let mut raster = Raster::new(8, 8);
        raster.fill_circle(-1.0, -1.0, 3.0, [255, 255, 255, 255]);
        raster.fill_circle(20.0, 20.0, 2.0, [255, 255, 255, 255]);
        assert_eq!(raster.pixel(0, 0), [255, 255, 255, 255]);
        assert_eq!(raster.pixel(7, 7), [0, 0, 0, 0]);
    }

    #[test]
    fn test_bezier_touches_endpoints() {
        let mut raster = Raster::new(32, 32);
        let a = Point2::new(2.0, 2.0);
        let b = Point2::new(29.0, 29.0);
        raster.stroke_bezier(a, Point2::new(10.0, 2.0), Point2::new(20.0, 29.0), b, 2.0, [0, 255, 0, 255]);
        assert_eq!(raster.pixel(2, 2)[1], 255);
        assert_eq!(raster.pixel(29, 29)[1], 255);
    }

    #[test]
    fn test_sample_wraps() {
        let mut raster = Raster::new(2, 1);
        raster.fill_circle(1.5, 0.5, 0.5, [255, 255, 255, 255]);
        assert_eq!(raster.sample(0.75, 0.0), Rgb::WHITE);
        assert_eq!(raster.sample(1.75, 3.0), Rgb::WHITE);
        assert_eq!(raster.sample(-0.75, 0.0), Rgb::BLACK);
    }
}
