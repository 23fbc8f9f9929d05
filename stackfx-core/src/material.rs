/// Surface materials for part visuals
use std::rc::Rc;

use crate::texture::Raster;

/// Linear RGB colour with channels in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value
    pub fn hex(value: u32) -> Self {
        Self::from_bytes([(value >> 16) as u8, (value >> 8) as u8, value as u8])
    }

    pub fn from_bytes([r, g, b]: [u8; 3]) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn to_bytes(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// `#rrggbb` form for style sheets and label markup
    pub fn to_css(self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub fn scale(self, k: f32) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k)
    }

    pub fn mul(self, other: Rgb) -> Self {
        Self::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }

    pub fn add(self, other: Rgb) -> Self {
        Self::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }

    pub fn mix(self, other: Rgb, t: f32) -> Self {
        self.scale(1.0 - t).add(other.scale(t))
    }

    /// Perceived brightness
    pub fn luma(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }
}

/// Phong-style material, optionally carrying procedural detail maps.
#[derive(Debug, Clone)]
pub struct Material {
    pub color: Rgb,
    pub shininess: f32,
    pub specular: Rgb,
    pub emissive: Rgb,
    pub opacity: f32,
    /// Multiplied into the base colour
    pub color_map: Option<Rc<Raster>>,
    /// Luminance perturbs the shading by up to `bump_scale`
    pub bump_map: Option<Rc<Raster>>,
    pub bump_scale: f32,
    /// World units covered by one repeat of a detail map
    pub detail_extent: f32,
}

impl Material {
    pub fn phong(color: Rgb, shininess: f32, specular: Rgb) -> Self {
        Self {
            color,
            shininess,
            specular,
            emissive: Rgb::BLACK,
            opacity: 1.0,
            color_map: None,
            bump_map: None,
            bump_scale: 0.0,
            detail_extent: 2.0,
        }
    }

    pub fn with_emissive(mut self, emissive: Rgb) -> Self {
        self.emissive = emissive;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_color_map(mut self, map: Option<Raster>) -> Self {
        self.color_map = map.map(Rc::new);
        self
    }

    pub fn with_bump_map(mut self, map: Option<Raster>, scale: f32) -> Self {
        self.bump_map = map.map(Rc::new);
        self.bump_scale = scale;
        self
    }

    pub fn with_detail_extent(mut self, extent: f32) -> Self {
        self.detail_extent = extent;
        self
    }

    pub fn has_detail(&self) -> bool {
        self.color_map.is_some() || self.bump_map.is_some()
    }

    /// Number of detail textures owned by this material
    pub fn texture_count(&self) -> usize {
        self.color_map.iter().count() + self.bump_map.iter().count()
    }

    /// Base colour at detail coordinates `(u, v)` and the bump offset there
    pub fn sample(&self, u: f32, v: f32) -> (Rgb, f32) {
        let color = match &self.color_map {
            Some(map) => self.color.mul(map.sample(u, v)),
            None => self.color,
        };
        let bump = match &self.bump_map {
            Some(map) => (map.sample(u, v).luma() - 0.5) * 2.0 * self.bump_scale,
            None => 0.0,
        };
        (color, bump)
    }
}
