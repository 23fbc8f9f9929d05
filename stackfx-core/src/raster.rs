/// Software z-buffer rasterizer producing a lit colour frame
///
/// Hosts decide how to present the frame: the terminal maps it onto
/// characters, the browser blits it into a canvas.
use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::Triangle;
use crate::lighting::LightRig;
use crate::material::{Material, Rgb};
use crate::projection::{project, Camera, ScreenPoint};
use crate::transform::Transform;
use crate::visual::Visual;

/// Axis pair a detail map is projected along, picked per face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetailPlane {
    Xy,
    Xz,
    Zy,
}

impl DetailPlane {
    fn for_normal(normal: &Vector3<f32>) -> Self {
        let n = normal.abs();
        if n.y >= n.x && n.y >= n.z {
            DetailPlane::Xz
        } else if n.z >= n.x {
            DetailPlane::Xy
        } else {
            DetailPlane::Zy
        }
    }

    fn uv(self, p: &Point3<f32>, extent: f32) -> (f32, f32) {
        let (a, b) = match self {
            DetailPlane::Xy => (p.x, p.y),
            DetailPlane::Xz => (p.x, p.z),
            DetailPlane::Zy => (p.z, p.y),
        };
        (a / extent + 0.5, b / extent + 0.5)
    }
}

/// Colour and depth target
#[derive(Debug, Clone)]
pub struct Rasterizer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    color_buffer: Vec<Option<Rgb>>,
}

impl Rasterizer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            color_buffer: vec![None; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.color_buffer.fill(None);
    }

    /// Colour at `(x, y)`, or `None` where nothing was drawn
    pub fn fragment(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.color_buffer[y * self.width + x]
    }

    pub fn depth(&self, x: usize, y: usize) -> f32 {
        self.depth_buffer[y * self.width + x]
    }

    /// Number of pixels holding geometry
    pub fn coverage(&self) -> usize {
        self.color_buffer.iter().filter(|c| c.is_some()).count()
    }

    /// Packed RGBA rows, empty pixels painted with `background`
    pub fn to_rgba(&self, background: Rgb) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.color_buffer.len() * 4);
        for fragment in &self.color_buffer {
            let [r, g, b] = fragment.unwrap_or(background).to_bytes();
            out.extend_from_slice(&[r, g, b, 255]);
        }
        out
    }

    /// Draw every piece of `visual` placed by `model`
    pub fn render_visual(
        &mut self,
        visual: &Visual,
        model: &Matrix4<f32>,
        camera: &Camera,
        lights: &LightRig,
    ) {
        let view = camera.view_matrix();
        let projection = camera.projection_matrix();
        for piece in &visual.pieces {
            let world = model * piece.local;
            let mvp = Transform::mvp_matrix(&world, &view, &projection);
            for triangle in &piece.mesh.triangles {
                self.render_triangle(triangle, &world, &mvp, camera, lights, &piece.material);
            }
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        world: &Matrix4<f32>,
        mvp: &Matrix4<f32>,
        camera: &Camera,
        lights: &LightRig,
        material: &Material,
    ) {
        let (w, h) = (self.width as u32, self.height as u32);
        let mut screen = [ScreenPoint { x: 0.0, y: 0.0, depth: 0.0 }; 3];
        for (slot, vertex) in screen.iter_mut().zip(&triangle.vertices) {
            match project(mvp, &vertex.position, w, h) {
                Some(p) => *slot = p,
                None => return, // Triangle is clipped
            }
        }

        let [p0, p1, p2] = triangle
            .vertices
            .map(|v| world.transform_point(&v.position));
        let Some(face) = Triangle::flat(p0, p1, p2) else {
            return;
        };
        let centroid = face.centroid();
        let mut normal = face.vertices[0].normal;
        // Thin shells are visible from both sides
        if normal.dot(&(camera.position - centroid)) < 0.0 {
            normal = -normal;
        }

        let light = lights.irradiance(&centroid, &normal, &camera.position, material);
        let local = triangle.vertices.map(|v| v.position);
        let plane = material
            .has_detail()
            .then(|| DetailPlane::for_normal(&triangle.calculate_normal()));
        let flat = light.resolve(material.color, 0.0, material);

        self.rasterize_triangle(&screen, material.opacity, |w0, w1, w2| match plane {
            Some(plane) => {
                let p = Point3::from(
                    local[0].coords * w0 + local[1].coords * w1 + local[2].coords * w2,
                );
                let (u, v) = plane.uv(&p, material.detail_extent);
                let (albedo, bump) = material.sample(u, v);
                light.resolve(albedo, bump, material)
            }
            None => flat,
        });
    }

    fn rasterize_triangle<F>(&mut self, coords: &[ScreenPoint; 3], opacity: f32, mut shade: F)
    where
        F: FnMut(f32, f32, f32) -> Rgb,
    {
        let [v0, v1, v2] = *coords;

        // Bounding box, clipped to screen bounds
        let min_x = (v0.x.min(v1.x).min(v2.x).floor() as i32).max(0);
        let max_x = (v0.x.max(v1.x).max(v2.x).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.y.min(v1.y).min(v2.y).floor() as i32).max(0);
        let max_y = (v0.y.max(v1.y).max(v2.y).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.x, v0.y), (v1.x, v1.y), (v2.x, v2.y), (px, py))
                else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.depth + w1 * v1.depth + w2 * v2.depth;
                let idx = y as usize * self.width + x as usize;
                if depth >= self.depth_buffer[idx] {
                    continue;
                }

                let color = shade(w0, w1, w2);
                let color = match self.color_buffer[idx] {
                    Some(behind) if opacity < 1.0 => behind.mix(color, opacity),
                    _ => color,
                };
                self.depth_buffer[idx] = depth;
                self.color_buffer[idx] = Some(color);
            }
        }
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Mesh;
    use crate::transform::Transform;
    use crate::visual::Piece;
    use std::rc::Rc;

    const W: usize = 64;
    const H: usize = 48;

    fn cube_visual(size: f32, color: Rgb) -> Visual {
        let mut visual = Visual::new();
        visual.push(Piece::new(
            Rc::new(Mesh::cube(size)),
            Rc::new(Material::phong(color, 10.0, Rgb::BLACK)),
        ));
        visual
    }

    fn render(visuals: &[(Visual, Matrix4<f32>)]) -> Rasterizer {
        let camera = Camera::new(W as u32, H as u32);
        let lights = LightRig::studio();
        let mut raster = Rasterizer::new(W, H);
        for (visual, model) in visuals {
            raster.render_visual(visual, model, &camera, &lights);
        }
        raster
    }

    #[test]
    fn test_barycentric_centroid() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (3.0, 0.0), (0.0, 3.0), (1.0, 1.0)).unwrap();
        assert!((w0 - 1.0 / 3.0).abs() < 1e-5);
        assert!((w1 - 1.0 / 3.0).abs() < 1e-5);
        assert!((w2 - 1.0 / 3.0).abs() < 1e-5);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 0.0)).is_none());
    }

    #[test]
    fn test_cube_covers_centre() {
        let model = Transform::translation_matrix(0.0, 1.0, 0.0);
        let raster = render(&[(cube_visual(1.0, Rgb::WHITE), model)]);
        assert!(raster.fragment(W / 2, H / 2).is_some());
        assert!(raster.fragment(0, 0).is_none());
        assert!(raster.coverage() > 10);
        assert!(raster.coverage() < W * H);
    }

    #[test]
    fn test_nearer_surface_wins() {
        let red = Rgb::new(1.0, 0.0, 0.0);
        let blue = Rgb::new(0.0, 0.0, 1.0);
        let front = Transform::translation_matrix(0.0, 1.0, 2.0);
        let back = Transform::translation_matrix(0.0, 1.0, -2.0);
        // Draw the far cube last; the depth test must keep the near one
        let raster = render(&[(cube_visual(1.0, red), front), (cube_visual(3.0, blue), back)]);
        let centre = raster.fragment(W / 2, H / 2).unwrap();
        assert!(centre.r > centre.b);
    }

    #[test]
    fn test_back_of_shell_is_lit() {
        // A disc facing away from the camera still shows
        let mut visual = Visual::new();
        visual.push(
            Piece::new(
                Rc::new(Mesh::disc(1.0, 16)),
                Rc::new(Material::phong(Rgb::WHITE, 10.0, Rgb::BLACK)),
            )
            .rotated(crate::transform::RotationState::new(0.0, std::f32::consts::PI, 0.0))
            .at(0.0, 1.0, 0.0),
        );
        let raster = render(&[(visual, Matrix4::identity())]);
        let c = raster.fragment(W / 2, H / 2).unwrap();
        assert!(c.luma() > 0.5);
    }

    #[test]
    fn test_clear_and_rgba() {
        let model = Transform::translation_matrix(0.0, 1.0, 0.0);
        let mut raster = render(&[(cube_visual(1.0, Rgb::WHITE), model)]);
        let rgba = raster.to_rgba(Rgb::BLACK);
        assert_eq!(rgba.len(), W * H * 4);
        assert_eq!(&rgba[..4], &[0, 0, 0, 255]);

        raster.clear();
        assert_eq!(raster.coverage(), 0);
        assert_eq!(raster.depth(W / 2, H / 2), f32::INFINITY);
    }

    #[test]
    fn test_detail_plane_selection() {
        assert_eq!(DetailPlane::for_normal(&Vector3::new(0.1, 0.9, 0.2)), DetailPlane::Xz);
        assert_eq!(DetailPlane::for_normal(&Vector3::new(0.1, 0.2, -0.9)), DetailPlane::Xy);
        assert_eq!(DetailPlane::for_normal(&Vector3::new(-0.9, 0.2, 0.1)), DetailPlane::Zy);
        let (u, v) = DetailPlane::Xz.uv(&Point3::new(1.0, 5.0, -1.0), 4.0);
        assert!((u - 0.75).abs() < 1e-6);
        assert!((v - 0.25).abs() < 1e-6);
    }
}
