/// Geometry primitives and procedural mesh generators
use nalgebra::{Matrix4, Point2, Point3, Vector3};
use std::f32::consts::{PI, TAU};

/// Triangles with less area than this are dropped by the generators
const DEGENERATE_AREA: f32 = 1e-9;

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    fn at(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Build a flat-shaded triangle from positions, or `None` if it has no area
    pub fn flat(p0: Point3<f32>, p1: Point3<f32>, p2: Point3<f32>) -> Option<Self> {
        let cross = (p1 - p0).cross(&(p2 - p0));
        if cross.norm_squared() < DEGENERATE_AREA {
            return None;
        }
        let normal = cross.normalize();
        Some(Self::new(
            Vertex::at(p0, normal),
            Vertex::at(p1, normal),
            Vertex::at(p2, normal),
        ))
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }

    pub fn centroid(&self) -> Point3<f32> {
        let sum = self.vertices[0].position.coords
            + self.vertices[1].position.coords
            + self.vertices[2].position.coords;
        Point3::from(sum / 3.0)
    }
}

/// Options for [`Mesh::extrude`]
#[derive(Debug, Clone, Copy)]
pub struct ExtrudeOptions {
    pub depth: f32,
    /// Extra thickness added on each face by the bevel
    pub bevel_thickness: f32,
    /// How far the bevelled cap is pulled in from the outline
    pub bevel_size: f32,
}

impl ExtrudeOptions {
    pub fn new(depth: f32) -> Self {
        Self {
            depth,
            bevel_thickness: 0.0,
            bevel_size: 0.0,
        }
    }

    pub fn bevel(mut self, thickness: f32, size: f32) -> Self {
        self.bevel_thickness = thickness;
        self.bevel_size = size;
        self
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Add a quad as two flat triangles, skipping degenerate halves
    fn add_quad(&mut self, a: Point3<f32>, b: Point3<f32>, c: Point3<f32>, d: Point3<f32>) {
        if let Some(t) = Triangle::flat(a, b, c) {
            self.add_triangle(t);
        }
        if let Some(t) = Triangle::flat(a, c, d) {
            self.add_triangle(t);
        }
    }

    fn add_face(&mut self, a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) {
        if let Some(t) = Triangle::flat(a, b, c) {
            self.add_triangle(t);
        }
    }

    /// Return a copy with every position mapped through `matrix`.
    /// Normals are recomputed from the transformed faces.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Mesh {
        let mut mesh = Mesh::with_capacity(self.triangles.len());
        for triangle in &self.triangles {
            let [a, b, c] = triangle
                .vertices
                .map(|v| matrix.transform_point(&v.position));
            mesh.add_face(a, b, c);
        }
        mesh
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        let mut iter = self.triangles.iter().flat_map(|t| t.vertices.iter());
        let first = iter.next()?.position;
        let (mut min, mut max) = (first, first);
        for v in iter {
            let p = v.position;
            min = Point3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Point3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Some((min, max))
    }

    /// Surface of revolution around the Y axis.
    ///
    /// `profile` is an ordered list of `(radius, height)` control points; each
    /// consecutive pair sweeps a band of `segments` quads.
    pub fn revolve(profile: &[Point2<f32>], segments: usize) -> Self {
        let segments = segments.max(3);
        let mut mesh = Self::with_capacity(profile.len().saturating_sub(1) * segments * 2);
        let ring = |p: &Point2<f32>, j: usize| {
            let phi = j as f32 / segments as f32 * TAU;
            Point3::new(p.x * phi.sin(), p.y, p.x * phi.cos())
        };

        for pair in profile.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            for j in 0..segments {
                mesh.add_quad(
                    ring(lower, j),
                    ring(lower, j + 1),
                    ring(upper, j + 1),
                    ring(upper, j),
                );
            }
        }
        mesh
    }

    /// Extrude a closed outline in the XY plane along +Z.
    ///
    /// The outline should be star-shaped around its centroid; caps are
    /// triangulated as a fan from that centroid.
    pub fn extrude(outline: &[Point2<f32>], options: ExtrudeOptions) -> Self {
        let mut mesh = Self::with_capacity(0);
        if outline.len() < 3 {
            return mesh;
        }

        let centroid = outline
            .iter()
            .fold(Point2::origin(), |acc, p| acc + p.coords / outline.len() as f32);
        let inset = |p: &Point2<f32>| -> Point2<f32> {
            let offset = *p - centroid;
            let len = offset.norm();
            if len <= options.bevel_size || len < f32::EPSILON {
                centroid
            } else {
                centroid + offset * ((len - options.bevel_size) / len)
            }
        };

        let bt = options.bevel_thickness;
        let mut rings: Vec<(f32, Vec<Point2<f32>>)> = Vec::with_capacity(4);
        if bt > 0.0 {
            rings.push((-bt, outline.iter().map(inset).collect()));
        }
        rings.push((0.0, outline.to_vec()));
        rings.push((options.depth, outline.to_vec()));
        if bt > 0.0 {
            rings.push((options.depth + bt, outline.iter().map(inset).collect()));
        }

        let lift = |p: &Point2<f32>, z: f32| Point3::new(p.x, p.y, z);
        let n = outline.len();

        for pair in rings.windows(2) {
            let (z0, r0) = (pair[0].0, &pair[0].1);
            let (z1, r1) = (pair[1].0, &pair[1].1);
            for i in 0..n {
                let k = (i + 1) % n;
                mesh.add_quad(lift(&r0[i], z0), lift(&r0[k], z0), lift(&r1[k], z1), lift(&r1[i], z1));
            }
        }

        for (index, (z, ring)) in [rings.first(), rings.last()].into_iter().flatten().enumerate() {
            let center = lift(&centroid, *z);
            for i in 0..n {
                let k = (i + 1) % n;
                if index == 0 {
                    mesh.add_face(center, lift(&ring[k], *z), lift(&ring[i], *z));
                } else {
                    mesh.add_face(center, lift(&ring[i], *z), lift(&ring[k], *z));
                }
            }
        }

        mesh
    }

    /// Subdivided plane in the XY plane, centred on the origin, with each
    /// vertex pushed along Z by `displace(x, y)`.
    pub fn grid<F>(width: f32, height: f32, segments: usize, mut displace: F) -> Self
    where
        F: FnMut(f32, f32) -> f32,
    {
        let segments = segments.max(1);
        let stride = segments + 1;
        let mut points = Vec::with_capacity(stride * stride);
        for iy in 0..=segments {
            let y = height / 2.0 - iy as f32 / segments as f32 * height;
            for ix in 0..=segments {
                let x = ix as f32 / segments as f32 * width - width / 2.0;
                points.push(Point3::new(x, y, displace(x, y)));
            }
        }

        let mut mesh = Self::with_capacity(segments * segments * 2);
        for iy in 0..segments {
            for ix in 0..segments {
                let a = iy * stride + ix;
                let b = a + stride;
                mesh.add_quad(points[a], points[b], points[b + 1], points[a + 1]);
            }
        }
        mesh
    }

    /// UV sphere (or the top part of one, when `theta_length < PI`)
    pub fn sphere_cap(radius: f32, width_segments: usize, height_segments: usize, theta_length: f32) -> Self {
        let ws = width_segments.max(3);
        let hs = height_segments.max(2);
        let point = |ix: usize, iy: usize| {
            let phi = ix as f32 / ws as f32 * TAU;
            let theta = iy as f32 / hs as f32 * theta_length;
            Point3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            )
        };

        let mut mesh = Self::with_capacity(ws * hs * 2);
        for iy in 0..hs {
            for ix in 0..ws {
                mesh.add_quad(point(ix, iy), point(ix, iy + 1), point(ix + 1, iy + 1), point(ix + 1, iy));
            }
        }
        mesh
    }

    pub fn sphere(radius: f32, width_segments: usize, height_segments: usize) -> Self {
        Self::sphere_cap(radius, width_segments, height_segments, PI)
    }

    /// Torus lying in the XY plane around the Z axis
    pub fn torus(radius: f32, tube: f32, radial_segments: usize, tubular_segments: usize) -> Self {
        let rs = radial_segments.max(3);
        let ts = tubular_segments.max(3);
        let point = |i: usize, j: usize| {
            let v = i as f32 / rs as f32 * TAU;
            let u = j as f32 / ts as f32 * TAU;
            Point3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            )
        };

        let mut mesh = Self::with_capacity(rs * ts * 2);
        for i in 0..rs {
            for j in 0..ts {
                mesh.add_quad(point(i, j), point(i + 1, j), point(i + 1, j + 1), point(i, j + 1));
            }
        }
        mesh
    }

    /// Capped cylinder centred on the origin along Y
    pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: usize) -> Self {
        let half = height / 2.0;
        let profile = [
            Point2::new(0.0, -half),
            Point2::new(radius_bottom, -half),
            Point2::new(radius_top, half),
            Point2::new(0.0, half),
        ];
        Self::revolve(&profile, segments)
    }

    /// Flat disc in the XY plane facing +Z
    pub fn disc(radius: f32, segments: usize) -> Self {
        let segments = segments.max(3);
        let mut mesh = Self::with_capacity(segments);
        let rim = |j: usize| {
            let a = j as f32 / segments as f32 * TAU;
            Point3::new(radius * a.cos(), radius * a.sin(), 0.0)
        };
        for j in 0..segments {
            mesh.add_face(Point3::origin(), rim(j), rim(j + 1));
        }
        mesh
    }

    /// Axis-aligned cube centred on the origin, used as a test fixture
    #[cfg(test)]
    pub(crate) fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let p = |x: f32, y: f32, z: f32| Point3::new(x * h, y * h, z * h);
        let mut mesh = Self::with_capacity(12);
        // Front, back, top, bottom, right, left
        mesh.add_quad(p(-1.0, -1.0, 1.0), p(1.0, -1.0, 1.0), p(1.0, 1.0, 1.0), p(-1.0, 1.0, 1.0));
        mesh.add_quad(p(-1.0, -1.0, -1.0), p(-1.0, 1.0, -1.0), p(1.0, 1.0, -1.0), p(1.0, -1.0, -1.0));
        mesh.add_quad(p(-1.0, 1.0, -1.0), p(-1.0, 1.0, 1.0), p(1.0, 1.0, 1.0), p(1.0, 1.0, -1.0));
        mesh.add_quad(p(-1.0, -1.0, -1.0), p(1.0, -1.0, -1.0), p(1.0, -1.0, 1.0), p(-1.0, -1.0, 1.0));
        mesh.add_quad(p(1.0, -1.0, -1.0), p(1.0, 1.0, -1.0), p(1.0, 1.0, 1.0), p(1.0, -1.0, 1.0));
        mesh.add_quad(p(-1.0, -1.0, -1.0), p(-1.0, -1.0, 1.0), p(-1.0, 1.0, 1.0), p(-1.0, 1.0, -1.0));
        mesh
    }
}
