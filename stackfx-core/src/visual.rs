/// Grouped visual sub-objects produced by the part factory
use std::collections::HashSet;
use std::rc::Rc;

use nalgebra::{Matrix4, Point3, Vector3};

use crate::geometry::Mesh;
use crate::material::Material;
use crate::transform::{RotationState, Transform};

/// One drawable piece: shared geometry, shared material, local placement
#[derive(Debug, Clone)]
pub struct Piece {
    pub mesh: Rc<Mesh>,
    pub material: Rc<Material>,
    pub local: Matrix4<f32>,
}

impl Piece {
    pub fn new(mesh: Rc<Mesh>, material: Rc<Material>) -> Self {
        Self {
            mesh,
            material,
            local: Matrix4::identity(),
        }
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.local = Transform::translation_matrix(x, y, z) * self.local;
        self
    }

    pub fn rotated(mut self, rotation: RotationState) -> Self {
        self.local = Transform::rotation_matrix(&rotation) * self.local;
        self
    }

    pub fn scaled(mut self, sx: f32, sy: f32, sz: f32) -> Self {
        self.local = Transform::scale_matrix(sx, sy, sz) * self.local;
        self
    }
}

/// Counts of generated graphics resources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCount {
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
}

impl ResourceCount {
    pub fn total(&self) -> usize {
        self.geometries + self.materials + self.textures
    }
}

impl std::ops::Add for ResourceCount {
    type Output = ResourceCount;

    fn add(self, other: ResourceCount) -> ResourceCount {
        ResourceCount {
            geometries: self.geometries + other.geometries,
            materials: self.materials + other.materials,
            textures: self.textures + other.textures,
        }
    }
}

/// A self-contained group of pieces, positioned as one unit
#[derive(Debug, Clone, Default)]
pub struct Visual {
    pub pieces: Vec<Piece>,
}

impl Visual {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, piece: Piece) {
        self.pieces.push(piece);
    }

    pub fn triangle_count(&self) -> usize {
        self.pieces.iter().map(|p| p.mesh.triangles.len()).sum()
    }

    pub fn has_detail(&self) -> bool {
        self.pieces.iter().any(|p| p.material.has_detail())
    }

    /// Unique geometries, materials and detail maps referenced by the pieces
    pub fn resources(&self) -> ResourceCount {
        let mut meshes = HashSet::new();
        let mut materials = HashSet::new();
        let mut textures = 0;
        for piece in &self.pieces {
            meshes.insert(Rc::as_ptr(&piece.mesh));
            if materials.insert(Rc::as_ptr(&piece.material)) {
                textures += piece.material.texture_count();
            }
        }
        ResourceCount {
            geometries: meshes.len(),
            materials: materials.len(),
            textures,
        }
    }

    /// Bounds of every piece after its local placement
    pub fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        self.pieces
            .iter()
            .filter_map(|piece| piece.mesh.transformed(&piece.local).bounds())
            .reduce(|(amin, amax), (bmin, bmax)| {
                (
                    Point3::from(amin.coords.inf(&bmin.coords)),
                    Point3::from(amax.coords.sup(&bmax.coords)),
                )
            })
    }

    /// Extent along each axis
    pub fn size(&self) -> Vector3<f32> {
        self.bounds().map(|(min, max)| max - min).unwrap_or_else(Vector3::zeros)
    }
}
