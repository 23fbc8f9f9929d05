/// Studio light rig with a slowly breathing, orbiting rim light
use std::time::Duration;

use nalgebra::{Point3, Vector3};

use crate::material::{Material, Rgb};

/// Seconds-to-phase factor for the rim animation
const RIM_PHASE_RATE: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    /// Parallel rays shining from `position` toward the origin
    Directional { position: Point3<f32> },
    /// Falls off to zero at `range`
    Point { position: Point3<f32>, range: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: Rgb,
    pub intensity: f32,
}

impl Light {
    pub fn ambient(color: u32, intensity: f32) -> Self {
        Self {
            kind: LightKind::Ambient,
            color: Rgb::hex(color),
            intensity,
        }
    }

    pub fn directional(color: u32, intensity: f32, position: Point3<f32>) -> Self {
        Self {
            kind: LightKind::Directional { position },
            color: Rgb::hex(color),
            intensity,
        }
    }

    pub fn point(color: u32, intensity: f32, position: Point3<f32>, range: f32) -> Self {
        Self {
            kind: LightKind::Point { position, range },
            color: Rgb::hex(color),
            intensity,
        }
    }

    /// Unit vector toward the light and its attenuation at `at`
    fn incidence(&self, at: &Point3<f32>) -> Option<(Vector3<f32>, f32)> {
        match self.kind {
            LightKind::Ambient => None,
            LightKind::Directional { position } => {
                let dir = position.coords.try_normalize(1e-6)?;
                Some((dir, 1.0))
            }
            LightKind::Point { position, range } => {
                let offset = position - at;
                let distance = offset.norm();
                let falloff = (1.0 - distance / range).max(0.0);
                Some((offset.try_normalize(1e-6)?, falloff * falloff))
            }
        }
    }
}

/// Per-face light totals, so detail maps can modulate them per pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Irradiance {
    pub diffuse: Rgb,
    pub specular: Rgb,
}

impl Irradiance {
    /// Final colour for a surface albedo; `bump` nudges the diffuse term
    pub fn resolve(&self, albedo: Rgb, bump: f32, material: &Material) -> Rgb {
        albedo
            .mul(self.diffuse)
            .scale(1.0 + bump)
            .add(self.specular)
            .add(material.emissive)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    pub ambient: Light,
    pub key: Light,
    pub rim: Light,
    pub fill: Light,
    rim_base: f32,
}

impl LightRig {
    /// Warm key from above-right, orange rim behind-left, cool fill below
    pub fn studio() -> Self {
        let rim = Light::point(0xffaa55, 0.6, Point3::new(-6.0, 3.0, 4.0), 30.0);
        Self {
            ambient: Light::ambient(0xffffff, 0.7),
            key: Light::directional(0xffffff, 1.0, Point3::new(8.0, 10.0, 6.0)),
            rim,
            fill: Light::point(0xaaaaff, 0.3, Point3::new(4.0, -1.0, -6.0), 30.0),
            rim_base: rim.intensity,
        }
    }

    pub fn lights(&self) -> [&Light; 4] {
        [&self.ambient, &self.key, &self.rim, &self.fill]
    }

    /// Pose the rim light for the total elapsed time
    pub fn animate(&mut self, elapsed: Duration) {
        let t = elapsed.as_secs_f32() * RIM_PHASE_RATE;
        self.rim.intensity = self.rim_base + (t * 0.7).sin() * 0.15;
        if let LightKind::Point { position, .. } = &mut self.rim.kind {
            position.x = (t * 0.4).sin() * 6.0;
            position.z = (t * 0.4).cos() * 6.0;
        }
    }

    /// Light arriving at a surface point with outward `normal`, seen from `eye`
    pub fn irradiance(
        &self,
        at: &Point3<f32>,
        normal: &Vector3<f32>,
        eye: &Point3<f32>,
        material: &Material,
    ) -> Irradiance {
        let mut diffuse = Rgb::BLACK;
        let mut specular = Rgb::BLACK;
        let view = (eye - at).try_normalize(1e-6).unwrap_or(*normal);

        for light in self.lights() {
            let radiance = light.color.scale(light.intensity);
            let Some((dir, attenuation)) = light.incidence(at) else {
                diffuse = diffuse.add(radiance);
                continue;
            };

            let lambert = normal.dot(&dir).max(0.0) * attenuation;
            if lambert <= 0.0 {
                continue;
            }
            diffuse = diffuse.add(radiance.scale(lambert));

            let half = (dir + view).try_normalize(1e-6).unwrap_or(dir);
            let highlight = normal.dot(&half).max(0.0).powf(material.shininess.max(1.0));
            specular = specular.add(material.specular.mul(radiance).scale(highlight * attenuation));
        }

        Irradiance { diffuse, specular }
    }
}

impl Default for LightRig {
    fn default() -> Self {
        Self::studio()
    }
}
