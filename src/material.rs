//! Per-pixel material shading.
//!
//! Materials are a tagged enum rather than a trait-object hierarchy: the
//! renderer resolves the variant once per mesh and the per-pixel `match`
//! stays branch-predictable.

use std::f32::consts::PI;
use std::rc::Rc;

use crate::light::SUN;
use crate::math::{Color, Vec2, Vec3};
use crate::render::raster::VertexOut;
use crate::texture::Texture;

const SHININESS: f32 = 25.0;

/// Whether a material participates in alpha blending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialKind {
    Opaque,
    Transparent,
}

pub enum Material {
    /// Opaque Phong shading with optional tangent-space normal mapping
    /// and specular/glossiness maps.
    Phong {
        diffuse: Option<Rc<Texture>>,
        normal: Option<Rc<Texture>>,
        specular: Option<Rc<Texture>>,
        glossiness: Option<Rc<Texture>>,
    },
    /// Unlit textured diffuse whose sample alpha drives blending.
    TransparentDiffuse { diffuse: Option<Rc<Texture>> },
}

impl Material {
    pub fn phong(
        diffuse: Option<Rc<Texture>>,
        normal: Option<Rc<Texture>>,
        specular: Option<Rc<Texture>>,
        glossiness: Option<Rc<Texture>>,
    ) -> Self {
        Material::Phong {
            diffuse,
            normal,
            specular,
            glossiness,
        }
    }

    pub fn transparent_diffuse(diffuse: Option<Rc<Texture>>) -> Self {
        Material::TransparentDiffuse { diffuse }
    }

    pub fn kind(&self) -> MaterialKind {
        match self {
            Material::Phong { .. } => MaterialKind::Opaque,
            Material::TransparentDiffuse { .. } => MaterialKind::Transparent,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.kind() == MaterialKind::Transparent
    }

    /// Shade one covered pixel from its interpolated attributes.
    ///
    /// Missing optional maps degrade gracefully; a missing diffuse map
    /// shades black.
    pub fn shade(&self, pixel: &VertexOut) -> Color {
        match self {
            Material::Phong {
                diffuse,
                normal,
                specular,
                glossiness,
            } => shade_phong(pixel, diffuse, normal, specular, glossiness),
            Material::TransparentDiffuse { diffuse } => sample_or_black(diffuse, pixel.uv),
        }
    }
}

fn sample_or_black(texture: &Option<Rc<Texture>>, uv: Vec2) -> Color {
    texture
        .as_ref()
        .map(|t| t.sample(uv))
        .unwrap_or(Color::BLACK)
}

fn shade_phong(
    pixel: &VertexOut,
    diffuse: &Option<Rc<Texture>>,
    normal_map: &Option<Rc<Texture>>,
    specular: &Option<Rc<Texture>>,
    glossiness: &Option<Rc<Texture>>,
) -> Color {
    let mut normal = pixel.normal;

    if let Some(map) = normal_map {
        // Tangent-space basis: (tangent, bitangent, normal)
        let bitangent = pixel.tangent.cross(pixel.normal);
        let sample = map.sample(pixel.uv);
        let decoded = Vec3::new(
            2.0 * sample.r - 1.0,
            2.0 * sample.g - 1.0,
            2.0 * sample.b - 1.0,
        );
        normal = (pixel.tangent * decoded.x + bitangent * decoded.y + pixel.normal * decoded.z)
            .normalize();
    }

    let n_dot_l = (-normal).dot(SUN.direction);
    let diffuse_strength = n_dot_l.clamp(0.0, 1.0) * SUN.intensity / PI;
    let diffuse_color = sample_or_black(diffuse, pixel.uv) * diffuse_strength;

    let mut specular_color = Color::BLACK;
    if let (Some(spec_map), Some(gloss_map)) = (specular, glossiness) {
        // Light direction reflected about the shading normal
        let reflected = SUN.direction - (-normal) * (n_dot_l + n_dot_l);
        let r_dot_v = reflected.dot(pixel.view_vector).clamp(0.0, 1.0);
        let exponent = SHININESS * gloss_map.sample(pixel.uv).r;
        specular_color = spec_map.sample(pixel.uv) * r_dot_v.powf(exponent);
    }

    diffuse_color + specular_color
}
