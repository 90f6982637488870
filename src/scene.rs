//! Scene: an ordered collection of meshes.
//!
//! Paint order is submission order — the renderer walks meshes in the
//! order they were added, which is what makes unsorted transparency
//! deterministic.

use crate::mesh::Mesh;

#[derive(Default)]
pub struct Scene {
    meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_mesh(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut [Mesh] {
        &mut self.meshes
    }

    /// Per-frame update hook, fanned out to every mesh.
    pub fn update(&mut self, delta_time: f32) {
        for mesh in &mut self.meshes {
            mesh.update(delta_time);
        }
    }
}
