//! Tag-keyed resource registry.
//!
//! Owns textures and materials for the program lifetime. Materials and
//! meshes hold `Rc` handles into it, so a registry entry stays alive as
//! long as anything samples it. Constructed explicitly by the host and
//! passed where needed — there is no global instance.

use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use log::{info, warn};

use crate::material::Material;
use crate::texture::Texture;

#[derive(Default)]
pub struct ResourceRegistry {
    textures: HashMap<String, Rc<Texture>>,
    materials: HashMap<String, Rc<Material>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an image file and register it under `tag`.
    pub fn load_texture<P: AsRef<Path>>(
        &mut self,
        tag: &str,
        path: P,
    ) -> Result<(), image::ImageError> {
        let texture = Texture::from_file(&path)?;
        info!(
            "loaded texture '{}' ({}x{})",
            tag,
            texture.width(),
            texture.height()
        );
        self.textures.insert(tag.to_owned(), Rc::new(texture));
        Ok(())
    }

    pub fn add_texture(&mut self, tag: &str, texture: Texture) {
        self.textures.insert(tag.to_owned(), Rc::new(texture));
    }

    pub fn add_material(&mut self, tag: &str, material: Material) {
        self.materials.insert(tag.to_owned(), Rc::new(material));
    }

    /// Look up a texture handle; a missing tag is logged and yields `None`.
    pub fn texture(&self, tag: &str) -> Option<Rc<Texture>> {
        let found = self.textures.get(tag).cloned();
        if found.is_none() {
            warn!("texture '{}' does not exist", tag);
        }
        found
    }

    /// Look up a material handle; a missing tag is logged and yields `None`.
    pub fn material(&self, tag: &str) -> Option<Rc<Material>> {
        let found = self.materials.get(tag).cloned();
        if found.is_none() {
            warn!("material '{}' does not exist", tag);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_return_registered_resources() {
        let mut registry = ResourceRegistry::new();
        registry.add_texture("white", Texture::from_rgba8(1, 1, vec![255; 4]));
        let diffuse = registry.texture("white");
        assert!(diffuse.is_some());

        registry.add_material("fx", Material::transparent_diffuse(diffuse));
        assert!(registry.material("fx").is_some());
    }

    #[test]
    fn missing_tags_yield_none() {
        let registry = ResourceRegistry::new();
        assert!(registry.texture("absent").is_none());
        assert!(registry.material("absent").is_none());
    }

    #[test]
    fn handles_keep_resources_alive() {
        let handle = {
            let mut registry = ResourceRegistry::new();
            registry.add_texture("white", Texture::from_rgba8(1, 1, vec![255; 4]));
            registry.texture("white")
        };
        // Registry dropped; the Rc handle still samples
        let texture = handle.expect("registered");
        assert_eq!(texture.width(), 1);
    }
}
