//! Render settings shared by the software and (future) hardware paths.
//!
//! Modeled as a plain context struct constructed by the host and threaded
//! into the renderer by reference each frame; the renderer never mutates
//! it mid-frame.

use std::fmt;

/// Texture filtering for the hardware path. The software rasterizer
/// always point-samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Point,
    Linear,
    Anisotropic,
}

impl FilterMode {
    pub fn toggled(self) -> Self {
        match self {
            FilterMode::Point => FilterMode::Linear,
            FilterMode::Linear => FilterMode::Anisotropic,
            FilterMode::Anisotropic => FilterMode::Point,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Software,
    Hardware,
}

impl RenderMode {
    pub fn toggled(self) -> Self {
        match self {
            RenderMode::Software => RenderMode::Hardware,
            RenderMode::Hardware => RenderMode::Software,
        }
    }
}

/// Which triangle orientations get drawn.
///
/// `MeshBased` defers to each mesh's own cull mode; any other value
/// overrides it globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    #[default]
    MeshBased,
    None,
    Backface,
    Frontface,
}

impl CullMode {
    pub fn toggled(self) -> Self {
        match self {
            CullMode::MeshBased => CullMode::None,
            CullMode::None => CullMode::Backface,
            CullMode::Backface => CullMode::Frontface,
            CullMode::Frontface => CullMode::MeshBased,
        }
    }

    /// Resolve the effective cull mode for one mesh.
    pub fn resolve(self, mesh_mode: CullMode) -> CullMode {
        match self {
            CullMode::MeshBased => mesh_mode,
            other => other,
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterMode::Point => write!(f, "point"),
            FilterMode::Linear => write!(f, "linear"),
            FilterMode::Anisotropic => write!(f, "anisotropic"),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Software => write!(f, "software"),
            RenderMode::Hardware => write!(f, "hardware"),
        }
    }
}

impl fmt::Display for CullMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CullMode::MeshBased => write!(f, "mesh-based"),
            CullMode::None => write!(f, "none"),
            CullMode::Backface => write!(f, "backface"),
            CullMode::Frontface => write!(f, "frontface"),
        }
    }
}

/// Process-wide render options. Defaults match the original host:
/// software rendering, mesh-based culling, transparency on.
#[derive(Debug, Clone)]
pub struct Settings {
    filter_mode: FilterMode,
    render_mode: RenderMode,
    cull_mode: CullMode,
    use_transparency: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            filter_mode: FilterMode::Point,
            render_mode: RenderMode::Software,
            cull_mode: CullMode::MeshBased,
            use_transparency: true,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_filter_mode(&mut self) {
        self.filter_mode = self.filter_mode.toggled();
    }

    pub fn toggle_render_mode(&mut self) {
        self.render_mode = self.render_mode.toggled();
    }

    pub fn toggle_cull_mode(&mut self) {
        self.cull_mode = self.cull_mode.toggled();
    }

    pub fn toggle_transparency(&mut self) {
        self.use_transparency = !self.use_transparency;
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn cull_mode(&self) -> CullMode {
        self.cull_mode
    }

    pub fn use_transparency(&self) -> bool {
        self.use_transparency
    }
}
