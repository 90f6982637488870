//! The per-frame software rendering driver.
//!
//! Walks the scene in submission order and pushes every triangle through
//! the raster stages: assemble, transform, bound, cover, depth-test,
//! shade, blend, write. There is no scene-level culling and no sorting;
//! transparent surfaces composite in paint order against whatever is
//! already in the framebuffer.

use crate::camera::Camera;
use crate::material::Material;
use crate::math::{Color, Vec2};
use crate::render::framebuffer::FrameBuffer;
use crate::render::raster::{self, PrimitiveTopology, VertexOut};
use crate::scene::Scene;
use crate::settings::{CullMode, Settings};

pub struct Renderer {
    frame: FrameBuffer,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: FrameBuffer::new(width, height),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.frame.resize(width, height);
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Reset the color and depth buffers to their clear state.
    pub fn clear(&mut self) {
        self.frame.clear();
    }

    /// The rendered frame as ARGB8888 bytes for presentation.
    pub fn as_bytes(&self) -> &[u8] {
        self.frame.as_bytes()
    }

    /// Render one frame of the scene.
    ///
    /// Settings are read once per mesh (cull-mode resolution and the
    /// transparency switch); the buffers are exclusively owned here for
    /// the duration of the call.
    pub fn render(&mut self, camera: &Camera, scene: &Scene, settings: &Settings) {
        self.frame.clear();

        let projection_view = *camera.projection_matrix() * camera.view_matrix();
        let camera_pos = camera.position();
        let cull_settings = settings.cull_mode();
        let width = self.frame.width();
        let height = self.frame.height();

        for mesh in scene.meshes() {
            let vertices = mesh.vertices();
            let indices = mesh.indices();
            if indices.len() < 3 {
                continue;
            }

            let cull_mode = cull_settings.resolve(mesh.cull_mode());
            let material = mesh.material();
            let use_transparency = material.is_transparent() && settings.use_transparency();
            let world_view_projection = projection_view * *mesh.transform();
            let topology = PrimitiveTopology::TriangleList;

            let mut index = 0;
            while index + 3 <= indices.len() {
                let screen = raster::assemble_triangle(topology, vertices, indices, index)
                    .and_then(|triangle| {
                        raster::transform_triangle(
                            &triangle,
                            &world_view_projection,
                            mesh.transform(),
                            camera_pos,
                            width,
                            height,
                        )
                    });

                if let Some(screen) = screen {
                    self.rasterize_triangle(&screen, material, cull_mode, use_transparency);
                }

                index += topology.step();
            }
        }
    }

    /// Rasterize one raster-space triangle into the framebuffer.
    ///
    /// `use_transparency` selects the blend path: the pixel still
    /// depth-tests, but compositing reads back the current framebuffer
    /// color and the depth buffer is left unwritten.
    pub fn rasterize_triangle(
        &mut self,
        vertices: &[VertexOut; 3],
        material: &Material,
        cull_mode: CullMode,
        use_transparency: bool,
    ) {
        let aabb = raster::screen_aabb(vertices, self.frame.width(), self.frame.height());

        for row in aabb.bot..aabb.top {
            for column in aabb.left..aabb.right {
                let pixel = Vec2::new(column as f32, row as f32);

                let Some((w0, w1, w2)) = raster::coverage(vertices, pixel, cull_mode) else {
                    continue;
                };

                let index = self.frame.index(column, row);
                let depth = raster::interpolate_depth(vertices, w0, w1, w2);
                if depth >= self.frame.depth_at(index) {
                    continue;
                }

                let pixel_info = raster::interpolate_attributes(pixel, vertices, depth, w0, w1, w2);
                let mut color = material.shade(&pixel_info);

                if use_transparency {
                    // src-over against the current framebuffer contents;
                    // the composite is opaque and depth stays unwritten
                    let dst = Color::from_argb(self.frame.color_at(index));
                    let alpha = color.a;
                    let blended = color * alpha + dst * (1.0 - alpha);
                    color = Color::new(blended.r, blended.g, blended.b);
                } else {
                    self.frame.set_depth(index, depth);
                }

                self.frame.set_color(index, color.max_to_one().to_argb());
            }
        }
    }
}
