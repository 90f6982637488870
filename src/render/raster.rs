//! Per-triangle rasterization stages.
//!
//! Everything between the index buffer and the shaded pixel: triangle
//! assembly, the model-to-raster vertex transform with its all-or-nothing
//! frustum test, screen bounding boxes, the edge-function inside test with
//! cull-mode tie-breaks, and perspective-correct attribute interpolation.
//!
//! Coordinate conventions: raster space puts the origin top-left, x right,
//! y down, z in [0,1] for depth. A transformed vertex keeps 1/clip-w in
//! its w slot so interpolation stays linear in world space.

use crate::math::{remap, Mat4, Vec2, Vec3, Vec4};
use crate::mesh::Vertex;
use crate::settings::CullMode;

/// How the index buffer encodes triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
    TriangleStrip,
}

impl PrimitiveTopology {
    /// How far the index cursor advances between triangles.
    pub fn step(self) -> usize {
        match self {
            PrimitiveTopology::TriangleList => 3,
            PrimitiveTopology::TriangleStrip => 1,
        }
    }
}

/// A vertex after the raster-space transform, also used for the
/// interpolated per-pixel record.
#[derive(Clone, Copy, Debug)]
pub struct VertexOut {
    /// x, y in raster pixels; z is NDC depth; w holds 1/clip-w.
    pub position: Vec4,
    /// World-space normal (unnormalized until interpolation).
    pub normal: Vec3,
    /// World-space tangent (unnormalized until interpolation).
    pub tangent: Vec3,
    /// Camera position minus world position.
    pub view_vector: Vec3,
    pub uv: Vec2,
}

/// Integer pixel bounds, half-open on right and top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aabb {
    pub left: u32,
    pub right: u32,
    pub bot: u32,
    pub top: u32,
}

/// Pull one triangle's vertices out of the index stream.
///
/// Triangle lists read three consecutive indices. Strips read a sliding
/// window of three and reverse the winding of every odd-started triangle
/// so front faces stay consistent; a strip window with any two equal
/// indices is degenerate and yields `None`.
pub fn assemble_triangle(
    topology: PrimitiveTopology,
    vertices: &[Vertex],
    indices: &[u32],
    start: usize,
) -> Option<[Vertex; 3]> {
    let i0 = indices[start] as usize;
    let i1 = indices[start + 1] as usize;
    let i2 = indices[start + 2] as usize;

    match topology {
        PrimitiveTopology::TriangleList => Some([vertices[i0], vertices[i1], vertices[i2]]),
        PrimitiveTopology::TriangleStrip => {
            if i0 == i1 || i1 == i2 || i2 == i0 {
                return None;
            }
            if start & 1 == 0 {
                Some([vertices[i0], vertices[i1], vertices[i2]])
            } else {
                Some([vertices[i0], vertices[i2], vertices[i1]])
            }
        }
    }
}

/// Transform a model-space triangle into raster space.
///
/// Returns `None` when any vertex lands outside the canonical view volume
/// (x or y outside [-1,1], NDC z outside [0,1]). The whole triangle is
/// dropped rather than clipped against the frustum planes, so triangles
/// straddling a plane disappear. Triangles behind a right-handed near
/// plane can produce z < 0 and reject the same way.
pub fn transform_triangle(
    triangle: &[Vertex; 3],
    world_view_projection: &Mat4,
    world: &Mat4,
    camera_pos: Vec3,
    width: u32,
    height: u32,
) -> Option<[VertexOut; 3]> {
    let mut out = [VertexOut {
        position: Vec4::ZERO,
        normal: Vec3::ZERO,
        tangent: Vec3::ZERO,
        view_vector: Vec3::ZERO,
        uv: Vec2::ZERO,
    }; 3];

    for (vertex, transformed) in triangle.iter().zip(out.iter_mut()) {
        let mut position = *world_view_projection * Vec4::from(vertex.position);

        // Perspective divide; keep the reciprocal for interpolation
        position.x /= position.w;
        position.y /= position.w;
        position.z /= position.w;
        position.w = 1.0 / position.w;

        if position.x < -1.0
            || position.x > 1.0
            || position.y < -1.0
            || position.y > 1.0
            || position.z < 0.0
            || position.z > 1.0
        {
            return None;
        }

        // Viewport map, y flipped so the raster origin is top-left
        position.x = (position.x + 1.0) / 2.0 * width as f32;
        position.y = (1.0 - position.y) / 2.0 * height as f32;

        transformed.position = position;
        transformed.uv = vertex.uv;
        transformed.normal = (*world * Vec4::from_vec3(vertex.normal, 0.0)).to_vec3();
        transformed.tangent = (*world * Vec4::from_vec3(vertex.tangent, 0.0)).to_vec3();
        transformed.view_vector = camera_pos - (*world * Vec4::from(vertex.position)).to_vec3();
    }

    Some(out)
}

/// Integer bounding box of a raster-space triangle, expanded one pixel on
/// the right and top edges and clamped to the buffer.
pub fn screen_aabb(vertices: &[VertexOut; 3], width: u32, height: u32) -> Aabb {
    let mut left = i32::MAX;
    let mut right = i32::MIN;
    let mut bot = i32::MAX;
    let mut top = i32::MIN;

    for vertex in vertices {
        left = left.min(vertex.position.x as i32);
        right = right.max((vertex.position.x + 1.0) as i32);
        bot = bot.min(vertex.position.y as i32);
        top = top.max((vertex.position.y + 1.0) as i32);
    }

    Aabb {
        left: left.clamp(0, width as i32) as u32,
        right: right.clamp(0, width as i32) as u32,
        bot: bot.clamp(0, height as i32) as u32,
        top: top.clamp(0, height as i32) as u32,
    }
}

/// Edge-function inside test at `pixel`, honoring the cull mode.
///
/// Two signed edge functions decide coverage and orientation together:
/// `Backface` keeps triangles whose edges are positive (screen
/// counter-clockwise), `Frontface` the negative ones, and `None` keeps
/// both but rejects pixels whose edge magnitude falls under epsilon —
/// exact-edge ties and near-degenerate slivers drop out.
///
/// Returns the barycentric weights of the three vertices, which sum to 1.
pub fn coverage(
    vertices: &[VertexOut; 3],
    pixel: Vec2,
    culling: CullMode,
) -> Option<(f32, f32, f32)> {
    let v0 = vertices[0].position.xy();
    let v1 = vertices[1].position.xy();
    let v2 = vertices[2].position.xy();

    let edge_v1v2 = v2 - v1;
    let edge_v2v0 = v0 - v2;

    let e0 = (pixel - v1).cross(edge_v1v2);
    let e1 = (pixel - v2).cross(edge_v2v0);

    match culling {
        CullMode::None => {
            if e0.abs() < f32::EPSILON || e1.abs() < f32::EPSILON {
                return None;
            }
        }
        CullMode::Backface => {
            if e0 < f32::EPSILON || e1 < f32::EPSILON {
                return None;
            }
        }
        CullMode::Frontface => {
            if e0 > -f32::EPSILON || e1 > -f32::EPSILON {
                return None;
            }
        }
        // Resolved to a concrete mode per mesh before rasterization
        CullMode::MeshBased => {}
    }

    // Signed area with the same orientation as the edge functions
    let inv_area = 1.0 / (-edge_v1v2).cross(edge_v2v0);

    let w0 = e0 * inv_area;
    if !(0.0..=1.0).contains(&w0) {
        return None;
    }

    let w1 = e1 * inv_area;
    if w1 < 0.0 || w0 + w1 > 1.0 {
        return None;
    }

    Some((w0, w1, 1.0 - (w0 + w1)))
}

/// Screen-space linear interpolation of NDC depth for z-buffering.
pub fn interpolate_depth(vertices: &[VertexOut; 3], w0: f32, w1: f32, w2: f32) -> f32 {
    1.0 / (w0 / vertices[0].position.z + w1 / vertices[1].position.z + w2 / vertices[2].position.z)
}

/// Perspective-correct attribute interpolation for one covered pixel.
///
/// Weights are scaled by each vertex's stored 1/clip-w so attributes stay
/// linear in world space. Normals, tangents, and view vectors are
/// renormalized. The z slot of the result carries a remap of the depth
/// onto [0.975, 1.0] for shaders that visualize depth; z-buffering uses
/// the raw `depth` instead.
pub fn interpolate_attributes(
    pixel: Vec2,
    vertices: &[VertexOut; 3],
    depth: f32,
    w0: f32,
    w1: f32,
    w2: f32,
) -> VertexOut {
    let [v0, v1, v2] = vertices;

    let a0 = v0.position.w * w0;
    let a1 = v1.position.w * w1;
    let a2 = v2.position.w * w2;
    let w = 1.0 / (a0 + a1 + a2);

    VertexOut {
        position: Vec4::new(
            pixel.x,
            pixel.y,
            remap(depth, 0.975, 1.0).clamp(0.0, 1.0),
            w,
        ),
        uv: (v0.uv * a0 + v1.uv * a1 + v2.uv * a2) * w,
        normal: ((v0.normal * a0 + v1.normal * a1 + v2.normal * a2) * w).normalize(),
        tangent: ((v0.tangent * a0 + v1.tangent * a1 + v2.tangent * a2) * w).normalize(),
        view_vector: ((v0.view_vector * a0 + v1.view_vector * a1 + v2.view_vector * a2) * w)
            .normalize(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vertex(x: f32, y: f32, z: f32) -> Vertex {
        Vertex {
            position: Vec3::new(x, y, z),
            normal: Vec3::FORWARD,
            tangent: Vec3::RIGHT,
            uv: Vec2::ZERO,
        }
    }

    /// Raster-space vertex with unit 1/w (no perspective).
    fn raster_vertex(x: f32, y: f32, z: f32) -> VertexOut {
        VertexOut {
            position: Vec4::new(x, y, z, 1.0),
            normal: Vec3::FORWARD,
            tangent: Vec3::RIGHT,
            view_vector: -Vec3::FORWARD,
            uv: Vec2::ZERO,
        }
    }

    /// Screen counter-clockwise triangle (y-down raster space).
    fn ccw_triangle() -> [VertexOut; 3] {
        [
            raster_vertex(100.0, 100.0, 0.5),
            raster_vertex(200.0, 300.0, 0.5),
            raster_vertex(300.0, 100.0, 0.5),
        ]
    }

    #[test]
    fn list_topology_reads_consecutive_triples() {
        let vertices: Vec<Vertex> = (0..6).map(|i| vertex(i as f32, 0.0, 0.0)).collect();
        let indices = [0u32, 1, 2, 3, 4, 5];
        let tri = assemble_triangle(PrimitiveTopology::TriangleList, &vertices, &indices, 3)
            .expect("valid");
        assert_relative_eq!(tri[0].position.x, 3.0);
        assert_relative_eq!(tri[2].position.x, 5.0);
    }

    #[test]
    fn strip_reverses_winding_on_odd_triangles() {
        let vertices: Vec<Vertex> = (0..4).map(|i| vertex(i as f32, 0.0, 0.0)).collect();
        let indices = [0u32, 1, 2, 3];

        let even = assemble_triangle(PrimitiveTopology::TriangleStrip, &vertices, &indices, 0)
            .expect("valid");
        assert_relative_eq!(even[0].position.x, 0.0);
        assert_relative_eq!(even[1].position.x, 1.0);
        assert_relative_eq!(even[2].position.x, 2.0);

        // Odd start swaps the last two vertices: (1, 3, 2)
        let odd = assemble_triangle(PrimitiveTopology::TriangleStrip, &vertices, &indices, 1)
            .expect("valid");
        assert_relative_eq!(odd[0].position.x, 1.0);
        assert_relative_eq!(odd[1].position.x, 3.0);
        assert_relative_eq!(odd[2].position.x, 2.0);
    }

    #[test]
    fn degenerate_strip_triangles_are_invalid() {
        let vertices: Vec<Vertex> = (0..3).map(|i| vertex(i as f32, 0.0, 0.0)).collect();
        let indices = [0u32, 0, 1, 1];
        for start in 0..2 {
            assert!(assemble_triangle(
                PrimitiveTopology::TriangleStrip,
                &vertices,
                &indices,
                start
            )
            .is_none());
        }
    }

    #[test]
    fn strip_winding_keeps_both_quad_halves_front_facing() {
        // A quad strip laid out screen counter-clockwise
        let quad = [
            raster_vertex(100.0, 100.0, 0.5),
            raster_vertex(100.0, 200.0, 0.5),
            raster_vertex(200.0, 100.0, 0.5),
            raster_vertex(200.0, 200.0, 0.5),
        ];
        let first = [quad[0], quad[1], quad[2]];
        let second = [quad[1], quad[3], quad[2]]; // odd triangle, swapped

        assert!(coverage(&first, Vec2::new(120.0, 140.0), CullMode::Backface).is_some());
        assert!(coverage(&second, Vec2::new(180.0, 160.0), CullMode::Backface).is_some());

        // Without the swap the second half would be back-facing
        let unswapped = [quad[1], quad[2], quad[3]];
        assert!(coverage(&unswapped, Vec2::new(180.0, 160.0), CullMode::Backface).is_none());
    }

    #[test]
    fn identity_transform_maps_ndc_to_viewport() {
        let triangle = [
            vertex(-1.0, -1.0, 0.5),
            vertex(0.0, 1.0, 0.5),
            vertex(1.0, -1.0, 0.5),
        ];
        let identity = Mat4::identity();
        let out = transform_triangle(&triangle, &identity, &identity, Vec3::ZERO, 200, 100)
            .expect("inside the volume");

        // NDC (-1,-1) maps to raster (0, height); y is flipped
        assert_relative_eq!(out[0].position.x, 0.0);
        assert_relative_eq!(out[0].position.y, 100.0);
        assert_relative_eq!(out[1].position.x, 100.0);
        assert_relative_eq!(out[1].position.y, 0.0);
        assert_relative_eq!(out[2].position.x, 200.0);
        // w=1 stays 1 after the reciprocal
        assert_relative_eq!(out[0].position.w, 1.0);
    }

    #[test]
    fn triangle_with_any_vertex_outside_volume_is_rejected() {
        let identity = Mat4::identity();

        // One vertex past the far plane (ndc z = 1.2)
        let triangle = [
            vertex(-0.5, -0.5, 0.5),
            vertex(0.0, 0.5, 1.2),
            vertex(0.5, -0.5, 0.5),
        ];
        assert!(
            transform_triangle(&triangle, &identity, &identity, Vec3::ZERO, 100, 100).is_none()
        );

        // One vertex off to the left (x < -1)
        let triangle = [
            vertex(-1.5, -0.5, 0.5),
            vertex(0.0, 0.5, 0.5),
            vertex(0.5, -0.5, 0.5),
        ];
        assert!(
            transform_triangle(&triangle, &identity, &identity, Vec3::ZERO, 100, 100).is_none()
        );

        // Negative ndc z (behind a right-handed near plane)
        let triangle = [
            vertex(-0.5, -0.5, -0.1),
            vertex(0.0, 0.5, 0.5),
            vertex(0.5, -0.5, 0.5),
        ];
        assert!(
            transform_triangle(&triangle, &identity, &identity, Vec3::ZERO, 100, 100).is_none()
        );
    }

    #[test]
    fn view_vector_points_from_surface_to_camera() {
        let triangle = [
            vertex(-0.5, -0.5, 0.5),
            vertex(0.0, 0.5, 0.5),
            vertex(0.5, -0.5, 0.5),
        ];
        let identity = Mat4::identity();
        let camera = Vec3::new(0.0, 0.0, -3.0);
        let out = transform_triangle(&triangle, &identity, &identity, camera, 100, 100)
            .expect("inside the volume");
        assert_relative_eq!(out[1].view_vector.x, 0.0);
        assert_relative_eq!(out[1].view_vector.y, -0.5);
        assert_relative_eq!(out[1].view_vector.z, -3.5);
    }

    #[test]
    fn aabb_expands_right_and_top_and_clamps() {
        let tri = ccw_triangle();
        let aabb = screen_aabb(&tri, 400, 400);
        assert_eq!(
            aabb,
            Aabb {
                left: 100,
                right: 301,
                bot: 100,
                top: 301,
            }
        );

        // A triangle partially off-screen clamps to the buffer
        let tri = [
            raster_vertex(-50.0, -20.0, 0.5),
            raster_vertex(30.0, 90.0, 0.5),
            raster_vertex(90.0, -20.0, 0.5),
        ];
        let aabb = screen_aabb(&tri, 64, 64);
        assert_eq!(aabb.left, 0);
        assert_eq!(aabb.bot, 0);
        assert_eq!(aabb.right, 64);
        assert_eq!(aabb.top, 64);
    }

    #[test]
    fn coverage_accepts_interior_and_rejects_exterior() {
        let tri = ccw_triangle();
        assert!(coverage(&tri, Vec2::new(200.0, 150.0), CullMode::Backface).is_some());
        assert!(coverage(&tri, Vec2::new(99.0, 99.0), CullMode::Backface).is_none());
        assert!(coverage(&tri, Vec2::new(310.0, 150.0), CullMode::Backface).is_none());
    }

    #[test]
    fn cull_modes_select_winding() {
        let ccw = ccw_triangle();
        let cw = [ccw[0], ccw[2], ccw[1]];
        let inside = Vec2::new(200.0, 150.0);

        assert!(coverage(&ccw, inside, CullMode::Backface).is_some());
        assert!(coverage(&cw, inside, CullMode::Backface).is_none());

        assert!(coverage(&ccw, inside, CullMode::Frontface).is_none());
        assert!(coverage(&cw, inside, CullMode::Frontface).is_some());

        assert!(coverage(&ccw, inside, CullMode::None).is_some());
        assert!(coverage(&cw, inside, CullMode::None).is_some());
    }

    #[test]
    fn none_mode_rejects_exact_edge_ties() {
        let tri = ccw_triangle();
        // The v1->v2 edge passes through x=200..300 at y=... pick a point
        // exactly on the v0->v2 edge (y = 100 between x=100 and 300)
        let on_edge = Vec2::new(200.0, 100.0);
        assert!(coverage(&tri, on_edge, CullMode::None).is_none());
    }

    #[test]
    fn barycentric_weights_sum_to_one_and_locate_the_pixel() {
        let tri = ccw_triangle();
        for &(x, y) in &[(150.0, 150.0), (200.0, 250.0), (250.0, 120.0)] {
            let pixel = Vec2::new(x, y);
            let (w0, w1, w2) = coverage(&tri, pixel, CullMode::Backface).expect("inside");
            assert_relative_eq!(w0 + w1 + w2, 1.0, epsilon = 1e-5);

            // Weighted vertices reconstruct the sample position
            let p = tri[0].position.xy() * w0 + tri[1].position.xy() * w1
                + tri[2].position.xy() * w2;
            assert_relative_eq!(p.x, x, epsilon = 1e-2);
            assert_relative_eq!(p.y, y, epsilon = 1e-2);
        }
    }

    #[test]
    fn depth_interpolation_is_harmonic_in_screen_z() {
        let mut tri = ccw_triangle();
        tri[0].position.z = 0.2;
        tri[1].position.z = 0.4;
        tri[2].position.z = 0.4;

        // At vertex 0's corner the depth approaches z0
        let z = interpolate_depth(&tri, 1.0, 0.0, 0.0);
        assert_relative_eq!(z, 0.2, epsilon = 1e-6);

        // Midway the harmonic mean is below the arithmetic mean
        let z = interpolate_depth(&tri, 0.5, 0.25, 0.25);
        assert!(z < 0.5 * 0.2 + 0.5 * 0.4);
    }

    #[test]
    fn attribute_interpolation_is_perspective_correct() {
        // Two vertices at different depths: the near vertex (larger 1/w)
        // dominates the screen midpoint.
        let mut tri = ccw_triangle();
        tri[0].position.w = 1.0; // near
        tri[0].uv = Vec2::new(0.0, 0.0);
        tri[1].position.w = 0.25; // far
        tri[1].uv = Vec2::new(1.0, 0.0);
        tri[2].position.w = 0.25;
        tri[2].uv = Vec2::new(1.0, 0.0);

        let pixel = Vec2::new(175.0, 175.0);
        let out = interpolate_attributes(pixel, &tri, 0.5, 0.5, 0.25, 0.25);

        // Screen-linear interpolation would give u = 0.5; the perspective
        // weights pull it toward the near vertex's u = 0.
        assert!(out.uv.x < 0.5);
        assert_relative_eq!(out.uv.x, 0.2, epsilon = 1e-5);
    }

    #[test]
    fn interpolated_vectors_are_renormalized() {
        let mut tri = ccw_triangle();
        tri[0].normal = Vec3::new(0.0, 0.0, 2.0);
        tri[1].normal = Vec3::new(0.0, 2.0, 0.0);
        tri[2].normal = Vec3::new(0.0, 2.0, 0.0);

        let out = interpolate_attributes(Vec2::new(200.0, 150.0), &tri, 0.5, 0.4, 0.3, 0.3);
        assert_relative_eq!(out.normal.magnitude(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(out.tangent.magnitude(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(out.view_vector.magnitude(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn remapped_depth_lands_in_unit_range() {
        let tri = ccw_triangle();
        let near = interpolate_attributes(Vec2::new(200.0, 150.0), &tri, 0.5, 0.4, 0.3, 0.3);
        assert_relative_eq!(near.position.z, 0.0); // 0.5 remaps below the window

        let far = interpolate_attributes(Vec2::new(200.0, 150.0), &tri, 0.99, 0.4, 0.3, 0.3);
        assert!(far.position.z > 0.0 && far.position.z <= 1.0);
    }
}
