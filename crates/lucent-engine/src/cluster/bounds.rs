use glam::{Mat4, Vec2, Vec3};

use super::grid::ClusterGrid;

/// View-space axis-aligned box enclosing one cluster cell.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClusterBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl ClusterBounds {
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for p in points {
            min = min.min(p);
            max = max.max(p);
        }
        Self { min, max }
    }

    pub fn contains(&self, p: Vec3, eps: f32) -> bool {
        p.cmpge(self.min - eps).all() && p.cmple(self.max + eps).all()
    }

    /// Sphere test against the closest point of the box.
    #[inline]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }
}

/// View-space distance of the plane starting depth slice `slice` of `slices`.
///
/// Slices are exponential: `near * (far / near)^(slice / slices)`.
#[inline]
pub fn slice_depth(near: f32, far: f32, slice: u32, slices: u32) -> f32 {
    near * (far / near).powf(slice as f32 / slices as f32)
}

/// View-space bounds of cell `(x, y, z)`.
///
/// The four tile corners are unprojected onto the near plane and scaled along
/// their rays to both slice planes; the box encloses all eight points.
pub fn cell_bounds(
    grid: &ClusterGrid,
    inv_proj: &Mat4,
    near: f32,
    far: f32,
    [x, y, z]: [u32; 3],
) -> ClusterBounds {
    let [dx, dy, dz] = grid.dims();
    let ndc = |i: u32, n: u32| -1.0 + 2.0 * i as f32 / n as f32;

    let d0 = slice_depth(near, far, z, dz);
    let d1 = slice_depth(near, far, z + 1, dz);

    let corners = [
        (ndc(x, dx), ndc(y, dy)),
        (ndc(x + 1, dx), ndc(y, dy)),
        (ndc(x, dx), ndc(y + 1, dy)),
        (ndc(x + 1, dx), ndc(y + 1, dy)),
    ];

    ClusterBounds::from_points(corners.into_iter().flat_map(|(nx, ny)| {
        let p = inv_proj.project_point3(Vec3::new(nx, ny, 0.0));
        let ray = p / -p.z;
        [ray * d0, ray * d1]
    }))
}

/// Cell containing a fragment, as the shading passes look it up.
///
/// `frag` is the framebuffer position (origin top-left), `view_depth` the
/// positive view-space distance. Out-of-range values clamp to the border cells.
pub fn cluster_for_fragment(
    grid: &ClusterGrid,
    frag: Vec2,
    viewport: [f32; 2],
    view_depth: f32,
    near: f32,
    far: f32,
) -> [u32; 3] {
    let [dx, dy, dz] = grid.dims();
    let clamp_axis = |v: f32, n: u32| (v.floor().max(0.0) as u32).min(n - 1);

    let tx = clamp_axis(frag.x / viewport[0] * dx as f32, dx);
    let ty = clamp_axis((1.0 - frag.y / viewport[1]) * dy as f32, dy);
    let slice = (view_depth / near).ln() / (far / near).ln() * dz as f32;
    let tz = clamp_axis(slice, dz);
    [tx, ty, tz]
}
