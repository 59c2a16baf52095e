/// Bytes taken by the dimension header at the start of the cluster buffer.
pub const CLUSTER_HEADER_BYTES: usize = 12;

/// Rounds `n` up to the next multiple of 16.
#[inline]
pub const fn align16(n: u64) -> u64 {
    n.div_ceil(16) * 16
}

/// Fixed 3-D partition of view space.
///
/// X and Y split the screen into uniform tiles, Z splits view depth into
/// exponential slices. Each cell owns one `u32` count followed by
/// `max_lights_per_cluster` `u32` index slots; cells are stored X fastest.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ClusterGrid {
    dims: [u32; 3],
    max_lights_per_cluster: u32,
}

impl ClusterGrid {
    pub const fn new(dims: [u32; 3], max_lights_per_cluster: u32) -> Self {
        Self {
            dims,
            max_lights_per_cluster,
        }
    }

    #[inline]
    pub const fn dims(&self) -> [u32; 3] {
        self.dims
    }

    #[inline]
    pub const fn max_lights_per_cluster(&self) -> u32 {
        self.max_lights_per_cluster
    }

    /// `X * Y * Z`.
    #[inline]
    pub const fn total_clusters(&self) -> usize {
        self.dims[0] as usize * self.dims[1] as usize * self.dims[2] as usize
    }

    /// `u32` words per cell: the count plus its index slots.
    #[inline]
    pub const fn cell_stride_words(&self) -> usize {
        self.max_lights_per_cluster as usize + 1
    }

    /// Linear cell index, X varying fastest: `x + X * (y + Y * z)`.
    #[inline]
    pub const fn cell_index(&self, x: u32, y: u32, z: u32) -> usize {
        let [dx, dy, _] = self.dims;
        x as usize + dx as usize * (y as usize + dy as usize * z as usize)
    }

    /// Inverse of [`ClusterGrid::cell_index`].
    pub const fn cell_coords(&self, index: usize) -> [u32; 3] {
        let [dx, dy, _] = self.dims;
        let (dx, dy) = (dx as usize, dy as usize);
        [
            (index % dx) as u32,
            ((index / dx) % dy) as u32,
            (index / (dx * dy)) as u32,
        ]
    }

    /// Whether `(x, y, z)` lies inside the grid.
    #[inline]
    pub const fn contains(&self, x: u32, y: u32, z: u32) -> bool {
        x < self.dims[0] && y < self.dims[1] && z < self.dims[2]
    }

    /// Unaligned payload size: header plus every cell.
    #[inline]
    pub const fn payload_size_bytes(&self) -> u64 {
        (self.total_clusters() * self.cell_stride_words() * 4 + CLUSTER_HEADER_BYTES) as u64
    }

    /// Cluster buffer size: `align16(total * (max + 1) * 4 + 12)`.
    #[inline]
    pub const fn buffer_size_bytes(&self) -> u64 {
        align16(self.payload_size_bytes())
    }

    /// Byte offset of cell `index`'s count field.
    #[inline]
    pub const fn count_offset(&self, index: usize) -> usize {
        CLUSTER_HEADER_BYTES + index * self.cell_stride_words() * 4
    }

    /// Byte offset of cell `index`'s first index slot.
    #[inline]
    pub const fn indices_offset(&self, index: usize) -> usize {
        self.count_offset(index) + 4
    }

    /// Per-axis workgroup counts covering the grid with workgroups of `extent`.
    pub fn workgroup_counts(&self, extent: [u32; 3]) -> [u32; 3] {
        [
            self.dims[0].div_ceil(extent[0].max(1)),
            self.dims[1].div_ceil(extent[1].max(1)),
            self.dims[2].div_ceil(extent[2].max(1)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── addressing ────────────────────────────────────────────────────────

    #[test]
    fn row_major_on_2x2x2() {
        let g = ClusterGrid::new([2, 2, 2], 4);
        assert_eq!(g.cell_index(0, 0, 0), 0);
        assert_eq!(g.cell_index(1, 0, 0), 1);
        assert_eq!(g.cell_index(0, 1, 0), 2);
        assert_eq!(g.cell_index(1, 1, 0), 3);
        assert_eq!(g.cell_index(0, 0, 1), 4);
        assert_eq!(g.cell_index(1, 1, 1), 7);
    }

    #[test]
    fn coords_invert_index() {
        let g = ClusterGrid::new([16, 9, 24], 100);
        for i in 0..g.total_clusters() {
            let [x, y, z] = g.cell_coords(i);
            assert!(g.contains(x, y, z));
            assert_eq!(g.cell_index(x, y, z), i);
        }
    }

    // ── sizing ────────────────────────────────────────────────────────────

    #[test]
    fn buffer_size_4x4x4() {
        let g = ClusterGrid::new([4, 4, 4], 100);
        assert_eq!(g.total_clusters(), 64);
        assert_eq!(g.payload_size_bytes(), 64 * 101 * 4 + 12);
        assert_eq!(g.buffer_size_bytes(), 25872);
    }

    #[test]
    fn buffer_size_is_16_aligned() {
        for max in 1..40 {
            let g = ClusterGrid::new([3, 5, 7], max);
            let size = g.buffer_size_bytes();
            assert_eq!(size % 16, 0);
            assert!(size >= g.payload_size_bytes());
            assert!(size - g.payload_size_bytes() < 16);
        }
    }

    #[test]
    fn cell_offsets() {
        let g = ClusterGrid::new([2, 2, 2], 3);
        assert_eq!(g.count_offset(0), 12);
        assert_eq!(g.indices_offset(0), 16);
        assert_eq!(g.count_offset(1), 12 + 16);
        assert!(g.indices_offset(7) + 3 * 4 <= g.buffer_size_bytes() as usize);
    }

    #[test]
    fn workgroups_round_up() {
        let g = ClusterGrid::new([16, 9, 24], 100);
        assert_eq!(g.workgroup_counts([4, 4, 4]), [4, 3, 6]);
        assert_eq!(g.workgroup_counts([16, 9, 24]), [1, 1, 1]);
    }
}
