use super::grid::{ClusterGrid, CLUSTER_HEADER_BYTES};

const HEADER_WORDS: usize = CLUSTER_HEADER_BYTES / 4;

/// Host mirror of the cluster buffer.
///
/// Stored as the same flat `u32` words the kernels see, so the byte image is a
/// plain cast and GPU readback can be compared word for word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSet {
    grid: ClusterGrid,
    words: Vec<u32>,
}

impl ClusterSet {
    /// Zeroed cells with the dimension header written.
    pub fn new(grid: ClusterGrid) -> Self {
        let mut words = vec![0u32; grid.buffer_size_bytes() as usize / 4];
        words[..HEADER_WORDS].copy_from_slice(&grid.dims());
        Self { grid, words }
    }

    /// Parses a buffer image (e.g. read back from the GPU).
    pub fn from_bytes(grid: ClusterGrid, bytes: &[u8]) -> anyhow::Result<Self> {
        anyhow::ensure!(
            bytes.len() as u64 == grid.buffer_size_bytes(),
            "cluster buffer image is {} bytes, expected {}",
            bytes.len(),
            grid.buffer_size_bytes()
        );
        let words: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        anyhow::ensure!(
            words[..HEADER_WORDS] == grid.dims(),
            "cluster buffer header {:?} does not match grid {:?}",
            &words[..HEADER_WORDS],
            grid.dims()
        );
        Ok(Self { grid, words })
    }

    #[inline]
    pub fn grid(&self) -> &ClusterGrid {
        &self.grid
    }

    /// The dimension header as stored.
    pub fn header(&self) -> [u32; 3] {
        [self.words[0], self.words[1], self.words[2]]
    }

    #[inline]
    fn count_word(&self, cell: usize) -> usize {
        HEADER_WORDS + cell * self.grid.cell_stride_words()
    }

    /// Stored count of `cell`.
    #[inline]
    pub fn count(&self, cell: usize) -> u32 {
        self.words[self.count_word(cell)]
    }

    /// Light indices of `cell`, limited to the stored count.
    pub fn indices(&self, cell: usize) -> &[u32] {
        let start = self.count_word(cell) + 1;
        let n = (self.count(cell) as usize).min(self.grid.max_lights_per_cluster() as usize);
        &self.words[start..start + n]
    }

    /// Resets every count to zero. Stale index slots are left in place.
    pub fn clear_counts(&mut self) {
        for cell in 0..self.grid.total_clusters() {
            let w = self.count_word(cell);
            self.words[w] = 0;
        }
    }

    /// Appends `light` to `cell`. Returns `false` when the cell is full.
    pub fn push_light(&mut self, cell: usize, light: u32) -> bool {
        let w = self.count_word(cell);
        let count = self.words[w];
        if count >= self.grid.max_lights_per_cluster() {
            return false;
        }
        self.words[w + 1 + count as usize] = light;
        self.words[w] = count + 1;
        true
    }

    /// Sum of all cell counts.
    pub fn total_assignments(&self) -> u64 {
        (0..self.grid.total_clusters())
            .map(|c| u64::from(self.count(c)))
            .sum()
    }

    /// Cells whose count or live index list differs from `other`.
    ///
    /// Stale slots past the count are ignored.
    pub fn diff_cells(&self, other: &ClusterSet) -> Vec<usize> {
        (0..self.grid.total_clusters())
            .filter(|&c| self.count(c) != other.count(c) || self.indices(c) != other.indices(c))
            .collect()
    }

    /// The buffer image.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> ClusterGrid {
        ClusterGrid::new([2, 2, 2], 3)
    }

    #[test]
    fn new_writes_dimension_header() {
        let set = ClusterSet::new(grid());
        assert_eq!(set.header(), [2, 2, 2]);
        assert_eq!(set.as_bytes().len() as u64, grid().buffer_size_bytes());
        assert_eq!(&set.as_bytes()[..4], &2u32.to_le_bytes());
        assert_eq!(set.total_assignments(), 0);
    }

    #[test]
    fn push_stops_at_capacity() {
        let mut set = ClusterSet::new(grid());
        for i in 0..5 {
            let accepted = set.push_light(6, i);
            assert_eq!(accepted, i < 3);
        }
        assert_eq!(set.count(6), 3);
        assert_eq!(set.indices(6), &[0, 1, 2]);
        assert_eq!(set.count(5), 0);
        assert_eq!(set.count(7), 0);
    }

    #[test]
    fn clear_counts_keeps_header() {
        let mut set = ClusterSet::new(grid());
        set.push_light(0, 9);
        set.clear_counts();
        assert_eq!(set.count(0), 0);
        assert!(set.indices(0).is_empty());
        assert_eq!(set.header(), [2, 2, 2]);
    }

    #[test]
    fn bytes_round_trip_and_reject_wrong_size() {
        let mut set = ClusterSet::new(grid());
        set.push_light(3, 1);
        let parsed = ClusterSet::from_bytes(grid(), set.as_bytes()).unwrap();
        assert_eq!(parsed, set);
        assert!(ClusterSet::from_bytes(grid(), &set.as_bytes()[4..]).is_err());
    }

    #[test]
    fn diff_ignores_stale_slots() {
        let mut a = ClusterSet::new(grid());
        let mut b = ClusterSet::new(grid());
        a.push_light(1, 4);
        a.clear_counts();
        assert!(a.diff_cells(&b).is_empty());

        b.push_light(2, 0);
        assert_eq!(a.diff_cells(&b), vec![2]);
    }
}
