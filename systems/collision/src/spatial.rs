//! Uniform-grid spatial hash over enemy positions.

use ring_defence_core::Position;
use rustc_hash::FxHashMap;

/// Buckets entity indices by grid cell for neighbourhood queries.
///
/// Indices refer to the slice passed to [`SpatialIndex::rebuild`] and are only
/// meaningful until the next rebuild.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    cell_size: f32,
    cells: FxHashMap<(i32, i32), Vec<usize>>,
}

impl SpatialIndex {
    /// Creates an empty index with the provided cell side length.
    ///
    /// Non-positive sizes fall back to a single unit so cell keys stay finite.
    #[must_use]
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        Self {
            cell_size,
            cells: FxHashMap::default(),
        }
    }

    /// Side length of a cell.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Removes every entry while keeping allocated buckets.
    pub fn clear(&mut self) {
        self.cells.values_mut().for_each(Vec::clear);
    }

    /// Clears the index and inserts every position under its slice index.
    pub fn rebuild<I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = Position>,
    {
        self.clear();
        for (index, position) in positions.into_iter().enumerate() {
            self.insert(index, position);
        }
    }

    /// Inserts a single entry.
    pub fn insert(&mut self, index: usize, position: Position) {
        let key = self.cell_key(position);
        self.cells.entry(key).or_default().push(index);
    }

    /// Writes the indices stored in the 3×3 block of cells around `position`.
    ///
    /// The output is cleared first and sorted ascending.
    pub fn query_neighbors(&self, position: Position, out: &mut Vec<usize>) {
        self.collect_ring(self.cell_key(position), 1, out);
    }

    /// Writes the indices of every cell that may contain an entry within
    /// `radius` of `position`. Entries are not distance-filtered.
    ///
    /// Blocks wider than the number of occupied cells are answered by
    /// scanning the occupied cells instead.
    pub fn query_radius(&self, position: Position, radius: f32, out: &mut Vec<usize>) {
        let rings = (radius.max(0.0) / self.cell_size).ceil().max(1.0);
        let span = 2.0 * rings + 1.0;
        let centre = self.cell_key(position);
        if span * span > self.cells.len() as f32 {
            self.collect_occupied(centre, rings as i64, out);
        } else {
            self.collect_ring(centre, rings as i32, out);
        }
    }

    fn collect_ring(&self, (cx, cy): (i32, i32), rings: i32, out: &mut Vec<usize>) {
        out.clear();
        for ix in (cx - rings)..=(cx + rings) {
            for iy in (cy - rings)..=(cy + rings) {
                if let Some(indices) = self.cells.get(&(ix, iy)) {
                    out.extend_from_slice(indices);
                }
            }
        }
        out.sort_unstable();
    }

    fn collect_occupied(&self, (cx, cy): (i32, i32), rings: i64, out: &mut Vec<usize>) {
        out.clear();
        for (&(ix, iy), indices) in &self.cells {
            let dx = (i64::from(ix) - i64::from(cx)).abs();
            let dy = (i64::from(iy) - i64::from(cy)).abs();
            if dx <= rings && dy <= rings {
                out.extend_from_slice(indices);
            }
        }
        out.sort_unstable();
    }

    fn cell_key(&self, position: Position) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }
}
