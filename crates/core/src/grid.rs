//! Multi-resolution occupancy grid.
//!
//! Several uniform grids of increasing cell size are superimposed over the
//! same `width × height` domain. Level 0 has the smallest cells. Occupancy is
//! stored as one `u32` bitmask per finest-level cell: bit `i` of the mask at
//! slot `s` records that the level-`i` cell with index `s` is occupied.
//!
//! Each level's cell counts are rounded independently, so coarse cell
//! boundaries need not align with fine ones. Spacing is enforced only up to
//! that quantization.

use serde::{Deserialize, Serialize};

use crate::error::HatchError;

/// Number of levels a `u32` mask can track.
pub const MAX_LEVELS: usize = u32::BITS as usize;

/// Largest number of cells any level may have. Seed cells are indexed by
/// `u32`.
pub const MAX_CELLS: usize = u32::MAX as usize;

/// How cell sizes are interpolated between the smallest and largest level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellScale {
    #[default]
    Linear,
    /// Finer steps near the minimum size, coarser growth toward the maximum.
    Logarithmic,
}

impl CellScale {
    pub fn from_logarithmic(logarithmic: bool) -> Self {
        if logarithmic {
            CellScale::Logarithmic
        } else {
            CellScale::Linear
        }
    }
}

/// Geometry of one grid level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLevel {
    /// Nominal cell size from the schedule.
    pub cell_size: f64,
    pub nx: usize,
    pub ny: usize,
    /// Actual cell width after rounding `nx`.
    pub cell_w: f64,
    /// Actual cell height after rounding `ny`.
    pub cell_h: f64,
}

impl GridLevel {
    /// `nx · ny`, at most [`MAX_CELLS`] for any level of a constructed grid.
    pub fn cell_count(&self) -> usize {
        self.nx * self.ny
    }
}

/// Computes the nominal cell size for each of `count` levels.
///
/// The first entry is always `min` and, for `count > 1`, the last is always
/// `max`.
pub fn cell_sizes(min: f64, max: f64, count: usize, scale: CellScale) -> Vec<f64> {
    if count <= 1 {
        return vec![min; count];
    }
    let last = (count - 1) as f64;
    let mut sizes: Vec<f64> = match scale {
        CellScale::Linear => {
            let diff = (max - min) / last;
            (0..count).map(|i| min + i as f64 * diff).collect()
        }
        CellScale::Logarithmic => {
            let log_diff = (max - min + 1.0).log2() / last;
            (0..count)
                .map(|i| min + (i as f64 * log_diff).exp2() - 1.0)
                .collect()
        }
    };
    sizes[count - 1] = max;
    sizes
}

/// Validates a level schedule: `1..=32` levels and `0 < min <= max`, finite.
pub fn check_schedule(min: f64, max: f64, level_count: usize) -> Result<(), HatchError> {
    if level_count == 0 || level_count > MAX_LEVELS {
        return Err(HatchError::InvalidLevelCount {
            count: level_count,
            max: MAX_LEVELS,
        });
    }
    if !(min.is_finite() && max.is_finite() && min > 0.0 && min <= max) {
        return Err(HatchError::InvalidCellSize { min, max });
    }
    Ok(())
}

/// Stack of superimposed occupancy grids. See the module docs.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    width: f64,
    height: f64,
    levels: Vec<GridLevel>,
    data: Vec<u32>,
}

impl OccupancyGrid {
    /// Builds an empty grid.
    ///
    /// Fails with a [`HatchError`] on non-positive dimensions or cell sizes,
    /// `min_cell_size > max_cell_size`, a level count outside `1..=32`, a
    /// level that rounds to zero cells along either axis, or a level with
    /// more than [`MAX_CELLS`] cells. Nothing is allocated before these
    /// checks pass.
    pub fn new(
        width: f64,
        height: f64,
        min_cell_size: f64,
        max_cell_size: f64,
        level_count: usize,
        scale: CellScale,
    ) -> Result<Self, HatchError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(HatchError::InvalidDimensions);
        }
        check_schedule(min_cell_size, max_cell_size, level_count)?;

        let levels = cell_sizes(min_cell_size, max_cell_size, level_count, scale)
            .into_iter()
            .enumerate()
            .map(|(level, cell_size)| {
                let nx = (width / cell_size).round() as usize;
                let ny = (height / cell_size).round() as usize;
                if nx == 0 || ny == 0 {
                    return Err(HatchError::DegenerateGrid { level, nx, ny });
                }
                match nx.checked_mul(ny) {
                    Some(cells) if cells <= MAX_CELLS => {}
                    _ => {
                        return Err(HatchError::GridTooLarge {
                            level,
                            nx,
                            ny,
                            max: MAX_CELLS,
                        })
                    }
                }
                Ok(GridLevel {
                    cell_size,
                    nx,
                    ny,
                    cell_w: width / nx as f64,
                    cell_h: height / ny as f64,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let finest = levels[0].cell_count();
        Ok(Self {
            width,
            height,
            levels,
            data: vec![0; finest],
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[GridLevel] {
        &self.levels
    }

    /// Geometry of `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level >= level_count()`.
    pub fn level(&self, level: usize) -> &GridLevel {
        &self.levels[level]
    }

    /// Number of cells at level 0, which is also the number of mask slots.
    pub fn finest_cell_count(&self) -> usize {
        self.data.len()
    }

    /// Row-major index of the level-`level` cell containing `(x, y)`.
    ///
    /// Callers keep `(x, y)` inside `[0, width) × [0, height)`. Indices are
    /// clamped to the last column and row so rounding at the far edge stays
    /// in range.
    pub fn cell_index(&self, x: f64, y: f64, level: usize) -> usize {
        let l = &self.levels[level];
        let ix = ((x / l.cell_w).floor().max(0.0) as usize).min(l.nx - 1);
        let iy = ((y / l.cell_h).floor().max(0.0) as usize).min(l.ny - 1);
        iy * l.nx + ix
    }

    /// Cell index of `(x, y)` at every level, finest first.
    pub fn level_indices(&self, x: f64, y: f64) -> Vec<usize> {
        (0..self.levels.len())
            .map(|level| self.cell_index(x, y, level))
            .collect()
    }

    /// Whether the level-`level` cell containing `(x, y)` has been claimed.
    pub fn is_occupied(&self, x: f64, y: f64, level: usize) -> bool {
        let slot = self.cell_index(x, y, level);
        self.data[slot] & (1u32 << level) != 0
    }

    /// Claims the cell containing `(x, y)` at every level.
    pub fn mark_occupied(&mut self, x: f64, y: f64) {
        for level in 0..self.levels.len() {
            let slot = self.cell_index(x, y, level);
            self.data[slot] |= 1u32 << level;
        }
    }

    /// Number of occupied cells at `level`.
    pub fn occupied_count(&self, level: usize) -> usize {
        let mask = 1u32 << level;
        self.data.iter().filter(|&&m| m & mask != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(min: f64, max: f64, levels: usize, scale: CellScale) -> OccupancyGrid {
        OccupancyGrid::new(100.0, 100.0, min, max, levels, scale).unwrap()
    }

    // -- cell size schedule --

    #[test]
    fn linear_three_levels_has_midpoint_twelve() {
        let sizes = cell_sizes(4.0, 20.0, 3, CellScale::Linear);
        assert_eq!(sizes.len(), 3);
        assert!((sizes[0] - 4.0).abs() < 1e-12);
        assert!((sizes[1] - 12.0).abs() < 1e-12, "size_1 = {}", sizes[1]);
        assert!((sizes[2] - 20.0).abs() < 1e-12);
    }

    #[test]
    fn single_level_uses_min_size() {
        assert_eq!(cell_sizes(4.0, 20.0, 1, CellScale::Linear), vec![4.0]);
        assert_eq!(cell_sizes(4.0, 20.0, 1, CellScale::Logarithmic), vec![4.0]);
    }

    #[test]
    fn logarithmic_grows_slower_at_the_fine_end() {
        let sizes = cell_sizes(2.0, 65.0, 4, CellScale::Logarithmic);
        // log2(64) / 3 = 2 → 2 + {1, 4, 16, 64} - 1
        let expected = [2.0, 5.0, 17.0, 65.0];
        for (got, want) in sizes.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9, "got {sizes:?}, want {expected:?}");
        }
        assert!(sizes[1] - sizes[0] < sizes[3] - sizes[2]);
    }

    #[test]
    fn equal_min_and_max_gives_constant_schedule() {
        for scale in [CellScale::Linear, CellScale::Logarithmic] {
            let sizes = cell_sizes(10.0, 10.0, 5, scale);
            assert!(sizes.iter().all(|&s| (s - 10.0).abs() < 1e-12), "{sizes:?}");
        }
    }

    #[test]
    fn from_logarithmic_maps_bool() {
        assert_eq!(CellScale::from_logarithmic(true), CellScale::Logarithmic);
        assert_eq!(CellScale::from_logarithmic(false), CellScale::Linear);
    }

    // -- construction --

    #[test]
    fn level_geometry_rounds_cell_counts() {
        let g = OccupancyGrid::new(100.0, 50.0, 4.0, 20.0, 3, CellScale::Linear).unwrap();
        let l1 = g.level(1);
        // 100 / 12 = 8.33 → 8 columns, 50 / 12 = 4.17 → 4 rows
        assert_eq!((l1.nx, l1.ny), (8, 4));
        assert!((l1.cell_w - 12.5).abs() < 1e-12);
        assert!((l1.cell_h - 12.5).abs() < 1e-12);
        assert_eq!(g.finest_cell_count(), 25 * 13);
    }

    #[test]
    fn rejects_invalid_parameters() {
        assert!(matches!(
            OccupancyGrid::new(0.0, 10.0, 1.0, 1.0, 1, CellScale::Linear),
            Err(HatchError::InvalidDimensions)
        ));
        assert!(matches!(
            OccupancyGrid::new(10.0, 10.0, 1.0, 2.0, 0, CellScale::Linear),
            Err(HatchError::InvalidLevelCount { count: 0, .. })
        ));
        assert!(matches!(
            OccupancyGrid::new(10.0, 10.0, 1.0, 2.0, 33, CellScale::Linear),
            Err(HatchError::InvalidLevelCount { count: 33, .. })
        ));
        assert!(matches!(
            OccupancyGrid::new(10.0, 10.0, 3.0, 2.0, 2, CellScale::Linear),
            Err(HatchError::InvalidCellSize { .. })
        ));
        assert!(matches!(
            OccupancyGrid::new(10.0, 10.0, 0.0, 2.0, 2, CellScale::Linear),
            Err(HatchError::InvalidCellSize { .. })
        ));
    }

    #[test]
    fn rejects_level_that_rounds_to_zero_cells() {
        // 10 / 40 = 0.25 → 0 columns at the coarsest level.
        let err = OccupancyGrid::new(10.0, 10.0, 1.0, 40.0, 2, CellScale::Linear).unwrap_err();
        assert!(
            matches!(err, HatchError::DegenerateGrid { level: 1, nx: 0, .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn rejects_cell_count_that_overflows_usize() {
        // 1e10 × 1e10 unit cells: the product does not fit in 64 bits.
        let err = OccupancyGrid::new(1e10, 1e10, 1.0, 1.0, 1, CellScale::Linear).unwrap_err();
        assert!(
            matches!(err, HatchError::GridTooLarge { level: 0, .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn rejects_cell_count_beyond_u32_before_allocating() {
        // 1e5 × 1e5 = 1e10 cells; would be ~40 GB of masks.
        let err = OccupancyGrid::new(1e5, 1e5, 1.0, 1.0, 1, CellScale::Linear).unwrap_err();
        assert!(
            matches!(err, HatchError::GridTooLarge { nx: 100_000, ny: 100_000, .. }),
            "unexpected error: {err}"
        );
        assert!(err.to_string().contains("100000 x 100000"), "{err}");
    }

    #[test]
    fn accepts_thirty_two_levels() {
        let g = grid(1.0, 32.0, 32, CellScale::Linear);
        assert_eq!(g.level_count(), 32);
        g.is_occupied(50.0, 50.0, 31);
    }

    // -- indexing --

    #[test]
    fn cell_index_is_row_major() {
        let g = grid(10.0, 10.0, 1, CellScale::Linear);
        assert_eq!(g.cell_index(0.0, 0.0, 0), 0);
        assert_eq!(g.cell_index(15.0, 0.0, 0), 1);
        assert_eq!(g.cell_index(0.0, 15.0, 0), 10);
        assert_eq!(g.cell_index(99.9, 99.9, 0), 99);
    }

    #[test]
    fn cell_index_clamps_at_far_edge() {
        let g = grid(3.0, 3.0, 1, CellScale::Linear);
        let l = *g.level(0);
        let x = 100.0 - f64::EPSILON * 100.0;
        assert_eq!(g.cell_index(x, x, 0), l.cell_count() - 1);
    }

    #[test]
    fn level_indices_preserve_level_order() {
        let g = grid(4.0, 20.0, 3, CellScale::Linear);
        let idx = g.level_indices(30.0, 30.0);
        assert_eq!(idx.len(), 3);
        for (level, &i) in idx.iter().enumerate() {
            assert_eq!(i, g.cell_index(30.0, 30.0, level));
        }
    }

    // -- occupancy --

    #[test]
    fn fresh_grid_is_empty() {
        let g = grid(4.0, 20.0, 3, CellScale::Linear);
        for level in 0..3 {
            assert_eq!(g.occupied_count(level), 0);
            assert!(!g.is_occupied(10.0, 10.0, level));
        }
    }

    #[test]
    fn marking_claims_every_level() {
        let mut g = grid(4.0, 20.0, 3, CellScale::Linear);
        g.mark_occupied(42.0, 17.0);
        for level in 0..3 {
            assert!(g.is_occupied(42.0, 17.0, level), "level {level} not marked");
            assert_eq!(g.occupied_count(level), 1);
        }
    }

    #[test]
    fn coarse_cell_covers_neighbouring_fine_cells() {
        let mut g = grid(5.0, 20.0, 2, CellScale::Linear);
        g.mark_occupied(1.0, 1.0);
        // Same 20-unit cell at level 1, different 5-unit cell at level 0.
        assert!(g.is_occupied(12.0, 12.0, 1));
        assert!(!g.is_occupied(12.0, 12.0, 0));
        assert!(!g.is_occupied(25.0, 1.0, 1));
    }

    #[test]
    fn marking_only_touches_configured_levels() {
        let mut g = grid(5.0, 20.0, 2, CellScale::Linear);
        g.mark_occupied(99.0, 99.0);
        let spill = g.data.iter().any(|&m| m & !0b11 != 0);
        assert!(!spill, "bits beyond level 1 were set");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn schedule_endpoints_are_min_and_max(
                min in 0.5_f64..50.0,
                extra in 0.0_f64..200.0,
                count in 2_usize..=32,
                log: bool,
            ) {
                let max = min + extra;
                let sizes = cell_sizes(min, max, count, CellScale::from_logarithmic(log));
                prop_assert_eq!(sizes.len(), count);
                prop_assert!((sizes[0] - min).abs() < 1e-9, "size_0 = {}", sizes[0]);
                prop_assert_eq!(sizes[count - 1], max);
                for pair in sizes.windows(2) {
                    prop_assert!(pair[0] <= pair[1] + 1e-9, "not monotonic: {sizes:?}");
                }
            }

            #[test]
            fn cell_indices_stay_in_range(
                x in 0.0_f64..100.0,
                y in 0.0_f64..100.0,
                log: bool,
            ) {
                let g = grid(3.0, 25.0, 4, CellScale::from_logarithmic(log));
                for level in 0..g.level_count() {
                    let idx = g.cell_index(x, y, level);
                    prop_assert!(idx < g.level(level).cell_count());
                    prop_assert!(idx < g.finest_cell_count());
                }
            }

            #[test]
            fn occupancy_is_monotonic(
                points in proptest::collection::vec((0.0_f64..100.0, 0.0_f64..100.0), 1..40),
            ) {
                let mut g = grid(4.0, 20.0, 3, CellScale::Linear);
                let mut claimed: Vec<(f64, f64)> = Vec::new();
                for (x, y) in points {
                    g.mark_occupied(x, y);
                    claimed.push((x, y));
                    for &(cx, cy) in &claimed {
                        for level in 0..3 {
                            prop_assert!(g.is_occupied(cx, cy, level));
                        }
                    }
                }
            }
        }
    }
}
