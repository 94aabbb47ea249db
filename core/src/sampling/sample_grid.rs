//! Tabulated 2D sampling grid.

use super::sample_discrete;
use crate::geometry::Point2f;
use crate::pbrt::*;
use crate::rng::ONE_MINUS_EPSILON;

/// Fraction of the per-cell average added to every cell by
/// `SampleGrid::ensure_non_zero_entries()`.
pub const GRID_FLOOR_FRACTION: Float = 0.03;

/// Represents a piecewise-constant density over the unit square that is
/// filled incrementally and sampled by inverse transform: a row is chosen
/// from the marginal, then a column from that row.
#[derive(Clone, Debug)]
pub struct SampleGrid {
    /// Number of columns (x-direction).
    nu: usize,

    /// Number of rows (y-direction).
    nv: usize,

    /// Cell values stored row by row.
    cells: Vec<Float>,

    /// Sum of each row.
    row_sums: Vec<Float>,

    /// Sum of all cells.
    total: Float,
}

impl SampleGrid {
    /// Returns an empty grid.
    ///
    /// * `nu` - Number of columns.
    /// * `nv` - Number of rows.
    pub fn new(nu: usize, nv: usize) -> Result<Self, String> {
        if nu == 0 || nv == 0 {
            return Err(format!("SampleGrid needs at least one cell, got {}x{}", nu, nv));
        }
        Ok(Self {
            nu,
            nv,
            cells: vec![0.0; nu * nv],
            row_sums: vec![0.0; nv],
            total: 0.0,
        })
    }

    /// Returns the grid resolution as (columns, rows).
    pub fn resolution(&self) -> (usize, usize) {
        (self.nu, self.nv)
    }

    /// Returns the sum of all cells.
    pub fn total(&self) -> Float {
        self.total
    }

    /// Returns the value of a cell.
    ///
    /// * `ix` - Column.
    /// * `iy` - Row.
    pub fn value(&self, ix: usize, iy: usize) -> Float {
        self.cells[iy * self.nu + ix]
    }

    /// Accumulates a value into the cell containing (x, y). Coordinates are
    /// clamped into the unit square.
    ///
    /// * `x`     - X-coordinate in [0, 1].
    /// * `y`     - Y-coordinate in [0, 1].
    /// * `value` - Non-negative value to add.
    pub fn add(&mut self, x: Float, y: Float, value: Float) {
        let ix = cell_index(x, self.nu);
        let iy = cell_index(y, self.nv);
        self.add_cell(ix, iy, value);
    }

    /// Accumulates a value into a cell.
    ///
    /// * `ix`    - Column.
    /// * `iy`    - Row.
    /// * `value` - Non-negative value to add.
    pub fn add_cell(&mut self, ix: usize, iy: usize, value: Float) {
        debug_assert!(value >= 0.0, "negative grid value {}", value);
        let value = max(value, 0.0);
        self.cells[iy * self.nu + ix] += value;
        self.row_sums[iy] += value;
        self.total += value;
    }

    /// Adds a small floor to every cell so that no region of the domain has
    /// zero probability. An empty grid becomes uniform.
    pub fn ensure_non_zero_entries(&mut self) {
        let n = self.cells.len() as Float;
        let floor = if self.total > 0.0 {
            GRID_FLOOR_FRACTION * self.total / n
        } else {
            1.0
        };
        for c in self.cells.iter_mut() {
            *c += floor;
        }
        for r in self.row_sums.iter_mut() {
            *r += floor * self.nu as Float;
        }
        self.total += floor * n;
    }

    /// Draws a point in [0, 1)^2 and returns it with its density with respect
    /// to area on the unit square.
    ///
    /// * `u` - Uniform random sample.
    pub fn sample(&self, u: &Point2f) -> (Point2f, Float) {
        let row = sample_discrete(&self.row_sums, self.total, u.y);
        let start = row.index * self.nu;
        let column = sample_discrete(
            &self.cells[start..start + self.nu],
            self.row_sums[row.index],
            u.x,
        );

        let x = min(
            (column.index as Float + column.remapped) / self.nu as Float,
            ONE_MINUS_EPSILON,
        );
        let y = min(
            (row.index as Float + row.remapped) / self.nv as Float,
            ONE_MINUS_EPSILON,
        );

        // Cell probability divided by cell area.
        let pdf = row.pdf * column.pdf * (self.nu * self.nv) as Float;
        (Point2f::new(x, y), pdf)
    }

    /// Returns the density `sample()` assigns to a point.
    ///
    /// * `p` - Point in the unit square.
    pub fn pdf(&self, p: &Point2f) -> Float {
        if self.total <= 0.0 {
            return 1.0;
        }
        let ix = cell_index(p.x, self.nu);
        let iy = cell_index(p.y, self.nv);
        self.value(ix, iy) / self.total * (self.nu * self.nv) as Float
    }
}

/// Maps a coordinate in [0, 1] to one of `n` cells.
fn cell_index(x: Float, n: usize) -> usize {
    clamp((x * n as Float) as isize, 0, n as isize - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RNG;
    use float_cmp::approx_eq;

    fn test_grid() -> SampleGrid {
        let mut grid = SampleGrid::new(4, 3).unwrap();
        grid.add_cell(0, 0, 5.0);
        grid.add_cell(3, 0, 1.0);
        grid.add_cell(1, 1, 2.0);
        grid.add(0.9, 0.9, 4.0);
        grid
    }

    #[test]
    fn rejects_empty_resolution() {
        assert!(SampleGrid::new(0, 3).is_err());
    }

    #[test]
    fn add_maps_coordinates_to_cells() {
        let grid = test_grid();
        assert_eq!(grid.value(3, 2), 4.0);
        assert_eq!(grid.total(), 12.0);
    }

    #[test]
    fn floor_removes_dead_zones() {
        let mut grid = test_grid();
        grid.ensure_non_zero_entries();
        for iy in 0..3 {
            for ix in 0..4 {
                assert!(grid.value(ix, iy) > 0.0);
            }
        }
        // 3% of the 1.0 per-cell average.
        assert!(approx_eq!(Float, grid.value(2, 2), 0.03, epsilon = 1e-6));
    }

    #[test]
    fn empty_grid_becomes_uniform() {
        let mut grid = SampleGrid::new(2, 2).unwrap();
        grid.ensure_non_zero_entries();
        let (_, pdf) = grid.sample(&Point2f::new(0.3, 0.7));
        assert!(approx_eq!(Float, pdf, 1.0, epsilon = 1e-5));
    }

    #[test]
    fn pdf_matches_cell_share() {
        let grid = test_grid();
        // Cell (0, 0) holds 5 of 12 over an area of 1/12.
        assert!(approx_eq!(Float, grid.pdf(&Point2f::new(0.1, 0.1)), 5.0, epsilon = 1e-5));
        assert!(approx_eq!(Float, grid.pdf(&Point2f::new(0.6, 0.1)), 0.0));
    }

    #[test]
    fn inverse_pdf_integrates_to_unit_area() {
        let mut grid = test_grid();
        grid.ensure_non_zero_entries();
        let mut rng = RNG::new(1);
        let n = 100_000;
        let mut sum = 0.0_f64;
        for _ in 0..n {
            let (p, pdf) = grid.sample(&rng.uniform_point2());
            assert!((0.0..1.0).contains(&p.x) && (0.0..1.0).contains(&p.y));
            sum += 1.0 / pdf as f64;
        }
        let mean = sum / n as f64;
        assert!((mean - 1.0).abs() < 0.02, "mean 1/pdf {}", mean);
    }

    #[test]
    fn histogram_follows_cell_values() {
        let mut grid = test_grid();
        grid.ensure_non_zero_entries();
        let mut rng = RNG::new(2);
        let n = 100_000;
        let mut counts = vec![0usize; 12];
        for _ in 0..n {
            let (p, _) = grid.sample(&rng.uniform_point2());
            counts[cell_index(p.y, 3) * 4 + cell_index(p.x, 4)] += 1;
        }
        for iy in 0..3 {
            for ix in 0..4 {
                let expected = grid.value(ix, iy) / grid.total();
                let observed = counts[iy * 4 + ix] as Float / n as Float;
                assert!(
                    (expected - observed).abs() < 0.01,
                    "cell ({}, {}): {} vs {}",
                    ix,
                    iy,
                    observed,
                    expected
                );
            }
        }
    }
}
