//! Strided windows: sparse binary matrices with exactly one contiguous run
//! of set cells per row.
//!
//! Two global invariants hold for every window:
//!
//! 1. the run starts are monotone non-decreasing down the rows (lower
//!    envelope), and
//! 2. the run ends are monotone non-decreasing down the rows (upper
//!    envelope).
//!
//! ```text
//!   0 1 2 3 4 5
//! 0 * * * . . .
//! 1 . * * * . .
//! 2 . * * * . .
//! 3 . . * * * *
//! 4 . . * * * *
//! ```
//!
//! A window of this shape serves as the *search window* restricting which
//! cells of a warping cost table are evaluated. A *path-mask* is the stricter
//! form produced by a back-trace: it additionally touches the upper-left and
//! lower-right corners, and consecutive rows overlap by at most one cell, so
//! enumerating its cells row-major yields a monotone warp path:
//!
//! ```text
//!   0 1 2 3 4 5
//! 0 * . . . . .
//! 1 * * . . . .
//! 2 . * . . . .
//! 3 . * * * . .
//! 4 . . . . * *
//! ```
//!
//! The representation is two parallel arrays of per-row run bounds; no cell
//! storage is ever materialized, including during [`StridedWindow::expand`],
//! the upsample-and-dilate step that projects a coarse path-mask onto a grid
//! of twice the resolution.

/// Errors for strided-window construction.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A window needs at least one row and one column.
    #[error("window shape must be non-empty, got {rows}x{cols}")]
    EmptyShape {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
    },
    /// Run-bound arrays must hold exactly one entry per row.
    #[error("expected {rows} run bounds, got {got}")]
    RunCountMismatch {
        /// Number of rows in the window.
        rows: usize,
        /// Number of run bounds supplied.
        got: usize,
    },
    /// Every run must satisfy `start <= end < n_cols`.
    #[error("row {row} has run {start}..={end}, outside a {cols}-column window")]
    RunOutOfBounds {
        /// Offending row.
        row: usize,
        /// Run start column.
        start: usize,
        /// Run end column.
        end: usize,
        /// Number of columns in the window.
        cols: usize,
    },
    /// Run starts and run ends must both be monotone non-decreasing.
    #[error("row {row} breaks the monotone envelope: {prev} then {curr}")]
    EnvelopeNotMonotone {
        /// First row of the offending adjacent pair.
        row: usize,
        /// Bound on the earlier row.
        prev: usize,
        /// Bound on the later row.
        curr: usize,
    },
    /// An index-pair path must contain at least one pair.
    #[error("cannot build a window from an empty path")]
    EmptyPath,
}

/// Convenience result type for this module.
pub type Result<T> = std::result::Result<T, Error>;

/// A sparse binary matrix storing one contiguous column run per row.
#[derive(Debug, Clone, PartialEq)]
pub struct StridedWindow {
    n_rows: usize,
    n_cols: usize,
    start_cols: Vec<usize>,
    end_cols: Vec<usize>,
}

impl StridedWindow {
    /// Builds a window from per-row run bounds, validating shape, run
    /// bounds, and both monotone envelopes.
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        start_cols: Vec<usize>,
        end_cols: Vec<usize>,
    ) -> Result<Self> {
        if n_rows == 0 || n_cols == 0 {
            return Err(Error::EmptyShape {
                rows: n_rows,
                cols: n_cols,
            });
        }
        if start_cols.len() != n_rows {
            return Err(Error::RunCountMismatch {
                rows: n_rows,
                got: start_cols.len(),
            });
        }
        if end_cols.len() != n_rows {
            return Err(Error::RunCountMismatch {
                rows: n_rows,
                got: end_cols.len(),
            });
        }
        for row in 0..n_rows {
            let (start, end) = (start_cols[row], end_cols[row]);
            if start > end || end >= n_cols {
                return Err(Error::RunOutOfBounds {
                    row,
                    start,
                    end,
                    cols: n_cols,
                });
            }
        }
        for row in 1..n_rows {
            if start_cols[row] < start_cols[row - 1] {
                return Err(Error::EnvelopeNotMonotone {
                    row,
                    prev: start_cols[row - 1],
                    curr: start_cols[row],
                });
            }
            if end_cols[row] < end_cols[row - 1] {
                return Err(Error::EnvelopeNotMonotone {
                    row,
                    prev: end_cols[row - 1],
                    curr: end_cols[row],
                });
            }
        }
        Ok(Self {
            n_rows,
            n_cols,
            start_cols,
            end_cols,
        })
    }

    /// Builds a window from a `(start, end)` run per row.
    pub fn from_runs(runs: &[(usize, usize)], n_cols: usize) -> Result<Self> {
        let (start_cols, end_cols) = runs.iter().copied().unzip();
        Self::new(runs.len(), n_cols, start_cols, end_cols)
    }

    /// Builds the minimum window containing exactly the given cells.
    ///
    /// The input is assumed to be a monotone corner-to-corner path in
    /// row-major order; the shape is derived from its final pair. Input that
    /// skips a row or runs backwards is rejected by run validation.
    pub fn from_index_pairs(pairs: &[(usize, usize)]) -> Result<Self> {
        let Some(&(last_row, last_col)) = pairs.last() else {
            return Err(Error::EmptyPath);
        };
        let n_rows = last_row + 1;
        let n_cols = last_col + 1;
        let mut start_cols = vec![usize::MAX; n_rows];
        let mut end_cols = vec![0usize; n_rows];
        for &(i, j) in pairs {
            if i >= n_rows {
                return Err(Error::RunOutOfBounds {
                    row: i,
                    start: j,
                    end: j,
                    cols: n_cols,
                });
            }
            start_cols[i] = start_cols[i].min(j);
            end_cols[i] = end_cols[i].max(j);
        }
        Self::new(n_rows, n_cols, start_cols, end_cols)
    }

    /// Builds a window from run bounds already known to satisfy every
    /// invariant (back-trace output). Checked in debug builds only.
    pub(crate) fn from_monotone_runs_unchecked(
        n_cols: usize,
        start_cols: Vec<usize>,
        end_cols: Vec<usize>,
    ) -> Self {
        debug_assert!(
            Self::new(start_cols.len(), n_cols, start_cols.clone(), end_cols.clone()).is_ok(),
            "caller promised valid monotone runs"
        );
        Self {
            n_rows: start_cols.len(),
            n_cols,
            start_cols,
            end_cols,
        }
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// The inclusive `(start, end)` column run of `row`.
    ///
    /// Panics if `row` is out of range.
    pub fn row_range(&self, row: usize) -> (usize, usize) {
        (self.start_cols[row], self.end_cols[row])
    }

    /// Total number of set cells.
    ///
    /// For a path-mask this is the warp-path length, at most
    /// `n_rows + n_cols - 1`.
    pub fn set_cell_count(&self) -> usize {
        self.start_cols
            .iter()
            .zip(&self.end_cols)
            .map(|(&s, &e)| e - s + 1)
            .sum()
    }

    /// Enumerates every set cell as an `(row, col)` pair in row-major order.
    ///
    /// On a path-mask this is exactly the warp path.
    pub fn to_index_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::with_capacity(self.set_cell_count());
        for row in 0..self.n_rows {
            for col in self.start_cols[row]..=self.end_cols[row] {
                pairs.push((row, col));
            }
        }
        pairs
    }

    /// Upsamples the window by a factor of two and dilates the result by a
    /// square structuring element of the given Chebyshev `radius`.
    ///
    /// Each set cell `(i, j)` maps to the 2x2 block at `(2i, 2j)`; the
    /// parities (0 or 1) extend the output grid by a trailing row and/or
    /// column so that an odd-length operand truncated during halving regains
    /// its final element. The output shape is
    /// `(2 n_rows + row_parity) x (2 n_cols + col_parity)`.
    ///
    /// The run bounds are computed directly, without materializing the
    /// upsampled grid: output row `r` can only be reached by dilation from
    /// source rows within `radius` of it in upsampled coordinates, so its
    /// start is governed by source row `clamp(r - radius) / 2` and its end
    /// by source row `clamp(r + radius) / 2`. Both envelopes stay monotone.
    /// The result is a search window, not necessarily a path-mask.
    pub fn expand(&self, row_parity: usize, col_parity: usize, radius: usize) -> StridedWindow {
        debug_assert!(row_parity <= 1 && col_parity <= 1);
        let rows_out = 2 * self.n_rows + row_parity;
        let cols_out = 2 * self.n_cols + col_parity;
        let r = radius as isize;
        let source_row_cap = 2 * (self.n_rows as isize - 1);
        let last_col = cols_out as isize - 1;
        let mut start_cols = Vec::with_capacity(rows_out);
        let mut end_cols = Vec::with_capacity(rows_out);
        for row in 0..rows_out as isize {
            let prev = ((row - r).clamp(0, source_row_cap) / 2) as usize;
            let next = ((row + r).clamp(0, source_row_cap) / 2) as usize;
            let start = (2 * self.start_cols[prev] as isize - r).max(0);
            let end =
                (2 * self.end_cols[next] as isize + 1 + r + col_parity as isize).min(last_col);
            start_cols.push(start as usize);
            end_cols.push(end as usize);
        }
        StridedWindow {
            n_rows: rows_out,
            n_cols: cols_out,
            start_cols,
            end_cols,
        }
    }

    /// Renders the window as a grid of `*` and `.` cells with modulo-10
    /// row and column headers.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.n_rows + 1) * (2 * self.n_cols + 3));
        out.push_str("  ");
        for col in 0..self.n_cols {
            out.push_str(&format!("{} ", col % 10));
        }
        out.push('\n');
        for row in 0..self.n_rows {
            out.push_str(&format!("{} ", row % 10));
            let (start, end) = self.row_range(row);
            for col in 0..self.n_cols {
                out.push_str(if start <= col && col <= end { "* " } else { ". " });
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // The worked 5x6 example used throughout the expand tests:
    //   0 1 2 3 4 5
    // 0 . * * . . .
    // 1 . * * * . .
    // 2 . * * * . .
    // 3 . . * * . .
    // 4 . . * * * .
    fn sample_window() -> StridedWindow {
        StridedWindow::from_runs(&[(1, 2), (1, 3), (1, 3), (2, 3), (2, 4)], 6).unwrap()
    }

    fn runs_of(window: &StridedWindow) -> Vec<(usize, usize)> {
        (0..window.n_rows()).map(|r| window.row_range(r)).collect()
    }

    #[test]
    fn construction_rejects_bad_shapes_and_runs() {
        assert_eq!(
            StridedWindow::from_runs(&[], 4),
            Err(Error::EmptyShape { rows: 0, cols: 4 })
        );
        assert_eq!(
            StridedWindow::from_runs(&[(0, 4)], 4),
            Err(Error::RunOutOfBounds {
                row: 0,
                start: 0,
                end: 4,
                cols: 4
            })
        );
        assert_eq!(
            StridedWindow::from_runs(&[(2, 1)], 4),
            Err(Error::RunOutOfBounds {
                row: 0,
                start: 2,
                end: 1,
                cols: 4
            })
        );
        assert_eq!(
            StridedWindow::new(2, 4, vec![0], vec![1, 2]),
            Err(Error::RunCountMismatch { rows: 2, got: 1 })
        );
    }

    #[test]
    fn construction_rejects_non_monotone_envelopes() {
        // Start envelope backtracks.
        assert_eq!(
            StridedWindow::from_runs(&[(1, 2), (0, 2)], 4),
            Err(Error::EnvelopeNotMonotone {
                row: 1,
                prev: 1,
                curr: 0
            })
        );
        // End envelope backtracks.
        assert_eq!(
            StridedWindow::from_runs(&[(0, 3), (1, 2)], 4),
            Err(Error::EnvelopeNotMonotone {
                row: 1,
                prev: 3,
                curr: 2
            })
        );
    }

    #[test]
    fn render_draws_the_documented_grid() {
        let expected = "  0 1 2 3 4 5 \n\
                        0 . * * . . . \n\
                        1 . * * * . . \n\
                        2 . * * * . . \n\
                        3 . . * * . . \n\
                        4 . . * * * . \n";
        assert_eq!(sample_window().render(), expected);
    }

    #[test]
    fn path_mask_enumerates_cells_row_major() {
        //   0 1 2 3 4 5
        // 0 * * . . . .
        // 1 . * . . . .
        // 2 . * . . . .
        // 3 . * * * . .
        // 4 . . . . * *
        let mask =
            StridedWindow::from_runs(&[(0, 1), (1, 1), (1, 1), (1, 3), (4, 5)], 6).unwrap();
        assert_eq!(
            mask.to_index_pairs(),
            vec![
                (0, 0),
                (0, 1),
                (1, 1),
                (2, 1),
                (3, 1),
                (3, 2),
                (3, 3),
                (4, 4),
                (4, 5)
            ]
        );
        assert_eq!(mask.set_cell_count(), 9);
    }

    #[test]
    fn index_pairs_round_trip() {
        let mask =
            StridedWindow::from_runs(&[(0, 1), (1, 1), (1, 1), (1, 3), (4, 5)], 6).unwrap();
        let rebuilt = StridedWindow::from_index_pairs(&mask.to_index_pairs()).unwrap();
        assert_eq!(rebuilt, mask);
    }

    #[test]
    fn from_index_pairs_rejects_empty_and_gapped_input() {
        assert_eq!(StridedWindow::from_index_pairs(&[]), Err(Error::EmptyPath));
        // Row 1 is never visited, so its run stays unset and fails validation.
        assert!(StridedWindow::from_index_pairs(&[(0, 0), (2, 1)]).is_err());
    }

    #[test]
    fn expand_radius_zero_doubles_each_run() {
        let expanded = sample_window().expand(0, 0, 0);
        assert_eq!(expanded.n_rows(), 10);
        assert_eq!(expanded.n_cols(), 12);
        assert_eq!(
            runs_of(&expanded),
            vec![
                (2, 5),
                (2, 5),
                (2, 7),
                (2, 7),
                (2, 7),
                (2, 7),
                (4, 7),
                (4, 7),
                (4, 9),
                (4, 9)
            ]
        );
    }

    #[test]
    fn expand_radius_one_dilates_by_one_cell() {
        let expanded = sample_window().expand(0, 0, 1);
        assert_eq!(
            runs_of(&expanded),
            vec![
                (1, 6),
                (1, 8),
                (1, 8),
                (1, 8),
                (1, 8),
                (1, 8),
                (1, 8),
                (3, 10),
                (3, 10),
                (3, 10)
            ]
        );
    }

    #[test]
    fn expand_radius_two_dilates_by_two_cells() {
        let expanded = sample_window().expand(0, 0, 2);
        assert_eq!(
            runs_of(&expanded),
            vec![
                (0, 9),
                (0, 9),
                (0, 9),
                (0, 9),
                (0, 9),
                (0, 9),
                (0, 11),
                (0, 11),
                (2, 11),
                (2, 11)
            ]
        );
    }

    #[test]
    fn expand_row_parity_appends_a_trailing_row() {
        let expanded = sample_window().expand(1, 0, 0);
        assert_eq!(expanded.n_rows(), 11);
        assert_eq!(expanded.n_cols(), 12);
        // The trailing row clamps to the last source row.
        assert_eq!(expanded.row_range(10), (4, 9));
        assert_eq!(expanded.row_range(9), (4, 9));
    }

    #[test]
    fn expand_col_parity_widens_every_run_end() {
        let expanded = sample_window().expand(0, 1, 0);
        assert_eq!(expanded.n_rows(), 10);
        assert_eq!(expanded.n_cols(), 13);
        assert_eq!(
            runs_of(&expanded),
            vec![
                (2, 6),
                (2, 6),
                (2, 8),
                (2, 8),
                (2, 8),
                (2, 8),
                (4, 8),
                (4, 8),
                (4, 10),
                (4, 10)
            ]
        );
    }

    #[test]
    fn expand_both_parities_with_radius() {
        let expanded = sample_window().expand(1, 1, 1);
        assert_eq!(expanded.n_rows(), 11);
        assert_eq!(expanded.n_cols(), 13);
        assert_eq!(
            runs_of(&expanded),
            vec![
                (1, 7),
                (1, 9),
                (1, 9),
                (1, 9),
                (1, 9),
                (1, 9),
                (1, 9),
                (3, 11),
                (3, 11),
                (3, 11),
                (3, 11)
            ]
        );
    }

    #[test]
    fn expanded_path_mask_always_spans_both_corners() {
        // A path-mask starts its first run at column 0 and ends its last run
        // at the last column; expansion must preserve both corner contacts
        // for the refinement pass to have a complete alignment to find.
        let mask =
            StridedWindow::from_runs(&[(0, 1), (1, 1), (1, 1), (1, 3), (4, 5)], 6).unwrap();
        for (rho, kappa, radius) in
            [(0, 0, 0), (1, 0, 0), (0, 1, 0), (1, 1, 2), (0, 0, 3), (1, 1, 0)]
        {
            let w = mask.expand(rho, kappa, radius);
            assert_eq!(w.row_range(0).0, 0, "rho={rho} kappa={kappa} r={radius}");
            assert_eq!(
                w.row_range(w.n_rows() - 1).1,
                w.n_cols() - 1,
                "rho={rho} kappa={kappa} r={radius}"
            );
        }
    }

    /// A random monotone corner-to-corner path: a sequence of diagonal,
    /// down, and right steps.
    fn path_strategy() -> impl Strategy<Value = Vec<(usize, usize)>> {
        prop::collection::vec(0u8..3, 1..60).prop_map(|steps| {
            let mut pairs = vec![(0usize, 0usize)];
            let (mut i, mut j) = (0usize, 0usize);
            for step in steps {
                match step {
                    0 => {
                        i += 1;
                        j += 1;
                    }
                    1 => i += 1,
                    _ => j += 1,
                }
                pairs.push((i, j));
            }
            pairs
        })
    }

    proptest! {
        #[test]
        fn random_paths_round_trip_through_runs(pairs in path_strategy()) {
            let mask = StridedWindow::from_index_pairs(&pairs).unwrap();
            prop_assert_eq!(mask.to_index_pairs(), pairs);
        }

        #[test]
        fn expand_contains_all_upsampled_blocks_and_stays_monotone(
            pairs in path_strategy(),
            rho in 0usize..2,
            kappa in 0usize..2,
            radius in 0usize..4,
        ) {
            let mask = StridedWindow::from_index_pairs(&pairs).unwrap();
            let expanded = mask.expand(rho, kappa, radius);
            prop_assert_eq!(expanded.n_rows(), 2 * mask.n_rows() + rho);
            prop_assert_eq!(expanded.n_cols(), 2 * mask.n_cols() + kappa);
            // Every 2x2 block of a set source cell is set in the expansion.
            for (i, j) in mask.to_index_pairs() {
                for (r, c) in [
                    (2 * i, 2 * j),
                    (2 * i + 1, 2 * j),
                    (2 * i, 2 * j + 1),
                    (2 * i + 1, 2 * j + 1),
                ] {
                    let (start, end) = expanded.row_range(r);
                    prop_assert!(
                        start <= c && c <= end,
                        "block cell ({}, {}) not covered by run {}..={}",
                        r, c, start, end
                    );
                }
            }
            // Both envelopes stay monotone.
            for r in 1..expanded.n_rows() {
                let (ps, pe) = expanded.row_range(r - 1);
                let (cs, ce) = expanded.row_range(r);
                prop_assert!(cs >= ps && ce >= pe);
            }
        }
    }
}
