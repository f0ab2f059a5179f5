//! The dynamic-time-warping kernel: dense and windowed cost-table fills with
//! an exact back-trace.
//!
//! For operands of `R` and `C` points the engine fills an
//! `(R+1) x (C+1)` table in which row 0 and column 0 are a boundary of
//! `+inf` around the base cell `dp[0][0] = 0`. Interior cell `(r, c)` holds
//! the optimum for aligning the prefixes `a[0..r)` and `b[0..c)`:
//!
//! ```text
//! dp[r][c] = |a[r-1] - b[c-1]|^2 + min(dp[r-1][c-1], dp[r-1][c], dp[r][c-1])
//! ```
//!
//! The local step cost is the *squared* Euclidean distance, so the reported
//! cost is a sum of squared distances. Ties in the minimum resolve
//! diagonal, then up, then left; the tie-break is part of the public
//! contract and the tests pin exact paths against it.
//!
//! Windowed mode evaluates only the cells a [`StridedWindow`] admits.
//! Unvisited cells keep their `+inf` initialization, which is exactly the
//! "predecessors outside the window are infinite" semantics the window
//! demands, and the monotone envelope invariants guarantee every in-window
//! predecessor is filled before it is read.
//!
//! The back-trace recomputes the step direction at each cell from the same
//! predecessor comparison instead of tagging cells during the fill, and
//! emits the path as a path-mask.

use ndarray::Array2;

use crate::stream::Stream;
use crate::strided_window::StridedWindow;

/// Errors for windowed alignment.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The window shape must match the operand lengths.
    #[error("window is {window_rows}x{window_cols} but operands need {rows}x{cols}")]
    WindowShapeMismatch {
        /// Rows in the supplied window.
        window_rows: usize,
        /// Columns in the supplied window.
        window_cols: usize,
        /// Points in the row operand.
        rows: usize,
        /// Points in the column operand.
        cols: usize,
    },
    /// No in-window sequence of steps connects the two corners.
    #[error("window admits no complete alignment")]
    NoAlignment,
}

/// Convenience result type for this module.
pub type Result<T> = std::result::Result<T, Error>;

/// The materialized result of an alignment: its cost and warp path.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpSummary {
    /// Sum of squared Euclidean step distances along the path.
    pub cost: f64,
    /// The warp path as `(i, j)` pairings, lexicographically sorted, each
    /// coordinate advancing by 0 or 1 per step.
    pub index_pairs: Vec<(usize, usize)>,
}

impl WarpSummary {
    /// Number of pairings on the path.
    pub fn path_length(&self) -> usize {
        self.index_pairs.len()
    }

    fn from_warp_info(info: WarpInfo) -> Self {
        Self {
            cost: info.cost,
            index_pairs: info.path_mask.to_index_pairs(),
        }
    }

    /// The defined result for operands too short to align: zero cost and a
    /// single stationary pairing.
    pub(crate) fn degenerate() -> Self {
        Self {
            cost: 0.0,
            index_pairs: vec![(0, 0)],
        }
    }
}

/// Internal alignment result keeping the path in mask form, so the
/// coarse-to-fine driver can expand it without a pair-list detour.
#[derive(Debug)]
pub(crate) struct WarpInfo {
    pub(crate) cost: f64,
    pub(crate) path_mask: StridedWindow,
}

fn min_predecessor(diag: f64, up: f64, left: f64) -> f64 {
    // Tie-break order is part of the contract: diagonal wins ties, then up,
    // then left. The same comparison drives the back-trace.
    if diag <= up && diag <= left {
        diag
    } else if up <= left {
        up
    } else {
        left
    }
}

/// Walks the filled table from the lower-right corner back to the base,
/// accumulating the visited cells as per-row runs.
fn backtrace(dp: &Array2<f64>, rows: usize, cols: usize) -> StridedWindow {
    let mut start_cols = vec![usize::MAX; rows];
    let mut end_cols = vec![0usize; rows];
    let mut u = rows;
    let mut v = cols;
    while u > 0 && v > 0 {
        let (i, j) = (u - 1, v - 1);
        start_cols[i] = start_cols[i].min(j);
        end_cols[i] = end_cols[i].max(j);
        let diag = dp[[u - 1, v - 1]];
        let up = dp[[u - 1, v]];
        let left = dp[[u, v - 1]];
        if diag <= up && diag <= left {
            u -= 1;
            v -= 1;
        } else if up <= left {
            u -= 1;
        } else {
            v -= 1;
        }
    }
    StridedWindow::from_monotone_runs_unchecked(cols, start_cols, end_cols)
}

/// Dense alignment of two streams. Presumes both operands are non-empty.
pub(crate) fn full_dtw(a: &Stream, b: &Stream) -> WarpInfo {
    let rows = a.len();
    let cols = b.len();
    let mut dp = Array2::from_elem((rows + 1, cols + 1), f64::INFINITY);
    dp[[0, 0]] = 0.0;
    for r in 1..=rows {
        for c in 1..=cols {
            let step = a.point(r - 1).sq_dist(&b.point(c - 1));
            let best = min_predecessor(dp[[r - 1, c - 1]], dp[[r - 1, c]], dp[[r, c - 1]]);
            dp[[r, c]] = step + best;
        }
    }
    let cost = dp[[rows, cols]];
    WarpInfo {
        cost,
        path_mask: backtrace(&dp, rows, cols),
    }
}

/// Alignment restricted to the cells of `window`.
///
/// The window shape must equal `(a.len(), b.len())`. Returns
/// [`Error::NoAlignment`] when the window does not connect the two corners
/// (a validated window always has monotone envelopes, but nothing forces it
/// to include the corner cells).
pub(crate) fn windowed_dtw(a: &Stream, b: &Stream, window: &StridedWindow) -> Result<WarpInfo> {
    let rows = a.len();
    let cols = b.len();
    if window.n_rows() != rows || window.n_cols() != cols {
        return Err(Error::WindowShapeMismatch {
            window_rows: window.n_rows(),
            window_cols: window.n_cols(),
            rows,
            cols,
        });
    }
    let mut dp = Array2::from_elem((rows + 1, cols + 1), f64::INFINITY);
    dp[[0, 0]] = 0.0;
    for r in 1..=rows {
        let (start, end) = window.row_range(r - 1);
        for c in start + 1..=end + 1 {
            let step = a.point(r - 1).sq_dist(&b.point(c - 1));
            let best = min_predecessor(dp[[r - 1, c - 1]], dp[[r - 1, c]], dp[[r, c - 1]]);
            dp[[r, c]] = step + best;
        }
    }
    let cost = dp[[rows, cols]];
    if !cost.is_finite() {
        return Err(Error::NoAlignment);
    }
    Ok(WarpInfo {
        cost,
        path_mask: backtrace(&dp, rows, cols),
    })
}

/// Exact alignment of two streams: optimal cost plus the warp path.
///
/// Uses `O(R * C)` time and space. If either stream has fewer than two
/// points the result is the defined degenerate summary: cost 0 and the
/// single pairing `(0, 0)`.
pub fn full_warp_summary(a: &Stream, b: &Stream) -> WarpSummary {
    if a.len() < 2 || b.len() < 2 {
        return WarpSummary::degenerate();
    }
    WarpSummary::from_warp_info(full_dtw(a, b))
}

/// Exact alignment cost without the path, in `O(max(R, C))` space.
///
/// Keeps only the previous and current table rows. Degenerate operands
/// (fewer than two points) report cost 0.
pub fn full_dtw_cost(a: &Stream, b: &Stream) -> f64 {
    if a.len() < 2 || b.len() < 2 {
        return 0.0;
    }
    let cols = b.len();
    let mut prev = vec![f64::INFINITY; cols + 1];
    let mut curr = vec![f64::INFINITY; cols + 1];
    prev[0] = 0.0;
    for r in 0..a.len() {
        curr[0] = f64::INFINITY;
        for c in 0..cols {
            let step = a.point(r).sq_dist(&b.point(c));
            curr[c + 1] = step + min_predecessor(prev[c], prev[c + 1], curr[c]);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[cols]
}
