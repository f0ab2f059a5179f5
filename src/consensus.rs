//! Consensus over stream collections: medoid selection from a pairwise
//! alignment-cost matrix, and DTW barycenter averaging (DBA).
//!
//! Both consumers only need costs or warp paths, so the exact mode leans on
//! the linear-space cost kernel where the path is not needed, and the
//! approximate mode runs FastDTW with a radius that grows as the fourth
//! root of the longest member (a tuning choice, not a contract).

use log::debug;

use crate::dtw::{full_dtw_cost, full_warp_summary};
use crate::fast_dtw::fast_warp_summary;
use crate::stream::{Point, Stream, StreamCollection};

/// Errors for consensus operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Consensus over an empty collection is undefined.
    #[error("stream collection is empty")]
    EmptyCollection,
}

/// Convenience result type for this module.
pub type Result<T> = std::result::Result<T, Error>;

fn approximate_radius(streams: &StreamCollection) -> usize {
    streams
        .iter()
        .map(|s| (s.len() as f64).powf(0.25).ceil() as usize)
        .max()
        .unwrap_or(0)
}

fn pair_cost(a: &Stream, b: &Stream, radius: Option<usize>) -> f64 {
    match radius {
        Some(r) => fast_warp_summary(a, b, r).cost,
        None => full_dtw_cost(a, b),
    }
}

/// Fills the symmetric `|S| x |S|` matrix of pairwise alignment costs,
/// row-major, with a zero diagonal.
///
/// Exact mode (`approximate = false`) uses the linear-space cost-only
/// kernel; approximate mode runs FastDTW at the fourth-root radius. The
/// matrix is returned to the caller so repeated consensus queries over the
/// same collection can reuse it.
pub fn pairwise_cost_matrix(streams: &StreamCollection, approximate: bool) -> Result<Vec<f64>> {
    if streams.is_empty() {
        return Err(Error::EmptyCollection);
    }
    let members = streams.streams();
    let n = members.len();
    let radius = approximate.then(|| approximate_radius(streams));
    debug!("filling {n}x{n} pairwise cost matrix, radius {radius:?}");
    let mut matrix = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..i {
            let cost = pair_cost(&members[i], &members[j], radius);
            matrix[i * n + j] = cost;
            matrix[j * n + i] = cost;
        }
    }
    Ok(matrix)
}

/// Index of the member minimizing the summed alignment cost to all others.
///
/// Ties resolve to the lowest index. Costs come from
/// [`pairwise_cost_matrix`] with the same `approximate` flag.
pub fn medoid_consensus(streams: &StreamCollection, approximate: bool) -> Result<usize> {
    let matrix = pairwise_cost_matrix(streams, approximate)?;
    let n = streams.len();
    let mut best_index = 0;
    let mut best_total = f64::INFINITY;
    for i in 0..n {
        let total: f64 = matrix[i * n..(i + 1) * n].iter().sum();
        if total < best_total {
            best_total = total;
            best_index = i;
        }
    }
    Ok(best_index)
}

/// DTW barycenter averaging: an iteratively refined consensus stream.
///
/// The consensus starts as a copy of the first member and keeps its length.
/// Each round aligns every member to the current consensus, accumulates
/// member points onto the consensus index they warp to, and replaces every
/// consensus point with the mean of its contributors. A point no member
/// warped onto keeps its previous position. With `iterations = 0` the
/// result is simply a copy of the first member.
pub fn dba_consensus(
    streams: &StreamCollection,
    approximate: bool,
    iterations: usize,
) -> Result<Stream> {
    let members = streams.streams();
    let Some(first) = members.first() else {
        return Err(Error::EmptyCollection);
    };
    let radius = approximate.then(|| approximate_radius(streams));
    let mut consensus = first.clone();
    for round in 0..iterations {
        let mut sums = vec![Point::default(); consensus.len()];
        let mut valence = vec![0u64; consensus.len()];
        for member in members {
            let summary = match radius {
                Some(r) => fast_warp_summary(&consensus, member, r),
                None => full_warp_summary(&consensus, member),
            };
            for &(i, j) in &summary.index_pairs {
                let p = member.point(j);
                sums[i].x += p.x;
                sums[i].y += p.y;
                valence[i] += 1;
            }
        }
        let updated = consensus
            .points()
            .iter()
            .enumerate()
            .map(|(i, &old)| {
                if valence[i] == 0 {
                    old
                } else {
                    Point::new(
                        sums[i].x / valence[i] as f64,
                        sums[i].y / valence[i] as f64,
                    )
                }
            })
            .collect();
        consensus = Stream::new(updated);
        debug!("dba round {round}: {} members folded in", members.len());
    }
    Ok(consensus)
}
