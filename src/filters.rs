//! Geometry filters over streams: Ramer-Douglas-Peucker simplification and
//! geometric-medoid median smoothing.
//!
//! Streams are immutable values, so every filter returns a fresh stream
//! rather than editing in place; simplification only ever shrinks the point
//! count.

use crate::stream::{Point, Stream};

/// Errors for stream filters.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The smoothing window must be odd so it centers on a point.
    #[error("median filter window must be odd, got {0}")]
    EvenWindow(usize),
}

/// Convenience result type for this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Distance from `p` to the line through `s` and `e`, or to `s` itself when
/// the two line points coincide.
fn point_line_distance(p: Point, s: Point, e: Point) -> f64 {
    if s == e {
        return p.dist(&s);
    }
    let cross = (e.x - s.x) * (s.y - p.y) - (s.x - p.x) * (e.y - s.y);
    cross.abs() / s.dist(&e)
}

fn douglas_peucker(points: &[Point], start: usize, end: usize, epsilon: f64, keep: &mut [bool]) {
    let mut max_distance = 0.0;
    let mut index = start;
    for i in start + 1..end {
        let d = point_line_distance(points[i], points[start], points[end]);
        if d > max_distance {
            max_distance = d;
            index = i;
        }
    }
    if max_distance > epsilon {
        if index - start > 1 {
            douglas_peucker(points, start, index, epsilon, keep);
        }
        keep[index] = true;
        if end - index > 1 {
            douglas_peucker(points, index, end, epsilon, keep);
        }
    }
}

/// Ramer-Douglas-Peucker simplification: keeps both endpoints plus every
/// point that strays more than `epsilon` from the chords of the recursive
/// split. Streams with fewer than three points come back unchanged.
pub fn ramer_douglas_peucker(stream: &Stream, epsilon: f64) -> Stream {
    if stream.len() < 3 {
        return stream.clone();
    }
    let points = stream.points();
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    douglas_peucker(points, 0, points.len() - 1, epsilon, &mut keep);
    Stream::new(
        points
            .iter()
            .zip(&keep)
            .filter_map(|(&p, &k)| k.then_some(p))
            .collect(),
    )
}

/// Index in `points[start..end]` of the point minimizing the summed squared
/// distance to every other point of that range. Ties resolve to the lowest
/// index; an empty range reports `start`.
pub fn geometric_medoid(points: &[Point], start: usize, end: usize) -> usize {
    let mut best_index = start;
    let mut best_sum = f64::INFINITY;
    for i in start..end {
        let sum: f64 = points[start..end].iter().map(|p| points[i].sq_dist(p)).sum();
        if sum < best_sum {
            best_sum = sum;
            best_index = i;
        }
    }
    best_index
}

/// Replaces each interior point with the geometric medoid of the odd-width
/// window centered on it, damping isolated outliers. The margins narrower
/// than half a window pass through unchanged.
pub fn median_filter(stream: &Stream, window: usize) -> Result<Stream> {
    if window % 2 == 0 {
        return Err(Error::EvenWindow(window));
    }
    let half = window / 2;
    let points = stream.points();
    let mut output = points.to_vec();
    for i in half..points.len().saturating_sub(half) {
        let medoid = geometric_medoid(points, i - half, i + half + 1);
        output[i] = points[medoid];
    }
    Ok(Stream::new(output))
}
