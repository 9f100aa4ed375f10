use nalgebra as na;

use crate::Centroid;

#[inline]
pub fn to_point(c: &Centroid) -> na::Point2<f32> {
    na::Point2::new(c.x as f32, c.y as f32)
}

/// Euclidean distance between two centroids
#[inline]
pub fn distance(a: &Centroid, b: &Centroid) -> f32 {
    na::distance(&to_point(a), &to_point(b))
}

/// Arithmetic mean, `None` for an empty input
pub fn mean<I: IntoIterator<Item = i32>>(values: I) -> Option<f32> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0f64, 0usize), |(s, n), v| (s + v as f64, n + 1));

    if n == 0 {
        None
    } else {
        Some((sum / n as f64) as f32)
    }
}
