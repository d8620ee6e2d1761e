//! Geometry for the attribute radar chart.
//!
//! Axes start at twelve o'clock and run clockwise; coordinates are relative to the
//! chart centre with `radius` as the outer ring.

use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, TAU};

pub const RING_COUNT: usize = 4;
const MIN_SCALE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RadarSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl RadarSeries {
    pub fn from_attributes(attributes: &BTreeMap<String, f64>) -> Self {
        let (labels, values) = attributes
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .unzip();
        Self { labels, values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Outer-ring value: at least 100, or the largest stat when one exceeds it.
    pub fn scale(&self) -> f64 {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(MIN_SCALE, f64::max)
    }
}

pub fn axis_angle(index: usize, axes: usize) -> f64 {
    if axes == 0 {
        return FRAC_PI_2;
    }
    FRAC_PI_2 - TAU * (index as f64) / (axes as f64)
}

pub fn axis_point(index: usize, axes: usize, distance: f64) -> (f64, f64) {
    let angle = axis_angle(index, axes);
    (angle.cos() * distance, angle.sin() * distance)
}

/// Vertices of the data polygon, one per axis, values clamped to `0..=scale`.
pub fn polygon_points(values: &[f64], scale: f64, radius: f64) -> Vec<(f64, f64)> {
    let axes = values.len();
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let ratio = if scale > 0.0 && value.is_finite() {
                (value / scale).clamp(0.0, 1.0)
            } else {
                0.0
            };
            axis_point(i, axes, ratio * radius)
        })
        .collect()
}

/// Vertices of grid ring `ring` (1-based, `RING_COUNT` is the outer ring).
pub fn ring_points(axes: usize, ring: usize, radius: f64) -> Vec<(f64, f64)> {
    let distance = radius * (ring as f64) / (RING_COUNT as f64);
    (0..axes).map(|i| axis_point(i, axes, distance)).collect()
}

/// Closed outline segments through `points`.
pub fn outline(points: &[(f64, f64)]) -> Vec<((f64, f64), (f64, f64))> {
    if points.len() < 2 {
        return Vec::new();
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| (*a, *b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn first_axis_points_up_and_second_runs_clockwise() {
        assert!(close(axis_point(0, 4, 1.0), (0.0, 1.0)));
        assert!(close(axis_point(1, 4, 1.0), (1.0, 0.0)));
        assert!(close(axis_point(2, 4, 1.0), (0.0, -1.0)));
    }

    #[test]
    fn scale_never_drops_below_one_hundred() {
        let mut attrs = BTreeMap::new();
        attrs.insert("pace".to_string(), 40.0);
        assert_eq!(RadarSeries::from_attributes(&attrs).scale(), 100.0);
        attrs.insert("rating".to_string(), 140.0);
        assert_eq!(RadarSeries::from_attributes(&attrs).scale(), 140.0);
    }

    #[test]
    fn values_are_clamped_to_the_outer_ring() {
        let points = polygon_points(&[200.0, -5.0], 100.0, 10.0);
        assert!(close(points[0], (0.0, 10.0)));
        assert!(close(points[1], (0.0, 0.0)));
    }

    #[test]
    fn outline_closes_the_polygon() {
        let pts = ring_points(3, RING_COUNT, 1.0);
        let segments = outline(&pts);
        assert_eq!(segments.len(), 3);
        assert!(close(segments[2].1, pts[0]));
    }
}
