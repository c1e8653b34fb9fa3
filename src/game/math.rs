use super::types::Point;
use rand::Rng;

pub fn distance(a: Point, b: Point) -> f64 {
  (a.x - b.x).hypot(a.y - b.y)
}

pub fn within(a: Point, b: Point, threshold: f64) -> bool {
  distance(a, b) < threshold
}

/// Inclusive bounds check against `[0, width] x [0, height]`.
pub fn in_bounds(point: Point, width: f64, height: f64) -> bool {
  point.x >= 0.0 && point.x <= width && point.y >= 0.0 && point.y <= height
}

/// Uniform point in `[inset, width - inset] x [inset, height - inset]`.
pub fn random_point<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64, inset: f64) -> Point {
  Point::new(sample_axis(rng, width, inset), sample_axis(rng, height, inset))
}

fn sample_axis<R: Rng + ?Sized>(rng: &mut R, extent: f64, inset: f64) -> f64 {
  let low = inset.max(0.0);
  let high = extent - low;
  if high <= low {
    return extent / 2.0;
  }
  rng.gen_range(low..=high)
}
