use std::num::NonZeroUsize;

use rand::Rng;

/// One (x, y) observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// The ground-truth line a sample is generated around.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrueLine {
    pub weight: f64,
    pub bias: f64,
}

impl TrueLine {
    pub fn new(weight: f64, bias: f64) -> Self {
        Self { weight, bias }
    }

    /// Evaluates the line at `x`.
    pub fn at(&self, x: f64) -> f64 {
        self.weight * x + self.bias
    }
}

/// A fixed synthetic dataset, generated once per training run and immutable
/// thereafter. Carries the line it was generated from so the reference line
/// travels with the data it explains.
#[derive(Debug, Clone)]
pub struct Sample {
    points: Vec<Point>,
    true_line: TrueLine,
}

impl Sample {
    /// Draws a fresh noisy sample along `line`.
    ///
    /// Points sit on a fixed grid x = i / 10 for i in [0, size), in ascending
    /// order; each y is perturbed by an independent uniform noise value in
    /// [-0.5, 0.5). Every call consumes fresh draws from `rng`.
    ///
    /// # Arguments
    /// * `size` - Number of points to generate.
    /// * `line` - The ground-truth slope and intercept.
    /// * `rng` - Noise source.
    pub fn generate<R: Rng + ?Sized>(size: NonZeroUsize, line: TrueLine, rng: &mut R) -> Self {
        let points = (0..size.get())
            .map(|i| {
                let x = i as f64 / 10.0;
                let noise = rng.random::<f64>() - 0.5;
                Point {
                    x,
                    y: line.at(x) + noise,
                }
            })
            .collect();

        Self {
            points,
            true_line: line,
        }
    }

    /// Wraps hand-built points. Emptiness is tolerated here and rejected by
    /// the trainer at start/resume.
    pub fn from_points(points: Vec<Point>, true_line: TrueLine) -> Self {
        Self { points, true_line }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn true_line(&self) -> TrueLine {
        self.true_line
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn exact_length_and_grid() {
        const SIZE: usize = 50;
        let mut rng = seeded_rng();
        let line = TrueLine::new(2.0, 1.0);

        let sample = Sample::generate(size(SIZE), line, &mut rng);

        assert_eq!(sample.len(), SIZE);
        for (i, point) in sample.points().iter().enumerate() {
            assert_eq!(point.x, i as f64 / 10.0);
        }
    }

    #[test]
    fn x_strictly_increasing() {
        let mut rng = seeded_rng();
        let sample = Sample::generate(size(20), TrueLine::new(-1.5, 3.0), &mut rng);

        for pair in sample.points().windows(2) {
            assert!(pair[0].x < pair[1].x);
        }
    }

    #[test]
    fn noise_stays_in_band() {
        let mut rng = seeded_rng();
        let line = TrueLine::new(2.0, 1.0);

        let sample = Sample::generate(size(200), line, &mut rng);

        for point in sample.points() {
            let ideal = line.at(point.x);
            assert!(point.y >= ideal - 0.5, "y below band at x={}", point.x);
            assert!(point.y < ideal + 0.5, "y above band at x={}", point.x);
        }
    }

    #[test]
    fn fresh_draws_per_call() {
        let mut rng = seeded_rng();
        let line = TrueLine::new(0.5, -2.0);

        let first = Sample::generate(size(10), line, &mut rng);
        let second = Sample::generate(size(10), line, &mut rng);

        let identical = first
            .points()
            .iter()
            .zip(second.points())
            .all(|(a, b)| a.y == b.y);
        assert!(!identical, "two generate calls reused the same noise");
    }

    #[test]
    fn carries_its_line() {
        let mut rng = seeded_rng();
        let line = TrueLine::new(2.0, 1.0);

        let sample = Sample::generate(size(5), line, &mut rng);
        assert_eq!(sample.true_line(), line);
    }

    #[test]
    fn from_points_allows_empty() {
        let sample = Sample::from_points(Vec::new(), TrueLine::new(1.0, 0.0));
        assert!(sample.is_empty());
        assert_eq!(sample.len(), 0);
    }
}
