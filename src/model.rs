use rand::Rng;

/// The mutable (weight, bias) pair being fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModel {
    pub weight: f64,
    pub bias: f64,
}

impl LinearModel {
    pub fn new(weight: f64, bias: f64) -> Self {
        Self { weight, bias }
    }

    /// Initializes both parameters with independent uniform draws in [0, 1),
    /// weight first.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            weight: rng.random(),
            bias: rng.random(),
        }
    }

    /// Predicted y for the given x.
    pub fn predict(&self, x: f64) -> f64 {
        self.weight * x + self.bias
    }
}
