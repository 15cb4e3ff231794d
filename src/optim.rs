use crate::data::Sample;
use crate::model::LinearModel;

/// Full-batch gradient descent on mean squared error.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f64,
}

impl GradientDescent {
    /// Creates a new `GradientDescent` optimizer.
    ///
    /// The learning rate is accepted mechanically; zero or non-finite values
    /// converge degenerately but are not errors here.
    ///
    /// # Arguments
    /// * `learning_rate` - The coefficient that modulates the update size.
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }

    /// Runs one epoch: accumulates the gradient over the whole sample, then
    /// updates the model in place.
    ///
    /// The sample must be non-empty; callers guard this (the mean divides by
    /// its length).
    ///
    /// # Returns
    /// The mean squared error measured before the update.
    pub fn step(&self, model: &mut LinearModel, sample: &Sample) -> f64 {
        let n = sample.len() as f64;

        let mut dw = 0.0;
        let mut db = 0.0;
        let mut total_loss = 0.0;

        for point in sample.points() {
            let error = model.predict(point.x) - point.y;
            dw += point.x * error;
            db += error;
            total_loss += error * error;
        }

        dw *= 2.0 / n;
        db *= 2.0 / n;

        model.weight -= self.learning_rate * dw;
        model.bias -= self.learning_rate * db;

        total_loss / n
    }
}
