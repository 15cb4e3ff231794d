use crate::data::Sample;
use crate::model::LinearModel;

/// One completed epoch: post-increment index, post-update parameters,
/// pre-update loss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub epoch: usize,
    pub weight: f64,
    pub bias: f64,
    pub loss: f64,
}

/// Lifecycle notifications pushed to subscribers.
///
/// `Started` carries everything a renderer needs up front: the immutable
/// sample (with its true line) and the freshly initialized model.
#[derive(Debug, Clone)]
pub enum TrainingEvent {
    Started {
        sample: Sample,
        model: LinearModel,
        target_epochs: usize,
    },
    Epoch(Observation),
    Paused,
    Resumed,
    Completed,
    Reset,
}
