pub mod config;
pub mod data;
pub mod error;
pub mod event;
pub mod model;
pub mod optim;
pub mod scheduler;
pub mod session;

pub use config::RunConfig;
pub use data::{Point, Sample, TrueLine};
pub use error::{Result, TrainError};
pub use event::{Observation, TrainingEvent};
pub use model::LinearModel;
pub use optim::GradientDescent;
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
pub use session::{Phase, Trainer};
