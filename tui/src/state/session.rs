use std::io;
use std::time::Duration;

use descent_lab::{RunConfig, Sample, TokioScheduler, Trainer, TrainingEvent, TrueLine};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use super::model::{LabView, LogLine, PhaseView};

const MAX_LOGS: usize = 200;

/// Owns one training session and drives the lab screen state from its
/// stream of [`TrainingEvent`]s.
///
/// The runtime is held for the lifetime of the lab screen; dropping it
/// tears down any tick still waiting on a timer.
pub struct SessionState {
    _runtime: Runtime,
    trainer: Trainer<TokioScheduler>,
    events: mpsc::UnboundedReceiver<TrainingEvent>,
    rng: StdRng,
    cfg: RunConfig,
    sample: Option<Sample>,
    view: LabView,
}

impl SessionState {
    /// Creates a session from a validated config, spinning up a dedicated
    /// runtime for the epoch timers.
    ///
    /// # Errors
    /// Returns an error if the runtime cannot be created.
    pub fn new(cfg: RunConfig) -> io::Result<Self> {
        let runtime = Runtime::new()?;
        let scheduler = TokioScheduler::new(runtime.handle().clone());
        let trainer = Trainer::with_scheduler(
            scheduler,
            Duration::from_millis(cfg.epoch_delay_ms),
            cfg.seed,
        );
        let events = trainer.subscribe();

        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let view = LabView {
            phase: PhaseView::Idle,
            epoch: 0,
            target_epochs: cfg.epochs,
            learning_rate: cfg.learning_rate,
            model: None,
            loss: None,
            points: Vec::new(),
            true_line: None,
            loss_history: Vec::new(),
            logs: vec![LogLine {
                level: "INFO",
                message: "press s to start training".into(),
            }],
        };

        Ok(Self {
            _runtime: runtime,
            trainer,
            events,
            rng,
            cfg,
            sample: None,
            view,
        })
    }

    /// Returns the current snapshot for rendering.
    pub fn view(&self) -> &LabView {
        &self.view
    }

    /// Drains all pending events and updates state. Non-blocking.
    ///
    /// Should be called once per TUI frame tick.
    pub fn tick(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
        }
    }

    /// Starts a fresh run over a newly drawn sample.
    pub fn start(&mut self) {
        let line = TrueLine::new(self.cfg.true_weight, self.cfg.true_bias);
        let sample = Sample::generate(self.cfg.sample_size, line, &mut self.rng);
        if let Err(e) = self
            .trainer
            .start(sample, self.cfg.learning_rate, self.cfg.epochs)
        {
            self.push_log("ERROR", e.to_string());
        }
    }

    pub fn pause(&mut self) {
        self.trainer.pause();
    }

    /// Resumes with the sample of the paused run, training for whatever is
    /// left of the configured epoch count.
    pub fn resume(&mut self) {
        let Some(sample) = self.sample.clone() else {
            return;
        };
        let remaining = self
            .cfg
            .epochs
            .saturating_sub(self.trainer.completed_epochs());
        if let Err(e) = self
            .trainer
            .resume(sample, self.cfg.learning_rate, remaining)
        {
            self.push_log("ERROR", e.to_string());
        }
    }

    pub fn reset(&mut self) {
        self.trainer.reset();
    }

    fn apply(&mut self, event: TrainingEvent) {
        match event {
            TrainingEvent::Started {
                sample,
                model,
                target_epochs,
            } => {
                self.view.phase = PhaseView::Running;
                self.view.epoch = 0;
                self.view.target_epochs = target_epochs;
                self.view.model = Some((model.weight, model.bias));
                self.view.loss = None;
                self.view.points = sample.points().iter().map(|p| (p.x, p.y)).collect();
                let line = sample.true_line();
                self.view.true_line = Some((line.weight, line.bias));
                self.view.loss_history.clear();
                self.push_log(
                    "INFO",
                    format!(
                        "started: {} points, target {target_epochs} epochs",
                        sample.len()
                    ),
                );
                self.sample = Some(sample);
            }

            TrainingEvent::Epoch(obs) => {
                self.view.epoch = obs.epoch;
                self.view.model = Some((obs.weight, obs.bias));
                self.view.loss = Some(obs.loss);
                self.view.loss_history.push((obs.epoch as f64, obs.loss));
                self.push_log("INFO", format!("epoch {}: loss={:.4}", obs.epoch, obs.loss));
            }

            TrainingEvent::Paused => {
                self.view.phase = PhaseView::Paused;
                self.push_log("INFO", format!("paused at epoch {}", self.view.epoch));
            }

            TrainingEvent::Resumed => {
                self.view.phase = PhaseView::Running;
                self.push_log("INFO", "resumed".into());
            }

            TrainingEvent::Completed => {
                self.view.phase = PhaseView::Finished;
                self.push_log(
                    "INFO",
                    format!("training complete after {} epochs", self.view.epoch),
                );
            }

            TrainingEvent::Reset => {
                self.view.phase = PhaseView::Idle;
                self.view.epoch = 0;
                self.view.model = None;
                self.view.loss = None;
                self.view.loss_history.clear();
                self.push_log("INFO", "session reset".into());
            }
        }
    }

    fn push_log(&mut self, level: &'static str, message: String) {
        self.view.logs.push(LogLine { level, message });
        if self.view.logs.len() > MAX_LOGS {
            let drain = self.view.logs.len() - MAX_LOGS;
            self.view.logs.drain(0..drain);
        }
    }
}
