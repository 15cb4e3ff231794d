/// High-level lifecycle states shown in the lab header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseView {
    Idle,
    Running,
    Paused,
    Finished,
}

/// A single log entry shown in the event panel.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub level: &'static str,
    pub message: String,
}

/// Full snapshot rendered by the lab screen.
#[derive(Debug, Clone)]
pub struct LabView {
    pub phase: PhaseView,
    pub epoch: usize,
    pub target_epochs: usize,
    pub learning_rate: f64,
    /// Current fit as (weight, bias), once a run has started.
    pub model: Option<(f64, f64)>,
    /// Loss of the most recent epoch.
    pub loss: Option<f64>,
    /// The sample scatter, as chart-ready (x, y) pairs.
    pub points: Vec<(f64, f64)>,
    /// Ground-truth line as (weight, bias).
    pub true_line: Option<(f64, f64)>,
    /// Loss per epoch, as chart-ready (epoch, loss) pairs.
    pub loss_history: Vec<(f64, f64)>,
    pub logs: Vec<LogLine>,
}
