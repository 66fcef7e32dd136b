//! Step progress events

use tokio::sync::mpsc;

/// Where a step currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Probing,
    AlreadyPresent,
    Installing,
    Verifying,
    Installed,
    /// Optional step failed; the branch carries on.
    Warning,
    Failed,
    /// Not attempted because an earlier critical step failed.
    Skipped,
    /// The configuration document was seeded or left alone.
    Seeded,
}

impl StepPhase {
    /// Whether no further event follows for this step.
    pub fn is_final(self) -> bool {
        !matches!(self, Self::Probing | Self::Installing | Self::Verifying)
    }
}

/// One progress update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallProgress {
    pub step: &'static str,
    pub phase: StepPhase,
    pub message: String,
}

impl InstallProgress {
    pub fn new(step: &'static str, phase: StepPhase, message: impl Into<String>) -> Self {
        Self {
            step,
            phase,
            message: message.into(),
        }
    }
}

/// Optional sink for [`InstallProgress`] events.
///
/// Every event is also logged, so a run without a listener still leaves a
/// trail at `info` level.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    tx: Option<mpsc::Sender<InstallProgress>>,
}

impl Progress {
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn channel(tx: mpsc::Sender<InstallProgress>) -> Self {
        Self { tx: Some(tx) }
    }

    pub async fn emit(&self, step: &'static str, phase: StepPhase, message: impl Into<String>) {
        let event = InstallProgress::new(step, phase, message);
        match phase {
            StepPhase::Failed => log::error!("[{step}] {}", event.message),
            StepPhase::Warning => log::warn!("[{step}] {}", event.message),
            _ => log::info!("[{step}] {}", event.message),
        }

        if let Some(tx) = &self.tx {
            // A closed receiver only means nobody is watching any more.
            let _ = tx.send(event).await;
        }
    }
}
