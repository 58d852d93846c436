//! Progress snapshot published for each session.

use serde::{Deserialize, Serialize};

/// Coarse session status.
///
/// `Start`, `Processing` and `Complete` are derived from the percentage.
/// `Failed` is only ever written explicitly when a pipeline aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Start,
    Processing,
    Complete,
    Failed,
}

impl ProgressStatus {
    /// Derive the status from a completion percentage.
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage <= 0.0 {
            ProgressStatus::Start
        } else if percentage >= 100.0 {
            ProgressStatus::Complete
        } else {
            ProgressStatus::Processing
        }
    }
}

impl std::fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressStatus::Start => write!(f, "start"),
            ProgressStatus::Processing => write!(f, "processing"),
            ProgressStatus::Complete => write!(f, "complete"),
            ProgressStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Latest known progress for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Message type tag for polling clients.
    #[serde(rename = "type")]
    pub kind: String,
    pub status: ProgressStatus,
    pub message: String,
    /// Completion percentage in [0, 100].
    pub percentage: f64,
    pub current_step: String,
    pub estimated_time_left: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    /// Unix timestamp (seconds) of the write.
    pub timestamp: i64,
}

/// Value of the `type` field on every snapshot.
pub const PROCESS_UPDATE: &str = "process_update";

impl ProgressSnapshot {
    /// Build a snapshot whose status is derived from `percentage`.
    pub fn new(
        session_id: impl Into<String>,
        percentage: f64,
        message: impl Into<String>,
        current_step: impl Into<String>,
    ) -> Self {
        let percentage = clamp_percentage(percentage);
        Self {
            kind: PROCESS_UPDATE.to_string(),
            status: ProgressStatus::from_percentage(percentage),
            message: message.into(),
            percentage,
            current_step: current_step.into(),
            estimated_time_left: estimate_time_left(percentage),
            session_id: session_id.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Build a failed terminal snapshot.
    pub fn failed(
        session_id: impl Into<String>,
        percentage: f64,
        message: impl Into<String>,
        current_step: impl Into<String>,
    ) -> Self {
        Self {
            status: ProgressStatus::Failed,
            estimated_time_left: "Failed".to_string(),
            ..Self::new(session_id, percentage, message, current_step)
        }
    }
}

/// Bound a percentage to [0, 100]; NaN counts as 0.
pub fn clamp_percentage(percentage: f64) -> f64 {
    if percentage.is_nan() {
        0.0
    } else {
        percentage.clamp(0.0, 100.0)
    }
}

/// Coarse linear projection: one minute per remaining 10%.
pub fn estimate_time_left(percentage: f64) -> String {
    let percentage = clamp_percentage(percentage);
    if percentage >= 100.0 {
        return "Completed".to_string();
    }

    let remaining_minutes = (100.0 - percentage) / 10.0;
    if remaining_minutes < 1.0 {
        "Less than a minute".to_string()
    } else {
        format!("About {} minutes", remaining_minutes.round() as u64)
    }
}
