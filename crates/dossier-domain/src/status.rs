//! Record status state machine

use serde::{Deserialize, Serialize};

/// Lifecycle status of a record
///
/// Status advances monotonically through the processing pipeline; `Failed`
/// is a sink reachable from any non-terminal state. Records created by the
/// upload endpoint start at `Uploaded`; `Pending` exists for wire
/// compatibility with clients that poll before the upload completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// Created but no files registered yet
    Pending,

    /// Files uploaded and persisted; ready for analysis
    Uploaded,

    /// Analysis request in flight
    Analyzing,

    /// Structured result stored; summary not yet rendered
    Analyzed,

    /// Result and rendered summary both stored
    Completed,

    /// Processing failed; `error_message` carries the cause
    Failed,
}

impl RecordStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Pending => "pending",
            RecordStatus::Uploaded => "uploaded",
            RecordStatus::Analyzing => "analyzing",
            RecordStatus::Analyzed => "analyzed",
            RecordStatus::Completed => "completed",
            RecordStatus::Failed => "failed",
        }
    }

    /// Position of this status in the forward progression
    fn rank(&self) -> u8 {
        match self {
            RecordStatus::Pending => 0,
            RecordStatus::Uploaded => 1,
            RecordStatus::Analyzing => 2,
            RecordStatus::Analyzed => 3,
            RecordStatus::Completed => 4,
            RecordStatus::Failed => 5,
        }
    }

    /// Whether a transition from `self` to `next` respects the state machine
    ///
    /// Forward movement only, except that `Failed` is reachable from any
    /// state that is not already terminal.
    pub fn can_advance_to(&self, next: RecordStatus) -> bool {
        if *self == RecordStatus::Completed || *self == RecordStatus::Failed {
            return false;
        }
        if next == RecordStatus::Failed {
            return true;
        }
        next.rank() > self.rank()
    }

    /// Whether this status is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, RecordStatus::Completed | RecordStatus::Failed)
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_progression_allowed() {
        assert!(RecordStatus::Uploaded.can_advance_to(RecordStatus::Analyzing));
        assert!(RecordStatus::Analyzing.can_advance_to(RecordStatus::Analyzed));
        assert!(RecordStatus::Analyzed.can_advance_to(RecordStatus::Completed));
        // Skipping intermediate states is still forward movement
        assert!(RecordStatus::Uploaded.can_advance_to(RecordStatus::Completed));
    }

    #[test]
    fn test_backward_progression_rejected() {
        assert!(!RecordStatus::Analyzed.can_advance_to(RecordStatus::Uploaded));
        assert!(!RecordStatus::Analyzing.can_advance_to(RecordStatus::Pending));
    }

    #[test]
    fn test_failed_reachable_from_active_states() {
        assert!(RecordStatus::Uploaded.can_advance_to(RecordStatus::Failed));
        assert!(RecordStatus::Analyzing.can_advance_to(RecordStatus::Failed));
        assert!(!RecordStatus::Completed.can_advance_to(RecordStatus::Failed));
        assert!(!RecordStatus::Failed.can_advance_to(RecordStatus::Failed));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&RecordStatus::Uploaded).unwrap();
        assert_eq!(json, "\"uploaded\"");
        let parsed: RecordStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, RecordStatus::Completed);
    }
}
