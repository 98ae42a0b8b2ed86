use serde::{Deserialize, Serialize};

/// Lifecycle of a broadcast signature:
/// `Submitted -> Pending -> {Finalized | Failed | TimedOut}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    Submitted,
    Pending,
    Finalized,
    Failed,
    /// Attempt budget exhausted. The transaction may still land later.
    TimedOut,
}

impl ConfirmationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConfirmationStatus::Finalized | ConfirmationStatus::Failed | ConfirmationStatus::TimedOut
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationResult {
    pub signature: String,
    pub status: ConfirmationStatus,
    pub attempts_used: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConfirmationResult {
    pub fn submitted(signature: String) -> Self {
        Self {
            signature,
            status: ConfirmationStatus::Submitted,
            attempts_used: 0,
            error: None,
        }
    }

    pub fn pending(mut self, attempts_used: u32) -> Self {
        self.status = ConfirmationStatus::Pending;
        self.attempts_used = attempts_used;
        self
    }

    pub fn finalized(mut self) -> Self {
        self.status = ConfirmationStatus::Finalized;
        self
    }

    pub fn failed(mut self, error: String) -> Self {
        self.status = ConfirmationStatus::Failed;
        self.error = Some(error);
        self
    }

    pub fn timed_out(mut self) -> Self {
        self.status = ConfirmationStatus::TimedOut;
        self
    }

    pub fn is_finalized(&self) -> bool {
        self.status == ConfirmationStatus::Finalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        let result = ConfirmationResult::submitted("sig123".to_string());
        assert_eq!(result.status, ConfirmationStatus::Submitted);
        assert!(!result.status.is_terminal());

        let result = result.pending(3);
        assert_eq!(result.status, ConfirmationStatus::Pending);
        assert_eq!(result.attempts_used, 3);
        assert!(!result.status.is_terminal());

        let done = result.clone().finalized();
        assert!(done.is_finalized());
        assert!(done.status.is_terminal());

        let failed = result.clone().failed("InstructionError(2, Custom(6001))".to_string());
        assert_eq!(failed.status, ConfirmationStatus::Failed);
        assert!(failed.error.is_some());

        let timed_out = result.timed_out();
        assert_eq!(timed_out.status, ConfirmationStatus::TimedOut);
        assert!(!timed_out.is_finalized());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ConfirmationStatus::TimedOut).unwrap();
        assert_eq!(json, r#""timed_out""#);
    }
}
