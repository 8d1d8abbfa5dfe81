use thiserror::Error;

/// Failures raised by the persistence collaborators (request store and
/// balance ledger). A lookup miss is NOT an error anywhere in this core:
/// missing rows resolve to defaults and the operation continues.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("backend failure: {0}")]
    Backend(String),
    #[error("decode failure: {0}")]
    Decode(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Swallowed-failure taxonomy for the two workflow entry points. The entry
/// points never propagate these; they are logged, audited, and recorded on
/// the receipt so callers and tests can see which collaborator failed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("request store failure: {0}")]
    Store(StoreError),
    #[error("balance ledger failure: {0}")]
    Ledger(StoreError),
    #[error("notification failure: {0}")]
    Notify(#[from] NotifyError),
}

impl WorkflowError {
    /// Stable label used in audit metadata and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Store(_) => "store",
            Self::Ledger(_) => "ledger",
            Self::Notify(_) => "notify",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NotifyError, StoreError, WorkflowError};

    #[test]
    fn workflow_error_kinds_name_the_failed_collaborator() {
        assert_eq!(WorkflowError::Store(StoreError::Backend("down".into())).kind(), "store");
        assert_eq!(WorkflowError::Ledger(StoreError::Decode("bad row".into())).kind(), "ledger");
        assert_eq!(
            WorkflowError::from(NotifyError::Transport("timeout".into())).kind(),
            "notify"
        );
    }

    #[test]
    fn errors_render_their_collaborator_and_cause() {
        let error = WorkflowError::Ledger(StoreError::Backend("database locked".into()));
        assert_eq!(error.to_string(), "balance ledger failure: backend failure: database locked");
    }
}
