pub mod audit;
pub mod config;
pub mod deadline;
pub mod decision;
pub mod domain;
pub mod errors;
pub mod notifications;
pub mod store;
pub mod workflow;

pub use audit::{AuditCategory, AuditEvent, AuditOutcome, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use config::{AppConfig, ConfigError, LoadOptions};
pub use deadline::{days_until_start, DeadlineCheck, DeadlinePolicy};
pub use decision::{
    decide_status_edit, decide_submission, BalanceMutation, EditDecision, EditedStatus,
    SubmissionDecision,
};
pub use domain::employee::{BalanceSnapshot, EmployeeBalance, EmployeeId};
pub use domain::request::{
    AbsenceClass, PtoRequest, RequestId, RequestIntake, RequestStatus,
};
pub use errors::{NotifyError, StoreError, WorkflowError};
pub use notifications::{
    InMemoryNotificationDispatcher, NotificationDispatcher, NotificationIntent, NoticeKind,
    Recipient, RequestSummary,
};
pub use store::{BalanceLedger, InMemoryBalanceLedger, InMemoryRequestStore, RequestStore};
pub use workflow::{EditReceipt, IgnoredReason, PtoWorkflow, SubmitReceipt};
