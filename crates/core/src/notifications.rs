use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::employee::BalanceSnapshot;
use crate::domain::request::{PtoRequest, RequestId};
use crate::errors::NotifyError;

/// Who a notice is addressed to. The engine resolves the concrete address:
/// employees through the ledger email lookup, the manager from configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    Employee,
    Manager,
}

/// Structured notification payloads. The core decides which notice fires and
/// what data it carries; wording and layout belong to the dispatching side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoticeKind {
    SubmissionReceived,
    NewRequestPending { balance: BalanceSnapshot },
    DeadlineViolation { reason: String },
    DeadlineAlert { reason: String },
    Approved,
    Denied,
    NeedsInfo,
    BalanceShortfall { requested: Decimal, remaining: Decimal, shortfall: Decimal },
}

/// Request fields every notice needs for rendering, denormalized so the
/// dispatcher never has to read the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestSummary {
    pub request_id: RequestId,
    pub employee_name: String,
    pub absence_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hours_requested: Decimal,
}

impl RequestSummary {
    pub fn of(request: &PtoRequest) -> Self {
        Self {
            request_id: request.id.clone(),
            employee_name: request.employee_name.clone(),
            absence_type: request.absence_type.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            hours_requested: request.hours_requested,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotificationIntent {
    pub recipient: Recipient,
    pub kind: NoticeKind,
    pub request: RequestSummary,
}

impl NotificationIntent {
    pub fn employee(kind: NoticeKind, request: &PtoRequest) -> Self {
        Self { recipient: Recipient::Employee, kind, request: RequestSummary::of(request) }
    }

    pub fn manager(kind: NoticeKind, request: &PtoRequest) -> Self {
        Self { recipient: Recipient::Manager, kind, request: RequestSummary::of(request) }
    }
}

/// Delivery seam. Fire-and-forget from the engine's viewpoint: a transport
/// failure is logged and swallowed by the caller, never retried.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, to: &str, intent: &NotificationIntent) -> Result<(), NotifyError>;
}

#[derive(Clone, Default)]
pub struct InMemoryNotificationDispatcher {
    sent: Arc<Mutex<Vec<(String, NotificationIntent)>>>,
}

impl InMemoryNotificationDispatcher {
    pub fn sent(&self) -> Vec<(String, NotificationIntent)> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl NotificationDispatcher for InMemoryNotificationDispatcher {
    async fn send(&self, to: &str, intent: &NotificationIntent) -> Result<(), NotifyError> {
        match self.sent.lock() {
            Ok(mut sent) => sent.push((to.to_string(), intent.clone())),
            Err(poisoned) => poisoned.into_inner().push((to.to_string(), intent.clone())),
        }
        Ok(())
    }
}

/// Test dispatcher that refuses every send, for exercising the swallowed
/// notify-error path.
#[derive(Clone, Default)]
pub struct FailingNotificationDispatcher;

#[async_trait]
impl NotificationDispatcher for FailingNotificationDispatcher {
    async fn send(&self, _to: &str, _intent: &NotificationIntent) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("dispatcher unavailable".to_string()))
    }
}
