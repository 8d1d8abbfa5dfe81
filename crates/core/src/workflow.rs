//! Event-triggered orchestration around the pure decisions. The two entry
//! points here are the only ways into the core, and they are infallible by
//! contract: collaborator failures are logged, audited, and recorded on the
//! returned receipt, never propagated back to the trigger source. Ordering
//! inside a transition is mutation, then persist, then notify; there is no
//! rollback across those steps.

use chrono::Utc;

use crate::audit::{AuditCategory, AuditEvent, AuditOutcome, AuditSink};
use crate::deadline::DeadlinePolicy;
use crate::decision::{decide_status_edit, decide_submission, EditedStatus};
use crate::domain::request::{PtoRequest, RequestId, RequestIntake, RequestStatus};
use crate::errors::WorkflowError;
use crate::notifications::{NotificationDispatcher, NotificationIntent, Recipient};
use crate::store::{BalanceLedger, RequestStore};

const ACTOR: &str = "pto-workflow";

#[derive(Clone, Debug, PartialEq)]
pub struct SubmitReceipt {
    pub request_id: RequestId,
    /// `None` when a collaborator failure stopped the event before the
    /// request row was persisted.
    pub status: Option<RequestStatus>,
    pub notices_sent: usize,
    pub errors: Vec<WorkflowError>,
}

/// Why a status edit produced no transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoredReason {
    UnknownRequest,
    UnrecognizedStatus,
    TerminalState,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditReceipt {
    pub request_id: RequestId,
    pub status: Option<RequestStatus>,
    pub ignored: Option<IgnoredReason>,
    pub notices_sent: usize,
    pub errors: Vec<WorkflowError>,
}

pub struct PtoWorkflow<S, L, N, A> {
    store: S,
    ledger: L,
    notifier: N,
    audit: A,
    policy: DeadlinePolicy,
    manager_email: String,
}

impl<S, L, N, A> PtoWorkflow<S, L, N, A>
where
    S: RequestStore,
    L: BalanceLedger,
    N: NotificationDispatcher,
    A: AuditSink,
{
    pub fn new(
        store: S,
        ledger: L,
        notifier: N,
        audit: A,
        policy: DeadlinePolicy,
        manager_email: impl Into<String>,
    ) -> Self {
        Self { store, ledger, notifier, audit, policy, manager_email: manager_email.into() }
    }

    /// Submission trigger. Deadline-violating requests land in
    /// LateSubmission, everything else in Pending; both paths persist the
    /// row and notify employee and manager.
    pub async fn on_submit(&self, intake: RequestIntake) -> SubmitReceipt {
        let now = Utc::now();
        let mut request = intake.into_request(now);
        let mut errors = Vec::new();

        let balance = match self.ledger.get_balance(&request.employee_id).await {
            Ok(balance) => balance,
            Err(error) => {
                self.swallow(Some(&request.id), WorkflowError::Ledger(error), &mut errors);
                return SubmitReceipt {
                    request_id: request.id,
                    status: None,
                    notices_sent: 0,
                    errors,
                };
            }
        };

        let decision = decide_submission(&request, &balance, &self.policy, now);
        request.status = decision.status;

        if let Err(error) = self.store.save(request.clone()).await {
            self.swallow(Some(&request.id), WorkflowError::Store(error), &mut errors);
            return SubmitReceipt { request_id: request.id, status: None, notices_sent: 0, errors };
        }

        let (event_type, outcome) = match decision.status {
            RequestStatus::LateSubmission => ("request.deadline_rejected", AuditOutcome::Rejected),
            _ => ("request.submitted", AuditOutcome::Success),
        };
        self.audit.emit(
            AuditEvent::new(
                Some(request.id.clone()),
                event_type,
                AuditCategory::Intake,
                ACTOR,
                outcome,
            )
            .with_metadata("status", decision.status.to_string())
            .with_metadata("absence_type", request.absence_type.clone()),
        );

        let notices_sent = self.dispatch(&request, &decision.notifications, &mut errors).await;

        SubmitReceipt {
            request_id: request.id,
            status: Some(decision.status),
            notices_sent,
            errors,
        }
    }

    /// Manager status-edit trigger. Unknown requests, unrecognized edited
    /// values, and edits against terminal states are ignored no-ops; the
    /// receipt says which.
    pub async fn on_status_edit(&self, request_id: &RequestId, edited_value: &str) -> EditReceipt {
        let mut errors = Vec::new();

        let mut request = match self.store.find_by_id(request_id).await {
            Ok(Some(request)) => request,
            Ok(None) => {
                tracing::warn!(request_id = %request_id.0, "status edit for unknown request");
                return self.ignored(request_id, IgnoredReason::UnknownRequest, errors);
            }
            Err(error) => {
                self.swallow(Some(request_id), WorkflowError::Store(error), &mut errors);
                return EditReceipt {
                    request_id: request_id.clone(),
                    status: None,
                    ignored: None,
                    notices_sent: 0,
                    errors,
                };
            }
        };

        let Some(edited) = EditedStatus::parse(edited_value) else {
            return self.ignored(request_id, IgnoredReason::UnrecognizedStatus, errors);
        };

        let balance = match self.ledger.get_balance(&request.employee_id).await {
            Ok(balance) => balance,
            Err(error) => {
                self.swallow(Some(request_id), WorkflowError::Ledger(error), &mut errors);
                return EditReceipt {
                    request_id: request_id.clone(),
                    status: None,
                    ignored: None,
                    notices_sent: 0,
                    errors,
                };
            }
        };

        let Some(decision) = decide_status_edit(&request, edited, &balance) else {
            return self.ignored(request_id, IgnoredReason::TerminalState, errors);
        };

        if let Some(mutation) = &decision.mutation {
            if let Err(error) =
                self.ledger.apply_approval(&mutation.employee_id, mutation.hours).await
            {
                self.swallow(Some(request_id), WorkflowError::Ledger(error), &mut errors);
                return EditReceipt {
                    request_id: request_id.clone(),
                    status: None,
                    ignored: None,
                    notices_sent: 0,
                    errors,
                };
            }
            self.audit.emit(
                AuditEvent::new(
                    Some(request_id.clone()),
                    "balance.applied",
                    AuditCategory::Ledger,
                    ACTOR,
                    AuditOutcome::Success,
                )
                .with_metadata("employee_id", mutation.employee_id.0.clone())
                .with_metadata("hours", mutation.hours.to_string()),
            );
        }

        let previous = request.status;
        request.status = decision.new_status;
        if decision.sets_decision_at {
            request.decision_at = Some(Utc::now());
        }

        if let Err(error) = self.store.save(request.clone()).await {
            self.swallow(Some(request_id), WorkflowError::Store(error), &mut errors);
            return EditReceipt {
                request_id: request_id.clone(),
                status: None,
                ignored: None,
                notices_sent: 0,
                errors,
            };
        }

        let (event_type, outcome) = match decision.new_status {
            RequestStatus::Approved => ("request.approved", AuditOutcome::Success),
            RequestStatus::Denied => ("request.denied", AuditOutcome::Success),
            RequestStatus::NeedsInfo => ("request.needs_info", AuditOutcome::Success),
            RequestStatus::InsufficientBalance => {
                ("request.balance_rejected", AuditOutcome::Rejected)
            }
            _ => ("request.status_edited", AuditOutcome::Success),
        };
        self.audit.emit(
            AuditEvent::new(
                Some(request_id.clone()),
                event_type,
                AuditCategory::Decision,
                ACTOR,
                outcome,
            )
            .with_metadata("from", previous.to_string())
            .with_metadata("to", decision.new_status.to_string()),
        );

        let notices_sent = self.dispatch(&request, &decision.notifications, &mut errors).await;

        EditReceipt {
            request_id: request_id.clone(),
            status: Some(decision.new_status),
            ignored: None,
            notices_sent,
            errors,
        }
    }

    async fn dispatch(
        &self,
        request: &PtoRequest,
        intents: &[NotificationIntent],
        errors: &mut Vec<WorkflowError>,
    ) -> usize {
        let mut sent = 0;
        for intent in intents {
            let to = match intent.recipient {
                Recipient::Manager => Some(self.manager_email.clone()),
                Recipient::Employee => match self.ledger.get_email(&request.employee_id).await {
                    Ok(Some(email)) => Some(email),
                    Ok(None) => {
                        tracing::warn!(
                            employee_id = %request.employee_id.0,
                            "no email on file, skipping employee notice"
                        );
                        self.audit.emit(
                            AuditEvent::new(
                                Some(request.id.clone()),
                                "notice.skipped_missing_email",
                                AuditCategory::Notification,
                                ACTOR,
                                AuditOutcome::Rejected,
                            )
                            .with_metadata("employee_id", request.employee_id.0.clone()),
                        );
                        None
                    }
                    Err(error) => {
                        self.swallow(Some(&request.id), WorkflowError::Ledger(error), errors);
                        None
                    }
                },
            };

            let Some(to) = to else { continue };
            match self.notifier.send(&to, intent).await {
                Ok(()) => sent += 1,
                Err(error) => {
                    self.swallow(Some(&request.id), WorkflowError::Notify(error), errors);
                }
            }
        }
        sent
    }

    fn ignored(
        &self,
        request_id: &RequestId,
        reason: IgnoredReason,
        errors: Vec<WorkflowError>,
    ) -> EditReceipt {
        self.audit.emit(
            AuditEvent::new(
                Some(request_id.clone()),
                "edit.ignored",
                AuditCategory::Decision,
                ACTOR,
                AuditOutcome::Rejected,
            )
            .with_metadata("reason", format!("{reason:?}")),
        );
        EditReceipt {
            request_id: request_id.clone(),
            status: None,
            ignored: Some(reason),
            notices_sent: 0,
            errors,
        }
    }

    fn swallow(
        &self,
        request_id: Option<&RequestId>,
        error: WorkflowError,
        errors: &mut Vec<WorkflowError>,
    ) {
        tracing::error!(kind = error.kind(), %error, "collaborator failure swallowed");
        self.audit.emit(
            AuditEvent::new(
                request_id.cloned(),
                "workflow.error_swallowed",
                AuditCategory::System,
                ACTOR,
                AuditOutcome::Failed,
            )
            .with_metadata("kind", error.kind())
            .with_metadata("detail", error.to_string()),
        );
        errors.push(error);
    }
}
