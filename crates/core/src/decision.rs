//! Pure transition decisions for the approval state machine. Each function
//! maps a request plus its balance snapshot to the next status, the balance
//! mutation to apply (at most one), and the notices to fire; applying those
//! effects is the workflow engine's job.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::deadline::{DeadlineCheck, DeadlinePolicy};
use crate::domain::employee::{BalanceSnapshot, EmployeeId};
use crate::domain::request::{PtoRequest, RequestStatus};
use crate::notifications::{NotificationIntent, NoticeKind};

/// The manager statuses a status-cell edit can carry. Any other edited value
/// is not an event at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditedStatus {
    Approved,
    Denied,
    NeedsInfo,
}

impl EditedStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "approved" => Some(Self::Approved),
            "denied" => Some(Self::Denied),
            "needs info" | "needs_info" | "needsinfo" => Some(Self::NeedsInfo),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceMutation {
    pub employee_id: EmployeeId,
    pub hours: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDecision {
    pub status: RequestStatus,
    pub deadline: DeadlineCheck,
    pub notifications: Vec<NotificationIntent>,
}

/// Submission: a deadline violation short-circuits to LateSubmission with
/// both sides notified; otherwise the request parks in Pending and the
/// manager notice carries the employee's current balance snapshot.
pub fn decide_submission(
    request: &PtoRequest,
    balance: &BalanceSnapshot,
    policy: &DeadlinePolicy,
    now: DateTime<Utc>,
) -> SubmissionDecision {
    let deadline = policy.validate(&request.absence_type, request.start_date, now);

    if deadline.valid {
        return SubmissionDecision {
            status: RequestStatus::Pending,
            deadline,
            notifications: vec![
                NotificationIntent::manager(
                    NoticeKind::NewRequestPending { balance: *balance },
                    request,
                ),
                NotificationIntent::employee(NoticeKind::SubmissionReceived, request),
            ],
        };
    }

    let reason = deadline.reason.clone().unwrap_or_default();
    SubmissionDecision {
        status: RequestStatus::LateSubmission,
        deadline,
        notifications: vec![
            NotificationIntent::employee(
                NoticeKind::DeadlineViolation { reason: reason.clone() },
                request,
            ),
            NotificationIntent::manager(NoticeKind::DeadlineAlert { reason }, request),
        ],
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditDecision {
    pub new_status: RequestStatus,
    pub sets_decision_at: bool,
    pub mutation: Option<BalanceMutation>,
    pub notifications: Vec<NotificationIntent>,
}

/// Manager status edit. Returns `None` when the edit is ignored: the request
/// is already in a terminal state, so a repeated Approved edit can never
/// double-apply the balance deduction.
pub fn decide_status_edit(
    request: &PtoRequest,
    edited: EditedStatus,
    balance: &BalanceSnapshot,
) -> Option<EditDecision> {
    if !request.status.accepts_manager_edit() {
        return None;
    }

    let decision = match edited {
        EditedStatus::Approved => {
            if balance.covers(request.hours_requested) {
                EditDecision {
                    new_status: RequestStatus::Approved,
                    sets_decision_at: true,
                    mutation: Some(BalanceMutation {
                        employee_id: request.employee_id.clone(),
                        hours: request.hours_requested,
                    }),
                    notifications: vec![NotificationIntent::employee(
                        NoticeKind::Approved,
                        request,
                    )],
                }
            } else {
                // The attempted Approved write is overridden; the balance is
                // left untouched.
                EditDecision {
                    new_status: RequestStatus::InsufficientBalance,
                    sets_decision_at: true,
                    mutation: None,
                    notifications: vec![NotificationIntent::manager(
                        NoticeKind::BalanceShortfall {
                            requested: request.hours_requested,
                            remaining: balance.remaining_hours,
                            shortfall: balance.shortfall(request.hours_requested),
                        },
                        request,
                    )],
                }
            }
        }
        EditedStatus::Denied => EditDecision {
            new_status: RequestStatus::Denied,
            sets_decision_at: true,
            mutation: None,
            notifications: vec![NotificationIntent::employee(NoticeKind::Denied, request)],
        },
        EditedStatus::NeedsInfo => EditDecision {
            new_status: RequestStatus::NeedsInfo,
            sets_decision_at: false,
            mutation: None,
            notifications: vec![NotificationIntent::employee(NoticeKind::NeedsInfo, request)],
        },
    };

    Some(decision)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::deadline::DeadlinePolicy;
    use crate::domain::employee::{BalanceSnapshot, EmployeeId};
    use crate::domain::request::{PtoRequest, RequestId, RequestStatus};
    use crate::notifications::{NoticeKind, Recipient};

    use super::{decide_status_edit, decide_submission, EditedStatus};

    fn request(absence_type: &str, start: NaiveDate, hours: Decimal) -> PtoRequest {
        PtoRequest {
            id: RequestId("REQ-1".to_string()),
            employee_id: EmployeeId("emp-1".to_string()),
            employee_name: "Dana Whitfield".to_string(),
            absence_type: absence_type.to_string(),
            start_date: start,
            end_date: start,
            hours_requested: hours,
            status: RequestStatus::Pending,
            submitted_at: None,
            decision_at: None,
        }
    }

    fn balance(used: i64, remaining: i64) -> BalanceSnapshot {
        BalanceSnapshot {
            used_hours: Decimal::new(used, 0),
            remaining_hours: Decimal::new(remaining, 0),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn timely_submission_parks_in_pending_with_both_notices() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let request = request("vacation", date(2026, 3, 21), Decimal::new(16, 0));

        let decision =
            decide_submission(&request, &balance(0, 40), &DeadlinePolicy::default(), now);

        assert_eq!(decision.status, RequestStatus::Pending);
        assert!(decision.deadline.valid);
        assert_eq!(decision.notifications.len(), 2);
        assert_eq!(decision.notifications[0].recipient, Recipient::Manager);
        assert!(matches!(
            decision.notifications[0].kind,
            NoticeKind::NewRequestPending { balance } if balance.remaining_hours == Decimal::new(40, 0)
        ));
        assert_eq!(decision.notifications[1].recipient, Recipient::Employee);
        assert_eq!(decision.notifications[1].kind, NoticeKind::SubmissionReceived);
    }

    #[test]
    fn late_submission_routes_to_late_state_with_violation_notices() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let request = request("vacation", date(2026, 3, 6), Decimal::new(16, 0));

        let decision =
            decide_submission(&request, &balance(0, 40), &DeadlinePolicy::default(), now);

        assert_eq!(decision.status, RequestStatus::LateSubmission);
        assert!(!decision.deadline.valid);
        let kinds: Vec<_> =
            decision.notifications.iter().map(|n| (n.recipient, n.kind.clone())).collect();
        assert!(matches!(
            kinds[0],
            (Recipient::Employee, NoticeKind::DeadlineViolation { ref reason }) if !reason.is_empty()
        ));
        assert!(matches!(kinds[1], (Recipient::Manager, NoticeKind::DeadlineAlert { .. })));
    }

    #[test]
    fn approval_with_sufficient_balance_moves_hours_and_notifies_employee() {
        let request = request("vacation", date(2026, 3, 21), Decimal::new(16, 0));

        let decision = decide_status_edit(&request, EditedStatus::Approved, &balance(0, 40))
            .expect("pending accepts edits");

        assert_eq!(decision.new_status, RequestStatus::Approved);
        assert!(decision.sets_decision_at);
        let mutation = decision.mutation.expect("approval mutates the balance");
        assert_eq!(mutation.hours, Decimal::new(16, 0));
        assert_eq!(mutation.employee_id, EmployeeId("emp-1".to_string()));
        assert_eq!(decision.notifications.len(), 1);
        assert_eq!(decision.notifications[0].kind, NoticeKind::Approved);
    }

    #[test]
    fn approval_without_balance_overrides_to_insufficient_and_alerts_manager() {
        let request = request("vacation", date(2026, 3, 21), Decimal::new(16, 0));

        let decision = decide_status_edit(&request, EditedStatus::Approved, &balance(30, 10))
            .expect("pending accepts edits");

        assert_eq!(decision.new_status, RequestStatus::InsufficientBalance);
        assert!(decision.mutation.is_none());
        assert_eq!(decision.notifications.len(), 1);
        assert_eq!(decision.notifications[0].recipient, Recipient::Manager);
        assert!(matches!(
            decision.notifications[0].kind,
            NoticeKind::BalanceShortfall { shortfall, .. } if shortfall == Decimal::new(6, 0)
        ));
    }

    #[test]
    fn exact_remaining_balance_still_approves() {
        let request = request("vacation", date(2026, 3, 21), Decimal::new(40, 0));

        let decision = decide_status_edit(&request, EditedStatus::Approved, &balance(0, 40))
            .expect("pending accepts edits");

        assert_eq!(decision.new_status, RequestStatus::Approved);
    }

    #[test]
    fn denial_sets_decision_time_and_leaves_balance_alone() {
        let request = request("sick", date(2026, 3, 21), Decimal::new(8, 0));

        let decision = decide_status_edit(&request, EditedStatus::Denied, &balance(0, 40))
            .expect("pending accepts edits");

        assert_eq!(decision.new_status, RequestStatus::Denied);
        assert!(decision.sets_decision_at);
        assert!(decision.mutation.is_none());
        assert_eq!(decision.notifications[0].kind, NoticeKind::Denied);
    }

    #[test]
    fn needs_info_records_status_without_decision_time() {
        let request = request("sick", date(2026, 3, 21), Decimal::new(8, 0));

        let decision = decide_status_edit(&request, EditedStatus::NeedsInfo, &balance(0, 40))
            .expect("pending accepts edits");

        assert_eq!(decision.new_status, RequestStatus::NeedsInfo);
        assert!(!decision.sets_decision_at);
        assert!(decision.mutation.is_none());
        assert_eq!(decision.notifications[0].kind, NoticeKind::NeedsInfo);
    }

    #[test]
    fn needs_info_requests_can_still_be_approved_later() {
        let mut request = request("vacation", date(2026, 3, 21), Decimal::new(16, 0));
        request.status = RequestStatus::NeedsInfo;

        let decision = decide_status_edit(&request, EditedStatus::Approved, &balance(0, 40))
            .expect("needs-info accepts edits");

        assert_eq!(decision.new_status, RequestStatus::Approved);
    }

    #[test]
    fn edits_against_terminal_states_are_ignored() {
        for status in [
            RequestStatus::Approved,
            RequestStatus::Denied,
            RequestStatus::LateSubmission,
            RequestStatus::InsufficientBalance,
        ] {
            let mut request = request("vacation", date(2026, 3, 21), Decimal::new(16, 0));
            request.status = status;

            assert!(decide_status_edit(&request, EditedStatus::Approved, &balance(0, 40)).is_none());
        }
    }

    #[test]
    fn unknown_edited_values_are_not_events() {
        assert_eq!(EditedStatus::parse("Approved"), Some(EditedStatus::Approved));
        assert_eq!(EditedStatus::parse("  denied "), Some(EditedStatus::Denied));
        assert_eq!(EditedStatus::parse("Needs Info"), Some(EditedStatus::NeedsInfo));
        assert_eq!(EditedStatus::parse("escalated"), None);
        assert_eq!(EditedStatus::parse(""), None);
    }

    #[test]
    fn zero_hour_requests_pass_the_sufficiency_check_even_for_unknown_employees() {
        // A missing employee reads as the zero snapshot; zero requested hours
        // still compare as covered, and the ledger later skips the no-op
        // mutation on its own.
        let request = request("vacation", date(2026, 3, 21), Decimal::ZERO);

        let decision =
            decide_status_edit(&request, EditedStatus::Approved, &BalanceSnapshot::default())
                .expect("pending accepts edits");

        assert_eq!(decision.new_status, RequestStatus::Approved);
    }
}
