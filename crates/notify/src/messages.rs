use ptoflow_core::notifications::{NotificationIntent, NoticeKind, RequestSummary};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MailMessage {
    pub subject: String,
    pub body: String,
}

fn request_lines(request: &RequestSummary) -> String {
    format!(
        "Request: {}\nEmployee: {}\nType: {}\nDates: {} to {}\nHours: {}",
        request.request_id.0,
        request.employee_name,
        request.absence_type,
        request.start_date,
        request.end_date,
        request.hours_requested,
    )
}

/// Renders a structured notice into a deliverable message. All wording
/// lives here, outside the decision core.
pub fn render(intent: &NotificationIntent) -> MailMessage {
    let request = &intent.request;
    match &intent.kind {
        NoticeKind::SubmissionReceived => MailMessage {
            subject: format!("PTO request received ({})", request.request_id.0),
            body: format!(
                "Your time-off request has been submitted and is awaiting review.\n\n{}",
                request_lines(request)
            ),
        },
        NoticeKind::NewRequestPending { balance } => MailMessage {
            subject: format!("New PTO request from {}", request.employee_name),
            body: format!(
                "A new time-off request is awaiting your decision.\n\n{}\n\nCurrent balance: {} hours used, {} hours remaining",
                request_lines(request),
                balance.used_hours,
                balance.remaining_hours,
            ),
        },
        NoticeKind::DeadlineViolation { reason } => MailMessage {
            subject: format!("PTO request not accepted ({})", request.request_id.0),
            body: format!(
                "Your time-off request was not accepted: {reason}.\n\n{}",
                request_lines(request)
            ),
        },
        NoticeKind::DeadlineAlert { reason } => MailMessage {
            subject: format!("Late PTO submission from {}", request.employee_name),
            body: format!(
                "A time-off request missed its submission deadline and was not queued for approval: {reason}.\n\n{}",
                request_lines(request)
            ),
        },
        NoticeKind::Approved => MailMessage {
            subject: format!("PTO request approved ({})", request.request_id.0),
            body: format!(
                "Your time-off request has been approved.\n\n{}",
                request_lines(request)
            ),
        },
        NoticeKind::Denied => MailMessage {
            subject: format!("PTO request denied ({})", request.request_id.0),
            body: format!(
                "Your time-off request has been denied.\n\n{}",
                request_lines(request)
            ),
        },
        NoticeKind::NeedsInfo => MailMessage {
            subject: format!("More information needed ({})", request.request_id.0),
            body: format!(
                "Your manager needs more information before deciding on your time-off request.\n\n{}",
                request_lines(request)
            ),
        },
        NoticeKind::BalanceShortfall { requested, remaining, shortfall } => MailMessage {
            subject: format!("Insufficient PTO balance for {}", request.employee_name),
            body: format!(
                "The request could not be approved: {requested} hours requested with only {remaining} remaining (short {shortfall} hours).\n\n{}",
                request_lines(request)
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use ptoflow_core::domain::employee::{BalanceSnapshot, EmployeeId};
    use ptoflow_core::domain::request::{PtoRequest, RequestId, RequestStatus};
    use ptoflow_core::notifications::{NotificationIntent, NoticeKind};

    use super::render;

    fn request() -> PtoRequest {
        PtoRequest {
            id: RequestId("REQ-42".to_string()),
            employee_id: EmployeeId("emp-1".to_string()),
            employee_name: "Dana Whitfield".to_string(),
            absence_type: "vacation".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 9, 14).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 9, 18).unwrap(),
            hours_requested: Decimal::new(40, 0),
            status: RequestStatus::Pending,
            submitted_at: None,
            decision_at: None,
        }
    }

    #[test]
    fn new_request_notice_carries_the_balance_snapshot() {
        let balance = BalanceSnapshot {
            used_hours: Decimal::new(24, 0),
            remaining_hours: Decimal::new(96, 0),
        };
        let message = render(&NotificationIntent::manager(
            NoticeKind::NewRequestPending { balance },
            &request(),
        ));

        assert!(message.subject.contains("Dana Whitfield"));
        assert!(message.body.contains("24 hours used"));
        assert!(message.body.contains("96 hours remaining"));
        assert!(message.body.contains("2026-09-14"));
    }

    #[test]
    fn shortfall_alert_names_the_missing_hours() {
        let message = render(&NotificationIntent::manager(
            NoticeKind::BalanceShortfall {
                requested: Decimal::new(16, 0),
                remaining: Decimal::new(10, 0),
                shortfall: Decimal::new(6, 0),
            },
            &request(),
        ));

        assert!(message.subject.contains("Insufficient PTO balance"));
        assert!(message.body.contains("16 hours requested"));
        assert!(message.body.contains("short 6 hours"));
    }

    #[test]
    fn deadline_violation_embeds_the_policy_reason() {
        let message = render(&NotificationIntent::employee(
            NoticeKind::DeadlineViolation {
                reason: "vacation and personal requests must be submitted at least 14 days before the start date".to_string(),
            },
            &request(),
        ));

        assert!(message.body.contains("at least 14 days"));
        assert!(message.subject.contains("REQ-42"));
    }

    #[test]
    fn decision_notices_reference_the_request_id() {
        for kind in [NoticeKind::Approved, NoticeKind::Denied, NoticeKind::NeedsInfo] {
            let message = render(&NotificationIntent::employee(kind, &request()));
            assert!(message.subject.contains("REQ-42"));
            assert!(message.body.contains("Request: REQ-42"));
        }
    }
}
