use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::request::AbsenceClass;

const SECONDS_PER_DAY: i64 = 86_400;

/// Submission lead-time policy. Vacation-class requests need two weeks of
/// notice, sick-class requests one day; unclassified absence types carry no
/// deadline rule at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlinePolicy {
    pub vacation_lead_days: i64,
    pub sick_lead_days: i64,
}

impl Default for DeadlinePolicy {
    fn default() -> Self {
        Self { vacation_lead_days: 14, sick_lead_days: 1 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineCheck {
    pub valid: bool,
    pub reason: Option<String>,
}

impl DeadlineCheck {
    fn met() -> Self {
        Self { valid: true, reason: None }
    }

    fn violated(reason: String) -> Self {
        Self { valid: false, reason: Some(reason) }
    }
}

/// Calendar days until the absence begins, as the ceiling of the delta
/// between midnight UTC of the start date and `now`. Rounding is always up
/// toward the future, so a fractional day of notice still counts as a full
/// day against the threshold.
pub fn days_until_start(start_date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let start = start_date.and_time(NaiveTime::MIN).and_utc();
    let seconds = (start - now).num_seconds();
    seconds.div_euclid(SECONDS_PER_DAY) + i64::from(seconds.rem_euclid(SECONDS_PER_DAY) > 0)
}

impl DeadlinePolicy {
    pub fn validate(
        &self,
        absence_type: &str,
        start_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> DeadlineCheck {
        let notice_days = days_until_start(start_date, now);
        match AbsenceClass::classify(absence_type) {
            AbsenceClass::Vacation if notice_days < self.vacation_lead_days => {
                DeadlineCheck::violated(format!(
                    "vacation and personal requests must be submitted at least {} days before the start date",
                    self.vacation_lead_days
                ))
            }
            AbsenceClass::Sick if notice_days < self.sick_lead_days => {
                DeadlineCheck::violated(format!(
                    "sick requests must be submitted at least {} day(s) before the start date",
                    self.sick_lead_days
                ))
            }
            _ => DeadlineCheck::met(),
        }
    }
}
