use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmployeeBalance {
    pub employee_id: EmployeeId,
    pub email: String,
    pub used_hours: Decimal,
    pub remaining_hours: Decimal,
}

impl EmployeeBalance {
    /// Invariant: an approval moves hours from remaining to used, so the
    /// total allotment never changes through this core.
    pub fn total_allotment(&self) -> Decimal {
        self.used_hours + self.remaining_hours
    }

    pub fn snapshot(&self) -> BalanceSnapshot {
        BalanceSnapshot {
            used_hours: self.used_hours,
            remaining_hours: self.remaining_hours,
        }
    }
}

/// Point-in-time balance reading. The default is the lookup-miss value: an
/// unknown employee reads as zero hours, never as an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub used_hours: Decimal,
    pub remaining_hours: Decimal,
}

impl BalanceSnapshot {
    pub fn covers(&self, requested: Decimal) -> bool {
        self.remaining_hours >= requested
    }

    pub fn shortfall(&self, requested: Decimal) -> Decimal {
        requested - self.remaining_hours
    }
}
