//! Collaborator seams for persistence. The core only ever talks to these
//! traits; SQL implementations live in ptoflow-db and the in-memory
//! implementations here double as test fakes and demo backends.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::employee::{BalanceSnapshot, EmployeeBalance, EmployeeId};
use crate::domain::request::{PtoRequest, RequestId};
use crate::errors::StoreError;

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn find_by_id(&self, id: &RequestId) -> Result<Option<PtoRequest>, StoreError>;

    /// Append-or-update keyed on the request id.
    async fn save(&self, request: PtoRequest) -> Result<(), StoreError>;
}

#[async_trait]
pub trait BalanceLedger: Send + Sync {
    /// Missing employee is a valid, silent outcome: the zero snapshot.
    async fn get_balance(&self, employee_id: &EmployeeId) -> Result<BalanceSnapshot, StoreError>;

    async fn get_email(&self, employee_id: &EmployeeId) -> Result<Option<String>, StoreError>;

    /// `used += hours; remaining -= hours`, no clamping. A missing employee
    /// or non-positive hours is a logged no-op, not an error.
    async fn apply_approval(
        &self,
        employee_id: &EmployeeId,
        hours: Decimal,
    ) -> Result<(), StoreError>;

    /// Full roster, ordered by employee id.
    async fn list_employees(&self) -> Result<Vec<EmployeeBalance>, StoreError>;

    async fn has_sufficient_balance(
        &self,
        employee_id: &EmployeeId,
        hours: Decimal,
    ) -> Result<bool, StoreError> {
        Ok(self.get_balance(employee_id).await?.covers(hours))
    }
}

fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Clone, Default)]
pub struct InMemoryRequestStore {
    requests: Arc<Mutex<HashMap<String, PtoRequest>>>,
}

#[async_trait]
impl RequestStore for InMemoryRequestStore {
    async fn find_by_id(&self, id: &RequestId) -> Result<Option<PtoRequest>, StoreError> {
        Ok(lock_or_recover(&self.requests).get(&id.0).cloned())
    }

    async fn save(&self, request: PtoRequest) -> Result<(), StoreError> {
        lock_or_recover(&self.requests).insert(request.id.0.clone(), request);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryBalanceLedger {
    balances: Arc<Mutex<HashMap<String, EmployeeBalance>>>,
}

impl InMemoryBalanceLedger {
    pub fn with_balances(balances: Vec<EmployeeBalance>) -> Self {
        let ledger = Self::default();
        {
            let mut map = lock_or_recover(&ledger.balances);
            for balance in balances {
                map.insert(balance.employee_id.0.clone(), balance);
            }
        }
        ledger
    }

    pub fn balance_row(&self, employee_id: &EmployeeId) -> Option<EmployeeBalance> {
        lock_or_recover(&self.balances).get(&employee_id.0).cloned()
    }
}

#[async_trait]
impl BalanceLedger for InMemoryBalanceLedger {
    async fn get_balance(&self, employee_id: &EmployeeId) -> Result<BalanceSnapshot, StoreError> {
        Ok(lock_or_recover(&self.balances)
            .get(&employee_id.0)
            .map(EmployeeBalance::snapshot)
            .unwrap_or_default())
    }

    async fn get_email(&self, employee_id: &EmployeeId) -> Result<Option<String>, StoreError> {
        Ok(lock_or_recover(&self.balances).get(&employee_id.0).map(|b| b.email.clone()))
    }

    async fn apply_approval(
        &self,
        employee_id: &EmployeeId,
        hours: Decimal,
    ) -> Result<(), StoreError> {
        if hours <= Decimal::ZERO {
            tracing::warn!(employee_id = %employee_id.0, %hours, "skipping balance mutation for non-positive hours");
            return Ok(());
        }

        let mut balances = lock_or_recover(&self.balances);
        match balances.get_mut(&employee_id.0) {
            Some(balance) => {
                balance.used_hours += hours;
                balance.remaining_hours -= hours;
            }
            None => {
                tracing::warn!(employee_id = %employee_id.0, "skipping balance mutation for unknown employee");
            }
        }
        Ok(())
    }

    async fn list_employees(&self) -> Result<Vec<EmployeeBalance>, StoreError> {
        let mut employees: Vec<EmployeeBalance> =
            lock_or_recover(&self.balances).values().cloned().collect();
        employees.sort_by(|a, b| a.employee_id.0.cmp(&b.employee_id.0));
        Ok(employees)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::employee::{EmployeeBalance, EmployeeId};
    use crate::domain::request::{RequestId, RequestIntake};

    use super::{BalanceLedger, InMemoryBalanceLedger, InMemoryRequestStore, RequestStore};

    fn employee(id: &str, used: i64, remaining: i64) -> EmployeeBalance {
        EmployeeBalance {
            employee_id: EmployeeId(id.to_string()),
            email: format!("{id}@example.com"),
            used_hours: Decimal::new(used, 0),
            remaining_hours: Decimal::new(remaining, 0),
        }
    }

    fn ledger() -> InMemoryBalanceLedger {
        InMemoryBalanceLedger::with_balances(vec![employee("emp-1", 24, 40)])
    }

    #[tokio::test]
    async fn unknown_employee_reads_as_zero_balance_and_no_email() {
        let ledger = ledger();
        let unknown = EmployeeId("ghost".to_string());

        let snapshot = ledger.get_balance(&unknown).await.expect("lookup miss is not an error");
        assert_eq!(snapshot.used_hours, Decimal::ZERO);
        assert_eq!(snapshot.remaining_hours, Decimal::ZERO);
        assert_eq!(ledger.get_email(&unknown).await.expect("soft miss"), None);
    }

    #[tokio::test]
    async fn apply_approval_moves_hours_between_buckets() {
        let ledger = ledger();
        let id = EmployeeId("emp-1".to_string());

        ledger.apply_approval(&id, Decimal::new(16, 0)).await.expect("apply");

        let snapshot = ledger.get_balance(&id).await.expect("balance");
        assert_eq!(snapshot.used_hours, Decimal::new(40, 0));
        assert_eq!(snapshot.remaining_hours, Decimal::new(24, 0));
        let row = ledger.balance_row(&id).expect("row");
        assert_eq!(row.total_allotment(), Decimal::new(64, 0));
    }

    #[tokio::test]
    async fn apply_approval_is_a_no_op_for_unknown_employee_or_bad_hours() {
        let ledger = ledger();
        let id = EmployeeId("emp-1".to_string());

        ledger
            .apply_approval(&EmployeeId("ghost".to_string()), Decimal::new(8, 0))
            .await
            .expect("silent skip");
        ledger.apply_approval(&id, Decimal::ZERO).await.expect("silent skip");
        ledger.apply_approval(&id, Decimal::new(-4, 0)).await.expect("silent skip");

        let snapshot = ledger.get_balance(&id).await.expect("balance");
        assert_eq!(snapshot.remaining_hours, Decimal::new(40, 0));
    }

    #[tokio::test]
    async fn list_employees_returns_the_roster_in_id_order() {
        let ledger = InMemoryBalanceLedger::with_balances(vec![
            employee("emp-2", 0, 80),
            employee("emp-1", 24, 40),
        ]);

        let roster = ledger.list_employees().await.expect("roster");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].employee_id.0, "emp-1");
        assert_eq!(roster[1].employee_id.0, "emp-2");
    }

    #[tokio::test]
    async fn sufficiency_uses_remaining_hours_and_is_false_for_unknown_employee() {
        let ledger = ledger();
        let id = EmployeeId("emp-1".to_string());

        assert!(ledger.has_sufficient_balance(&id, Decimal::new(40, 0)).await.expect("check"));
        assert!(!ledger.has_sufficient_balance(&id, Decimal::new(41, 0)).await.expect("check"));
        assert!(!ledger
            .has_sufficient_balance(&EmployeeId("ghost".to_string()), Decimal::new(1, 0))
            .await
            .expect("check"));
    }

    #[tokio::test]
    async fn request_store_round_trips_and_updates_in_place() {
        let store = InMemoryRequestStore::default();
        let intake = RequestIntake {
            request_id: Some(RequestId("REQ-1".to_string())),
            employee_id: EmployeeId("emp-1".to_string()),
            employee_name: "Dana Whitfield".to_string(),
            absence_type: "vacation".to_string(),
            start_date: chrono::NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            end_date: chrono::NaiveDate::from_ymd_opt(2026, 4, 3).unwrap(),
            hours_requested: Some(Decimal::new(16, 0)),
        };
        let mut request = intake.into_request(chrono::Utc::now());

        store.save(request.clone()).await.expect("save");
        request.status = crate::domain::request::RequestStatus::Approved;
        store.save(request.clone()).await.expect("update");

        let found = store.find_by_id(&request.id).await.expect("find").expect("exists");
        assert_eq!(found.status, crate::domain::request::RequestStatus::Approved);
        assert_eq!(
            store.find_by_id(&RequestId("missing".to_string())).await.expect("soft miss"),
            None
        );
    }
}
