//! SQL-backed employee balance ledger. Balance rows are seeded externally
//! (fixtures or an import); this core only reads them and moves hours from
//! remaining to used on approval.

use rust_decimal::Decimal;
use sqlx::Row;

use ptoflow_core::domain::employee::{BalanceSnapshot, EmployeeBalance, EmployeeId};
use ptoflow_core::errors::StoreError;
use ptoflow_core::store::BalanceLedger;

use crate::DbPool;

pub struct SqlBalanceLedger {
    pool: DbPool,
}

impl SqlBalanceLedger {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn read_row(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<(Decimal, Decimal)>, StoreError> {
        let row = sqlx::query(
            "SELECT used_hours, remaining_hours FROM employee_balance WHERE employee_id = ?",
        )
        .bind(&employee_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let Some(row) = row else { return Ok(None) };

        let used: String =
            row.try_get("used_hours").map_err(|e| StoreError::Decode(e.to_string()))?;
        let remaining: String =
            row.try_get("remaining_hours").map_err(|e| StoreError::Decode(e.to_string()))?;

        Ok(Some((
            used.parse()
                .map_err(|_| StoreError::Decode(format!("invalid used_hours `{used}`")))?,
            remaining
                .parse()
                .map_err(|_| StoreError::Decode(format!("invalid remaining_hours `{remaining}`")))?,
        )))
    }
}

#[async_trait::async_trait]
impl BalanceLedger for SqlBalanceLedger {
    async fn get_balance(&self, employee_id: &EmployeeId) -> Result<BalanceSnapshot, StoreError> {
        Ok(self
            .read_row(employee_id)
            .await?
            .map(|(used_hours, remaining_hours)| BalanceSnapshot { used_hours, remaining_hours })
            .unwrap_or_default())
    }

    async fn get_email(&self, employee_id: &EmployeeId) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT email FROM employee_balance WHERE employee_id = ?")
            .bind(&employee_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            Some(row) => {
                let email: String =
                    row.try_get("email").map_err(|e| StoreError::Decode(e.to_string()))?;
                Ok((!email.trim().is_empty()).then_some(email))
            }
            None => Ok(None),
        }
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

        let Some((used, remaining)) = self.read_row(employee_id).await? else {
            tracing::warn!(employee_id = %employee_id.0, "skipping balance mutation for unknown employee");
            return Ok(());
        };

        // No clamping: remaining may go negative if called out of band; the
        // workflow's sufficiency check is what prevents that in practice.
        sqlx::query(
            "UPDATE employee_balance SET used_hours = ?, remaining_hours = ? WHERE employee_id = ?",
        )
        .bind((used + hours).to_string())
        .bind((remaining - hours).to_string())
        .bind(&employee_id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn list_employees(&self) -> Result<Vec<EmployeeBalance>, StoreError> {
        let rows = sqlx::query(
            "SELECT employee_id, email, used_hours, remaining_hours
             FROM employee_balance ORDER BY employee_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let employee_id: String =
                    row.try_get("employee_id").map_err(|e| StoreError::Decode(e.to_string()))?;
                let email: String =
                    row.try_get("email").map_err(|e| StoreError::Decode(e.to_string()))?;
                let used: String =
                    row.try_get("used_hours").map_err(|e| StoreError::Decode(e.to_string()))?;
                let remaining: String = row
                    .try_get("remaining_hours")
                    .map_err(|e| StoreError::Decode(e.to_string()))?;

                Ok(EmployeeBalance {
                    employee_id: EmployeeId(employee_id),
                    email,
                    used_hours: used
                        .parse()
                        .map_err(|_| StoreError::Decode(format!("invalid used_hours `{used}`")))?,
                    remaining_hours: remaining.parse().map_err(|_| {
                        StoreError::Decode(format!("invalid remaining_hours `{remaining}`"))
                    })?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use ptoflow_core::domain::employee::EmployeeId;
    use ptoflow_core::store::BalanceLedger;

    use super::SqlBalanceLedger;
    use crate::{connect_with_settings, migrations};

    async fn setup() -> sqlx::SqlitePool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        pool
    }

    async fn insert_employee(pool: &sqlx::SqlitePool, id: &str, email: &str, used: &str, remaining: &str) {
        sqlx::query(
            "INSERT INTO employee_balance (employee_id, email, used_hours, remaining_hours)
             VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(email)
        .bind(used)
        .bind(remaining)
        .execute(pool)
        .await
        .expect("insert employee");
    }

    #[tokio::test]
    async fn known_employee_reads_balance_and_email() {
        let pool = setup().await;
        insert_employee(&pool, "emp-1", "dana@example.com", "24", "40").await;
        let ledger = SqlBalanceLedger::new(pool);
        let id = EmployeeId("emp-1".to_string());

        let snapshot = ledger.get_balance(&id).await.expect("balance");
        assert_eq!(snapshot.used_hours, Decimal::new(24, 0));
        assert_eq!(snapshot.remaining_hours, Decimal::new(40, 0));
        assert_eq!(
            ledger.get_email(&id).await.expect("email"),
            Some("dana@example.com".to_string())
        );
    }

    #[tokio::test]
    async fn unknown_employee_defaults_to_zero_and_no_email() {
        let ledger = SqlBalanceLedger::new(setup().await);
        let id = EmployeeId("ghost".to_string());

        let snapshot = ledger.get_balance(&id).await.expect("lookup miss is not an error");
        assert_eq!(snapshot.used_hours, Decimal::ZERO);
        assert_eq!(snapshot.remaining_hours, Decimal::ZERO);
        assert_eq!(ledger.get_email(&id).await.expect("soft miss"), None);
        assert!(!ledger.has_sufficient_balance(&id, Decimal::new(1, 0)).await.expect("check"));
    }

    #[tokio::test]
    async fn blank_email_reads_as_no_address() {
        let pool = setup().await;
        insert_employee(&pool, "emp-2", "  ", "0", "40").await;
        let ledger = SqlBalanceLedger::new(pool);

        assert_eq!(
            ledger.get_email(&EmployeeId("emp-2".to_string())).await.expect("email"),
            None
        );
    }

    #[tokio::test]
    async fn apply_approval_moves_hours_and_preserves_the_allotment() {
        let pool = setup().await;
        insert_employee(&pool, "emp-1", "dana@example.com", "24", "40").await;
        let ledger = SqlBalanceLedger::new(pool);
        let id = EmployeeId("emp-1".to_string());

        ledger.apply_approval(&id, Decimal::new(16, 0)).await.expect("apply");

        let snapshot = ledger.get_balance(&id).await.expect("balance");
        assert_eq!(snapshot.used_hours, Decimal::new(40, 0));
        assert_eq!(snapshot.remaining_hours, Decimal::new(24, 0));
        assert_eq!(
            snapshot.used_hours + snapshot.remaining_hours,
            Decimal::new(64, 0),
        );
    }

    #[tokio::test]
    async fn apply_approval_handles_fractional_hours() {
        let pool = setup().await;
        insert_employee(&pool, "emp-1", "dana@example.com", "0", "40").await;
        let ledger = SqlBalanceLedger::new(pool);
        let id = EmployeeId("emp-1".to_string());

        ledger.apply_approval(&id, Decimal::new(75, 1)).await.expect("apply 7.5h");

        let snapshot = ledger.get_balance(&id).await.expect("balance");
        assert_eq!(snapshot.used_hours, Decimal::new(75, 1));
        assert_eq!(snapshot.remaining_hours, Decimal::new(325, 1));
    }

    #[tokio::test]
    async fn list_employees_returns_the_roster_in_id_order() {
        let pool = setup().await;
        insert_employee(&pool, "emp-2", "marcus@example.com", "64", "16").await;
        insert_employee(&pool, "emp-1", "dana@example.com", "24", "40").await;
        let ledger = SqlBalanceLedger::new(pool);

        let roster = ledger.list_employees().await.expect("roster");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].employee_id.0, "emp-1");
        assert_eq!(roster[1].email, "marcus@example.com");
        assert_eq!(roster[1].remaining_hours, Decimal::new(16, 0));
    }

    #[tokio::test]
    async fn apply_approval_is_a_silent_no_op_for_unknown_employee_or_bad_hours() {
        let pool = setup().await;
        insert_employee(&pool, "emp-1", "dana@example.com", "0", "40").await;
        let ledger = SqlBalanceLedger::new(pool);
        let id = EmployeeId("emp-1".to_string());

        ledger
            .apply_approval(&EmployeeId("ghost".to_string()), Decimal::new(8, 0))
            .await
            .expect("silent skip");
        ledger.apply_approval(&id, Decimal::ZERO).await.expect("silent skip");

        let snapshot = ledger.get_balance(&id).await.expect("balance");
        assert_eq!(snapshot.remaining_hours, Decimal::new(40, 0));
    }
}
