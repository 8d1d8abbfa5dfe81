//! SQL-backed request log.
//!
//! Requests were historically kept on an intake sheet with positional
//! columns; this store keeps the same semantic fields under names. The
//! mapping, documented only here at the persistence boundary:
//!
//! | sheet column | field             |
//! |--------------|-------------------|
//! | A            | `id`              |
//! | B            | `employee_name`   |
//! | C            | `employee_id`     |
//! | D            | `absence_type`    |
//! | E            | `start_date`      |
//! | F            | `end_date`        |
//! | G            | `hours_requested` |
//! | H            | `status`          |
//! | J            | `submitted_at`    |
//! | K            | `decision_at`     |

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;

use ptoflow_core::domain::request::{PtoRequest, RequestId, RequestStatus};
use ptoflow_core::domain::employee::EmployeeId;
use ptoflow_core::errors::StoreError;
use ptoflow_core::store::RequestStore;

use crate::DbPool;

pub struct SqlRequestStore {
    pool: DbPool,
}

impl SqlRequestStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn backend(error: sqlx::Error) -> StoreError {
    StoreError::Backend(error.to_string())
}

fn decode(detail: impl Into<String>) -> StoreError {
    StoreError::Decode(detail.into())
}

fn parse_date(raw: &str, column: &str) -> Result<NaiveDate, StoreError> {
    raw.parse::<NaiveDate>()
        .map_err(|_| decode(format!("invalid date `{raw}` in column `{column}`")))
}

fn parse_timestamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn row_to_request(row: &sqlx::sqlite::SqliteRow) -> Result<PtoRequest, StoreError> {
    let id: String = row.try_get("id").map_err(|e| decode(e.to_string()))?;
    let employee_id: String = row.try_get("employee_id").map_err(|e| decode(e.to_string()))?;
    let employee_name: String = row.try_get("employee_name").map_err(|e| decode(e.to_string()))?;
    let absence_type: String = row.try_get("absence_type").map_err(|e| decode(e.to_string()))?;
    let start_date: String = row.try_get("start_date").map_err(|e| decode(e.to_string()))?;
    let end_date: String = row.try_get("end_date").map_err(|e| decode(e.to_string()))?;
    let hours_requested: String =
        row.try_get("hours_requested").map_err(|e| decode(e.to_string()))?;
    let status: String = row.try_get("status").map_err(|e| decode(e.to_string()))?;
    let submitted_at: Option<String> =
        row.try_get("submitted_at").map_err(|e| decode(e.to_string()))?;
    let decision_at: Option<String> =
        row.try_get("decision_at").map_err(|e| decode(e.to_string()))?;

    Ok(PtoRequest {
        id: RequestId(id),
        employee_id: EmployeeId(employee_id),
        employee_name,
        absence_type,
        start_date: parse_date(&start_date, "start_date")?,
        end_date: parse_date(&end_date, "end_date")?,
        hours_requested: hours_requested
            .parse()
            .map_err(|_| decode(format!("invalid hours value `{hours_requested}`")))?,
        // Unknown stored statuses read as pending rather than poisoning the row.
        status: status.parse().unwrap_or(RequestStatus::Pending),
        submitted_at: parse_timestamp(submitted_at),
        decision_at: parse_timestamp(decision_at),
    })
}

#[async_trait::async_trait]
impl RequestStore for SqlRequestStore {
    async fn find_by_id(&self, id: &RequestId) -> Result<Option<PtoRequest>, StoreError> {
        let row = sqlx::query(
            "SELECT id, employee_id, employee_name, absence_type, start_date, end_date,
                    hours_requested, status, submitted_at, decision_at
             FROM pto_request WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        match row {
            Some(ref r) => Ok(Some(row_to_request(r)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, request: PtoRequest) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO pto_request (id, employee_id, employee_name, absence_type, start_date,
                                      end_date, hours_requested, status, submitted_at, decision_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 employee_id = excluded.employee_id,
                 employee_name = excluded.employee_name,
                 absence_type = excluded.absence_type,
                 start_date = excluded.start_date,
                 end_date = excluded.end_date,
                 hours_requested = excluded.hours_requested,
                 status = excluded.status,
                 submitted_at = excluded.submitted_at,
                 decision_at = excluded.decision_at",
        )
        .bind(&request.id.0)
        .bind(&request.employee_id.0)
        .bind(&request.employee_name)
        .bind(&request.absence_type)
        .bind(request.start_date.to_string())
        .bind(request.end_date.to_string())
        .bind(request.hours_requested.to_string())
        .bind(request.status.to_string())
        .bind(request.submitted_at.map(|dt| dt.to_rfc3339()))
        .bind(request.decision_at.map(|dt| dt.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }
}
