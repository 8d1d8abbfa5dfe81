//! Deterministic demo fixtures: a small employee roster with balances and
//! one pending request, so a fresh database can exercise both workflow
//! triggers immediately.

use crate::DbPool;

struct SeedEmployee {
    employee_id: &'static str,
    email: &'static str,
    used_hours: &'static str,
    remaining_hours: &'static str,
}

struct SeedRequest {
    id: &'static str,
    employee_id: &'static str,
    employee_name: &'static str,
    absence_type: &'static str,
    start_date: &'static str,
    end_date: &'static str,
    hours_requested: &'static str,
    status: &'static str,
    submitted_at: &'static str,
}

const SEED_EMPLOYEES: &[SeedEmployee] = &[
    SeedEmployee {
        employee_id: "emp-1001",
        email: "dana.whitfield@example.com",
        used_hours: "24",
        remaining_hours: "96",
    },
    SeedEmployee {
        employee_id: "emp-1002",
        email: "marcus.okafor@example.com",
        used_hours: "64",
        remaining_hours: "16",
    },
    SeedEmployee {
        employee_id: "emp-1003",
        email: "priya.raman@example.com",
        used_hours: "0",
        remaining_hours: "120",
    },
];

const SEED_REQUESTS: &[SeedRequest] = &[SeedRequest {
    id: "REQ-seed-001",
    employee_id: "emp-1001",
    employee_name: "Dana Whitfield",
    absence_type: "vacation",
    start_date: "2026-09-14",
    end_date: "2026-09-18",
    hours_requested: "40",
    status: "pending",
    submitted_at: "2026-08-01T09:00:00+00:00",
}];

#[derive(Clone, Debug)]
pub struct SeedResult {
    pub employees_seeded: usize,
    pub requests_seeded: usize,
}

#[derive(Clone, Debug)]
pub struct SeedVerification {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

pub struct SeedDataset;

impl SeedDataset {
    pub async fn load(pool: &DbPool) -> Result<SeedResult, sqlx::Error> {
        for employee in SEED_EMPLOYEES {
            sqlx::query(
                "INSERT INTO employee_balance (employee_id, email, used_hours, remaining_hours)
                 VALUES (?, ?, ?, ?)
                 ON CONFLICT(employee_id) DO UPDATE SET
                     email = excluded.email,
                     used_hours = excluded.used_hours,
                     remaining_hours = excluded.remaining_hours",
            )
            .bind(employee.employee_id)
            .bind(employee.email)
            .bind(employee.used_hours)
            .bind(employee.remaining_hours)
            .execute(pool)
            .await?;
        }

        for request in SEED_REQUESTS {
            sqlx::query(
                "INSERT INTO pto_request (id, employee_id, employee_name, absence_type,
                                          start_date, end_date, hours_requested, status,
                                          submitted_at, decision_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, NULL)
                 ON CONFLICT(id) DO UPDATE SET status = excluded.status",
            )
            .bind(request.id)
            .bind(request.employee_id)
            .bind(request.employee_name)
            .bind(request.absence_type)
            .bind(request.start_date)
            .bind(request.end_date)
            .bind(request.hours_requested)
            .bind(request.status)
            .bind(request.submitted_at)
            .execute(pool)
            .await?;
        }

        Ok(SeedResult {
            employees_seeded: SEED_EMPLOYEES.len(),
            requests_seeded: SEED_REQUESTS.len(),
        })
    }

    pub async fn verify(pool: &DbPool) -> Result<SeedVerification, sqlx::Error> {
        let employee_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM employee_balance").fetch_one(pool).await?;
        let request_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pto_request WHERE id LIKE 'REQ-seed-%'",
        )
        .fetch_one(pool)
        .await?;
        let pending_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pto_request WHERE id LIKE 'REQ-seed-%' AND status = 'pending'",
        )
        .fetch_one(pool)
        .await?;

        let checks = vec![
            ("employee-roster", employee_count >= SEED_EMPLOYEES.len() as i64),
            ("seed-requests", request_count == SEED_REQUESTS.len() as i64),
            ("seed-request-pending", pending_count == SEED_REQUESTS.len() as i64),
        ];
        let all_present = checks.iter().all(|(_, passed)| *passed);

        Ok(SeedVerification { all_present, checks })
    }
}
