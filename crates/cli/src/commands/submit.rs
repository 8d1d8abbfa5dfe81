use chrono::NaiveDate;
use rust_decimal::Decimal;

use ptoflow_core::domain::employee::EmployeeId;
use ptoflow_core::domain::request::{RequestId, RequestIntake};
use ptoflow_db::{connect_with_settings, migrations};

use crate::commands::{build_runtime, build_workflow, load_config, CommandResult};

pub struct SubmitInput {
    pub request_id: Option<String>,
    pub employee_id: String,
    pub employee_name: String,
    pub absence_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hours: Option<Decimal>,
}

pub fn run(input: SubmitInput) -> CommandResult {
    let config = match load_config("submit") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("submit") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;

        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let workflow = build_workflow(pool.clone(), &config);
        let receipt = workflow
            .on_submit(RequestIntake {
                request_id: input.request_id.map(RequestId),
                employee_id: EmployeeId(input.employee_id),
                employee_name: input.employee_name,
                absence_type: input.absence_type,
                start_date: input.start_date,
                end_date: input.end_date,
                hours_requested: input.hours,
            })
            .await;

        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(receipt)
    });

    match result {
        Ok(receipt) => match receipt.status {
            Some(status) => {
                let mut message = format!(
                    "request {} recorded with status {status}; {} notice(s) sent",
                    receipt.request_id.0, receipt.notices_sent
                );
                if !receipt.errors.is_empty() {
                    message.push_str(&format!("; {} collaborator failure(s) logged", receipt.errors.len()));
                }
                CommandResult::success("submit", message)
            }
            None => CommandResult::failure(
                "submit",
                "workflow",
                receipt
                    .errors
                    .first()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "submission was dropped".to_string()),
                6,
            ),
        },
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("submit", error_class, message, exit_code)
        }
    }
}
