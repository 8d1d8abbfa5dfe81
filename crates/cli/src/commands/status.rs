use ptoflow_core::domain::request::RequestId;
use ptoflow_db::{connect_with_settings, migrations};

use crate::commands::{build_runtime, build_workflow, load_config, CommandResult};

pub fn run(request_id: String, new_status: String) -> CommandResult {
    let config = match load_config("set-status") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("set-status") {
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
        let receipt = workflow.on_status_edit(&RequestId(request_id), &new_status).await;

        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(receipt)
    });

    match result {
        Ok(receipt) => {
            if let Some(status) = receipt.status {
                let mut message = format!(
                    "request {} is now {status}; {} notice(s) sent",
                    receipt.request_id.0, receipt.notices_sent
                );
                if !receipt.errors.is_empty() {
                    message.push_str(&format!("; {} collaborator failure(s) logged", receipt.errors.len()));
                }
                return CommandResult::success("set-status", message);
            }
            if let Some(reason) = receipt.ignored {
                return CommandResult::success(
                    "set-status",
                    format!("edit ignored for request {}: {reason:?}", receipt.request_id.0),
                );
            }
            CommandResult::failure(
                "set-status",
                "workflow",
                receipt
                    .errors
                    .first()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "status edit was dropped".to_string()),
                6,
            )
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("set-status", error_class, message, exit_code)
        }
    }
}
