use ptoflow_core::domain::request::RequestId;
use ptoflow_core::store::{BalanceLedger, RequestStore};
use ptoflow_db::{connect_with_settings, migrations, SqlBalanceLedger, SqlRequestStore};

use crate::commands::{build_runtime, load_config, CommandResult};

pub fn run(request_id: String) -> CommandResult {
    let config = match load_config("show") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("show") {
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

        let store = SqlRequestStore::new(pool.clone());
        let ledger = SqlBalanceLedger::new(pool.clone());

        let request = store
            .find_by_id(&RequestId(request_id.clone()))
            .await
            .map_err(|error| ("store", error.to_string(), 6u8))?;

        let outcome = match request {
            Some(request) => {
                let balance = ledger
                    .get_balance(&request.employee_id)
                    .await
                    .map_err(|error| ("ledger", error.to_string(), 6u8))?;
                Ok(serde_json::json!({
                    "request": request,
                    "balance": balance,
                })
                .to_string())
            }
            None => Err(("not_found", format!("no request with id `{request_id}`"), 7u8)),
        };

        pool.close().await;
        outcome
    });

    match result {
        Ok(payload) => CommandResult::success("show", payload),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("show", error_class, message, exit_code)
        }
    }
}
