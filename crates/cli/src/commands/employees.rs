use ptoflow_core::store::BalanceLedger;
use ptoflow_db::{connect_with_settings, migrations, SqlBalanceLedger};

use crate::commands::{build_runtime, load_config, CommandResult};

pub fn run() -> CommandResult {
    let config = match load_config("employees") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("employees") {
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

        let ledger = SqlBalanceLedger::new(pool.clone());
        let roster = ledger
            .list_employees()
            .await
            .map_err(|error| ("ledger", error.to_string(), 6u8))?;

        pool.close().await;
        Ok::<_, (&'static str, String, u8)>(serde_json::json!(roster).to_string())
    });

    match result {
        Ok(payload) => CommandResult::success("employees", payload),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("employees", error_class, message, exit_code)
        }
    }
}
