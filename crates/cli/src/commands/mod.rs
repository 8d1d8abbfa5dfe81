pub mod employees;
pub mod migrate;
pub mod seed;
pub mod show;
pub mod status;
pub mod submit;

use serde::Serialize;

use ptoflow_core::audit::TracingAuditSink;
use ptoflow_core::config::{AppConfig, LoadOptions};
use ptoflow_core::workflow::PtoWorkflow;
use ptoflow_db::{DbPool, SqlBalanceLedger, SqlRequestStore};
use ptoflow_notify::{HttpMailer, LogMailer, MailDispatcher, Mailer};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Shared per-command bootstrap: config, then a current-thread runtime.
pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(command, "config_validation", format!("configuration issue: {error}"), 2)
    })
}

pub(crate) fn build_runtime(command: &str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

pub(crate) type CliWorkflow = PtoWorkflow<
    SqlRequestStore,
    SqlBalanceLedger,
    MailDispatcher<Box<dyn Mailer>>,
    TracingAuditSink,
>;

/// Wires the workflow engine over the SQL collaborators. Without a relay
/// url, notices are logged instead of delivered.
pub(crate) fn build_workflow(pool: DbPool, config: &AppConfig) -> CliWorkflow {
    let mailer: Box<dyn Mailer> = match &config.notify.relay_url {
        Some(url) => Box::new(HttpMailer::new(url.clone(), config.notify.relay_token.clone())),
        None => Box::new(LogMailer),
    };

    PtoWorkflow::new(
        SqlRequestStore::new(pool.clone()),
        SqlBalanceLedger::new(pool),
        MailDispatcher::new(mailer),
        TracingAuditSink,
        config.policy.deadline_policy(),
        config.notify.manager_email.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::CommandResult;

    #[test]
    fn success_payload_has_ok_status_and_no_error_class() {
        let result = CommandResult::success("migrate", "applied 1 migration");
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("\"status\":\"ok\""));
        assert!(result.output.contains("\"error_class\":null"));
    }

    #[test]
    fn failure_payload_carries_class_and_exit_code() {
        let result = CommandResult::failure("seed", "db_connectivity", "no such host", 4);
        assert_eq!(result.exit_code, 4);
        assert!(result.output.contains("\"error_class\":\"db_connectivity\""));
        assert!(result.output.contains("no such host"));
    }
}
