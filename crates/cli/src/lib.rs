pub mod commands;

use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use commands::submit::SubmitInput;

#[derive(Debug, Parser)]
#[command(
    name = "ptoflow",
    about = "PTO request workflow CLI",
    long_about = "Operate the PTO request workflow: migrations, demo fixtures, request submission, and manager status edits.",
    after_help = "Examples:\n  ptoflow migrate\n  ptoflow seed\n  ptoflow submit --employee-id emp-1001 --name \"Dana Whitfield\" --absence-type vacation --start 2026-09-14 --end 2026-09-18 --hours 40\n  ptoflow set-status --request-id REQ-seed-001 --status approved"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations")]
    Migrate,
    #[command(about = "Load deterministic demo fixtures (employee balances and a pending request)")]
    Seed,
    #[command(about = "Submit a new PTO request (the submission trigger)")]
    Submit {
        #[arg(long, help = "Existing request id to reuse; generated when omitted")]
        request_id: Option<String>,
        #[arg(long)]
        employee_id: String,
        #[arg(long)]
        name: String,
        #[arg(long, help = "Free-text absence type, e.g. vacation, personal, sick")]
        absence_type: String,
        #[arg(long, help = "First day of absence (YYYY-MM-DD)")]
        start: NaiveDate,
        #[arg(long, help = "Last day of absence (YYYY-MM-DD)")]
        end: NaiveDate,
        #[arg(long, help = "PTO hours requested")]
        hours: Option<Decimal>,
    },
    #[command(name = "set-status", about = "Apply a manager status edit (the edit trigger)")]
    SetStatus {
        #[arg(long)]
        request_id: String,
        #[arg(long, help = "approved, denied, or needs_info; anything else is ignored")]
        status: String,
    },
    #[command(about = "Print a request row and its employee's balance as JSON")]
    Show {
        #[arg(long)]
        request_id: String,
    },
    #[command(about = "List the employee balance roster as JSON")]
    Employees,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Submit {
            request_id,
            employee_id,
            name,
            absence_type,
            start,
            end,
            hours,
        } => commands::submit::run(SubmitInput {
            request_id,
            employee_id,
            employee_name: name,
            absence_type,
            start_date: start,
            end_date: end,
            hours,
        }),
        Command::SetStatus { request_id, status } => commands::status::run(request_id, status),
        Command::Show { request_id } => commands::show::run(request_id),
        Command::Employees => commands::employees::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
