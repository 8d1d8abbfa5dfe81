//! Notification delivery for ptoflow.
//!
//! The decision core only says *which* notice fires and what data it
//! carries; this crate owns presentation and transport:
//! - **Messages** (`messages`) - renders a `NotificationIntent` into a mail
//!   subject and body
//! - **Mailer** (`mailer`) - transport seam with an HTTP relay
//!   implementation and an in-memory recorder for tests
//! - **Dispatcher** (`dispatcher`) - the `NotificationDispatcher`
//!   implementation the workflow engine is wired with
//!
//! Delivery is fire-and-forget: the engine swallows and logs transport
//! failures, so nothing here retries or queues.

pub mod dispatcher;
pub mod mailer;
pub mod messages;

pub use dispatcher::MailDispatcher;
pub use mailer::{HttpMailer, LogMailer, Mailer, MailerError, RecordingMailer};
pub use messages::{render, MailMessage};
