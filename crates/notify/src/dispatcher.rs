use async_trait::async_trait;

use ptoflow_core::errors::NotifyError;
use ptoflow_core::notifications::{NotificationDispatcher, NotificationIntent};

use crate::mailer::Mailer;
use crate::messages::render;

/// The production `NotificationDispatcher`: renders each intent and hands
/// it to the transport. Failures surface as `NotifyError` and the workflow
/// engine decides what to do with them (swallow and log).
pub struct MailDispatcher<M> {
    mailer: M,
}

impl<M> MailDispatcher<M>
where
    M: Mailer,
{
    pub fn new(mailer: M) -> Self {
        Self { mailer }
    }
}

#[async_trait]
impl<M> NotificationDispatcher for MailDispatcher<M>
where
    M: Mailer,
{
    async fn send(&self, to: &str, intent: &NotificationIntent) -> Result<(), NotifyError> {
        let message = render(intent);
        tracing::debug!(
            to,
            request_id = %intent.request.request_id.0,
            subject = %message.subject,
            "dispatching notice"
        );

        self.mailer
            .deliver(to, &message)
            .await
            .map_err(|error| NotifyError::Transport(error.to_string()))
    }
}
