//! Effect dispatcher.
//!
//! Reducers return [`SideEffect`] values; this dispatcher executes them
//! against the provider traits. Failures here are logged and dropped, never
//! propagated back into reducer state: a paid registration whose ticket
//! upload failed is still paid, and a later outcome replay re-issues the
//! ticket.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::DispatchConfig;
use crate::effects::{Notification, SideEffect};
use crate::error::{BookingError, Result};
use crate::providers::{ArtifactStore, CatalogStore, Notifier, RegistrationStore, TicketRenderer};
use crate::types::RegistrationId;

/// Executes side effects emitted by the reducers
pub struct EffectDispatcher {
    catalog: Arc<dyn CatalogStore>,
    registrations: Arc<dyn RegistrationStore>,
    renderer: Arc<dyn TicketRenderer>,
    artifacts: Arc<dyn ArtifactStore>,
    notifier: Arc<dyn Notifier>,
    config: DispatchConfig,
}

impl EffectDispatcher {
    /// Creates a dispatcher over the given providers
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        registrations: Arc<dyn RegistrationStore>,
        renderer: Arc<dyn TicketRenderer>,
        artifacts: Arc<dyn ArtifactStore>,
        notifier: Arc<dyn Notifier>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            catalog,
            registrations,
            renderer,
            artifacts,
            notifier,
            config,
        }
    }

    /// Executes a batch of effects in order.
    ///
    /// Never fails: each effect's failure is logged and the remaining
    /// effects still run.
    pub async fn dispatch(&self, effects: impl IntoIterator<Item = SideEffect>) {
        for effect in effects {
            self.execute(effect).await;
        }
    }

    async fn execute(&self, effect: SideEffect) {
        match effect {
            SideEffect::IssueTicket { registration_id } => {
                if let Err(error) = self.issue_ticket(registration_id).await {
                    crate::metrics::record_effect_failure("issue_ticket");
                    tracing::error!(
                        registration_id = %registration_id.as_uuid(),
                        %error,
                        "Ticket issuance failed"
                    );
                }
            }
            SideEffect::Notify(notification) => {
                let kind = notification.kind();
                let registration_id = notification.registration_id();
                if let Err(error) = self.deliver(notification).await {
                    crate::metrics::record_effect_failure(kind);
                    tracing::error!(
                        kind,
                        registration_id = %registration_id.as_uuid(),
                        %error,
                        "Notification delivery failed"
                    );
                }
            }
        }
    }

    /// Issues the ticket artifact for a paid registration.
    ///
    /// Render, store, attach the URL, then send the booking confirmation.
    /// Skips silently when a ticket URL is already attached; re-running
    /// after a partial failure overwrites the artifact in place.
    async fn issue_ticket(&self, registration_id: RegistrationId) -> Result<()> {
        let registration = self.registrations.find(registration_id).await?.ok_or_else(|| {
            BookingError::not_found("registration", registration_id.as_uuid().to_string())
        })?;

        if registration.ticket_url.is_some() {
            tracing::debug!(
                registration_id = %registration_id.as_uuid(),
                "Ticket already issued, skipping"
            );
            return Ok(());
        }

        let event = self
            .catalog
            .event(registration.event_id)
            .await?
            .ok_or_else(|| {
                BookingError::not_found("event", registration.event_id.as_uuid().to_string())
            })?;

        let recipient = registration.attendee.email.clone();
        let attendee_name = registration.attendee.first_name.clone();
        let reference = registration.reference.clone();

        let bytes = self.renderer.render(registration, event).await?;
        let url = self.artifacts.store_ticket(registration_id, bytes).await?;
        self.registrations
            .attach_ticket_url(registration_id, url)
            .await?;

        crate::metrics::record_ticket_issued();
        tracing::info!(registration_id = %registration_id.as_uuid(), "Ticket issued");

        // The ticket is issued at this point; a confirmation failure is its
        // own incident, not an issuance failure.
        if let Err(error) = self
            .deliver(Notification::BookingConfirmed {
                registration_id,
                recipient,
                attendee_name,
                reference,
            })
            .await
        {
            crate::metrics::record_effect_failure("booking_confirmed");
            tracing::error!(
                registration_id = %registration_id.as_uuid(),
                %error,
                "Confirmation delivery failed after issuance"
            );
        }
        Ok(())
    }

    async fn deliver(&self, notification: Notification) -> Result<()> {
        let notifier = Arc::clone(&self.notifier);
        with_retry(&self.config, || {
            let notifier = Arc::clone(&notifier);
            let notification = notification.clone();
            async move { notifier.send(notification).await }
        })
        .await
    }
}

/// Runs an operation under the configured retry policy.
///
/// Delays grow exponentially between attempts, capped at the configured
/// ceiling. The attempt count includes the initial attempt.
///
/// # Errors
///
/// Returns the last attempt's error once all attempts are exhausted.
pub async fn with_retry<T, F, Fut>(config: &DispatchConfig, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = config.max_attempts.max(1);
    let mut delay = Duration::from_millis(config.initial_delay_ms);
    let max_delay = Duration::from_millis(config.max_delay_ms);
    let mut last_error = None;

    for attempt in 0..attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                tracing::warn!(attempt = attempt + 1, %error, "Dispatch attempt failed");
                last_error = Some(error);
                if attempt < attempts - 1 {
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(max_delay);
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| BookingError::Persistence("no dispatch attempts were made".to_string())))
}
