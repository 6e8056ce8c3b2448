use chrono::Utc;
use control_plane_db::{
    Gateway, InsertOutcome, PaymentEventRepository, SubscriptionRepository, WorkspaceRepository,
};
use control_plane_lifecycle::LifecycleManager;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::SubscriptionError;
use crate::event::WebhookEvent;
use crate::signature::verify_webhook_signature;
use crate::transition::decide;

/// Processes inbound payment-provider webhooks: signature verification,
/// idempotent ledger insert, row-locked state transition, and post-commit
/// side effects. See the module-level docs for the seven-step algorithm
/// this follows.
#[derive(Clone)]
pub struct SubscriptionProcessor {
    gateway: Gateway,
    lifecycle: LifecycleManager,
    webhook_secret: Vec<u8>,
}

impl SubscriptionProcessor {
    pub fn new(gateway: Gateway, lifecycle: LifecycleManager, webhook_secret: Vec<u8>) -> Self {
        Self {
            gateway,
            lifecycle,
            webhook_secret,
        }
    }

    /// Returns `Ok(())` whenever the provider should see a 200-class
    /// response — including "duplicate delivery", "unknown subscription",
    /// and "transition not allowed", all of which are still recorded.
    /// Returns `Err` only when the provider should retry: bad signature,
    /// malformed payload, or a database failure.
    pub async fn process_webhook(
        &self,
        raw_body: &[u8],
        signature_header: Option<&str>,
    ) -> Result<(), SubscriptionError> {
        let signature = signature_header.ok_or(SubscriptionError::InvalidSignature)?;
        if !verify_webhook_signature(&self.webhook_secret, raw_body, signature) {
            return Err(SubscriptionError::InvalidSignature);
        }

        let raw_payload: serde_json::Value = serde_json::from_slice(raw_body)
            .map_err(|e| SubscriptionError::MalformedPayload(e.to_string()))?;
        let event: WebhookEvent = serde_json::from_slice(raw_body)
            .map_err(|e| SubscriptionError::MalformedPayload(e.to_string()))?;

        let mut tx = self.gateway.begin().await?;

        let insert_outcome = PaymentEventRepository::insert(
            &mut *tx,
            Uuid::new_v4(),
            None,
            &event.provider_event_id,
            &event.event_type,
            event.provider_payment_id.as_deref(),
            event.amount_minor_units,
            event.currency.as_deref(),
            raw_payload,
        )
        .await?;

        if matches!(insert_outcome, InsertOutcome::Duplicate) {
            tx.commit().await.map_err(control_plane_db::DbError::Query)?;
            info!(provider_event_id = %event.provider_event_id, "duplicate webhook delivery, ignoring");
            return Ok(());
        }

        let Some(provider_subscription_id) = &event.provider_subscription_id else {
            tx.commit().await.map_err(control_plane_db::DbError::Query)?;
            warn!(event_type = %event.event_type, "webhook carried no subscription id, recorded only");
            return Ok(());
        };

        let Some(subscription) =
            SubscriptionRepository::find_by_provider_subscription_id(&mut *tx, provider_subscription_id)
                .await?
        else {
            tx.commit().await.map_err(control_plane_db::DbError::Query)?;
            warn!(%provider_subscription_id, "webhook referenced an unknown subscription, recorded only");
            return Ok(());
        };

        let subscription = SubscriptionRepository::find_by_id_for_update(&mut *tx, subscription.id)
            .await?
            .ok_or(control_plane_db::DbError::NotFound)?;

        if subscription.state.is_terminal() {
            tx.commit().await.map_err(control_plane_db::DbError::Query)?;
            info!(subscription_id = %subscription.id, "subscription already terminal, event recorded only");
            return Ok(());
        }

        let outcome = decide(&event.event_type, subscription.state);
        if outcome.is_noop() {
            tx.commit().await.map_err(control_plane_db::DbError::Query)?;
            info!(subscription_id = %subscription.id, event_type = %event.event_type, "transition not allowed, event recorded only");
            return Ok(());
        }

        let next_state = outcome.next_state.unwrap_or(subscription.state);
        let period_start = outcome.refresh_period.then_some(event.period_start).flatten();
        let period_end = outcome.refresh_period.then_some(event.period_end).flatten();
        let cancelled_at = outcome.set_cancelled_at.then_some(Utc::now());

        SubscriptionRepository::apply_transition(
            &mut *tx,
            subscription.id,
            next_state,
            period_start,
            period_end,
            cancelled_at,
        )
        .await?;

        let user_id = subscription.user_id;
        tx.commit().await.map_err(control_plane_db::DbError::Query)?;
        info!(subscription_id = %subscription.id, ?next_state, "subscription transition applied");

        if outcome.triggers_stop {
            self.spawn_stop_fan_out(user_id);
        }

        Ok(())
    }

    /// Stops every workspace belonging to a user whose subscription just
    /// left the active pool. Runs after commit, on its own task, so a slow
    /// or failing container engine never delays the webhook response.
    fn spawn_stop_fan_out(&self, user_id: Uuid) {
        let gateway = self.gateway.clone();
        let lifecycle = self.lifecycle.clone();
        tokio::spawn(async move {
            let workspaces = match WorkspaceRepository::list_by_owner(gateway.pool(), user_id).await {
                Ok(workspaces) => workspaces,
                Err(e) => {
                    error!(%user_id, error = %e, "failed to list workspaces for stop fan-out");
                    return;
                }
            };
            for workspace in workspaces {
                if let Err(e) = lifecycle.stop(workspace.id, true).await {
                    error!(workspace_id = %workspace.id, error = %e, "failed to stop workspace after subscription ended");
                }
            }
        });
    }
}
