use axum::extract::{Extension, State};
use axum::Json;
use chrono::Utc;
use control_plane_db::{SubscriptionRepository, WorkspaceRepository};
use control_plane_models::SubscriptionState;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthenticatedUser;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub plan_id: String,
}

#[derive(Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

pub struct PaymentsHandler;

impl PaymentsHandler {
    #[instrument(skip(state, body))]
    pub async fn checkout(
        State(state): State<AppState>,
        Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
        Json(body): Json<CheckoutRequest>,
    ) -> Result<Json<Value>, ApiError> {
        if !state.config.plan_ids.contains(&body.plan_id) {
            return Err(ApiError::Validation(format!("unknown plan id: {}", body.plan_id)));
        }

        let subscription_id = Uuid::new_v4();
        let provider_subscription_id = format!("chk_{subscription_id}");

        SubscriptionRepository::insert(
            state.gateway.pool(),
            subscription_id,
            user_id,
            &body.plan_id,
            Some(&provider_subscription_id),
        )
        .await?;

        let short_url = format!(
            "https://checkout.{}/session/{provider_subscription_id}",
            state.config.payment_provider_key_id
        );

        Ok(Json(json!({
            "subscription_id": subscription_id,
            "short_url": short_url,
        })))
    }

    #[instrument(skip(state))]
    pub async fn get_subscription(
        State(state): State<AppState>,
        Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
    ) -> Result<Json<Value>, ApiError> {
        let subscription = SubscriptionRepository::find_current_for_user(state.gateway.pool(), user_id)
            .await?
            .ok_or(ApiError::NotFound)?;

        let now = Utc::now();
        let is_active = subscription.is_entitled(now);
        let days_remaining = subscription
            .period_end
            .map(|end| (end - now).num_days().max(0))
            .unwrap_or(0);

        Ok(Json(json!({
            "state": subscription.state.as_str(),
            "plan": subscription.plan_id,
            "period_start": subscription.period_start,
            "period_end": subscription.period_end,
            "is_active": is_active,
            "days_remaining": days_remaining,
        })))
    }

    #[instrument(skip(state, _body))]
    pub async fn cancel(
        State(state): State<AppState>,
        Extension(AuthenticatedUser(user_id)): Extension<AuthenticatedUser>,
        Json(_body): Json<CancelRequest>,
    ) -> Result<Json<Value>, ApiError> {
        let subscription = SubscriptionRepository::find_current_for_user(state.gateway.pool(), user_id)
            .await?
            .ok_or(ApiError::NotFound)?;

        let mut tx = state.gateway.begin().await?;
        let locked = SubscriptionRepository::find_by_id_for_update(&mut *tx, subscription.id)
            .await?
            .ok_or(ApiError::NotFound)?;

        if locked.state.is_terminal() {
            tx.commit().await.map_err(control_plane_db::DbError::Query)?;
            return Err(ApiError::Conflict("subscription is already cancelled or expired".to_string()));
        }
        if !locked.state.can_transition_to(SubscriptionState::Cancelled) {
            tx.commit().await.map_err(control_plane_db::DbError::Query)?;
            return Err(ApiError::Conflict("subscription cannot be cancelled from its current state".to_string()));
        }

        let cancelled_at = Utc::now();
        let updated = SubscriptionRepository::apply_transition(
            &mut *tx,
            locked.id,
            SubscriptionState::Cancelled,
            None,
            None,
            Some(cancelled_at),
        )
        .await?;
        tx.commit().await.map_err(control_plane_db::DbError::Query)?;

        spawn_stop_fan_out(state.clone(), user_id);

        Ok(Json(json!({ "end_date": updated.cancelled_at })))
    }
}

/// Mirrors `control_plane_subscriptions::SubscriptionProcessor`'s
/// post-cancellation fan-out for the user-initiated cancel path: stop
/// every workspace the user owns, off the request's critical path.
fn spawn_stop_fan_out(state: AppState, user_id: Uuid) {
    tokio::spawn(async move {
        let workspaces = match WorkspaceRepository::list_by_owner(state.gateway.pool(), user_id).await {
            Ok(workspaces) => workspaces,
            Err(e) => {
                error!(%user_id, error = %e, "failed to list workspaces for stop fan-out");
                return;
            }
        };
        for workspace in workspaces {
            if let Err(e) = state.lifecycle.stop(workspace.id, true).await {
                error!(workspace_id = %workspace.id, error = %e, "failed to stop workspace after cancellation");
            }
        }
    });
}
