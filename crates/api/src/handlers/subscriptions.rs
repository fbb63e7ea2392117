//! Handler for email opt-ins.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use ideaboard_core::subscriptions::{normalize_email, normalize_source};
use ideaboard_db::models::subscription::CreateSubscription;
use ideaboard_db::repositories::SubscriptionRepo;
use ideaboard_events::bus::SUBSCRIPTION_CREATED;
use ideaboard_events::PlatformEvent;
use serde::Serialize;
use serde_json::json;

use crate::error::AppResult;
use crate::middleware::identity::MaybeActor;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub email: String,
    pub already_subscribed: bool,
}

/// POST /api/v1/subscriptions
///
/// 201 for a new address, 200 with `already_subscribed` for a known one.
/// Only new addresses are relayed to the mailing list.
pub async fn subscribe(
    State(state): State<AppState>,
    MaybeActor(identity): MaybeActor,
    Json(input): Json<CreateSubscription>,
) -> AppResult<(StatusCode, Json<DataResponse<SubscriptionResponse>>)> {
    let email = normalize_email(&input.email)?;
    let source = normalize_source(input.source.as_deref())?;
    let session_id = identity.as_ref().and_then(|i| i.session_id());

    let created = SubscriptionRepo::create(&state.pool, &email, &source, session_id).await?;
    let status = match created {
        Some(subscription) => {
            tracing::info!(subscription_id = subscription.id, source = %source, "Subscription created");
            state.event_bus.publish(
                PlatformEvent::new(SUBSCRIPTION_CREATED)
                    .with_source("subscription", subscription.id)
                    .with_payload(json!({ "email": email, "source": source })),
            );
            StatusCode::CREATED
        }
        None => StatusCode::OK,
    };

    Ok((
        status,
        Json(DataResponse {
            data: SubscriptionResponse {
                email,
                already_subscribed: status == StatusCode::OK,
            },
        }),
    ))
}
