//! Role-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use ideaboard_core::error::CoreError;
use ideaboard_core::roles::ROLE_ADMIN;

use super::auth::AuthUser;
use super::identity::ClientIp;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role and a client address inside
/// `ADMIN_TRUSTED_NETWORKS`. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }

        let ClientIp(ip) = ClientIp::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});
        if !state.config.trusted_networks.allows(&ip) {
            tracing::warn!(user_id = user.user_id, ip = %ip, "Admin request from untrusted network");
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin access is not allowed from this network".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}
