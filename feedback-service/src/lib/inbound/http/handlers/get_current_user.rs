use axum::http::StatusCode;
use axum::Extension;

use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::Principal;

/// Return the caller's own account, as resolved by the auth gate.
pub async fn get_current_user(
    Extension(principal): Extension<Principal>,
) -> ApiSuccess<UserData> {
    ApiSuccess::new(StatusCode::OK, (&principal).into())
}
