use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::server::AppState;
use crate::services::{AuthSession, Credentials};

/// POST /api/auth/signup - Register and receive a JWT token
///
/// Expected Input:
/// ```json
/// { "email": "a@x.com", "password": "pw1" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "user": { "id": "user_uuid", "email": "a@x.com" }
///   }
/// }
/// ```
///
/// A registered email yields 400 with message "User exists".
pub async fn signup(
    State(state): State<AppState>,
    ValidJson(credentials): ValidJson<Credentials>,
) -> ApiResult<AuthSession> {
    let session = state.auth.signup(credentials).await?;
    Ok(ApiResponse::success(session))
}

/// POST /api/auth/login - Authenticate and receive a JWT token
///
/// Same input and output shape as signup. Unknown email and wrong password
/// both answer 400 "Invalid credentials".
pub async fn login(
    State(state): State<AppState>,
    ValidJson(credentials): ValidJson<Credentials>,
) -> ApiResult<AuthSession> {
    let session = state.auth.login(credentials).await?;
    Ok(ApiResponse::success(session))
}
