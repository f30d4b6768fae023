use axum::extract::{Extension, Path, State};
use serde::{Deserialize, Serialize};

use crate::database::models::{Contact, ContactPatch, NewContact};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson, ValidQuery};
use crate::services::ContactService;
use crate::server::AppState;
use crate::types::ContactId;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteConfirmation {
    pub msg: &'static str,
}

/// POST /api/contacts - Create a contact owned by the caller
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidJson(contact): ValidJson<NewContact>,
) -> ApiResult<Contact> {
    let created = state.contacts.add(auth.user_id, contact).await?;
    Ok(ApiResponse::created(created))
}

/// GET /api/contacts?search=term - The caller's contacts, optionally filtered
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidQuery(query): ValidQuery<ListQuery>,
) -> ApiResult<Vec<Contact>> {
    let contacts = state
        .contacts
        .list(auth.user_id, query.search.as_deref())
        .await?;
    Ok(ApiResponse::success(contacts))
}

/// PUT /api/contacts/:id - Partially update one of the caller's contacts
///
/// The body is validated first, so a bad field value is a 400 for any id.
/// After that, responds `data: null` when the id is unknown, malformed, or
/// owned by someone else. These cases are indistinguishable.
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidJson(patch): ValidJson<ContactPatch>,
) -> ApiResult<Option<Contact>> {
    let Ok(id) = id.parse::<ContactId>() else {
        ContactService::clean_patch(patch)?;
        return Ok(ApiResponse::success(None));
    };
    let updated = state.contacts.update(auth.user_id, id, patch).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/contacts/:id - Remove one of the caller's contacts
///
/// Always confirms, whether or not a contact was removed.
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<DeleteConfirmation> {
    if let Ok(id) = id.parse::<ContactId>() {
        state.contacts.delete(auth.user_id, id).await?;
    }
    Ok(ApiResponse::success(DeleteConfirmation { msg: "Deleted" }))
}
