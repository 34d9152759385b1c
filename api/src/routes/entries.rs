use actix_web::{web, HttpResponse};
use chrono::Duration;
use uuid::Uuid;

use sk_core::repositories::{EntryRepository, TokenRepository, UserRepository};
use sk_core::services::entry::{CreateEntryRequest as NewEntry, EntryNotifier, RevealOutcome};
use sk_shared::errors::{error_codes, ErrorResponse};

use crate::dto::{
    CreateEntryRequest, EntryEnvelope, EntryListResponse, EntryResponse, NonceQuery,
    RevealFailure, RevealRequest, RevealResponse,
};
use crate::handlers::error::{forbidden, handle_domain_error};
use crate::middleware::auth::{AuthContext, OptionalAuth};

use super::AppState;

/// Handler for POST /api/v1/entries
///
/// Encrypts and stores a secret for `sendToEmail`, then notifies the
/// recipient with the entry link. `duration` is given in minutes.
///
/// # Response
///
/// ## Success (201 Created)
/// ```json
/// { "success": true, "entry": { "id": "...", "name": "wifi", "expiresAtUtc": "..." } }
/// ```
///
/// ## Errors
/// - 400 Bad Request: every violated rule in `errors`
/// - 401 Unauthorized: no valid access token
/// - 500 Internal Server Error: storage or notification failure
pub async fn create_entry<E, N, T, U>(
    state: web::Data<AppState<E, N, T, U>>,
    auth: AuthContext,
    request: web::Json<CreateEntryRequest>,
) -> HttpResponse
where
    E: EntryRepository + 'static,
    N: EntryNotifier + 'static,
    T: TokenRepository + 'static,
    U: UserRepository + 'static,
{
    let request = request.into_inner();
    let new_entry = NewEntry {
        name: request.name,
        sent_by_user_id: auth.user_id,
        sent_to_email: request.send_to_email,
        value: request.value,
        secret: request.secret,
        duration: duration_from_minutes(request.duration),
    };

    match state.entry_service.create_entry(new_entry).await {
        Ok(entry) => HttpResponse::Created().json(EntryEnvelope {
            success: true,
            entry: EntryResponse::from(&entry),
        }),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for GET /api/v1/entries/{id}?nonce=
///
/// A missing entry, a wrong nonce and an expired entry all answer 404.
pub async fn find_entry<E, N, T, U>(
    state: web::Data<AppState<E, N, T, U>>,
    _auth: OptionalAuth,
    path: web::Path<Uuid>,
    query: web::Query<NonceQuery>,
) -> HttpResponse
where
    E: EntryRepository + 'static,
    N: EntryNotifier + 'static,
    T: TokenRepository + 'static,
    U: UserRepository + 'static,
{
    match state
        .entry_service
        .find_entry(path.into_inner(), &query.nonce)
        .await
    {
        Ok(Some(entry)) => HttpResponse::Ok().json(EntryEnvelope {
            success: true,
            entry: EntryResponse::from(&entry),
        }),
        Ok(None) => entry_not_found(),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/v1/entries/{id}/value
///
/// Reveals the secret value once. A failed attempt answers 400 with
/// `expired: true` when it used up the last allowed guess.
pub async fn reveal_entry<E, N, T, U>(
    state: web::Data<AppState<E, N, T, U>>,
    _auth: OptionalAuth,
    path: web::Path<Uuid>,
    request: web::Json<RevealRequest>,
) -> HttpResponse
where
    E: EntryRepository + 'static,
    N: EntryNotifier + 'static,
    T: TokenRepository + 'static,
    U: UserRepository + 'static,
{
    let outcome = match state
        .entry_service
        .decrypt_entry(path.into_inner(), &request.nonce, &request.secret)
        .await
    {
        Ok(outcome) => outcome,
        Err(error) => return handle_domain_error(error),
    };

    match outcome {
        RevealOutcome::Revealed { value } => HttpResponse::Ok().json(RevealResponse {
            success: true,
            value: String::from_utf8_lossy(&value).into_owned(),
        }),
        failed => HttpResponse::BadRequest().json(RevealFailure {
            success: false,
            errors: failed.errors().into_iter().map(String::from).collect(),
            expired: failed.is_expired(),
        }),
    }
}

/// Handler for GET /api/v1/users/{id}/entries
///
/// Lists the caller's own active entries, oldest first.
pub async fn list_user_entries<E, N, T, U>(
    state: web::Data<AppState<E, N, T, U>>,
    auth: AuthContext,
    path: web::Path<Uuid>,
) -> HttpResponse
where
    E: EntryRepository + 'static,
    N: EntryNotifier + 'static,
    T: TokenRepository + 'static,
    U: UserRepository + 'static,
{
    let owner_id = path.into_inner();
    if owner_id != auth.user_id {
        log::debug!("User {} asked for entries of {}", auth.user_id, owner_id);
        return forbidden();
    }

    match state.entry_service.list_by_owner(owner_id).await {
        Ok(entries) => HttpResponse::Ok().json(EntryListResponse {
            success: true,
            entries: entries.iter().map(EntryResponse::from).collect(),
        }),
        Err(error) => handle_domain_error(error),
    }
}

fn entry_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(error_codes::NOT_FOUND, "Entry not found"))
}

/// Non-positive input maps to zero so validation reports it; overflow saturates
fn duration_from_minutes(minutes: i64) -> Duration {
    if minutes <= 0 {
        return Duration::zero();
    }
    Duration::try_minutes(minutes).unwrap_or_else(Duration::max_value)
}
