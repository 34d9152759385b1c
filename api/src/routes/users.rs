use actix_web::{web, HttpResponse};

use sk_core::errors::{DomainError, TokenError};
use sk_core::repositories::{EntryRepository, TokenRepository, UserRepository};
use sk_core::services::entry::EntryNotifier;
use sk_core::services::user::CreateUserRequest as NewUser;

use crate::dto::{
    CreateUserRequest, CreateUserResponse, LoginRequest, LoginResponse, LogoutRequest,
    TokenRequest, TokenResponse,
};
use crate::handlers::error::handle_domain_error;
use crate::middleware::auth::AuthContext;

use super::AppState;

/// Handler for POST /api/v1/users
///
/// Registers a new account.
///
/// # Response
///
/// ## Success (201 Created)
/// ```json
/// { "success": true, "user": { "id": "...", "email": "ann@example.com", ... } }
/// ```
///
/// ## Errors
/// - 400 Bad Request: `{ "success": false, "errors": [...] }`, including a taken email
pub async fn create_user<E, N, T, U>(
    state: web::Data<AppState<E, N, T, U>>,
    request: web::Json<CreateUserRequest>,
) -> HttpResponse
where
    E: EntryRepository + 'static,
    N: EntryNotifier + 'static,
    T: TokenRepository + 'static,
    U: UserRepository + 'static,
{
    let request = request.into_inner();
    let new_user = NewUser {
        email: request.email,
        password: request.password,
        first_name: request.first_name,
        last_name: request.last_name,
    };

    match state.user_service.create_user(new_user).await {
        Ok(user) => HttpResponse::Created().json(CreateUserResponse {
            success: true,
            user: user.into(),
        }),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/v1/login
///
/// Checks credentials and opens a session: a short-lived access token and
/// a refresh token. Unknown email and wrong password look the same.
pub async fn login<E, N, T, U>(
    state: web::Data<AppState<E, N, T, U>>,
    request: web::Json<LoginRequest>,
) -> HttpResponse
where
    E: EntryRepository + 'static,
    N: EntryNotifier + 'static,
    T: TokenRepository + 'static,
    U: UserRepository + 'static,
{
    let user = match state
        .user_service
        .login(&request.email, &request.password)
        .await
    {
        Ok(user) => user,
        Err(error) => return handle_domain_error(error),
    };

    match state.token_service.issue_session(user.id).await {
        Ok(pair) => HttpResponse::Ok().json(LoginResponse::new(user.id, pair)),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/v1/token
///
/// Trades a refresh token for a new access token. The refresh token is not
/// rotated and stays valid until it expires or the user logs out.
pub async fn refresh_token<E, N, T, U>(
    state: web::Data<AppState<E, N, T, U>>,
    request: web::Json<TokenRequest>,
) -> HttpResponse
where
    E: EntryRepository + 'static,
    N: EntryNotifier + 'static,
    T: TokenRepository + 'static,
    U: UserRepository + 'static,
{
    let record = match state
        .token_service
        .verify_refresh_token(&request.refresh_token, request.user_id)
        .await
    {
        Ok(record) => record,
        Err(error) => return handle_domain_error(error),
    };

    match state.token_service.refresh_access_token(&record) {
        Ok(issued) => HttpResponse::Ok().json(TokenResponse::from(issued)),
        Err(error) => handle_domain_error(error),
    }
}

/// Handler for POST /api/v1/logout
///
/// Revokes one of the caller's refresh tokens. Unknown or already expired
/// tokens are treated as logged out.
pub async fn logout<E, N, T, U>(
    state: web::Data<AppState<E, N, T, U>>,
    auth: AuthContext,
    request: web::Json<LogoutRequest>,
) -> HttpResponse
where
    E: EntryRepository + 'static,
    N: EntryNotifier + 'static,
    T: TokenRepository + 'static,
    U: UserRepository + 'static,
{
    let verified = state
        .token_service
        .verify_refresh_token(&request.refresh_token, auth.user_id)
        .await;

    let record = match verified {
        Ok(record) => record,
        Err(DomainError::Token(
            TokenError::InvalidRefreshToken | TokenError::RefreshTokenExpired,
        )) => return HttpResponse::NoContent().finish(),
        Err(error) => return handle_domain_error(error),
    };

    match state.token_service.revoke_refresh_token(&record).await {
        Ok(_) => {
            log::info!("User {} logged out", auth.user_id);
            HttpResponse::NoContent().finish()
        }
        Err(error) => handle_domain_error(error),
    }
}
