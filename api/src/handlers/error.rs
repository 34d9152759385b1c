//! Conversion of domain errors into HTTP responses

use actix_web::{error::InternalError, error::JsonPayloadError, HttpRequest, HttpResponse};
use sk_core::errors::{AuthError, DomainError, TokenError};
use sk_shared::errors::{error_codes, ErrorResponse, ValidationFailure};

use crate::middleware::auth::token_error_response;

/// Maps a domain error to its HTTP response.
///
/// Internal failures are logged in full and answered with a generic message.
pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    match error {
        DomainError::Validation { errors } => {
            HttpResponse::BadRequest().json(ValidationFailure::new(errors))
        }
        DomainError::Internal { message } => {
            log::error!("Internal error: {}", message);
            internal_error()
        }
        DomainError::Auth(auth_error) => handle_auth_error(auth_error),
        DomainError::Token(TokenError::TokenGenerationFailed) => {
            log::error!("Token generation failed");
            internal_error()
        }
        DomainError::Token(token_error) => token_error_response(&token_error),
    }
}

fn handle_auth_error(error: AuthError) -> HttpResponse {
    match error {
        AuthError::InvalidCredentials => HttpResponse::Unauthorized()
            .json(ErrorResponse::new(error_codes::UNAUTHORIZED, error.to_string())),
        AuthError::UserAlreadyExists => {
            HttpResponse::BadRequest().json(ValidationFailure::new(vec![error.to_string()]))
        }
    }
}

/// 403 for callers acting on someone else's resources
pub fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden().json(ErrorResponse::new(
        error_codes::FORBIDDEN,
        "You do not have access to this resource",
    ))
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse::new(
        error_codes::INTERNAL_ERROR,
        "An internal error occurred",
    ))
}

/// Answers unreadable JSON bodies with a 400 `ErrorResponse`
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = err.to_string();
    let response = HttpResponse::BadRequest().json(ErrorResponse::new(
        error_codes::BAD_REQUEST,
        format!("Invalid request body: {}", message),
    ));
    InternalError::from_response(err, response).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, http::StatusCode};

    async fn body_json(response: HttpResponse) -> serde_json::Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn test_validation_lists_every_message() {
        let response = handle_domain_error(DomainError::validation([
            "A name is required.",
            "A secret is required.",
        ]));

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"].as_array().unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_internal_error_hides_detail() {
        let response = handle_domain_error(DomainError::internal("connection refused at 10.0.0.3"));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], error_codes::INTERNAL_ERROR);
        assert!(!json.to_string().contains("10.0.0.3"));
    }

    #[actix_web::test]
    async fn test_status_codes() {
        let cases: [(DomainError, StatusCode); 5] = [
            (AuthError::InvalidCredentials.into(), StatusCode::UNAUTHORIZED),
            (AuthError::UserAlreadyExists.into(), StatusCode::BAD_REQUEST),
            (TokenError::TokenExpired.into(), StatusCode::UNAUTHORIZED),
            (TokenError::InvalidRefreshToken.into(), StatusCode::UNAUTHORIZED),
            (TokenError::TokenGenerationFailed.into(), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(handle_domain_error(error).status(), status);
        }
    }

    #[actix_web::test]
    async fn test_duplicate_user_is_a_validation_failure() {
        let response = handle_domain_error(AuthError::UserAlreadyExists.into());
        let json = body_json(response).await;

        assert_eq!(
            json["errors"][0],
            "An account with the specified email already exists."
        );
    }
}
