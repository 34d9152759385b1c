//! JWT authentication middleware.
//!
//! Requests without an `Authorization` header pass through anonymously.
//! In [`JwtAuth::required`] mode a header carrying a token that fails
//! verification is answered with 401 before any handler runs; in
//! [`JwtAuth::optional`] mode such a request continues anonymously. A
//! verified token places an [`AuthContext`] in the request extensions, read
//! back by the [`AuthContext`] and [`OptionalAuth`] extractors.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    error::InternalError,
    http::header::AUTHORIZATION,
    Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use sk_core::errors::TokenError;
use sk_core::services::token::AccessTokenVerifier;
use sk_shared::errors::{error_codes, ErrorResponse};
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
};
use uuid::Uuid;

/// Authenticated caller injected into requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// User ID taken from the token subject
    pub user_id: Uuid,
}

/// JWT authentication middleware factory
#[derive(Clone)]
pub struct JwtAuth {
    verifier: Arc<dyn AccessTokenVerifier>,
    reject_invalid: bool,
}

impl JwtAuth {
    /// Rejects requests whose token fails verification with 401
    pub fn required(verifier: Arc<dyn AccessTokenVerifier>) -> Self {
        Self {
            verifier,
            reject_invalid: true,
        }
    }

    /// Treats requests whose token fails verification as anonymous
    pub fn optional(verifier: Arc<dyn AccessTokenVerifier>) -> Self {
        Self {
            verifier,
            reject_invalid: false,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            verifier: Arc::clone(&self.verifier),
            reject_invalid: self.reject_invalid,
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    verifier: Arc<dyn AccessTokenVerifier>,
    reject_invalid: bool,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        if req.headers().contains_key(AUTHORIZATION) {
            let verified = extract_bearer_token(&req)
                .ok_or(TokenError::InvalidTokenFormat)
                .and_then(|token| self.verifier.verify_access_token(&token));

            match verified {
                Ok(user_id) => {
                    req.extensions_mut().insert(AuthContext { user_id });
                }
                Err(e) if !self.reject_invalid => {
                    log::debug!("Ignoring invalid access token: {}", e.code());
                }
                Err(e) => {
                    log::debug!("Rejected access token: {}", e.code());
                    let response = token_error_response(&e).map_into_right_body();
                    let (http_req, _payload) = req.into_parts();
                    return Box::pin(async move { Ok(ServiceResponse::new(http_req, response)) });
                }
            }
        }

        Box::pin(async move {
            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Extracts Bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.trim().to_string())
}

/// 401 body for a token that failed verification
pub fn token_error_response(error: &TokenError) -> HttpResponse {
    let code = match error {
        TokenError::MissingToken => error_codes::UNAUTHENTICATED,
        TokenError::TokenExpired => error_codes::TOKEN_EXPIRED,
        TokenError::RefreshTokenExpired | TokenError::InvalidRefreshToken => {
            error_codes::REFRESH_TOKEN_INVALID
        }
        _ => error_codes::TOKEN_INVALID,
    };

    HttpResponse::Unauthorized()
        .json(ErrorResponse::new(code, error.to_string()).add_detail("reason", error.code()))
}

fn authentication_required() -> Error {
    InternalError::from_response(
        "authentication required",
        HttpResponse::Unauthorized().json(ErrorResponse::new(
            error_codes::UNAUTHENTICATED,
            "Authentication required",
        )),
    )
    .into()
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<AuthContext>()
            .copied()
            .ok_or_else(authentication_required);

        ready(result)
    }
}

/// Extractor for optional authentication
pub struct OptionalAuth(pub Option<AuthContext>);

impl FromRequest for OptionalAuth {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let auth = req.extensions().get::<AuthContext>().copied();
        ready(Ok(OptionalAuth(auth)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test as actix_test, web, App};

    struct FixedVerifier(Uuid);

    impl AccessTokenVerifier for FixedVerifier {
        fn verify_access_token(&self, token: &str) -> Result<Uuid, TokenError> {
            match token {
                "good" => Ok(self.0),
                "old" => Err(TokenError::TokenExpired),
                "" => Err(TokenError::MissingToken),
                _ => Err(TokenError::InvalidSignature),
            }
        }
    }

    async fn whoami(auth: OptionalAuth) -> HttpResponse {
        match auth.0 {
            Some(ctx) => HttpResponse::Ok().body(ctx.user_id.to_string()),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    #[test]
    fn test_extract_bearer_token() {
        let req = actix_test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer test_token_123"))
            .to_srv_request();
        assert_eq!(extract_bearer_token(&req), Some("test_token_123".to_string()));

        let req_no_bearer = actix_test::TestRequest::default()
            .insert_header((AUTHORIZATION, "test_token_123"))
            .to_srv_request();
        assert_eq!(extract_bearer_token(&req_no_bearer), None);

        let req_no_header = actix_test::TestRequest::default().to_srv_request();
        assert_eq!(extract_bearer_token(&req_no_header), None);
    }

    #[actix_web::test]
    async fn test_middleware_modes() {
        let user_id = Uuid::new_v4();
        let app = actix_test::init_service(
            App::new()
                .wrap(JwtAuth::required(Arc::new(FixedVerifier(user_id))))
                .route("/", web::get().to(whoami)),
        )
        .await;

        let anonymous = actix_test::call_and_read_body(&app, actix_test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(anonymous, "anonymous");

        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header((AUTHORIZATION, "Bearer good"))
            .to_request();
        assert_eq!(actix_test::call_and_read_body(&app, req).await, user_id.to_string());

        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header((AUTHORIZATION, "Bearer old"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], error_codes::TOKEN_EXPIRED);
        assert_eq!(body["details"]["reason"], "token_expired");

        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header((AUTHORIZATION, "Basic abc"))
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_optional_mode_treats_bad_token_as_anonymous() {
        let user_id = Uuid::new_v4();
        let app = actix_test::init_service(
            App::new()
                .wrap(JwtAuth::optional(Arc::new(FixedVerifier(user_id))))
                .route("/", web::get().to(whoami)),
        )
        .await;

        for header in ["Bearer old", "Bearer forged", "Basic abc"] {
            let req = actix_test::TestRequest::get()
                .uri("/")
                .insert_header((AUTHORIZATION, header))
                .to_request();
            assert_eq!(actix_test::call_and_read_body(&app, req).await, "anonymous");
        }

        let req = actix_test::TestRequest::get()
            .uri("/")
            .insert_header((AUTHORIZATION, "Bearer good"))
            .to_request();
        assert_eq!(actix_test::call_and_read_body(&app, req).await, user_id.to_string());
    }

    #[actix_web::test]
    async fn test_required_auth_rejects_anonymous() {
        async fn protected(auth: AuthContext) -> HttpResponse {
            HttpResponse::Ok().body(auth.user_id.to_string())
        }

        let app = actix_test::init_service(
            App::new()
                .wrap(JwtAuth::required(Arc::new(FixedVerifier(Uuid::new_v4()))))
                .route("/", web::get().to(protected)),
        )
        .await;

        let resp = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), 401);
        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], error_codes::UNAUTHENTICATED);
    }
}
