//! Bearer-token extractors.
//!
//! Handlers take [`Authenticated`] or [`AdminIdentity`] as arguments; the
//! user id used by cart and order operations comes only from the verified
//! token, never from the request body.

use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};
use tracing::debug;

use crate::domain::ports::TokenError;
use crate::domain::{Error, Identity};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity of the caller, proven by a valid bearer token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

impl Authenticated {
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

/// Caller holding the admin role.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Identity);

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<Identity, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let token = bearer_token(req).ok_or_else(|| Error::unauthorized("login required"))?;
    state.tokens.verify(token).map_err(|err| {
        debug!(error = %err, "bearer token rejected");
        match err {
            TokenError::Expired => Error::unauthorized("token expired"),
            _ => Error::unauthorized("invalid token"),
        }
    })
}

impl FromRequest for Authenticated {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(Self))
    }
}

impl FromRequest for AdminIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).and_then(|identity| {
            if identity.is_admin() {
                Ok(Self(identity))
            } else {
                Err(Error::forbidden("admin role required"))
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{
        ADMIN_TOKEN, EXPIRED_TOKEN, MockPorts, USER_TOKEN, bearer,
    };
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;

    async fn call(path: &str, auth: Option<&str>) -> StatusCode {
        let app = test::init_service(
            App::new()
                .app_data(MockPorts::default().into_state())
                .route(
                    "/me",
                    web::get().to(|who: Authenticated| async move {
                        HttpResponse::Ok().body(who.identity().user_id.to_string())
                    }),
                )
                .route(
                    "/admin",
                    web::get().to(|_: AdminIdentity| async { HttpResponse::Ok().finish() }),
                ),
        )
        .await;
        let mut req = test::TestRequest::get().uri(path);
        if let Some(token) = auth {
            req = req.insert_header(bearer(token));
        }
        test::call_service(&app, req.to_request()).await.status()
    }

    #[rstest]
    #[case("/me", None, StatusCode::UNAUTHORIZED)]
    #[case("/me", Some("garbage"), StatusCode::UNAUTHORIZED)]
    #[case("/me", Some(EXPIRED_TOKEN), StatusCode::UNAUTHORIZED)]
    #[case("/me", Some(USER_TOKEN), StatusCode::OK)]
    #[case("/admin", Some(USER_TOKEN), StatusCode::FORBIDDEN)]
    #[case("/admin", Some(ADMIN_TOKEN), StatusCode::OK)]
    #[case("/admin", None, StatusCode::UNAUTHORIZED)]
    #[actix_web::test]
    async fn guards_requests(
        #[case] path: &str,
        #[case] token: Option<&str>,
        #[case] expected: StatusCode,
    ) {
        assert_eq!(call(path, token).await, expected);
    }

    #[actix_web::test]
    async fn non_bearer_schemes_are_ignored() {
        let app = test::init_service(
            App::new()
                .app_data(MockPorts::default().into_state())
                .route(
                    "/me",
                    web::get().to(|_: Authenticated| async { HttpResponse::Ok().finish() }),
                ),
        )
        .await;
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Basic {USER_TOKEN}")))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
