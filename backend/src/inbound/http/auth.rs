//! Login and registration handlers.
//!
//! ```text
//! POST /api/auth/login {"email":"admin@organikkose.com","password":"admin123"}
//! POST /api/auth/register {"email":"ayse@example.com","password":"secret1","name":"Ayşe"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    AuthSession, AuthValidationError, Error, LoginCredentials, Registration, Role,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Token plus the account it was issued for.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    #[schema(example = 1)]
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token.as_str().to_owned(),
            id: session.user.id.get(),
            email: session.user.email.as_str().to_owned(),
            name: session.user.name,
            role: session.user.role,
        }
    }
}

fn map_validation_error(err: AuthValidationError) -> Error {
    let code = match &err {
        AuthValidationError::Email(_) => "invalid_email",
        AuthValidationError::EmptyPassword => "empty_password",
        AuthValidationError::PasswordTooShort { .. } => "password_too_short",
        AuthValidationError::EmptyName => "empty_name",
    };
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": err.field(), "code": code }))
}

/// Authenticate with email and password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials =
        LoginCredentials::try_from_parts(&email, &password).map_err(map_validation_error)?;
    let session = state.auth.login(&credentials).await?;
    Ok(web::Json(session.into()))
}

/// Create a shopper account and log it in.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request or email taken", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let registration = Registration::try_new(
        &body.email,
        &body.password,
        &body.name,
        body.phone.as_deref(),
        body.address.as_deref(),
    )
    .map_err(map_validation_error)?;
    let session = state.auth.register(&registration).await?;
    Ok(HttpResponse::Created().json(AuthResponse::from(session)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessToken, Email, User, UserId};
    use crate::inbound::http::test_utils::MockPorts;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    fn session(role: Role) -> AuthSession {
        AuthSession {
            token: AccessToken::new("signed"),
            user: User {
                id: UserId::new(3),
                email: Email::parse("ayse@example.com").expect("email"),
                name: "Ayşe".to_owned(),
                phone: None,
                address: None,
                role,
            },
        }
    }

    async fn post_json(ports: MockPorts, uri: &str, body: Value) -> (StatusCode, Value) {
        let app = test::init_service(
            App::new()
                .app_data(ports.into_state())
                .service(web::scope("/api").service(login).service(register)),
        )
        .await;
        let req = test::TestRequest::post().uri(uri).set_json(body).to_request();
        let res = test::call_service(&app, req).await;
        let status = res.status();
        let bytes = test::read_body(res).await;
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[actix_web::test]
    async fn login_returns_token_and_profile() {
        let mut ports = MockPorts::default();
        ports
            .auth
            .expect_login()
            .withf(|creds| creds.email().as_str() == "ayse@example.com")
            .times(1)
            .return_once(|_| Ok(session(Role::User)));

        let (status, body) = post_json(
            ports,
            "/api/auth/login",
            json!({"email": "Ayse@Example.com", "password": "secret1"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"token": "signed", "id": 3, "email": "ayse@example.com", "name": "Ayşe", "role": "USER"})
        );
    }

    #[actix_web::test]
    async fn wrong_password_is_unauthorised() {
        let mut ports = MockPorts::default();
        ports
            .auth
            .expect_login()
            .return_once(|_| Err(Error::invalid_credentials("invalid email or password")));

        let (status, body) = post_json(
            ports,
            "/api/auth/login",
            json!({"email": "ayse@example.com", "password": "nope"}),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "invalid_credentials");
    }

    #[rstest]
    #[case(json!({"email": "bad", "password": "secret1", "name": "A"}), "email")]
    #[case(json!({"email": "a@b.c", "password": "123", "name": "A"}), "password")]
    #[case(json!({"email": "a@b.c", "password": "secret1", "name": " "}), "name")]
    #[actix_web::test]
    async fn registration_validation_never_reaches_service(
        #[case] body: Value,
        #[case] field: &str,
    ) {
        let (status, body) = post_json(MockPorts::default(), "/api/auth/register", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], field);
    }

    #[actix_web::test]
    async fn registration_returns_created() {
        let mut ports = MockPorts::default();
        ports
            .auth
            .expect_register()
            .withf(|reg| reg.name() == "Ayşe" && reg.phone().is_none())
            .return_once(|_| Ok(session(Role::User)));

        let (status, body) = post_json(
            ports,
            "/api/auth/register",
            json!({"email": "ayse@example.com", "password": "secret1", "name": "Ayşe", "phone": ""}),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["role"], "USER");
    }

    #[actix_web::test]
    async fn duplicate_email_is_bad_request() {
        let mut ports = MockPorts::default();
        ports.auth.expect_register().return_once(|_| {
            Err(Error::email_already_exists("email already registered"))
        });

        let (status, body) = post_json(
            ports,
            "/api/auth/register",
            json!({"email": "ayse@example.com", "password": "secret1", "name": "Ayşe"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "email_already_exists");
    }
}
