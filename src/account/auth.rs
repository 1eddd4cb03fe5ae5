//! Auth API client

use reqwest::Method;
use serde::Serialize;

use super::{Credentials, NewUser, UserInfo};
use crate::transport::{ApiClient, Session, TransportError, TransportResult};

const SIGNIN_PATH: &str = "/api/auth/signin";
const SIGNUP_PATH: &str = "/api/auth/signup";
const REFRESH_PATH: &str = "/api/auth/refresh";
const PASSWORD_RESET_PATH: &str = "/api/auth/password-reset";
const CHANGE_PASSWORD_PATH: &str = "/api/auth/change-password";
const INFO_PATH: &str = "/api/auth/info";

#[derive(Serialize)]
struct RefreshRequest<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct ChangePasswordRequest<'a> {
    hash: &'a str,
    password: &'a str,
}

/// Signup, signin and password flows
///
/// Signin and refresh update the `SessionHandle` of the wrapped client.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: ApiClient,
}

impl AuthClient {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Sign in and begin a session
    pub async fn signin(&self, credentials: &Credentials) -> TransportResult<Session> {
        let request = self.client.request(Method::POST, SIGNIN_PATH).json(credentials);
        let session: Session = self.client.send_json(request).await?;
        self.client.session().begin(session.clone());
        tracing::info!(email = %credentials.email, "signed in");
        Ok(session)
    }

    /// Register a new account; returns the new user id
    pub async fn signup(&self, user: &NewUser) -> TransportResult<u64> {
        if user.email.is_empty() || user.password.is_empty() {
            return Err(TransportError::InvalidInput(
                "email and password are required".to_string(),
            ));
        }
        let request = self.client.request(Method::POST, SIGNUP_PATH).json(user);
        let id: u64 = self.client.send_json(request).await?;
        tracing::info!(user_id = id, "account created, activation mail sent");
        Ok(id)
    }

    /// Exchange the current refresh token for a new token pair
    pub async fn refresh(&self) -> TransportResult<Session> {
        let current = self
            .client
            .session()
            .current()
            .filter(|s| !s.refresh_token.is_empty())
            .ok_or(TransportError::Unauthorized)?;

        let request = self
            .client
            .request(Method::POST, REFRESH_PATH)
            .json(&RefreshRequest {
                token: &current.refresh_token,
            });
        let session: Session = self.client.send_json(request).await?;
        self.client.session().replace(session.clone());
        Ok(session)
    }

    /// Ask the server to mail a password reset link
    pub async fn request_password_reset(&self, email: &str) -> TransportResult<()> {
        let request = self.client.request(Method::POST, PASSWORD_RESET_PATH).json(email);
        self.client.send(request).await?;
        Ok(())
    }

    /// Set a new password using the hash from a reset link
    pub async fn change_password(&self, hash: &str, password: &str) -> TransportResult<()> {
        if password.is_empty() {
            return Err(TransportError::InvalidInput("password is required".to_string()));
        }
        let request = self
            .client
            .request(Method::POST, CHANGE_PASSWORD_PATH)
            .json(&ChangePasswordRequest { hash, password });
        self.client.send(request).await?;
        Ok(())
    }

    /// Identity behind the current session
    pub async fn info(&self) -> TransportResult<UserInfo> {
        let request = self.client.request(Method::GET, INFO_PATH);
        self.client.send_json(request).await
    }

    /// End the session locally
    pub fn signout(&self) {
        self.client.session().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::transport::SessionHandle;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    async fn spawn_stub(bodies: Arc<Mutex<Vec<serde_json::Value>>>) -> String {
        let signin_bodies = Arc::clone(&bodies);
        let refresh_bodies = Arc::clone(&bodies);
        let reset_bodies = Arc::clone(&bodies);
        let app = Router::new()
            .route(
                "/api/auth/signin",
                post(move |Json(body): Json<serde_json::Value>| async move {
                    let ok = body["password"] == "right";
                    signin_bodies.lock().unwrap().push(body);
                    if ok {
                        Ok(Json(serde_json::json!({ "token": "t1", "refreshToken": "r1" })))
                    } else {
                        Err((
                            StatusCode::UNAUTHORIZED,
                            Json(serde_json::json!({ "error": "bad credentials" })),
                        ))
                    }
                }),
            )
            .route(
                "/api/auth/refresh",
                post(move |Json(body): Json<serde_json::Value>| async move {
                    refresh_bodies.lock().unwrap().push(body);
                    Json(serde_json::json!({ "token": "t2", "refreshToken": "r2" }))
                }),
            )
            .route(
                "/api/auth/password-reset",
                post(move |Json(body): Json<serde_json::Value>| async move {
                    reset_bodies.lock().unwrap().push(body);
                    Json(1)
                }),
            )
            .route(
                "/api/auth/info",
                get(|headers: HeaderMap| async move {
                    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
                        Some("Bearer t2") => Ok(Json(serde_json::json!({ "id": 3, "email": "me@x.io" }))),
                        _ => Err(StatusCode::UNAUTHORIZED),
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(url: &str, session: SessionHandle) -> AuthClient {
        let config = ApiConfig {
            base_url: url.to_string(),
            request_timeout_secs: 5,
        };
        AuthClient::new(ApiClient::new(&config, session).unwrap())
    }

    #[tokio::test]
    async fn test_session_lifecycle_through_auth() {
        let bodies = Arc::new(Mutex::new(Vec::new()));
        let url = spawn_stub(Arc::clone(&bodies)).await;
        let session = SessionHandle::new();
        let auth = client(&url, session.clone());

        let credentials = Credentials {
            email: "me@x.io".to_string(),
            password: "right".to_string(),
        };
        auth.signin(&credentials).await.unwrap();
        assert_eq!(session.access_token().as_deref(), Some("t1"));

        auth.refresh().await.unwrap();
        assert_eq!(session.current(), Some(Session::new("t2", "r2")));
        assert_eq!(bodies.lock().unwrap()[1], serde_json::json!({ "token": "r1" }));

        let info = auth.info().await.unwrap();
        assert_eq!(info.id, 3);

        auth.signout();
        assert!(!session.is_active());
        assert!(matches!(auth.info().await, Err(TransportError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_failed_signin_leaves_no_session() {
        let url = spawn_stub(Arc::new(Mutex::new(Vec::new()))).await;
        let session = SessionHandle::new();
        let auth = client(&url, session.clone());

        let credentials = Credentials {
            email: "me@x.io".to_string(),
            password: "wrong".to_string(),
        };
        assert!(matches!(
            auth.signin(&credentials).await,
            Err(TransportError::Unauthorized)
        ));
        assert!(!session.is_active());
    }

    #[tokio::test]
    async fn test_refresh_requires_refresh_token() {
        let auth = client("http://127.0.0.1:9", SessionHandle::with_session(Session::from_access_token("t")));
        assert!(matches!(auth.refresh().await, Err(TransportError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_password_reset_sends_bare_email() {
        let bodies = Arc::new(Mutex::new(Vec::new()));
        let url = spawn_stub(Arc::clone(&bodies)).await;
        let auth = client(&url, SessionHandle::new());

        auth.request_password_reset("me@x.io").await.unwrap();
        assert_eq!(bodies.lock().unwrap()[0], serde_json::json!("me@x.io"));
    }

    #[tokio::test]
    async fn test_local_validation() {
        let auth = client("http://127.0.0.1:9", SessionHandle::new());
        let err = auth.signup(&NewUser::default()).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidInput(_)));

        let err = auth.change_password("hash", "").await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidInput(_)));
    }
}
