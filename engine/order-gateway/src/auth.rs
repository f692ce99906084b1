//! Session-based authentication for the OrderGateway
//!
//! A successful login issues an opaque token. Callers present it as a
//! bearer token or in the `session` cookie; nothing is shared process-wide
//! beyond the session table itself.

use crate::config::AuthConfig;
use crate::error::GatewayError;
use crate::messages::LoginRequest;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// A logged-in client
#[derive(Debug, Clone)]
pub struct UserSession {
    /// User name the session was opened with
    pub username: String,

    /// Session start time
    pub start_time: Instant,

    /// Last activity time
    pub last_activity: Instant,
}

impl UserSession {
    /// Create a new user session
    pub fn new(username: String) -> Self {
        let now = Instant::now();
        Self { username, start_time: now, last_activity: now }
    }

    /// Update last activity time
    pub fn update_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    /// True when the session has been idle longer than `ttl`
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.last_activity.elapsed() > ttl
    }
}

/// Issues and checks session tokens
#[derive(Debug)]
pub struct SessionManager {
    config: AuthConfig,

    /// Active sessions (token -> session info)
    sessions: Arc<RwLock<HashMap<String, UserSession>>>,
}

impl SessionManager {
    /// Create a new session manager
    pub fn new(config: AuthConfig) -> Self {
        if config.required && (config.username.is_none() || config.password.is_none()) {
            warn!("Authentication is required but no credentials are configured; every login will fail");
        }
        Self { config, sessions: Arc::new(RwLock::new(HashMap::new())) }
    }

    fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.config.session_ttl_secs)
    }

    fn credentials_match(&self, request: &LoginRequest) -> bool {
        match (&self.config.username, &self.config.password) {
            (Some(username), Some(password)) => {
                *username == request.username && *password == request.password
            }
            _ => false,
        }
    }

    /// Check credentials and open a session, returning its token
    pub async fn login(&self, request: &LoginRequest) -> Result<String, GatewayError> {
        if !self.credentials_match(request) {
            warn!("Rejected login for user {:?}", request.username);
            return Err(GatewayError::Authentication("Invalid credentials".to_string()));
        }

        let token = uuid::Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), UserSession::new(request.username.clone()));

        info!("User {} logged in ({} active sessions)", request.username, sessions.len());
        Ok(token)
    }

    /// Resolve a token to a live session, refreshing its activity time
    pub async fn validate_session(&self, token: &str) -> Result<UserSession, GatewayError> {
        let ttl = self.session_ttl();
        let mut sessions = self.sessions.write().await;

        let expired = match sessions.get_mut(token) {
            Some(session) if !session.is_expired(ttl) => {
                session.update_activity();
                return Ok(session.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            sessions.remove(token);
            debug!("Dropped expired session");
            return Err(GatewayError::Authentication("Session expired".to_string()));
        }

        Err(GatewayError::Authentication("Invalid or expired session".to_string()))
    }

    /// True when the caller may use protected routes
    pub async fn is_authenticated(&self, token: Option<&str>) -> bool {
        if !self.config.required {
            return true;
        }
        match token {
            Some(token) => self.validate_session(token).await.is_ok(),
            None => false,
        }
    }

    /// Remove a session
    pub async fn remove_session(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.remove(token) {
            info!("User {} logged out", session.username);
        }
    }

    /// Clean up sessions idle longer than the configured lifetime
    pub async fn cleanup_expired_sessions(&self) -> usize {
        let ttl = self.session_ttl();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(ttl));
        before - sessions.len()
    }

    /// Number of open sessions
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Pull a session token from an `Authorization: Bearer` header or the session cookie
pub fn extract_token(authorization: Option<&str>, cookie: Option<&str>) -> Option<String> {
    let bearer = authorization
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    bearer.or(cookie.map(str::trim).filter(|token| !token.is_empty())).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn create_test_manager(required: bool) -> SessionManager {
        SessionManager::new(AuthConfig {
            required,
            username: Some("clerk".to_string()),
            password: Some("s3cret".to_string()),
            session_ttl_secs: 60,
        })
    }

    fn login_request(password: &str) -> LoginRequest {
        LoginRequest { username: "clerk".to_string(), password: password.to_string() }
    }

    #[tokio::test]
    async fn test_login_issues_distinct_tokens() {
        let manager = create_test_manager(true);
        let first = assert_ok!(manager.login(&login_request("s3cret")).await);
        let second = assert_ok!(manager.login(&login_request("s3cret")).await);

        assert_ne!(first, second);
        assert!(manager.is_authenticated(Some(&first)).await);
        assert!(manager.is_authenticated(Some(&second)).await);
        assert_eq!(manager.session_count().await, 2);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let manager = create_test_manager(true);
        let err = assert_err!(manager.login(&login_request("guess")).await);

        assert!(matches!(err, GatewayError::Authentication(_)));
        assert_eq!(manager.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_sessions_are_per_token() {
        let manager = create_test_manager(true);
        let token = manager.login(&login_request("s3cret")).await.unwrap();

        // Another caller without a token is still anonymous
        assert!(!manager.is_authenticated(None).await);
        assert!(!manager.is_authenticated(Some("forged")).await);

        manager.remove_session(&token).await;
        assert!(!manager.is_authenticated(Some(&token)).await);
    }

    #[tokio::test]
    async fn test_not_required_allows_everyone() {
        let manager = create_test_manager(false);
        assert!(manager.is_authenticated(None).await);
    }

    #[tokio::test]
    async fn test_missing_credentials_never_log_in() {
        let manager = SessionManager::new(AuthConfig::default());
        let request = LoginRequest { username: String::new(), password: String::new() };
        assert!(manager.login(&request).await.is_err());
    }

    #[tokio::test]
    async fn test_expired_sessions_removed() {
        let manager = SessionManager::new(AuthConfig {
            session_ttl_secs: 0,
            ..create_test_manager(true).config
        });
        let token = manager.login(&login_request("s3cret")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(manager.validate_session(&token).await.is_err());
        assert_eq!(manager.session_count().await, 0);
    }

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token(Some("Bearer abc"), None), Some("abc".to_string()));
        assert_eq!(extract_token(Some("Basic abc"), Some("xyz")), Some("xyz".to_string()));
        assert_eq!(extract_token(None, Some("xyz")), Some("xyz".to_string()));
        assert_eq!(extract_token(Some("Bearer  "), None), None);
        assert_eq!(extract_token(None, None), None);
    }
}
