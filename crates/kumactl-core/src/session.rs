//! Authenticated connection ownership for one run.

use std::fmt;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;

use crate::api::KumaApi;
use crate::error::{KumaError, Result};

/// How to authenticate against the instance.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Password { username: String, password: String },
    Token(String),
}

impl Credentials {
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Password {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(token.into())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
        }
    }
}

/// A connection to the remote service, exclusively owned by one run.
///
/// Prefer [`with_session`], which closes the session on every exit path.
pub struct Session<A: KumaApi> {
    api: A,
    authenticated: bool,
    closed: bool,
}

impl<A: KumaApi> Session<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            authenticated: false,
            closed: false,
        }
    }

    /// Logs in, refusing instances that have not been set up yet.
    ///
    /// Returns the session token handed out by a password login.
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<Option<String>> {
        if self.api.need_setup().await? {
            return Err(KumaError::authentication(
                "instance has not been set up yet",
            ));
        }

        let token = match credentials {
            Credentials::Password { username, password } => {
                tracing::debug!(username = %username, "logging in");
                let ack = self.api.login(username, password).await?;
                if !ack.ok {
                    let message = match ack.msg {
                        Some(msg) => msg,
                        None if ack.token_required => "two-factor token required".to_string(),
                        None => "login rejected".to_string(),
                    };
                    return Err(KumaError::authentication(message));
                }
                ack.token
            }
            Credentials::Token(token) => {
                tracing::debug!("logging in by token");
                let ack = self.api.login_by_token(token).await?;
                if !ack.ok {
                    return Err(KumaError::authentication(ack.reason()));
                }
                None
            }
        };

        self.authenticated = true;
        Ok(token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn api(&mut self) -> &mut A {
        &mut self.api
    }

    /// Disconnects. A second call does nothing; a failed disconnect is logged.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.api.disconnect().await {
            tracing::warn!(error = %e, "disconnect failed");
        }
    }
}

impl<A: KumaApi> Drop for Session<A> {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!("session dropped without being closed");
        }
    }
}

/// Runs `f` against a fresh session and closes it afterwards.
///
/// The session is closed when `f` returns and also when it panics; the panic
/// is resumed once the disconnect has been attempted.
pub async fn with_session<A, T, F>(api: A, f: F) -> T
where
    A: KumaApi,
    F: AsyncFnOnce(&mut Session<A>) -> T,
{
    let mut session = Session::new(api);
    let outcome = AssertUnwindSafe(f(&mut session)).catch_unwind().await;
    session.close().await;
    match outcome {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryKuma, RemoteCall};

    #[tokio::test]
    async fn test_password_login() {
        let kuma = MemoryKuma::new().with_user("admin", "secret");
        let log = kuma.call_log();

        let token = with_session(kuma, async |session| {
            session.authenticate(&Credentials::password("admin", "secret")).await
        })
        .await
        .unwrap();

        assert!(token.is_some());
        assert_eq!(
            log.calls(),
            vec![RemoteCall::NeedSetup, RemoteCall::Login, RemoteCall::Disconnect]
        );
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let kuma = MemoryKuma::new().with_user("admin", "secret");
        let log = kuma.call_log();

        let err = with_session(kuma, async |session| {
            session.authenticate(&Credentials::password("admin", "wrong")).await
        })
        .await
        .unwrap_err();

        assert!(matches!(err, KumaError::Authentication { .. }));
        assert_eq!(log.calls().last(), Some(&RemoteCall::Disconnect));
    }

    #[tokio::test]
    async fn test_needs_setup_refused() {
        let kuma = MemoryKuma::new();
        let log = kuma.call_log();

        let err = with_session(kuma, async |session| {
            session.authenticate(&Credentials::token("abc")).await
        })
        .await
        .unwrap_err();

        assert_eq!(
            err,
            KumaError::authentication("instance has not been set up yet")
        );
        assert_eq!(log.calls(), vec![RemoteCall::NeedSetup, RemoteCall::Disconnect]);
    }

    #[tokio::test]
    async fn test_token_login() {
        let kuma = MemoryKuma::new().with_user("admin", "secret");
        let token = kuma.issue_token();

        let result = with_session(kuma, async |session| {
            session.authenticate(&Credentials::token(token.clone())).await?;
            Ok::<_, KumaError>(session.is_authenticated())
        })
        .await;

        assert_eq!(result, Ok(true));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let kuma = MemoryKuma::new();
        let log = kuma.call_log();
        let mut session = Session::new(kuma);

        session.close().await;
        session.close().await;

        assert!(session.is_closed());
        assert_eq!(log.calls(), vec![RemoteCall::Disconnect]);
    }

    #[tokio::test]
    async fn test_closed_after_panic() {
        let kuma = MemoryKuma::new();
        let log = kuma.call_log();

        let outcome = AssertUnwindSafe(with_session(kuma, async |_session| -> () {
            panic!("reconciler blew up");
        }))
        .catch_unwind()
        .await;

        assert!(outcome.is_err());
        assert_eq!(log.calls(), vec![RemoteCall::Disconnect]);
    }
}
