//! First-run setup of an instance.

use crate::api::KumaApi;
use crate::error::{KumaError, Result};
use crate::report::{ReconciliationResult, ResultReporter};
use crate::session::{with_session, Credentials};

/// Creates the admin account if the instance has none, then checks that the
/// credentials log in.
pub async fn ensure_setup<A: KumaApi>(api: A, username: &str, password: &str) -> ReconciliationResult {
    with_session(api, async |session| {
        let mut reporter = ResultReporter::new();
        let outcome: Result<()> = async {
            if session.api().need_setup().await? {
                reporter.mark_changed();
                tracing::info!(username = %username, "running initial setup");
                let ack = session.api().setup(username, password).await?;
                if !ack.ok {
                    return Err(KumaError::remote_operation("setup", ack.reason()));
                }
            }
            session
                .authenticate(&Credentials::password(username, password))
                .await?;
            Ok(())
        }
        .await;
        reporter.absorb(outcome);
        reporter.finish()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryKuma, RemoteCall};
    use crate::report::Outcome;

    #[tokio::test]
    async fn test_setup_fresh_instance() {
        let kuma = MemoryKuma::new();
        let log = kuma.call_log();

        let result = ensure_setup(kuma.clone(), "admin", "secret123").await;
        assert_eq!(result.outcome(), Outcome::Changed);
        assert_eq!(
            log.calls(),
            vec![
                RemoteCall::NeedSetup,
                RemoteCall::Setup,
                RemoteCall::NeedSetup,
                RemoteCall::Login,
                RemoteCall::Disconnect
            ]
        );

        let again = ensure_setup(kuma, "admin", "secret123").await;
        assert_eq!(again.outcome(), Outcome::Unchanged);
    }

    #[tokio::test]
    async fn test_rejected_setup_is_changed_and_failed() {
        let kuma = MemoryKuma::new();
        kuma.reject_mutations("Password is too weak.");
        let log = kuma.call_log();

        let result = ensure_setup(kuma.clone(), "admin", "123").await;
        assert!(result.changed);
        assert_eq!(
            result.error,
            Some(KumaError::remote_operation("setup", "Password is too weak."))
        );
        assert_eq!(log.count("login"), 0);
        assert_eq!(log.calls().last(), Some(&RemoteCall::Disconnect));

        let mut check = kuma;
        assert!(check.need_setup().await.unwrap());
    }

    #[tokio::test]
    async fn test_setup_done_wrong_password() {
        let kuma = MemoryKuma::new().with_user("admin", "secret123");

        let result = ensure_setup(kuma, "admin", "other").await;
        assert!(!result.changed);
        assert!(matches!(result.error, Some(KumaError::Authentication { .. })));
    }
}
