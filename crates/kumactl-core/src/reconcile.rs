//! Applying the planned mutation and running a whole reconciliation.

use crate::api::KumaApi;
use crate::assertion::DesiredAssertion;
use crate::diff::{plan_monitor_tag, plan_tag, Action};
use crate::error::{KumaError, Result};
use crate::model::Ack;
use crate::report::{ReconciliationResult, Resource, ResultReporter};
use crate::session::{with_session, Credentials, Session};
use crate::state::{list_tags, read_state};

/// Executes `action`. Marks the run changed before the remote call is made.
pub async fn apply<A: KumaApi>(
    session: &mut Session<A>,
    action: Action,
    reporter: &mut ResultReporter,
) -> Result<()> {
    match action {
        Action::NoOp => {
            tracing::debug!("nothing to do");
            Ok(())
        }
        Action::CreateTag { name, color } => {
            reporter.mark_changed();
            tracing::info!(tag = %name, color = %color, "creating tag");
            let ack = session.api().add_tag(&color, &name).await?;
            if !ack.ok {
                return Err(KumaError::remote_operation("addTag", ack.reason()));
            }
            let tag = ack
                .tag
                .ok_or_else(|| KumaError::protocol("addTag acknowledged without a tag"))?;
            reporter.set_resource(Resource::Tag(tag));
            Ok(())
        }
        Action::DeleteTag { tag } => {
            reporter.mark_changed();
            tracing::info!(tag = %tag.name, id = tag.id, "deleting tag");
            let ack = session.api().delete_tag(tag.id).await?;
            check("deleteTag", ack)
        }
        Action::CreateLink { link } => {
            reporter.mark_changed();
            tracing::info!(
                tag_id = link.tag_id,
                monitor_id = link.monitor_id,
                value = %link.value,
                "adding monitor tag"
            );
            let ack = session
                .api()
                .add_monitor_tag(link.tag_id, link.monitor_id, &link.value)
                .await?;
            check("addMonitorTag", ack)?;
            reporter.set_resource(Resource::MonitorTag(link));
            Ok(())
        }
        Action::DeleteLink { link } => {
            reporter.mark_changed();
            tracing::info!(
                tag_id = link.tag_id,
                monitor_id = link.monitor_id,
                value = %link.value,
                "deleting monitor tag"
            );
            let ack = session
                .api()
                .delete_monitor_tag(link.tag_id, link.monitor_id, &link.value)
                .await?;
            check("deleteMonitorTag", ack)
        }
    }
}

fn check(operation: &str, ack: Ack) -> Result<()> {
    if ack.ok {
        Ok(())
    } else {
        Err(KumaError::remote_operation(operation, ack.reason()))
    }
}

/// Converges the remote towards `assertion` in one session.
///
/// Never returns early with an error: every failure ends up in the result,
/// and the session is closed before the result is handed back.
pub async fn reconcile<A: KumaApi>(
    api: A,
    credentials: &Credentials,
    assertion: &DesiredAssertion,
) -> ReconciliationResult {
    let result = with_session(api, async |session| {
        let mut reporter = ResultReporter::new();
        let outcome = run(session, credentials, assertion, &mut reporter).await;
        reporter.absorb(outcome);
        reporter.finish()
    })
    .await;

    tracing::debug!(changed = result.changed, failed = result.is_failed(), "reconciliation finished");
    result
}

async fn run<A: KumaApi>(
    session: &mut Session<A>,
    credentials: &Credentials,
    assertion: &DesiredAssertion,
    reporter: &mut ResultReporter,
) -> Result<()> {
    session.authenticate(credentials).await?;

    let plan = match assertion {
        DesiredAssertion::Tag(assertion) => {
            let tags = list_tags(session).await?;
            plan_tag(&tags, assertion)?
        }
        DesiredAssertion::MonitorTag(assertion) => {
            let state = read_state(session).await?;
            plan_monitor_tag(&state, assertion)?
        }
    };

    if let Some(matched) = plan.matched {
        reporter.set_resource(matched);
    }
    apply(session, plan.action, reporter).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::DesiredState;
    use crate::memory::{MemoryKuma, RemoteCall};

    fn creds() -> Credentials {
        Credentials::password("admin", "pw")
    }

    #[tokio::test]
    async fn test_rejected_create_is_changed_and_failed() {
        let kuma = MemoryKuma::new().with_user("admin", "pw");
        kuma.reject_mutations("database is locked");
        let log = kuma.call_log();

        let assertion = DesiredAssertion::tag("Tag 1", Some("#ff0000"), DesiredState::Present);
        let result = reconcile(kuma.clone(), &creds(), &assertion).await;

        assert!(result.changed);
        assert_eq!(
            result.error,
            Some(KumaError::remote_operation("addTag", "database is locked"))
        );
        assert!(result.resource.is_none());
        assert_eq!(log.calls().last(), Some(&RemoteCall::Disconnect));
        assert!(kuma.tags().is_empty());
    }

    #[tokio::test]
    async fn test_created_tag_missing_from_reply() {
        let kuma = MemoryKuma::new().with_user("admin", "pw");
        kuma.omit_created_tag();
        let log = kuma.call_log();

        let assertion = DesiredAssertion::tag("Tag 1", Some("#ff0000"), DesiredState::Present);
        let result = reconcile(kuma, &creds(), &assertion).await;

        assert!(result.changed);
        assert!(matches!(result.error, Some(KumaError::Protocol { .. })));
        assert!(result.resource.is_none());
        assert_eq!(log.count("disconnect"), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_during_delete() {
        let kuma = MemoryKuma::new().with_user("admin", "pw").with_tag("Tag 1", "#fff");
        kuma.fail_on("deleteTag");
        let log = kuma.call_log();

        let assertion = DesiredAssertion::tag("Tag 1", None, DesiredState::Absent);
        let result = reconcile(kuma, &creds(), &assertion).await;

        assert!(result.changed);
        assert!(matches!(result.error, Some(KumaError::Transport { .. })));
        assert_eq!(log.count("disconnect"), 1);
    }

    #[tokio::test]
    async fn test_bad_credentials_no_reads() {
        let kuma = MemoryKuma::new().with_user("admin", "pw");
        let log = kuma.call_log();

        let assertion = DesiredAssertion::tag("Tag 1", Some("#fff"), DesiredState::Present);
        let result = reconcile(kuma, &Credentials::password("admin", "nope"), &assertion).await;

        assert!(!result.changed);
        assert!(matches!(result.error, Some(KumaError::Authentication { .. })));
        assert_eq!(log.count("getTags"), 0);
        assert_eq!(log.count("disconnect"), 1);
    }

    #[tokio::test]
    async fn test_rejected_link_delete() {
        let kuma = MemoryKuma::new().with_user("admin", "pw");
        let tag = kuma.insert_tag("Tag 1", "#fff");
        let monitor_id = kuma.insert_monitor("Peer 1");
        kuma.insert_link(tag.id, monitor_id, "v");
        kuma.reject_mutations("busy");

        let assertion = DesiredAssertion::monitor_tag("Peer 1", "Tag 1", "v", DesiredState::Absent);
        let result = reconcile(kuma.clone(), &creds(), &assertion).await;

        assert!(result.changed);
        assert_eq!(result.error, Some(KumaError::remote_operation("deleteMonitorTag", "busy")));
        assert_eq!(kuma.links(monitor_id).len(), 1);
    }
}
