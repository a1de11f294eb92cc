//! Reads of the current remote state.

use crate::api::KumaApi;
use crate::error::Result;
use crate::model::{Monitor, Tag};
use crate::session::Session;

/// Tags and monitors as seen at the start of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteState {
    pub tags: Vec<Tag>,
    pub monitors: Vec<Monitor>,
}

pub async fn list_tags<A: KumaApi>(session: &mut Session<A>) -> Result<Vec<Tag>> {
    let tags = session.api().get_tags().await?;
    tracing::debug!(count = tags.len(), "read tags");
    Ok(tags)
}

/// Monitors in the order the remote listed them.
pub async fn list_monitors<A: KumaApi>(session: &mut Session<A>) -> Result<Vec<Monitor>> {
    let monitors: Vec<Monitor> = session
        .api()
        .get_monitors()
        .await?
        .into_values()
        .collect();
    tracing::debug!(count = monitors.len(), "read monitors");
    Ok(monitors)
}

/// Reads tags, then monitors.
pub async fn read_state<A: KumaApi>(session: &mut Session<A>) -> Result<RemoteState> {
    let tags = list_tags(session).await?;
    let monitors = list_monitors(session).await?;
    Ok(RemoteState { tags, monitors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKuma;
    use crate::session::{with_session, Credentials};
    use crate::KumaError;

    #[tokio::test]
    async fn test_read_state_keeps_remote_order() {
        let kuma = MemoryKuma::new()
            .with_user("admin", "pw")
            .with_monitor("b")
            .with_monitor("a")
            .with_tag("Tag 1", "#000");

        let state = with_session(kuma, async |session| {
            session.authenticate(&Credentials::password("admin", "pw")).await?;
            read_state(session).await
        })
        .await
        .unwrap();

        let names: Vec<_> = state.monitors.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(state.tags.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_read_fails_run() {
        let kuma = MemoryKuma::new().with_user("admin", "pw");
        kuma.fail_on("getMonitors");

        let err = with_session(kuma, async |session| {
            session.authenticate(&Credentials::password("admin", "pw")).await?;
            read_state(session).await
        })
        .await
        .unwrap_err();

        assert!(matches!(err, KumaError::Transport { .. }));
    }
}
