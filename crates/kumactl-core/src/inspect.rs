//! Read-only monitor listing.

use crate::api::KumaApi;
use crate::error::{EntityKind, KumaError, Result};
use crate::model::{Monitor, MonitorId};
use crate::resolve::{find_monitor_by_id, find_monitor_by_name};
use crate::session::{with_session, Credentials};
use crate::state::list_monitors;

/// Which monitors to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorSelector {
    All,
    Id(MonitorId),
    Name(String),
}

/// Reads monitors; a selector that matches nothing is an error.
pub async fn inspect_monitors<A: KumaApi>(
    api: A,
    credentials: &Credentials,
    selector: &MonitorSelector,
) -> Result<Vec<Monitor>> {
    with_session(api, async |session| {
        session.authenticate(credentials).await?;
        let monitors = list_monitors(session).await?;
        let selected = match selector {
            MonitorSelector::All => return Ok(monitors),
            MonitorSelector::Id(id) => find_monitor_by_id(&monitors, *id)
                .found_or(|| KumaError::not_found(EntityKind::Monitor, id.to_string()))?,
            MonitorSelector::Name(name) => find_monitor_by_name(&monitors, name)
                .found_or(|| KumaError::not_found(EntityKind::Monitor, name))?,
        };
        Ok(vec![selected.clone()])
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKuma;

    #[tokio::test]
    async fn test_list_by_name_and_id() {
        let kuma = MemoryKuma::new().with_user("admin", "pw");
        kuma.insert_monitor("Peer 1");
        let second = kuma.insert_monitor("Peer 2");
        let creds = Credentials::password("admin", "pw");

        let all = inspect_monitors(kuma.clone(), &creds, &MonitorSelector::All).await.unwrap();
        assert_eq!(all.len(), 2);

        let by_id = inspect_monitors(kuma.clone(), &creds, &MonitorSelector::Id(second)).await.unwrap();
        assert_eq!(by_id[0].name, "Peer 2");

        let err = inspect_monitors(kuma, &creds, &MonitorSelector::Name("Peer 3".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err, KumaError::not_found(EntityKind::Monitor, "Peer 3"));
    }
}
