//! In-memory [`KumaApi`] backend.
//!
//! Holds tags and monitors in process memory and records every call made
//! against it. Clones share the same remote state and call log, so several
//! runs can be made against one instance; each clone is its own connection
//! with its own login state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::api::KumaApi;
use crate::error::{KumaError, Result};
use crate::model::{Ack, LoginAck, Monitor, MonitorId, MonitorTagLink, Tag, TagAck, TagId};

/// One call received by [`MemoryKuma`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    NeedSetup,
    Setup,
    Login,
    LoginByToken,
    GetTags,
    GetMonitors,
    AddTag {
        color: String,
        name: String,
    },
    DeleteTag {
        id: TagId,
    },
    AddMonitorTag {
        tag_id: TagId,
        monitor_id: MonitorId,
        value: String,
    },
    DeleteMonitorTag {
        tag_id: TagId,
        monitor_id: MonitorId,
        value: String,
    },
    Disconnect,
}

impl RemoteCall {
    /// Event name the call is sent as.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NeedSetup => "needSetup",
            Self::Setup => "setup",
            Self::Login => "login",
            Self::LoginByToken => "loginByToken",
            Self::GetTags => "getTags",
            Self::GetMonitors => "getMonitors",
            Self::AddTag { .. } => "addTag",
            Self::DeleteTag { .. } => "deleteTag",
            Self::AddMonitorTag { .. } => "addMonitorTag",
            Self::DeleteMonitorTag { .. } => "deleteMonitorTag",
            Self::Disconnect => "disconnect",
        }
    }

    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Setup
                | Self::AddTag { .. }
                | Self::DeleteTag { .. }
                | Self::AddMonitorTag { .. }
                | Self::DeleteMonitorTag { .. }
        )
    }
}

/// Shared, ordered record of calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<RemoteCall>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<RemoteCall> {
        lock(&self.0).clone()
    }

    pub fn mutations(&self) -> Vec<RemoteCall> {
        lock(&self.0)
            .iter()
            .filter(|call| call.is_mutation())
            .cloned()
            .collect()
    }

    pub fn count(&self, name: &str) -> usize {
        lock(&self.0).iter().filter(|call| call.name() == name).count()
    }

    pub fn clear(&self) {
        lock(&self.0).clear();
    }

    fn push(&self, call: RemoteCall) {
        lock(&self.0).push(call);
    }
}

#[derive(Debug, Default)]
struct RemoteState {
    account: Option<(String, String)>,
    tokens: Vec<String>,
    tags: Vec<Tag>,
    monitors: Vec<Monitor>,
    next_id: i64,
    rejection: Option<String>,
    failing_call: Option<String>,
    omit_created_tag: bool,
}

impl RemoteState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryKuma {
    state: Arc<Mutex<RemoteState>>,
    log: CallLog,
    logged_in: bool,
}

impl MemoryKuma {
    /// An instance that has not been set up.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets up the instance with an admin account.
    pub fn with_user(self, username: &str, password: &str) -> Self {
        self.state().account = Some((username.to_string(), password.to_string()));
        self
    }

    pub fn with_tag(self, name: &str, color: &str) -> Self {
        self.insert_tag(name, color);
        self
    }

    pub fn with_monitor(self, name: &str) -> Self {
        self.insert_monitor(name);
        self
    }

    pub fn insert_tag(&self, name: &str, color: &str) -> Tag {
        let mut state = self.state();
        let tag = Tag {
            id: state.next_id(),
            name: name.to_string(),
            color: color.to_string(),
        };
        state.tags.push(tag.clone());
        tag
    }

    pub fn insert_monitor(&self, name: &str) -> MonitorId {
        let mut state = self.state();
        let id = state.next_id();
        state.monitors.push(Monitor::new(id, name));
        id
    }

    /// Attaches an existing tag to an existing monitor. Unknown ids are ignored.
    pub fn insert_link(&self, tag_id: TagId, monitor_id: MonitorId, value: &str) {
        let mut state = self.state();
        let Some(tag) = state.tags.iter().find(|t| t.id == tag_id).cloned() else {
            return;
        };
        if let Some(monitor) = state.monitors.iter_mut().find(|m| m.id == monitor_id) {
            monitor.tags.push(MonitorTagLink::new(&tag, monitor_id, value));
        }
    }

    /// Registers a token accepted by `loginByToken`.
    pub fn issue_token(&self) -> String {
        let mut state = self.state();
        let token = format!("token-{}", state.tokens.len() + 1);
        state.tokens.push(token.clone());
        token
    }

    /// Makes every following mutation, `setup` included, come back with
    /// `ok=false`.
    pub fn reject_mutations(&self, msg: &str) {
        self.state().rejection = Some(msg.to_string());
    }

    /// Makes `addTag` acknowledge with `ok=true` but leave the created tag
    /// out of the reply.
    pub fn omit_created_tag(&self) {
        self.state().omit_created_tag = true;
    }

    /// Makes every following call with this event name fail in transport.
    pub fn fail_on(&self, event: &str) {
        self.state().failing_call = Some(event.to_string());
    }

    pub fn call_log(&self) -> CallLog {
        self.log.clone()
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.state().tags.clone()
    }

    pub fn monitors(&self) -> Vec<Monitor> {
        self.state().monitors.clone()
    }

    pub fn links(&self, monitor_id: MonitorId) -> Vec<MonitorTagLink> {
        self.state()
            .monitors
            .iter()
            .find(|m| m.id == monitor_id)
            .map(|m| m.tags.clone())
            .unwrap_or_default()
    }

    fn state(&self) -> MutexGuard<'_, RemoteState> {
        lock(&self.state)
    }

    fn receive(&self, call: RemoteCall) -> Result<()> {
        let failing = self.state().failing_call.clone();
        let name = call.name();
        self.log.push(call);
        if failing.as_deref() == Some(name) {
            return Err(KumaError::transport(format!("connection reset during {name}")));
        }
        Ok(())
    }

    fn require_login(&self) -> Result<()> {
        if self.logged_in {
            Ok(())
        } else {
            Err(KumaError::protocol("You are not logged in."))
        }
    }

    fn rejection(&self) -> Option<Ack> {
        self.state().rejection.as_deref().map(Ack::rejected)
    }
}

#[async_trait]
impl KumaApi for MemoryKuma {
    async fn need_setup(&mut self) -> Result<bool> {
        self.receive(RemoteCall::NeedSetup)?;
        Ok(self.state().account.is_none())
    }

    async fn setup(&mut self, username: &str, password: &str) -> Result<Ack> {
        self.receive(RemoteCall::Setup)?;
        if let Some(rejected) = self.rejection() {
            return Ok(rejected);
        }
        let mut state = self.state();
        if state.account.is_some() {
            return Ok(Ack::rejected(
                "Uptime Kuma has been initialized. If you want to run setup again, please delete the database.",
            ));
        }
        state.account = Some((username.to_string(), password.to_string()));
        Ok(Ack::ok())
    }

    async fn login(&mut self, username: &str, password: &str) -> Result<LoginAck> {
        self.receive(RemoteCall::Login)?;
        let accepted = matches!(
            &self.state().account,
            Some((user, pass)) if user == username && pass == password
        );
        if !accepted {
            return Ok(LoginAck {
                ok: false,
                msg: Some("Incorrect username or password.".to_string()),
                ..LoginAck::default()
            });
        }
        self.logged_in = true;
        Ok(LoginAck {
            ok: true,
            token: Some(self.issue_token()),
            ..LoginAck::default()
        })
    }

    async fn login_by_token(&mut self, token: &str) -> Result<Ack> {
        self.receive(RemoteCall::LoginByToken)?;
        if !self.state().tokens.iter().any(|t| t == token) {
            return Ok(Ack::rejected("Invalid token."));
        }
        self.logged_in = true;
        Ok(Ack::ok())
    }

    async fn get_tags(&mut self) -> Result<Vec<Tag>> {
        self.receive(RemoteCall::GetTags)?;
        self.require_login()?;
        Ok(self.tags())
    }

    async fn get_monitors(&mut self) -> Result<IndexMap<String, Monitor>> {
        self.receive(RemoteCall::GetMonitors)?;
        self.require_login()?;
        Ok(self
            .monitors()
            .into_iter()
            .map(|m| (m.id.to_string(), m))
            .collect())
    }

    async fn add_tag(&mut self, color: &str, name: &str) -> Result<TagAck> {
        self.receive(RemoteCall::AddTag {
            color: color.to_string(),
            name: name.to_string(),
        })?;
        self.require_login()?;
        if let Some(rejected) = self.rejection() {
            return Ok(TagAck {
                ok: false,
                tag: None,
                msg: rejected.msg,
            });
        }
        let tag = self.insert_tag(name, color);
        let omit = self.state().omit_created_tag;
        Ok(TagAck {
            ok: true,
            tag: (!omit).then_some(tag),
            msg: None,
        })
    }

    async fn delete_tag(&mut self, id: TagId) -> Result<Ack> {
        self.receive(RemoteCall::DeleteTag { id })?;
        self.require_login()?;
        if let Some(rejected) = self.rejection() {
            return Ok(rejected);
        }
        let mut state = self.state();
        let before = state.tags.len();
        state.tags.retain(|t| t.id != id);
        if state.tags.len() == before {
            return Ok(Ack::rejected("Tag not found"));
        }
        for monitor in &mut state.monitors {
            monitor.tags.retain(|link| link.tag_id != id);
        }
        Ok(Ack::ok())
    }

    async fn add_monitor_tag(
        &mut self,
        tag_id: TagId,
        monitor_id: MonitorId,
        value: &str,
    ) -> Result<Ack> {
        self.receive(RemoteCall::AddMonitorTag {
            tag_id,
            monitor_id,
            value: value.to_string(),
        })?;
        self.require_login()?;
        if let Some(rejected) = self.rejection() {
            return Ok(rejected);
        }
        let mut state = self.state();
        let Some(tag) = state.tags.iter().find(|t| t.id == tag_id).cloned() else {
            return Ok(Ack::rejected("Tag not found"));
        };
        let Some(monitor) = state.monitors.iter_mut().find(|m| m.id == monitor_id) else {
            return Ok(Ack::rejected("Monitor not found"));
        };
        monitor.tags.push(MonitorTagLink::new(&tag, monitor_id, value));
        Ok(Ack::ok())
    }

    async fn delete_monitor_tag(
        &mut self,
        tag_id: TagId,
        monitor_id: MonitorId,
        value: &str,
    ) -> Result<Ack> {
        self.receive(RemoteCall::DeleteMonitorTag {
            tag_id,
            monitor_id,
            value: value.to_string(),
        })?;
        self.require_login()?;
        if let Some(rejected) = self.rejection() {
            return Ok(rejected);
        }
        let mut state = self.state();
        if let Some(monitor) = state.monitors.iter_mut().find(|m| m.id == monitor_id) {
            monitor
                .tags
                .retain(|link| !(link.tag_id == tag_id && link.value == value));
        }
        Ok(Ack::ok())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.logged_in = false;
        self.receive(RemoteCall::Disconnect)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_state_not_login() {
        let mut first = MemoryKuma::new().with_user("admin", "pw");
        let mut second = first.clone();

        first.login("admin", "pw").await.unwrap();
        let ack = first.add_tag("#ff0000", "Tag 1").await.unwrap();
        assert!(ack.ok);

        assert!(second.get_tags().await.is_err());
        second.login("admin", "pw").await.unwrap();
        assert_eq!(second.get_tags().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_tag_drops_links() {
        let kuma = MemoryKuma::new().with_user("admin", "pw");
        let tag = kuma.insert_tag("Tag 1", "#fff");
        let monitor_id = kuma.insert_monitor("Peer 1");
        kuma.insert_link(tag.id, monitor_id, "a");
        kuma.insert_link(tag.id, monitor_id, "b");

        let mut api = kuma.clone();
        api.login("admin", "pw").await.unwrap();
        assert!(api.delete_tag(tag.id).await.unwrap().ok);
        assert!(kuma.links(monitor_id).is_empty());
        assert!(!api.delete_tag(tag.id).await.unwrap().ok);
    }

    #[tokio::test]
    async fn test_fail_on_records_call() {
        let mut kuma = MemoryKuma::new().with_user("admin", "pw");
        kuma.fail_on("getTags");
        kuma.login("admin", "pw").await.unwrap();

        let err = kuma.get_tags().await.unwrap_err();
        assert!(matches!(err, KumaError::Transport { .. }));
        assert_eq!(kuma.call_log().count("getTags"), 1);
    }
}
