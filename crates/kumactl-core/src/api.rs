//! The remote service interface consumed by the reconciliation core.

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::Result;
use crate::model::{Ack, LoginAck, Monitor, MonitorId, Tag, TagAck, TagId};

/// Calls an Uptime Kuma instance understands.
///
/// Implementations hold one connection. Every method is a single remote
/// round trip; none of them retry. Transport failures are returned as
/// [`KumaError::Transport`](crate::KumaError::Transport), malformed replies as
/// [`KumaError::Protocol`](crate::KumaError::Protocol). A call the remote
/// refuses is not an error at this level: it comes back as an
/// acknowledgement with `ok == false`.
#[async_trait]
pub trait KumaApi: Send {
    /// Whether the instance still needs its first admin account.
    async fn need_setup(&mut self) -> Result<bool>;

    /// Creates the first admin account.
    async fn setup(&mut self, username: &str, password: &str) -> Result<Ack>;

    async fn login(&mut self, username: &str, password: &str) -> Result<LoginAck>;

    async fn login_by_token(&mut self, token: &str) -> Result<Ack>;

    async fn get_tags(&mut self) -> Result<Vec<Tag>>;

    /// Monitors keyed by their id as a string, in the order the remote sent
    /// them.
    async fn get_monitors(&mut self) -> Result<IndexMap<String, Monitor>>;

    async fn add_tag(&mut self, color: &str, name: &str) -> Result<TagAck>;

    async fn delete_tag(&mut self, id: TagId) -> Result<Ack>;

    async fn add_monitor_tag(
        &mut self,
        tag_id: TagId,
        monitor_id: MonitorId,
        value: &str,
    ) -> Result<Ack>;

    async fn delete_monitor_tag(
        &mut self,
        tag_id: TagId,
        monitor_id: MonitorId,
        value: &str,
    ) -> Result<Ack>;

    /// Closes the connection. Calling it twice is allowed.
    async fn disconnect(&mut self) -> Result<()>;
}
