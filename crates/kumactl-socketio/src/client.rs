//! Socket.IO client speaking the Uptime Kuma event protocol.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use kumactl_core::{
    rejection_reason, Ack, KumaApi, KumaError, LoginAck, Monitor, MonitorId, Tag, TagAck, TagId,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{Result, TransportError};
use crate::packet::{EnginePacket, SocketPacket};
use crate::transport::{endpoint_url, PollingTransport};

/// Event the server pushes with all monitors after a successful login.
const MONITOR_LIST_EVENT: &str = "monitorList";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Upper bound for a single HTTP request, including long polls.
    pub request_timeout: Duration,
    /// Upper bound for waiting on a reply or a pushed event.
    pub reply_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            reply_timeout: Duration::from_secs(10),
        }
    }
}

impl ClientConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }
}

/// A connected Socket.IO client.
///
/// Replies are matched to calls by ack id. Events pushed by the server are
/// kept by name, latest payload wins.
pub struct SocketIoClient {
    transport: PollingTransport,
    reply_timeout: Duration,
    next_id: u64,
    replies: HashMap<u64, Vec<Value>>,
    events: HashMap<String, Vec<Value>>,
    connected: bool,
}

impl SocketIoClient {
    /// Opens the engine session and joins the main namespace.
    pub async fn connect(url: &str, config: &ClientConfig) -> Result<Self> {
        let endpoint = endpoint_url(url)?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let (transport, _handshake) = PollingTransport::open(http, endpoint).await?;

        let mut client = Self {
            transport,
            reply_timeout: config.reply_timeout,
            next_id: 0,
            replies: HashMap::new(),
            events: HashMap::new(),
            connected: false,
        };
        client
            .transport
            .send(&[EnginePacket::Message(SocketPacket::Connect(None).encode())])
            .await?;
        client.wait_until("namespace connect", |c| c.connected).await?;
        tracing::debug!(sid = %client.transport.sid(), "socket.io connected");
        Ok(client)
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Emits `event` with an ack id and returns the first reply argument.
    pub async fn call(&mut self, event: &str, args: Vec<Value>) -> Result<Value> {
        if !self.connected {
            return Err(TransportError::Closed);
        }
        let id = self.next_id;
        self.next_id += 1;
        tracing::debug!(event, id, "call");

        let packet = SocketPacket::event(Some(id), event, args);
        self.transport
            .send(&[EnginePacket::Message(packet.encode())])
            .await?;
        self.wait_until(event, |c| c.replies.contains_key(&id)).await?;

        let reply = self.replies.remove(&id).unwrap_or_default();
        Ok(reply.into_iter().next().unwrap_or(Value::Null))
    }

    async fn call_as<T: DeserializeOwned>(&mut self, event: &str, args: Vec<Value>) -> Result<T> {
        let reply = self.call(event, args).await?;
        serde_json::from_value(reply).map_err(|e| TransportError::reply(event, e))
    }

    /// First argument of the latest `event` pushed by the server, waiting
    /// for one if none has arrived yet.
    pub async fn wait_for_event(&mut self, event: &str) -> Result<Value> {
        self.wait_until(event, |c| c.events.contains_key(event)).await?;
        let args = self.events.get(event).cloned().unwrap_or_default();
        Ok(args.into_iter().next().unwrap_or(Value::Null))
    }

    async fn wait_until(&mut self, what: &str, ready: impl Fn(&Self) -> bool) -> Result<()> {
        let limit = self.reply_timeout;
        let wait = async {
            while !ready(&*self) {
                self.pump().await?;
            }
            Ok::<(), TransportError>(())
        };
        match tokio::time::timeout(limit, wait).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(what.to_string())),
        }
    }

    /// Polls once and dispatches every packet received.
    async fn pump(&mut self) -> Result<()> {
        for packet in self.transport.poll().await? {
            match packet {
                EnginePacket::Ping(data) => {
                    self.transport.send(&[EnginePacket::Pong(data)]).await?;
                }
                EnginePacket::Close => {
                    self.connected = false;
                    return Err(TransportError::Closed);
                }
                EnginePacket::Message(data) => self.dispatch(SocketPacket::decode(&data)?)?,
                EnginePacket::Open(_)
                | EnginePacket::Pong(_)
                | EnginePacket::Upgrade
                | EnginePacket::Noop => {}
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, packet: SocketPacket) -> Result<()> {
        match packet {
            SocketPacket::Connect(_) => self.connected = true,
            SocketPacket::Disconnect => {
                self.connected = false;
                return Err(TransportError::Closed);
            }
            SocketPacket::ConnectError(data) => {
                let message = data
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| data.to_string());
                return Err(TransportError::ConnectRefused(message));
            }
            SocketPacket::Ack { id, args } => {
                self.replies.insert(id, args);
            }
            SocketPacket::Event { name, args, .. } => {
                tracing::trace!(event = %name, "event received");
                self.events.insert(name, args);
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct TagList {
    ok: bool,
    #[serde(default)]
    tags: Vec<Tag>,
    #[serde(default)]
    msg: Option<String>,
}

impl TagList {
    fn reason(&self) -> String {
        rejection_reason(self.msg.as_deref())
    }
}

#[async_trait]
impl KumaApi for SocketIoClient {
    async fn need_setup(&mut self) -> kumactl_core::Result<bool> {
        Ok(self.call_as("needSetup", vec![]).await?)
    }

    async fn setup(&mut self, username: &str, password: &str) -> kumactl_core::Result<Ack> {
        Ok(self
            .call_as("setup", vec![json!(username), json!(password)])
            .await?)
    }

    async fn login(&mut self, username: &str, password: &str) -> kumactl_core::Result<LoginAck> {
        let credentials = json!({"username": username, "password": password, "token": ""});
        Ok(self.call_as("login", vec![credentials]).await?)
    }

    async fn login_by_token(&mut self, token: &str) -> kumactl_core::Result<Ack> {
        Ok(self.call_as("loginByToken", vec![json!(token)]).await?)
    }

    async fn get_tags(&mut self) -> kumactl_core::Result<Vec<Tag>> {
        let list: TagList = self.call_as("getTags", vec![]).await?;
        if !list.ok {
            return Err(KumaError::remote_operation("getTags", list.reason()));
        }
        Ok(list.tags)
    }

    async fn get_monitors(&mut self) -> kumactl_core::Result<IndexMap<String, Monitor>> {
        let list = self.wait_for_event(MONITOR_LIST_EVENT).await?;
        serde_json::from_value(list)
            .map_err(|e| TransportError::reply(MONITOR_LIST_EVENT, e).into())
    }

    async fn add_tag(&mut self, color: &str, name: &str) -> kumactl_core::Result<TagAck> {
        let tag = json!({"color": color, "name": name, "new": true});
        Ok(self.call_as("addTag", vec![tag]).await?)
    }

    async fn delete_tag(&mut self, id: TagId) -> kumactl_core::Result<Ack> {
        Ok(self.call_as("deleteTag", vec![json!(id)]).await?)
    }

    async fn add_monitor_tag(
        &mut self,
        tag_id: TagId,
        monitor_id: MonitorId,
        value: &str,
    ) -> kumactl_core::Result<Ack> {
        Ok(self
            .call_as(
                "addMonitorTag",
                vec![json!(tag_id), json!(monitor_id), json!(value)],
            )
            .await?)
    }

    async fn delete_monitor_tag(
        &mut self,
        tag_id: TagId,
        monitor_id: MonitorId,
        value: &str,
    ) -> kumactl_core::Result<Ack> {
        Ok(self
            .call_as(
                "deleteMonitorTag",
                vec![json!(tag_id), json!(monitor_id), json!(value)],
            )
            .await?)
    }

    async fn disconnect(&mut self) -> kumactl_core::Result<()> {
        if !self.connected {
            return Ok(());
        }
        self.connected = false;
        self.transport
            .send(&[
                EnginePacket::Message(SocketPacket::Disconnect.encode()),
                EnginePacket::Close,
            ])
            .await?;
        tracing::debug!("socket.io disconnected");
        Ok(())
    }
}
