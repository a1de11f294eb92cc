//! Engine.IO v4 and Socket.IO v5 packet codec (text packets only).

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Result, TransportError};

/// Separates packets within one polling payload.
pub const RECORD_SEPARATOR: char = '\u{1e}';

/// Parameters sent by the server in the open packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    pub ping_interval: u64,
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping(String),
    Pong(String),
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn encode(&self) -> String {
        match self {
            // Clients never send open packets.
            Self::Open(_) => "0".to_string(),
            Self::Close => "1".to_string(),
            Self::Ping(data) => format!("2{data}"),
            Self::Pong(data) => format!("3{data}"),
            Self::Message(data) => format!("4{data}"),
            Self::Upgrade => "5".to_string(),
            Self::Noop => "6".to_string(),
        }
    }

    pub fn decode(raw: &str) -> Result<Self> {
        let mut chars = raw.chars();
        let kind = chars
            .next()
            .ok_or_else(|| TransportError::packet(raw, "empty packet"))?;
        let data = chars.as_str();
        Ok(match kind {
            '0' => Self::Open(
                serde_json::from_str(data).map_err(|e| TransportError::packet(raw, e.to_string()))?,
            ),
            '1' => Self::Close,
            '2' => Self::Ping(data.to_string()),
            '3' => Self::Pong(data.to_string()),
            '4' => Self::Message(data.to_string()),
            '5' => Self::Upgrade,
            '6' => Self::Noop,
            'b' => return Err(TransportError::packet(raw, "binary packets are not supported")),
            other => return Err(TransportError::packet(raw, format!("unknown packet type {other:?}"))),
        })
    }
}

pub fn encode_payload(packets: &[EnginePacket]) -> String {
    packets
        .iter()
        .map(EnginePacket::encode)
        .collect::<Vec<_>>()
        .join(&RECORD_SEPARATOR.to_string())
}

pub fn decode_payload(body: &str) -> Result<Vec<EnginePacket>> {
    body.split(RECORD_SEPARATOR)
        .filter(|raw| !raw.is_empty())
        .map(EnginePacket::decode)
        .collect()
}

/// A Socket.IO packet carried in an engine message, on the main namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect(Option<Value>),
    Disconnect,
    Event {
        id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        id: u64,
        args: Vec<Value>,
    },
    ConnectError(Value),
}

impl SocketPacket {
    pub fn event(id: Option<u64>, name: impl Into<String>, args: Vec<Value>) -> Self {
        Self::Event {
            id,
            name: name.into(),
            args,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Connect(None) => "0".to_string(),
            Self::Connect(Some(auth)) => format!("0{auth}"),
            Self::Disconnect => "1".to_string(),
            Self::Event { id, name, args } => {
                let mut data = Vec::with_capacity(args.len() + 1);
                data.push(Value::String(name.clone()));
                data.extend(args.iter().cloned());
                let id = id.map(|id| id.to_string()).unwrap_or_default();
                format!("2{id}{}", Value::Array(data))
            }
            Self::Ack { id, args } => format!("3{id}{}", Value::Array(args.clone())),
            Self::ConnectError(data) => format!("4{data}"),
        }
    }

    /// Decodes a packet. A namespace prefix (`/admin,`) is skipped.
    pub fn decode(raw: &str) -> Result<Self> {
        let mut chars = raw.chars();
        let kind = chars
            .next()
            .ok_or_else(|| TransportError::packet(raw, "empty socket packet"))?;
        let mut rest = chars.as_str();

        if rest.starts_with('/') {
            rest = match rest.find(',') {
                Some(comma) => &rest[comma + 1..],
                None => "",
            };
        }

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (id, json) = rest.split_at(digits);
        let id = if id.is_empty() {
            None
        } else {
            Some(
                id.parse::<u64>()
                    .map_err(|e| TransportError::packet(raw, e.to_string()))?,
            )
        };

        let parse = |json: &str| -> Result<Value> {
            serde_json::from_str(json).map_err(|e| TransportError::packet(raw, e.to_string()))
        };
        let parse_array = |json: &str| -> Result<Vec<Value>> {
            match parse(json)? {
                Value::Array(items) => Ok(items),
                _ => Err(TransportError::packet(raw, "expected a JSON array")),
            }
        };

        match kind {
            '0' if json.is_empty() => Ok(Self::Connect(None)),
            '0' => Ok(Self::Connect(Some(parse(json)?))),
            '1' => Ok(Self::Disconnect),
            '2' => {
                let mut args = parse_array(json)?;
                if args.is_empty() {
                    return Err(TransportError::packet(raw, "event without a name"));
                }
                let Value::String(name) = args.remove(0) else {
                    return Err(TransportError::packet(raw, "event name is not a string"));
                };
                Ok(Self::Event { id, name, args })
            }
            '3' => {
                let id = id.ok_or_else(|| TransportError::packet(raw, "ack without an id"))?;
                Ok(Self::Ack {
                    id,
                    args: parse_array(json)?,
                })
            }
            '4' => Ok(Self::ConnectError(if json.is_empty() {
                Value::Null
            } else {
                parse(json)?
            })),
            '5' | '6' => Err(TransportError::packet(raw, "binary packets are not supported")),
            other => Err(TransportError::packet(raw, format!("unknown socket packet type {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_open() {
        let packet = EnginePacket::decode(
            r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":["websocket"],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#,
        )
        .unwrap();

        let EnginePacket::Open(handshake) = packet else {
            panic!("expected open packet");
        };
        assert_eq!(handshake.sid, "lv_VI97HAXpY6yYWAAAC");
        assert_eq!(handshake.ping_interval, 25000);
        assert_eq!(handshake.max_payload, Some(1_000_000));
    }

    #[test]
    fn test_payload_split() {
        let body = "2\u{1e}40{\"sid\":\"x\"}\u{1e}42[\"monitorList\",{}]";
        let packets = decode_payload(body).unwrap();
        assert_eq!(
            packets,
            vec![
                EnginePacket::Ping(String::new()),
                EnginePacket::Message("0{\"sid\":\"x\"}".to_string()),
                EnginePacket::Message("2[\"monitorList\",{}]".to_string()),
            ]
        );
    }

    #[test]
    fn test_encode_payload() {
        let payload = encode_payload(&[
            EnginePacket::Message(SocketPacket::Disconnect.encode()),
            EnginePacket::Close,
        ]);
        assert_eq!(payload, "41\u{1e}1");
    }

    #[test]
    fn test_event_with_ack_id() {
        let packet = SocketPacket::event(Some(12), "addMonitorTag", vec![json!(1), json!(2), json!("v")]);
        assert_eq!(packet.encode(), r#"212["addMonitorTag",1,2,"v"]"#);
        assert_eq!(SocketPacket::event(None, "getTags", vec![]).encode(), r#"2["getTags"]"#);
    }

    #[test]
    fn test_decode_ack() {
        let packet = SocketPacket::decode(r#"37[{"ok":true,"tags":[]}]"#).unwrap();
        assert_eq!(
            packet,
            SocketPacket::Ack {
                id: 7,
                args: vec![json!({"ok": true, "tags": []})]
            }
        );
    }

    #[test]
    fn test_decode_event_and_namespace() {
        let packet = SocketPacket::decode(r#"2/admin,["info",{"version":"1.23.0"}]"#).unwrap();
        assert_eq!(
            packet,
            SocketPacket::event(None, "info", vec![json!({"version": "1.23.0"})])
        );
    }

    #[test]
    fn test_decode_connect_variants() {
        assert_eq!(
            SocketPacket::decode(r#"0{"sid":"abc"}"#).unwrap(),
            SocketPacket::Connect(Some(json!({"sid": "abc"})))
        );
        assert_eq!(SocketPacket::decode("0").unwrap(), SocketPacket::Connect(None));
        assert_eq!(
            SocketPacket::decode(r#"4{"message":"Not authorized"}"#).unwrap(),
            SocketPacket::ConnectError(json!({"message": "Not authorized"}))
        );
    }

    #[test]
    fn test_decode_errors() {
        assert!(SocketPacket::decode("3[true]").is_err());
        assert!(SocketPacket::decode("2[]").is_err());
        assert!(SocketPacket::decode("2[1]").is_err());
        assert!(EnginePacket::decode("bAQI=").is_err());
        assert!(EnginePacket::decode("9").is_err());
    }
}
