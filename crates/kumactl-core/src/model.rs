//! Remote entities as read from an Uptime Kuma instance.

use indexmap::{IndexMap, IndexSet};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type TagId = i64;
pub type MonitorId = i64;

/// A named, colored label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub color: String,
}

/// One attachment of a tag to a monitor.
///
/// The same tag may be attached to a monitor several times with different
/// values; each `(tag_id, monitor_id, value)` triple is a distinct link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorTagLink {
    pub tag_id: TagId,
    #[serde(rename = "name")]
    pub tag_name: String,
    #[serde(rename = "color")]
    pub tag_color: String,
    pub monitor_id: MonitorId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub value: String,
}

impl MonitorTagLink {
    /// Link that would result from attaching `tag` to `monitor_id`.
    pub fn new(tag: &Tag, monitor_id: MonitorId, value: impl Into<String>) -> Self {
        Self {
            tag_id: tag.id,
            tag_name: tag.name.clone(),
            tag_color: tag.color.clone(),
            monitor_id,
            value: value.into(),
        }
    }
}

/// A health-check target with its tag links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    pub id: MonitorId,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<MonitorTagLink>,
    #[serde(rename = "notificationIDList", default)]
    pub notification_ids: NotificationIds,
    /// Remaining monitor attributes, kept as sent by the remote.
    #[serde(flatten)]
    pub attributes: IndexMap<String, Value>,
}

impl Monitor {
    pub fn new(id: MonitorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tags: Vec::new(),
            notification_ids: NotificationIds::default(),
            attributes: IndexMap::new(),
        }
    }
}

/// Ids of the notifications enabled on a monitor.
///
/// The remote sends `{"1": true, "3": false}`; only enabled ids are kept,
/// in the order the remote listed them. Serialized as a plain array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NotificationIds(IndexSet<i64>);

impl NotificationIds {
    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }

    /// Compacts the remote id-to-enabled mapping.
    pub fn from_enabled_map(map: &IndexMap<String, bool>) -> Result<Self, String> {
        let mut ids = IndexSet::new();
        for (key, enabled) in map {
            if !enabled {
                continue;
            }
            let id = key
                .parse::<i64>()
                .map_err(|_| format!("invalid notification id: {key:?}"))?;
            ids.insert(id);
        }
        Ok(Self(ids))
    }
}

impl FromIterator<i64> for NotificationIds {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for NotificationIds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Enabled(IndexMap<String, bool>),
            List(Vec<i64>),
            Missing(()),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Enabled(map) => NotificationIds::from_enabled_map(&map).map_err(de::Error::custom),
            Raw::List(ids) => Ok(ids.into_iter().collect()),
            Raw::Missing(()) => Ok(NotificationIds::default()),
        }
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Message to report for an `ok=false` reply, which may come without one.
pub fn rejection_reason(msg: Option<&str>) -> String {
    msg.unwrap_or("no message given").to_string()
}

/// Plain acknowledgement of a remote call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true, msg: None }
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            msg: Some(msg.into()),
        }
    }

    /// Message to report for a rejection.
    pub fn reason(&self) -> String {
        rejection_reason(self.msg.as_deref())
    }
}

/// Acknowledgement of `addTag`, carrying the created tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAck {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl TagAck {
    pub fn reason(&self) -> String {
        rejection_reason(self.msg.as_deref())
    }
}

/// Acknowledgement of `login`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAck {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, rename = "tokenRequired")]
    pub token_required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_monitor_from_wire() {
        let monitor: Monitor = serde_json::from_value(json!({
            "id": 1,
            "name": "Peer 1",
            "type": "http",
            "url": "https://example.org",
            "notificationIDList": {"1": true, "2": false, "3": true},
            "tags": [
                {"id": 7, "monitor_id": 1, "tag_id": 2, "value": null, "name": "Tag 1", "color": "#ff0000"}
            ]
        }))
        .unwrap();

        assert_eq!(monitor.id, 1);
        assert_eq!(monitor.tags.len(), 1);
        assert_eq!(monitor.tags[0].value, "");
        assert_eq!(monitor.tags[0].tag_name, "Tag 1");
        assert_eq!(monitor.notification_ids.iter().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(monitor.attributes.get("type"), Some(&json!("http")));
    }

    #[test]
    fn test_notification_ids_serialize_as_list() {
        let mut monitor = Monitor::new(4, "db");
        monitor.notification_ids = [5, 2].into_iter().collect();

        let value = serde_json::to_value(&monitor).unwrap();
        assert_eq!(value["notificationIDList"], json!([5, 2]));
        assert_eq!(value["tags"], json!([]));
    }

    #[test]
    fn test_notification_ids_keep_remote_order() {
        let ids: NotificationIds =
            serde_json::from_str(r#"{"9": true, "2": true, "5": false, "4": true}"#).unwrap();
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec![9, 2, 4]);
    }

    #[test]
    fn test_login_ack_token_required() {
        let ack: LoginAck = serde_json::from_value(json!({"tokenRequired": true})).unwrap();
        assert!(!ack.ok);
        assert!(ack.token_required);
        assert_eq!(ack.token, None);
    }

    #[test]
    fn test_notification_ids_reject_bad_key() {
        let result = serde_json::from_value::<NotificationIds>(json!({"abc": true}));
        assert!(result.is_err());
    }

    #[test]
    fn test_notification_ids_disabled_only() {
        let ids: NotificationIds = serde_json::from_value(json!({"1": false})).unwrap();
        assert!(ids.is_empty());
        assert!(!ids.contains(1));
    }

    #[test]
    fn test_ack_reason() {
        assert_eq!(Ack::rejected("boom").reason(), "boom");
        assert_eq!(Ack::default().reason(), "no message given");
        assert_eq!(TagAck::default().reason(), "no message given");
        let ack: Ack = serde_json::from_value(json!({"ok": true})).unwrap();
        assert_eq!(ack, Ack::ok());
    }
}
