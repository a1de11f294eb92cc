//! Name lookups over remote listings.
//!
//! Names are not unique on the remote side. When several entities share a
//! name, the first one in listing order wins; callers that need uniqueness
//! have to guarantee it themselves.

use crate::error::KumaError;
use crate::model::{Monitor, MonitorId, Tag};

/// Outcome of a lookup. Absence is a value, never a panic or a null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }

    /// Turns absence into `err` for call sites where a match is required.
    pub fn found_or(self, err: impl FnOnce() -> KumaError) -> Result<T, KumaError> {
        match self {
            Self::Found(value) => Ok(value),
            Self::NotFound => Err(err()),
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Found(value),
            None => Self::NotFound,
        }
    }
}

pub fn find_tag_by_name<'a>(tags: &'a [Tag], name: &str) -> Lookup<&'a Tag> {
    tags.iter().find(|tag| tag.name == name).into()
}

pub fn find_monitor_by_name<'a>(monitors: &'a [Monitor], name: &str) -> Lookup<&'a Monitor> {
    monitors.iter().find(|monitor| monitor.name == name).into()
}

pub fn find_monitor_by_id(monitors: &[Monitor], id: MonitorId) -> Lookup<&Monitor> {
    monitors.iter().find(|monitor| monitor.id == id).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EntityKind;

    fn tag(id: i64, name: &str, color: &str) -> Tag {
        Tag {
            id,
            name: name.to_string(),
            color: color.to_string(),
        }
    }

    #[test]
    fn test_first_duplicate_wins() {
        let tags = vec![
            tag(4, "Tag 1", "#ff0000"),
            tag(2, "Tag 1", "#00ff00"),
            tag(3, "Tag 2", "#0000ff"),
        ];

        for _ in 0..3 {
            assert_eq!(find_tag_by_name(&tags, "Tag 1"), Lookup::Found(&tags[0]));
        }
    }

    #[test]
    fn test_not_found_is_explicit() {
        let monitors = vec![Monitor::new(1, "Peer 1")];

        assert_eq!(find_monitor_by_name(&monitors, "peer 1"), Lookup::NotFound);
        assert_eq!(find_monitor_by_id(&monitors, 2), Lookup::NotFound);
        assert!(find_monitor_by_id(&monitors, 1).is_found());
    }

    #[test]
    fn test_found_or() {
        let tags: Vec<Tag> = Vec::new();
        let err = find_tag_by_name(&tags, "x")
            .found_or(|| KumaError::not_found(EntityKind::Tag, "x"))
            .unwrap_err();
        assert_eq!(err, KumaError::not_found(EntityKind::Tag, "x"));
    }
}
