//! Caller-declared desired state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    #[default]
    Present,
    Absent,
}

impl DesiredState {
    pub fn want_present(self) -> bool {
        matches!(self, Self::Present)
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => f.write_str("present"),
            Self::Absent => f.write_str("absent"),
        }
    }
}

impl FromStr for DesiredState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            other => Err(format!("invalid state {other:?}, expected present or absent")),
        }
    }
}

/// A tag that should or should not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAssertion {
    pub name: String,
    /// Only used when the tag has to be created.
    pub color: Option<String>,
    pub state: DesiredState,
}

/// A tag attached to a monitor with a given value, or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorTagAssertion {
    pub monitor_name: String,
    pub tag_name: String,
    pub value: String,
    pub state: DesiredState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesiredAssertion {
    Tag(TagAssertion),
    MonitorTag(MonitorTagAssertion),
}

impl DesiredAssertion {
    pub fn tag(name: impl Into<String>, color: Option<&str>, state: DesiredState) -> Self {
        Self::Tag(TagAssertion {
            name: name.into(),
            color: color.map(str::to_string),
            state,
        })
    }

    pub fn monitor_tag(
        monitor_name: impl Into<String>,
        tag_name: impl Into<String>,
        value: impl Into<String>,
        state: DesiredState,
    ) -> Self {
        Self::MonitorTag(MonitorTagAssertion {
            monitor_name: monitor_name.into(),
            tag_name: tag_name.into(),
            value: value.into(),
            state,
        })
    }

    pub fn state(&self) -> DesiredState {
        match self {
            Self::Tag(a) => a.state,
            Self::MonitorTag(a) => a.state,
        }
    }

    /// Same selector with the opposite presence.
    pub fn inverted(&self) -> Self {
        let flip = |state| match state {
            DesiredState::Present => DesiredState::Absent,
            DesiredState::Absent => DesiredState::Present,
        };
        match self {
            Self::Tag(a) => Self::Tag(TagAssertion {
                state: flip(a.state),
                ..a.clone()
            }),
            Self::MonitorTag(a) => Self::MonitorTag(MonitorTagAssertion {
                state: flip(a.state),
                ..a.clone()
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_parse() {
        assert_eq!("absent".parse::<DesiredState>(), Ok(DesiredState::Absent));
        assert!("gone".parse::<DesiredState>().is_err());
        assert_eq!(DesiredState::default(), DesiredState::Present);
    }

    #[test]
    fn test_inverted() {
        let a = DesiredAssertion::monitor_tag("Peer 1", "Tag 1", "v", DesiredState::Present);
        let b = a.inverted();
        assert_eq!(b.state(), DesiredState::Absent);
        assert_eq!(b.inverted(), a);
    }
}
