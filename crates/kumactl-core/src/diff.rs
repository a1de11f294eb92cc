//! Desired-versus-observed comparison.

use crate::assertion::{MonitorTagAssertion, TagAssertion};
use crate::error::{EntityKind, KumaError, Result};
use crate::model::{Monitor, MonitorTagLink, Tag};
use crate::report::Resource;
use crate::resolve::{find_monitor_by_name, find_tag_by_name, Lookup};
use crate::state::RemoteState;

/// The single mutation a run has to make, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    NoOp,
    CreateTag { name: String, color: String },
    DeleteTag { tag: Tag },
    CreateLink { link: MonitorTagLink },
    DeleteLink { link: MonitorTagLink },
}

impl Action {
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

/// What the differ decided, plus the already-existing entity it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub action: Action,
    pub matched: Option<Resource>,
}

impl Plan {
    fn noop() -> Self {
        Self {
            action: Action::NoOp,
            matched: None,
        }
    }

    fn act(action: Action) -> Self {
        Self {
            action,
            matched: None,
        }
    }
}

pub fn plan_tag(tags: &[Tag], assertion: &TagAssertion) -> Result<Plan> {
    let lookup = find_tag_by_name(tags, &assertion.name);

    match (assertion.state.want_present(), lookup) {
        (true, Lookup::NotFound) => {
            let color = assertion.color.clone().ok_or_else(|| {
                KumaError::invalid_assertion(format!(
                    "tag {:?} does not exist and no color was given to create it",
                    assertion.name
                ))
            })?;
            Ok(Plan::act(Action::CreateTag {
                name: assertion.name.clone(),
                color,
            }))
        }
        (true, Lookup::Found(tag)) => {
            if let Some(color) = &assertion.color
                && *color != tag.color
            {
                tracing::warn!(
                    tag = %tag.name,
                    current = %tag.color,
                    declared = %color,
                    "tag exists with a different color; color is not reconciled"
                );
            }
            Ok(Plan {
                action: Action::NoOp,
                matched: Some(Resource::Tag(tag.clone())),
            })
        }
        (false, Lookup::Found(tag)) => Ok(Plan::act(Action::DeleteTag { tag: tag.clone() })),
        (false, Lookup::NotFound) => Ok(Plan::noop()),
    }
}

/// Finds the link matching the tag's name and color and the exact value.
pub fn find_link<'a>(monitor: &'a Monitor, tag: &Tag, value: &str) -> Lookup<&'a MonitorTagLink> {
    monitor
        .tags
        .iter()
        .find(|link| link.tag_name == tag.name && link.tag_color == tag.color && link.value == value)
        .into()
}

pub fn plan_monitor_tag(state: &RemoteState, assertion: &MonitorTagAssertion) -> Result<Plan> {
    let want_present = assertion.state.want_present();
    let monitor = find_monitor_by_name(&state.monitors, &assertion.monitor_name);
    let tag = find_tag_by_name(&state.tags, &assertion.tag_name);

    let (monitor, tag) = match (monitor, tag) {
        (Lookup::Found(monitor), Lookup::Found(tag)) => (monitor, tag),
        (monitor, _) if want_present => {
            return Err(if monitor.is_found() {
                KumaError::not_found(EntityKind::Tag, &assertion.tag_name)
            } else {
                KumaError::not_found(EntityKind::Monitor, &assertion.monitor_name)
            });
        }
        _ => {
            tracing::debug!(
                monitor = %assertion.monitor_name,
                tag = %assertion.tag_name,
                "monitor or tag missing; link cannot exist"
            );
            return Ok(Plan::noop());
        }
    };

    let wanted = MonitorTagLink::new(tag, monitor.id, &assertion.value);
    match (want_present, find_link(monitor, tag, &assertion.value)) {
        (true, Lookup::NotFound) => Ok(Plan::act(Action::CreateLink { link: wanted })),
        (true, Lookup::Found(link)) => Ok(Plan {
            action: Action::NoOp,
            matched: Some(Resource::MonitorTag(link.clone())),
        }),
        (false, Lookup::Found(link)) => Ok(Plan::act(Action::DeleteLink { link: link.clone() })),
        (false, Lookup::NotFound) => Ok(Plan::noop()),
    }
}
