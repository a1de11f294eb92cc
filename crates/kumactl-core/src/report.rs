//! The result record of a run.

use serde::{Serialize, Serializer};

use crate::error::KumaError;
use crate::model::{MonitorTagLink, Tag};

/// Entity a run created or matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Tag(Tag),
    MonitorTag(MonitorTagLink),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Unchanged,
    Changed,
    Failed,
}

/// Terminal output of one run.
///
/// Serializes as `{"changed": .., "tag": {..}, "msg": ".."}` with the
/// resource and message keys left out when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationResult {
    pub changed: bool,
    #[serde(flatten)]
    pub resource: Option<Resource>,
    #[serde(
        rename = "msg",
        skip_serializing_if = "Option::is_none",
        serialize_with = "error_message"
    )]
    pub error: Option<KumaError>,
}

impl ReconciliationResult {
    pub fn outcome(&self) -> Outcome {
        match (&self.error, self.changed) {
            (Some(_), _) => Outcome::Failed,
            (None, true) => Outcome::Changed,
            (None, false) => Outcome::Unchanged,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn tag(&self) -> Option<&Tag> {
        match &self.resource {
            Some(Resource::Tag(tag)) => Some(tag),
            _ => None,
        }
    }
}

fn error_message<S: Serializer>(error: &Option<KumaError>, serializer: S) -> Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.serialize_str(&error.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Accumulates the result of a run.
///
/// `changed` flips to true as soon as a mutation is attempted, whether or not
/// the remote accepts it. The first error recorded is kept; nothing is rolled
/// back.
#[derive(Debug, Default)]
pub struct ResultReporter {
    changed: bool,
    resource: Option<Resource>,
    error: Option<KumaError>,
}

impl ResultReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    pub fn set_resource(&mut self, resource: Resource) {
        self.resource = Some(resource);
    }

    pub fn fail(&mut self, error: KumaError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    /// Records the error of `result`, if any.
    pub fn absorb(&mut self, result: Result<(), KumaError>) {
        if let Err(error) = result {
            self.fail(error);
        }
    }

    pub fn finish(self) -> ReconciliationResult {
        ReconciliationResult {
            changed: self.changed,
            resource: self.resource,
            error: self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejected_mutation_stays_changed() {
        let mut reporter = ResultReporter::new();
        reporter.mark_changed();
        reporter.fail(KumaError::remote_operation("deleteTag", "nope"));
        reporter.fail(KumaError::transport("later"));

        let result = reporter.finish();
        assert!(result.changed);
        assert_eq!(result.outcome(), Outcome::Failed);
        assert_eq!(result.error, Some(KumaError::remote_operation("deleteTag", "nope")));
    }

    #[test]
    fn test_serialized_shape() {
        let mut reporter = ResultReporter::new();
        reporter.mark_changed();
        reporter.set_resource(Resource::Tag(Tag {
            id: 3,
            name: "Tag 1".to_string(),
            color: "#ff0000".to_string(),
        }));

        let value = serde_json::to_value(reporter.finish()).unwrap();
        assert_eq!(
            value,
            json!({"changed": true, "tag": {"id": 3, "name": "Tag 1", "color": "#ff0000"}})
        );
    }

    #[test]
    fn test_serialized_failure() {
        let mut reporter = ResultReporter::new();
        reporter.absorb(Err(KumaError::authentication("Invalid token.")));

        let result = reporter.finish();
        assert_eq!(result.outcome(), Outcome::Failed);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"changed": false, "msg": "Authentication failed: Invalid token."})
        );
    }

    #[test]
    fn test_unchanged() {
        assert_eq!(ResultReporter::new().finish().outcome(), Outcome::Unchanged);
    }
}
