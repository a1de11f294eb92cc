//! # kumactl-core
//!
//! Reconciliation of Uptime Kuma tags and monitor tags.
//!
//! A run opens one [`Session`], reads the current tags and monitors, resolves
//! the named entities, decides whether anything has to change, applies at
//! most one mutation and returns a [`ReconciliationResult`]. The session is
//! closed on every exit path.
//!
//! The remote service is reached through the [`KumaApi`] trait. This crate
//! ships an in-memory implementation ([`MemoryKuma`]); the Socket.IO client
//! lives in `kumactl-socketio`.
//!
//! ```ignore
//! use kumactl_core::{reconcile, Credentials, DesiredAssertion, DesiredState};
//!
//! let assertion = DesiredAssertion::tag("Tag 1", Some("#ff0000"), DesiredState::Present);
//! let result = reconcile(client, &Credentials::password("admin", "secret"), &assertion).await;
//! assert!(result.error.is_none());
//! ```

pub mod api;
pub mod assertion;
pub mod diff;
pub mod error;
pub mod inspect;
pub mod memory;
pub mod model;
pub mod reconcile;
pub mod report;
pub mod resolve;
pub mod session;
pub mod setup;
pub mod state;

pub use api::KumaApi;
pub use assertion::{DesiredAssertion, DesiredState, MonitorTagAssertion, TagAssertion};
pub use diff::{Action, Plan};
pub use error::{EntityKind, KumaError, Result};
pub use inspect::{inspect_monitors, MonitorSelector};
pub use memory::{CallLog, MemoryKuma, RemoteCall};
pub use model::{
    rejection_reason, Ack, LoginAck, Monitor, MonitorId, MonitorTagLink, NotificationIds, Tag,
    TagAck, TagId,
};
pub use reconcile::reconcile;
pub use report::{Outcome, ReconciliationResult, Resource, ResultReporter};
pub use resolve::Lookup;
pub use session::{with_session, Credentials, Session};
pub use setup::ensure_setup;
pub use state::RemoteState;
