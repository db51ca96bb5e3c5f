//! Notification Relay
//!
//! Best-effort fan-out of advisory events to connected WebSocket clients.
//!
//! - `event` - event types and their JSON wire format
//! - `registry` - subscriber registry ([`NotificationRelay`])
//! - `ws` - `GET /ws` endpoint
//!
//! The relay is created once at startup and passed to whoever publishes.
//! Delivery is unordered across sessions and unacknowledged; clients treat
//! events as hints and refetch state over REST.

pub mod event;
pub mod registry;
pub mod ws;

pub use event::{EngagementKind, EngagementState, RelationshipAction, RelayEvent};
pub use registry::{DEFAULT_QUEUE_CAPACITY, NotificationRelay, Subscription};
pub use ws::relay_router;
