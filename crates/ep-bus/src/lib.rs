//! `ep-bus` — the message-passing substrate between modules and the engine.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`topic`]    | `Topic` (closed enumeration), `Category`, `TopicPattern`     |
//! | [`message`]  | `Notification`, `Request`, `Envelope`                        |
//! | [`module`]   | `Module` trait, `ModuleContext`, `ModuleRegistry`, `ModuleKind` |
//! | [`bus`]      | `MessageBus`, `RequestQueue`                                 |
//! | [`error`]    | `BusError`, `ModuleError`                                    |
//!
//! # Delivery rules
//!
//! - Only the engine publishes notifications; modules only emit requests.
//! - Subscribers of a topic run in registration order.
//! - Every notification queued for a tick is delivered before the next
//!   tick begins; requests emitted meanwhile wait for the next resolve phase.
//! - After collect, [`MessageBus::review_all`] lets every module look at the
//!   queued requests once and add its own.  Nothing is removed or rewritten.

pub mod bus;
pub mod error;
pub mod message;
pub mod module;
pub mod topic;


pub use bus::{MessageBus, RequestQueue};
pub use error::{BusError, BusResult, ModuleError, ModuleResult};
pub use message::{Envelope, Notification, Request};
pub use module::{Module, ModuleContext, ModuleEntry, ModuleId, ModuleKind, ModuleRegistry};
pub use topic::{Category, Topic, TopicPattern};
