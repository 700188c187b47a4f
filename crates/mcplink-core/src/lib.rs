//! # McpLink Core Library
//!
//! Domain logic, entities, and collaborator traits for McpLink.
//!
//! ## Modules
//!
//! - `domain` - Core entities (Integration, McpServer) and domain events
//! - `repository` - Data access and control-plane adapter traits
//! - `event_bus` - Central event distribution system

pub mod domain;
pub mod event_bus;
pub mod repository;

// Re-export commonly used types
pub use domain::*;
pub use repository::*;

pub use event_bus::{EventBus, EventReceiver, EventSender};
