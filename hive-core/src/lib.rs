//! Hive Core - Shared Types
//!
//! Plain data structures and the error taxonomy shared by every hive crate.
//! This crate has no I/O and no async runtime dependency.

pub mod error;
pub mod message;
pub mod roles;

pub use error::{ConfigError, MountError, StorageError};
pub use message::{Message, Timestamp, HEARTBEAT_CONTENT};
pub use roles::{is_blank_key, is_reserved_key, RESERVED_KEYS, ROLE_ADMIN, ROLE_POWER, ROOT_USER};
