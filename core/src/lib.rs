//! Core domain logic for Catpoint.
//!
//! [`SecurityService`] is the single authority that turns sensor, arming and
//! camera events into alarm status transitions, and fans those transitions
//! out to registered [`StatusListener`]s.
//!
//! The service owns no durable state. Sensors, alarm status and arming status
//! live in the injected [`catpoint_store::SecurityRepository`]; the only state
//! held here is the transient cat-detected flag and the listener set.

mod errors;
mod listener;
mod service;


pub use errors::SecurityError;
pub use listener::StatusListener;
pub use service::SecurityService;
