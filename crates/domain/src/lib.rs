//! # ratgdo-domain
//!
//! Pure domain model for the ratgdo bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **garage devices** and the status reconciliation rule (including
//!   the lock state derived from the door)
//! - Define **topic paths** and the positional **topic filters** used by
//!   trigger rules
//! - Define **queued messages** and their decoding from connector payloads
//! - Define **device actions** and the outbound commands they map to
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod device;
pub mod message;
pub mod state;
pub mod topic;
pub mod trigger;
