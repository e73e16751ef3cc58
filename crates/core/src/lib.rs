//! Folio gallery domain logic.
//!
//! The photo collection store and reorder reconciler live here together with
//! the gateway traits they persist through. Nothing in this crate talks to a
//! network service directly.

pub mod collection;
pub mod error;
pub mod gallery;
pub mod gateway;
pub mod memory;
pub mod photo;
pub mod reconcile;
pub mod types;
