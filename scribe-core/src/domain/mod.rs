//! Core domain types
//!
//! These types mirror resources owned by the content-generation backend.
//! The client only ever observes them; it never creates or destroys them.

pub mod job;
