//! Data Transfer Objects for talking to the content-generation API
//!
//! This module contains the wire shapes that are not domain entities
//! themselves: the optional `{ data: ... }` envelope, job-creation
//! requests and helpers for reading job ids out of creation responses.

pub mod envelope;
pub mod job;
