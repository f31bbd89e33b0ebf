//! Scribe Core
//!
//! Core types shared by the Scribe content-generation client crates.
//!
//! This crate contains:
//! - Domain types: the server-owned `Job` resource and its status
//! - DTOs: response envelopes, job-creation requests and job-id discovery

pub mod domain;
pub mod dto;
