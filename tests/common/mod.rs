//! Shared test utilities for cwtail integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Timing-sensitive helpers record `tokio::time::Instant`s,
//! so they are deterministic under `#[tokio::test(start_paused = true)]`.
#![allow(dead_code)]

pub mod assertions;
pub mod builders;
pub mod capture;
pub mod fake_source;

pub use builders::*;
pub use capture::*;
pub use fake_source::*;
