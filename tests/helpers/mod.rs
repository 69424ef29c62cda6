#![allow(dead_code)]

//! Test helpers module
//!
//! Fakes for the outbound collaborators, a unified service context over the
//! in-memory backends, and a Postgres fixture for the ignored store tests.

pub mod database_helper;
pub mod fakes;
pub mod test_context;

pub use database_helper::*;
pub use fakes::*;
pub use test_context::*;
