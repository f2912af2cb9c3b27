//! Test helpers module
//!
//! This module provides utilities and helpers for testing the Pjotinha bot:
//! completion client doubles, a mock completion server and a wired test
//! context.

#![allow(dead_code)]

pub mod completion_mock;
pub mod test_context;
pub mod test_data;

pub use completion_mock::*;
pub use test_context::*;
pub use test_data::*;
