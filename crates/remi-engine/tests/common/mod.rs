//! Common test utilities for remi-engine
//!
//! This module provides shared test infrastructure including:
//! - Constants for names and deadlines
//! - Plugin builders with scripted behavior
//! - An invocation tracker shared between plugins and assertions
//! - Assertion helpers for ordering and outcomes

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod assertions;
pub mod builders;
pub mod constants;
pub mod mocks;

pub use assertions::*;
pub use builders::*;
pub use constants::*;
pub use mocks::*;
