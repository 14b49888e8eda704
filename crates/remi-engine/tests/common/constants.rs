//! Test constants for remi-engine tests

#![allow(dead_code)]

use std::time::Duration;

/// Deadline used by timeout tests
pub const SHORT_TIMEOUT: Duration = Duration::from_millis(100);

/// Delay comfortably inside [`SHORT_TIMEOUT`]
pub const FAST_DELAY: Duration = Duration::from_millis(10);

/// Delay comfortably past [`SHORT_TIMEOUT`]
pub const SLOW_DELAY: Duration = Duration::from_millis(250);

/// Default test plugin version
pub const TEST_PLUGIN_VERSION: &str = "1.0.0";

/// Main plugin name used across ordering tests
pub const MAIN_PLUGIN: &str = "main";
