//! Invocation tracking for test plugins

#![allow(dead_code)]

use remi_core::Options;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Records every plugin body and interceptor invocation, in order
#[derive(Clone, Default)]
pub struct InvocationTracker {
    calls: Arc<Mutex<Vec<String>>>,
    options: Arc<Mutex<HashMap<String, Options>>>,
}

impl InvocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    pub fn record_options(&self, name: &str, options: &Options) {
        self.options
            .lock()
            .unwrap()
            .insert(name.to_string(), options.clone());
    }

    /// All recorded calls, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
    }

    pub fn was_invoked(&self, name: &str) -> bool {
        self.count(name) > 0
    }

    /// Options the named plugin received on its last run
    pub fn options_for(&self, name: &str) -> Option<Options> {
        self.options.lock().unwrap().get(name).cloned()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
        self.options.lock().unwrap().clear();
    }
}
