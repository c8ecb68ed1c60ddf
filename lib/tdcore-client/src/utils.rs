// Copyright 2020 - developers of the `tdcore` project.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;

/// A [`std::sync::Mutex`] wrapper that requires callers to name the call site acquiring the
/// lock, so that a poisoned lock's panic message points at what broke it.
pub(crate) struct Mutex<T> {
    inner: std::sync::Mutex<T>,
}

impl<T> Mutex<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            inner: std::sync::Mutex::new(value),
        }
    }

    /// Lock the mutex, panicking with `site` in the message if another holder poisoned it.
    pub(crate) fn lock(&self, site: &str) -> std::sync::MutexGuard<'_, T> {
        self.inner
            .lock()
            .unwrap_or_else(|_| panic!("lock poisoned at {}", site))
    }
}

impl<T: fmt::Debug> fmt::Debug for Mutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

/// Generate a random ID suitable for sending messages or media.
pub(crate) fn generate_random_id() -> i64 {
    let mut buffer = [0; 8];
    getrandom::getrandom(&mut buffer).expect("failed to generate random message id");
    i64::from_le_bytes(buffer)
}

pub(crate) fn generate_random_ids(n: usize) -> Vec<i64> {
    let start = generate_random_id();
    (0..n as i64).map(|i| start.wrapping_add(i)).collect()
}
