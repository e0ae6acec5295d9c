// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazily recomputed derived values.

use core::cell::Cell;

/// A memoized derived value with a validity flag.
///
/// Reading through [`get_or_update`](Self::get_or_update) recomputes at most
/// once per [`invalidate`](Self::invalidate). Interior mutability lets cache
/// reads take `&self`, so getters on the store stay shared borrows.
#[derive(Debug)]
pub(crate) struct Cached<T: Copy> {
    value: Cell<Option<T>>,
}

impl<T: Copy> Default for Cached<T> {
    fn default() -> Self {
        Self::invalid()
    }
}

impl<T: Copy> Cached<T> {
    pub(crate) const fn invalid() -> Self {
        Self {
            value: Cell::new(None),
        }
    }

    /// Returns the cached value, computing and storing it first if invalid.
    pub(crate) fn get_or_update(&self, compute: impl FnOnce() -> T) -> T {
        if let Some(v) = self.value.get() {
            return v;
        }
        let v = compute();
        self.value.set(Some(v));
        v
    }

    /// Drops the cached value. Returns whether it was valid.
    pub(crate) fn invalidate(&self) -> bool {
        self.value.take().is_some()
    }

    #[cfg(test)]
    pub(crate) fn is_valid(&self) -> bool {
        self.value.get().is_some()
    }
}
