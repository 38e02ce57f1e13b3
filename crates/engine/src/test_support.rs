// SPDX-License-Identifier: MIT

//! Test-only helpers shared by handler, workflow, and scheduler tests.

#![cfg(test)]

use bf_core::FakeClock;
use bf_storage::Store;

/// A connected, schema-initialized in-memory store backed by `clock`.
pub async fn memory_store(clock: FakeClock) -> Store<FakeClock> {
    let mut store = Store::new(":memory:", clock);
    store.connect().await.expect("connect always succeeds for :memory:");
    store.init_schema().await.expect("init_schema always succeeds for :memory:");
    store
}
