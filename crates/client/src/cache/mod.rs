// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side query cache and optimistic updates.

mod key;
mod optimistic;
mod store;

pub use key::QueryKey;
pub use optimistic::OptimisticUpdate;
pub use store::{CacheSnapshot, EntryState, QueryCache, QueryOptions};
