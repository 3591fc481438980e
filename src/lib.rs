//! # memo-rs: memoizing caches for Rust
//!
//! **`memo-rs`** wraps a pure, deterministic computation into a callable that
//! caches results by the canonical key of its arguments. The wrapped
//! computation runs **at most once** per distinct argument sequence over the
//! lifetime of the wrapper.
//!
//! ## Key Features
//!
//! - **Explicit canonical keys**: arguments are keyed through the [`ArgKey`][crate::key::ArgKey] trait.
//!   Equal arguments share a key; arguments differing in value, type or order never do.
//!   Keys are stored in full, so a collision can never serve a foreign result.
//! - **Failures are not cached**: a failed computation propagates its error and is retried on the next call.
//! - **Invalid arguments are rejected up front**: `NaN` floats and over-deep [`Value`][crate::value::Value]
//!   lists fail with a [`KeyError`][crate::error::KeyError] before the computation runs.
//! - **Single-flight concurrency**: [`SyncMemo`][crate::sync::SyncMemo] collapses concurrent calls with the same key into one computation.
//!
//! ## Basic Usage
//!
//! ```rust
//! use memo_rs::memo::Memo;
//!
//! // 1. Wrap the computation
//! let concat = Memo::new(|(a, b): &(&'static str, &'static str)| format!("{}{}", a, b));
//!
//! // 2. Call it; argument order is part of the key
//! assert_eq!(concat.call(("x", "y")).unwrap(), "xy");
//! assert_eq!(concat.call(("y", "x")).unwrap(), "yx");
//!
//! // 3. Repeated calls are served from the cache
//! assert_eq!(concat.call(("x", "y")).unwrap(), "xy");
//! assert_eq!(concat.hits(), 1);
//! assert_eq!(concat.misses(), 2);
//! ```
//!
//! ## Core Components
//!
//! - **[`memo`]**: the single-threaded [`Memo`][crate::memo::Memo] wrapper.
//! - **[`sync`]**: the thread-safe [`SyncMemo`][crate::sync::SyncMemo] wrapper.
//! - **[`key`]**: canonical keys for statically typed arguments.
//! - **[`value`]**: dynamically typed arguments and their canonical encoding.

pub mod cache;
pub mod config;
pub mod error;
pub mod key;
pub mod memo;
pub mod sync;
pub mod value;
