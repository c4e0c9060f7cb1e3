// Copyright 2021 Datafuse Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Scan Stream
//!
//! Incremental traversal over the cursor based scan commands of a key-value
//! store: `SCAN`, `HSCAN`, `SSCAN` and `ZSCAN`.
//!
//! Each round trip returns a page of elements and a cursor to pass to the next
//! round trip. This crate drives that loop and exposes the result either as a
//! blocking iterator or as a demand driven stream.
//!
//! ## Core Components
//!
//! - [`Fetcher`]: one round trip of one scan variant; the only thing the engine knows about the store
//! - [`ScanEngine`]: owns the [`CursorState`] and returns the next page, or `None` when done
//! - [`ScanIterator`]: synchronous, one element at a time
//! - [`ScanStream`]: asynchronous [`Stream`](futures::Stream) that fetches only against demand
//! - [`variants`]: the four [`Fetcher`] bindings over [`ScanCommands`]
//!
//! The store gives no consistency guarantee across round trips: if the data
//! changes during a traversal, elements may be missed or returned twice.
//! Nothing here tries to correct that.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::io;
//! use std::sync::Arc;
//!
//! use futures_util::TryStreamExt;
//! use scan_stream::impls::mem_store::MemStore;
//! use scan_stream::ScanIterator;
//! use scan_stream::ScanOptions;
//! use scan_stream::ScanStream;
//!
//! #[tokio::main]
//! async fn main() -> io::Result<()> {
//!     let store = Arc::new(MemStore::default());
//!     store.set("key-1", "value");
//!     store.zadd("board", 10.0, "alice")?;
//!
//!     // Pull
//!     for key in ScanIterator::scan(store.clone(), ScanOptions::limit(200)) {
//!         println!("key: {}", key?);
//!     }
//!
//!     // Push
//!     let mut strm = ScanStream::zscan(store, "board", ScanOptions::default());
//!     while let Some(sv) = strm.try_next().await? {
//!         println!("member: {}", sv);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod cursor;
pub mod engine;
pub mod errors;
pub mod fetcher;
pub mod impls;
pub mod scan_iterator;
pub mod scan_options;
pub mod scan_stream;
pub mod util;
pub mod value;
pub mod variants;

#[cfg(test)]
mod scan_test;

pub use crate::commands::ScanCommands;
pub use crate::cursor::Cursor;
pub use crate::cursor::CursorState;
pub use crate::cursor::ScanStatus;
pub use crate::cursor::ScanVariant;
pub use crate::engine::ScanEngine;
pub use crate::errors::ScanError;
pub use crate::fetcher::FetchError;
pub use crate::fetcher::Fetcher;
pub use crate::fetcher::ScanPage;
pub use crate::scan_iterator::ScanIterator;
pub use crate::scan_options::KeyType;
pub use crate::scan_options::ScanOptions;
pub use crate::scan_stream::ScanStream;
pub use crate::scan_stream::StreamState;
pub use crate::value::KeyValue;
pub use crate::value::ScoredValue;

/// A batch of elements returned by one round trip.
pub type Batch<T> = Vec<T>;
