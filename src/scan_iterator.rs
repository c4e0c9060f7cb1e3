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

//! Synchronous, pull based consumption of a scan.

use std::collections::VecDeque;

use futures::executor::block_on;

use crate::commands::ScanCommands;
use crate::variants::HashScan;
use crate::variants::KeyScan;
use crate::variants::SetScan;
use crate::variants::SortedSetScan;
use crate::Fetcher;
use crate::ScanEngine;
use crate::ScanError;
use crate::ScanOptions;

/// Iterates over the elements of a scan, fetching the next page only when
/// the current one is drained.
///
/// A fetch blocks the calling thread. The fetch future is driven by
/// [`block_on`], so it must not depend on being polled by the runtime of the
/// calling thread; use [`ScanStream`](crate::ScanStream) from async code.
///
/// As an [`Iterator`] it yields `Err` when a fetch fails; calling `next()`
/// again retries the same cursor.
///
/// ```rust
/// use std::sync::Arc;
///
/// use scan_stream::impls::mem_store::MemStore;
/// use scan_stream::ScanIterator;
/// use scan_stream::ScanOptions;
///
/// let store = Arc::new(MemStore::default());
/// store.set("a", "1");
/// store.set("b", "2");
///
/// let keys = ScanIterator::scan(store, ScanOptions::default())
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
/// ```
#[derive(Debug)]
pub struct ScanIterator<F>
where F: Fetcher
{
    engine: ScanEngine<F>,
    buffer: VecDeque<F::Element>,
}

impl<F> ScanIterator<F>
where F: Fetcher
{
    pub fn new(engine: ScanEngine<F>) -> Self {
        Self {
            engine,
            buffer: VecDeque::new(),
        }
    }

    pub fn engine(&self) -> &ScanEngine<F> {
        &self.engine
    }

    /// Whether another element is available, fetching if the buffer is drained.
    ///
    /// Returns `false` only when the buffer is empty and the engine is exhausted.
    pub fn has_next(&mut self) -> Result<bool, ScanError> {
        while self.buffer.is_empty() {
            match block_on(self.engine.next_batch())? {
                Some(batch) => self.buffer.extend(batch),
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Return the next element, or [`ScanError::NoSuchElement`] if there is none.
    pub fn next_element(&mut self) -> Result<F::Element, ScanError> {
        if !self.has_next()? {
            return Err(ScanError::NoSuchElement);
        }
        self.buffer.pop_front().ok_or(ScanError::NoSuchElement)
    }
}

impl<F> Iterator for ScanIterator<F>
where F: Fetcher
{
    type Item = Result<F::Element, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.has_next() {
            Ok(true) => self.buffer.pop_front().map(Ok),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl<C> ScanIterator<KeyScan<C>>
where C: ScanCommands
{
    /// Iterate over the keys of the keyspace.
    pub fn scan(commands: C, options: ScanOptions) -> Self {
        Self::new(ScanEngine::new(KeyScan::new(commands), options))
    }
}

impl<C> ScanIterator<HashScan<C>>
where C: ScanCommands
{
    /// Iterate over the field-value pairs of a hash.
    pub fn hscan(commands: C, key: impl ToString, options: ScanOptions) -> Self {
        Self::new(ScanEngine::new(HashScan::new(commands, key), options))
    }
}

impl<C> ScanIterator<SetScan<C>>
where C: ScanCommands
{
    /// Iterate over the members of a set.
    pub fn sscan(commands: C, key: impl ToString, options: ScanOptions) -> Self {
        Self::new(ScanEngine::new(SetScan::new(commands, key), options))
    }
}

impl<C> ScanIterator<SortedSetScan<C>>
where C: ScanCommands
{
    /// Iterate over the member-score pairs of a sorted set.
    pub fn zscan(commands: C, key: impl ToString, options: ScanOptions) -> Self {
        Self::new(ScanEngine::new(SortedSetScan::new(commands, key), options))
    }
}
