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

//! Asynchronous, demand driven consumption of a scan.
//!
//! [`ScanStream`] is a [`Stream`] that only fetches when it has been asked
//! for elements it does not have buffered. Demand is expressed in two ways:
//!
//! - Polling: a stream created with [`ScanStream::new`] has unbounded demand,
//!   so it behaves like any other stream and stops fetching as soon as the
//!   consumer stops polling, e.g., after `take(n)`.
//! - Explicit: a stream created with [`ScanStream::with_demand`] emits at most
//!   as many elements as were granted with [`ScanStream::request`], and stays
//!   pending otherwise. The end of the scan is signaled even when no demand
//!   is left.

use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;
use std::task::Waker;

use futures::stream::FusedStream;
use futures::Stream;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use log::debug;
use log::warn;

use crate::commands::ScanCommands;
use crate::variants::HashScan;
use crate::variants::KeyScan;
use crate::variants::SetScan;
use crate::variants::SortedSetScan;
use crate::Batch;
use crate::Fetcher;
use crate::ScanEngine;
use crate::ScanError;
use crate::ScanOptions;

/// Demand value meaning "no limit".
pub const UNBOUNDED: u64 = u64::MAX;

/// Lifecycle of a [`ScanStream`]. Every state but `Active` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Active,
    /// All elements have been emitted and the end of the stream was signaled.
    Completed,
    /// A fetch failed and the error was emitted.
    Failed,
    /// The consumer canceled the stream.
    Canceled,
}

type FetchResult<F> = (ScanEngine<F>, Result<Option<Batch<<F as Fetcher>::Element>>, ScanError>);

/// Where the engine is: available, or moved into the one fetch in flight.
enum Fetching<F>
where F: Fetcher + 'static
{
    Idle(ScanEngine<F>),
    InFlight(BoxFuture<'static, FetchResult<F>>),
    Dropped,
}

/// A demand driven stream of scan elements.
///
/// At most one fetch is in flight at any time, and a fetch is issued only
/// when the buffer is empty and there is outstanding demand. A fetch error is
/// emitted once as `Err` and terminates the stream. The end of the stream is
/// signaled once, after the last buffered element.
///
/// ```rust
/// use std::sync::Arc;
///
/// use futures_util::StreamExt;
/// use scan_stream::impls::mem_store::MemStore;
/// use scan_stream::ScanOptions;
/// use scan_stream::ScanStream;
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = Arc::new(MemStore::default());
/// for i in 0..100 {
///     store.sadd("s", format!("m-{i}")).unwrap();
/// }
///
/// let strm = ScanStream::sscan(store, "s", ScanOptions::limit(20));
/// let got = strm.take(30).collect::<Vec<_>>().await;
/// assert_eq!(got.len(), 30);
/// # }
/// ```
pub struct ScanStream<F>
where F: Fetcher + 'static
{
    fetching: Fetching<F>,
    buffer: VecDeque<F::Element>,
    demand: u64,
    state: StreamState,
    waker: Option<Waker>,
}

// The fields are never pinned structurally: the in-flight future is boxed.
impl<F> Unpin for ScanStream<F> where F: Fetcher + 'static {}

impl<F> ScanStream<F>
where F: Fetcher + 'static
{
    /// Create a stream with unbounded demand.
    pub fn new(engine: ScanEngine<F>) -> Self {
        Self::with_demand(engine, UNBOUNDED)
    }

    /// Create a stream that emits nothing beyond `demand` until more is requested.
    pub fn with_demand(engine: ScanEngine<F>, demand: u64) -> Self {
        Self {
            fetching: Fetching::Idle(engine),
            buffer: VecDeque::new(),
            demand,
            state: StreamState::Active,
            waker: None,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Elements the consumer has granted but not yet received.
    pub fn demand(&self) -> u64 {
        self.demand
    }

    /// Whether a fetch has been issued and has not yet been resolved.
    pub fn is_fetching(&self) -> bool {
        matches!(self.fetching, Fetching::InFlight(_))
    }

    /// Grant `n` more elements. Demand saturates at [`UNBOUNDED`].
    pub fn request(&mut self, n: u64) {
        if n == 0 {
            warn!("ScanStream::request(0) is ignored");
            return;
        }
        if self.state != StreamState::Active {
            return;
        }

        self.demand = self.demand.saturating_add(n);
        if let Some(w) = self.waker.take() {
            w.wake();
        }
    }

    /// Stop the stream.
    ///
    /// Buffered elements are dropped, a fetch in flight is abandoned and its
    /// result discarded, and no further fetch is issued. The stream then ends
    /// without an error.
    pub fn cancel(&mut self) {
        if self.state != StreamState::Active {
            return;
        }

        debug!(
            "ScanStream canceled: {} buffered elements dropped, fetch in flight: {}",
            self.buffer.len(),
            self.is_fetching()
        );

        self.state = StreamState::Canceled;
        self.buffer.clear();
        self.fetching = Fetching::Dropped;
        if let Some(w) = self.waker.take() {
            w.wake();
        }
    }

    fn take_one(&mut self) -> Option<F::Element> {
        let v = self.buffer.pop_front()?;
        if self.demand != UNBOUNDED {
            self.demand -= 1;
        }
        Some(v)
    }

    fn complete(&mut self) -> Poll<Option<Result<F::Element, ScanError>>> {
        debug!("ScanStream completed");
        self.state = StreamState::Completed;
        Poll::Ready(None)
    }
}

impl<F> Stream for ScanStream<F>
where F: Fetcher + 'static
{
    type Item = Result<F::Element, ScanError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if this.state != StreamState::Active {
                return Poll::Ready(None);
            }

            // Completion is signaled without demand.
            if this.buffer.is_empty() {
                if let Fetching::Idle(engine) = &this.fetching {
                    if engine.is_exhausted() {
                        return this.complete();
                    }
                }
            }

            if this.demand == 0 {
                this.waker = Some(cx.waker().clone());
                return Poll::Pending;
            }

            if let Some(v) = this.take_one() {
                return Poll::Ready(Some(Ok(v)));
            }

            // Buffer is drained and there is demand: poll the fetch in flight or issue one.
            let mut fu = match std::mem::replace(&mut this.fetching, Fetching::Dropped) {
                Fetching::InFlight(fu) => fu,
                Fetching::Idle(mut engine) => {
                    if engine.is_exhausted() {
                        this.fetching = Fetching::Idle(engine);
                        return this.complete();
                    }
                    async move {
                        let res = engine.next_batch().await;
                        (engine, res)
                    }
                    .boxed()
                }
                Fetching::Dropped => return Poll::Ready(None),
            };

            let (engine, res) = match fu.poll_unpin(cx) {
                Poll::Ready(x) => x,
                Poll::Pending => {
                    this.fetching = Fetching::InFlight(fu);
                    return Poll::Pending;
                }
            };
            this.fetching = Fetching::Idle(engine);

            match res {
                Ok(Some(batch)) => this.buffer.extend(batch),
                Ok(None) => return this.complete(),
                Err(e) => {
                    debug!("ScanStream failed: {}", e);
                    this.state = StreamState::Failed;
                    this.buffer.clear();
                    return Poll::Ready(Some(Err(e)));
                }
            }
        }
    }
}

impl<F> FusedStream for ScanStream<F>
where F: Fetcher + 'static
{
    fn is_terminated(&self) -> bool {
        self.state != StreamState::Active
    }
}

impl<F> fmt::Debug for ScanStream<F>
where F: Fetcher + 'static
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanStream")
            .field("state", &self.state)
            .field("demand", &self.demand)
            .field("buffered", &self.buffer.len())
            .field("fetching", &self.is_fetching())
            .finish()
    }
}

impl<C> ScanStream<KeyScan<C>>
where C: ScanCommands + 'static
{
    /// Stream the keys of the keyspace.
    pub fn scan(commands: C, options: ScanOptions) -> Self {
        Self::new(ScanEngine::new(KeyScan::new(commands), options))
    }
}

impl<C> ScanStream<HashScan<C>>
where C: ScanCommands + 'static
{
    /// Stream the field-value pairs of a hash.
    pub fn hscan(commands: C, key: impl ToString, options: ScanOptions) -> Self {
        Self::new(ScanEngine::new(HashScan::new(commands, key), options))
    }
}

impl<C> ScanStream<SetScan<C>>
where C: ScanCommands + 'static
{
    /// Stream the members of a set.
    pub fn sscan(commands: C, key: impl ToString, options: ScanOptions) -> Self {
        Self::new(ScanEngine::new(SetScan::new(commands, key), options))
    }
}

impl<C> ScanStream<SortedSetScan<C>>
where C: ScanCommands + 'static
{
    /// Stream the member-score pairs of a sorted set.
    pub fn zscan(commands: C, key: impl ToString, options: ScanOptions) -> Self {
        Self::new(ScanEngine::new(SortedSetScan::new(commands, key), options))
    }
}
