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

//! Traversal properties that hold across variants and both adapters.

use std::io;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::TryStreamExt;
use pretty_assertions::assert_eq;

use crate::impls::mem_store::MemStore;
use crate::variants::HashScan;
use crate::variants::KeyScan;
use crate::variants::SetScan;
use crate::variants::SortedSetScan;
use crate::Cursor;
use crate::FetchError;
use crate::Fetcher;
use crate::ScanEngine;
use crate::ScanError;
use crate::ScanIterator;
use crate::ScanOptions;
use crate::ScanPage;
use crate::ScanStream;
use crate::ScanVariant;
use crate::StreamState;

/// Counts round trips, and fails the `fail_on`-th one (1-based) if set.
struct Counted<F> {
    inner: F,
    calls: Arc<AtomicUsize>,
    fail_on: Option<usize>,
}

impl<F> Counted<F> {
    fn new(inner: F) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Self {
            inner,
            calls: calls.clone(),
            fail_on: None,
        };
        (c, calls)
    }

    fn failing_on(inner: F, n: usize) -> (Self, Arc<AtomicUsize>) {
        let (mut c, calls) = Self::new(inner);
        c.fail_on = Some(n);
        (c, calls)
    }
}

#[async_trait::async_trait]
impl<F> Fetcher for Counted<F>
where F: Fetcher
{
    type Element = F::Element;

    fn variant(&self) -> ScanVariant {
        self.inner.variant()
    }

    async fn fetch(
        &self,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<F::Element>, FetchError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(n) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "connection lost"));
        }
        self.inner.fetch(cursor, options).await
    }
}

const N: usize = 1000;

fn populated() -> Arc<MemStore> {
    let store = Arc::new(MemStore::default());
    for i in 0..N {
        store.set(format!("key-{i}"), "value");
        store.hset("hash", format!("field-{i}"), format!("value-{i}")).unwrap();
        store.sadd("set", format!("value-{i}")).unwrap();
        store.zadd("zset", i as f64, format!("value-{i}")).unwrap();
    }
    store
}

fn calls(c: &Arc<AtomicUsize>) -> usize {
    c.load(Ordering::SeqCst)
}

#[tokio::test]
async fn test_no_loss_with_and_without_hint() -> anyhow::Result<()> {
    let store = populated();
    // 1000 keys plus the three collections.
    let total = N + 3;

    for (opts, want_fetches) in [(ScanOptions::limit(200), 6), (ScanOptions::default(), 101)] {
        let (f, c) = Counted::new(KeyScan::new(store.clone()));
        let got = ScanStream::new(ScanEngine::new(f, opts.clone()))
            .try_collect::<Vec<_>>()
            .await?;
        assert_eq!(got.len(), total);
        assert_eq!(calls(&c), want_fetches);

        let (f, c) = Counted::new(KeyScan::new(store.clone()));
        let got = ScanIterator::new(ScanEngine::new(f, opts)).collect::<Result<Vec<_>, _>>()?;
        assert_eq!(got.len(), total);
        assert_eq!(calls(&c), want_fetches);
    }
    Ok(())
}

#[tokio::test]
async fn test_variant_uniformity() -> anyhow::Result<()> {
    let store = populated();

    for opts in [ScanOptions::limit(200), ScanOptions::default()] {
        let n = ScanStream::hscan(store.clone(), "hash", opts.clone()).count().await;
        assert_eq!(n, N);

        let n = ScanStream::sscan(store.clone(), "set", opts.clone()).count().await;
        assert_eq!(n, N);

        let n = ScanStream::zscan(store.clone(), "zset", opts.clone()).count().await;
        assert_eq!(n, N);

        let n = ScanStream::scan(store.clone(), opts.clone().with_match("key-*"))
            .count()
            .await;
        assert_eq!(n, N);
    }

    let opts = ScanOptions::limit(200);

    let got = ScanStream::scan(store.clone(), opts.clone()).take(250).try_collect::<Vec<_>>().await?;
    assert_eq!(got.len(), 250);

    let got = ScanStream::hscan(store.clone(), "hash", opts.clone())
        .take(250)
        .try_collect::<Vec<_>>()
        .await?;
    assert_eq!(got.len(), 250);

    let got = ScanStream::sscan(store.clone(), "set", opts.clone())
        .take(250)
        .try_collect::<Vec<_>>()
        .await?;
    assert_eq!(got.len(), 250);

    let got = ScanStream::zscan(store.clone(), "zset", opts.clone())
        .take(250)
        .try_collect::<Vec<_>>()
        .await?;
    assert_eq!(got.len(), 250);
    Ok(())
}

#[tokio::test]
async fn test_take_fetches_only_what_is_consumed() -> anyhow::Result<()> {
    let store = populated();

    // Push
    {
        let (f, c) = Counted::new(HashScan::new(store.clone(), "hash"));
        let strm = ScanStream::new(ScanEngine::new(f, ScanOptions::limit(200)));

        let got = strm.take(250).try_collect::<Vec<_>>().await?;
        assert_eq!(got.len(), 250);
        assert_eq!(calls(&c), 2);
    }

    // Pull
    {
        let (f, c) = Counted::new(SortedSetScan::new(store.clone(), "zset"));
        let it = ScanIterator::new(ScanEngine::new(f, ScanOptions::limit(200)));

        let got = it.take(250).collect::<Result<Vec<_>, _>>()?;
        assert_eq!(got.len(), 250);
        assert_eq!(calls(&c), 2);
    }

    // Pull, stop at a page boundary: no read ahead.
    {
        let (f, c) = Counted::new(SetScan::new(store.clone(), "set"));
        let mut it = ScanIterator::new(ScanEngine::new(f, ScanOptions::limit(200)));

        for _ in 0..200 {
            it.next_element()?;
        }
        assert_eq!(calls(&c), 1);
    }
    Ok(())
}

#[tokio::test]
async fn test_request_then_cancel() -> anyhow::Result<()> {
    let store = populated();

    let (f, c) = Counted::new(SetScan::new(store, "set"));
    let engine = ScanEngine::new(f, ScanOptions::limit(200));
    let mut strm = ScanStream::with_demand(engine, 0);

    strm.request(250);

    let mut got = vec![];
    for _ in 0..250 {
        got.push(strm.next().await.unwrap()?);
    }
    assert_eq!(got.len(), 250);
    assert_eq!(strm.demand(), 0);
    assert_eq!(calls(&c), 2);

    strm.cancel();
    assert_eq!(strm.state(), StreamState::Canceled);

    assert!(strm.next().await.is_none());
    assert_eq!(calls(&c), 2);
    Ok(())
}

#[tokio::test]
async fn test_empty_dataset_fetches_exactly_once() -> anyhow::Result<()> {
    let store = Arc::new(MemStore::default());

    let (f, c) = Counted::new(KeyScan::new(store.clone()));
    let mut strm = ScanStream::new(ScanEngine::new(f, ScanOptions::default()));
    assert!(strm.try_next().await?.is_none());
    assert_eq!(strm.state(), StreamState::Completed);
    assert_eq!(calls(&c), 1);

    let (f, c) = Counted::new(HashScan::new(store.clone(), "no-such-hash"));
    let mut it = ScanIterator::new(ScanEngine::new(f, ScanOptions::default()));
    assert!(!it.has_next()?);
    assert!(!it.has_next()?);
    assert!(matches!(it.next_element(), Err(ScanError::NoSuchElement)));
    assert_eq!(calls(&c), 1);
    Ok(())
}

/// Relies on the store returning the same order for unchanged data,
/// which [`MemStore`] does; the engine itself does not enforce it.
#[tokio::test]
async fn test_pull_and_push_see_the_same_order() -> anyhow::Result<()> {
    let store = populated();

    let pulled = ScanIterator::scan(store.clone(), ScanOptions::default())
        .collect::<Result<Vec<_>, _>>()?;
    let pushed = ScanStream::scan(store.clone(), ScanOptions::default())
        .try_collect::<Vec<_>>()
        .await?;

    assert_eq!(pulled, pushed);
    Ok(())
}

#[test]
fn test_pull_error_on_second_fetch() -> anyhow::Result<()> {
    let store = populated();

    let (f, c) = Counted::failing_on(SetScan::new(store, "set"), 2);
    let mut it = ScanIterator::new(ScanEngine::new(f, ScanOptions::limit(200)));

    for i in 0..200 {
        assert!(it.next().unwrap().is_ok(), "element {}", i);
    }
    assert_eq!(calls(&c), 1);

    // The next element needs the second fetch, which fails.
    let err = it.next().unwrap().unwrap_err();
    assert!(matches!(err, ScanError::Fetch { variant: ScanVariant::SetMember, .. }));
    assert_eq!(calls(&c), 2);

    // Asking again retries the same cursor.
    let got = it.collect::<Result<Vec<_>, _>>()?;
    assert_eq!(got.len(), N - 200);
    assert_eq!(calls(&c), 6);
    Ok(())
}

#[tokio::test]
async fn test_push_error_on_second_fetch() -> anyhow::Result<()> {
    let store = populated();

    let (f, c) = Counted::failing_on(SetScan::new(store, "set"), 2);
    let mut strm = ScanStream::new(ScanEngine::new(f, ScanOptions::limit(200)));

    for _ in 0..200 {
        assert!(strm.next().await.unwrap().is_ok());
    }

    let err = strm.next().await.unwrap().unwrap_err();
    let io_err: io::Error = err.into();
    assert_eq!(io_err.kind(), io::ErrorKind::BrokenPipe);
    assert_eq!(strm.state(), StreamState::Failed);

    // Terminal: nothing more is emitted or fetched.
    assert!(strm.next().await.is_none());
    assert_eq!(calls(&c), 2);
    Ok(())
}
