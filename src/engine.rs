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

//! The variant-agnostic traversal loop.

use log::debug;
use log::warn;

use crate::Batch;
use crate::CursorState;
use crate::Fetcher;
use crate::ScanError;
use crate::ScanOptions;

/// Drives a scan traversal one page at a time.
///
/// The engine owns the [`CursorState`] and is the only thing that changes it.
/// It does not block, buffer or retry; the adapters
/// [`ScanIterator`](crate::ScanIterator) and [`ScanStream`](crate::ScanStream)
/// decide when to ask for the next page.
#[derive(Debug)]
pub struct ScanEngine<F> {
    fetcher: F,
    state: CursorState,
}

impl<F> ScanEngine<F>
where F: Fetcher
{
    pub fn new(fetcher: F, options: ScanOptions) -> Self {
        let state = CursorState::new(fetcher.variant(), options);
        Self { fetcher, state }
    }

    pub fn state(&self) -> &CursorState {
        &self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.is_exhausted()
    }

    /// Fetch the next page.
    ///
    /// Returns `Ok(None)` once the traversal is exhausted, without a round trip.
    /// The page that carries the end cursor is still returned as `Ok(Some(_))`;
    /// only the call after it returns `Ok(None)`.
    ///
    /// On error the state is not changed, so calling it again retries the same cursor.
    pub async fn next_batch(&mut self) -> Result<Option<Batch<F::Element>>, ScanError> {
        if self.state.is_exhausted() {
            return Ok(None);
        }

        let st = &self.state;

        let page = match self.fetcher.fetch(&st.cursor, &st.options).await {
            Ok(page) => page,
            Err(e) => {
                warn!("{} fetch failed at cursor {}: {}", st.variant, st.cursor, e);
                return Err(ScanError::fetch(st.variant, st.cursor.clone(), e));
            }
        };

        debug!(
            "{} fetched: cursor {} -> {}, {} elements",
            st.variant,
            st.cursor,
            page.cursor,
            page.values.len()
        );

        self.state.advance(page.cursor);
        Ok(Some(page.values))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::sync::Mutex;

    use super::*;
    use crate::Cursor;
    use crate::ScanPage;
    use crate::ScanStatus;
    use crate::ScanVariant;

    /// Replays a fixed list of responses and records the cursors it is called with.
    struct Scripted {
        responses: Mutex<VecDeque<Result<ScanPage<u32>, io::Error>>>,
        calls: Mutex<Vec<Cursor>>,
    }

    impl Scripted {
        fn new(responses: impl IntoIterator<Item = Result<ScanPage<u32>, io::Error>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                calls: Mutex::new(vec![]),
            }
        }

        fn calls(&self) -> Vec<Cursor> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl Fetcher for Scripted {
        type Element = u32;

        fn variant(&self) -> ScanVariant {
            ScanVariant::SetMember
        }

        async fn fetch(
            &self,
            cursor: &Cursor,
            _options: &ScanOptions,
        ) -> Result<ScanPage<u32>, io::Error> {
            self.calls.lock().unwrap().push(cursor.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected fetch")
        }
    }

    fn page(cursor: &str, values: Vec<u32>) -> Result<ScanPage<u32>, io::Error> {
        Ok(ScanPage::new(Cursor::new(cursor), values))
    }

    #[tokio::test]
    async fn test_empty_traversal_fetches_once() -> anyhow::Result<()> {
        let f = Scripted::new([page("0", vec![])]);
        let mut engine = ScanEngine::new(&f, ScanOptions::default());

        assert_eq!(engine.state().status(), ScanStatus::NotStarted);
        assert!(engine.state().cursor().is_start_end());

        assert_eq!(engine.next_batch().await?, Some(vec![]));
        assert!(engine.is_exhausted());

        assert_eq!(engine.next_batch().await?, None);
        assert_eq!(engine.next_batch().await?, None);

        assert_eq!(f.calls(), vec![Cursor::START_END]);
        Ok(())
    }

    #[tokio::test]
    async fn test_passes_returned_cursor() -> anyhow::Result<()> {
        let f = Scripted::new([
            page("5", vec![1, 2]),
            page("9", vec![]),
            page("0", vec![3]),
        ]);
        let mut engine = ScanEngine::new(&f, ScanOptions::limit(2));

        assert_eq!(engine.next_batch().await?, Some(vec![1, 2]));
        assert_eq!(engine.state().status(), ScanStatus::InProgress);
        assert_eq!(engine.state().cursor(), &Cursor::new("5"));

        assert_eq!(engine.next_batch().await?, Some(vec![]));
        assert_eq!(engine.state().status(), ScanStatus::InProgress);

        // The last page is delivered before the engine reports done.
        assert_eq!(engine.next_batch().await?, Some(vec![3]));
        assert_eq!(engine.state().status(), ScanStatus::Exhausted);
        assert_eq!(engine.next_batch().await?, None);

        assert_eq!(f.calls(), vec![
            Cursor::START_END,
            Cursor::new("5"),
            Cursor::new("9")
        ]);
        Ok(())
    }

    #[tokio::test]
    async fn test_error_keeps_cursor_for_retry() -> anyhow::Result<()> {
        let f = Scripted::new([
            page("5", vec![1]),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            page("0", vec![2]),
        ]);
        let mut engine = ScanEngine::new(&f, ScanOptions::default());

        assert_eq!(engine.next_batch().await?, Some(vec![1]));

        let err = engine.next_batch().await.unwrap_err();
        match err {
            ScanError::Fetch {
                variant,
                cursor,
                source,
            } => {
                assert_eq!(variant, ScanVariant::SetMember);
                assert_eq!(cursor, Cursor::new("5"));
                assert_eq!(source.kind(), io::ErrorKind::ConnectionReset);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(engine.state().status(), ScanStatus::InProgress);
        assert_eq!(engine.state().cursor(), &Cursor::new("5"));

        // Retry resumes from the same cursor.
        assert_eq!(engine.next_batch().await?, Some(vec![2]));
        assert_eq!(engine.next_batch().await?, None);

        assert_eq!(f.calls(), vec![
            Cursor::START_END,
            Cursor::new("5"),
            Cursor::new("5")
        ]);
        Ok(())
    }

    #[tokio::test]
    async fn test_error_on_first_fetch_stays_not_started() -> anyhow::Result<()> {
        let f = Scripted::new([
            Err(io::Error::new(io::ErrorKind::TimedOut, "timeout")),
            page("0", vec![7]),
        ]);
        let mut engine = ScanEngine::new(&f, ScanOptions::default());

        assert!(engine.next_batch().await.is_err());
        assert_eq!(engine.state().status(), ScanStatus::NotStarted);
        assert!(!engine.is_exhausted());

        assert_eq!(engine.next_batch().await?, Some(vec![7]));
        assert_eq!(engine.next_batch().await?, None);
        Ok(())
    }
}
