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

//! Defines the capability of fetching one page of a scan.
//!
//! [`Fetcher`] is the only thing [`ScanEngine`](crate::ScanEngine) knows about
//! the store. Each scan variant provides its own implementation; see
//! [`variants`](crate::variants).

use std::io;
use std::sync::Arc;

use crate::Cursor;
use crate::ScanOptions;
use crate::ScanVariant;

/// Error of a single round trip: transport, protocol or timeout failure.
pub type FetchError = io::Error;

/// One page returned by a scan round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPage<T> {
    /// Cursor for the next round trip. [`Cursor::START_END`] if there is nothing left.
    pub cursor: Cursor,

    /// Elements in this page. Possibly empty even if `cursor` is not the end.
    pub values: Vec<T>,
}

impl<T> ScanPage<T> {
    pub fn new(cursor: Cursor, values: Vec<T>) -> Self {
        Self { cursor, values }
    }

    /// The last page of a traversal.
    pub fn last(values: Vec<T>) -> Self {
        Self::new(Cursor::START_END, values)
    }
}

/// Executes one round trip of a scan variant.
///
/// An implementation must issue exactly one request per call and must not
/// retry on its own: a failure is returned to the engine as is.
///
/// # Examples
///
/// ```rust
/// use std::io;
///
/// use scan_stream::Cursor;
/// use scan_stream::Fetcher;
/// use scan_stream::ScanOptions;
/// use scan_stream::ScanPage;
/// use scan_stream::ScanVariant;
///
/// /// Two pages of numbers.
/// struct TwoPages;
///
/// #[async_trait::async_trait]
/// impl Fetcher for TwoPages {
///     type Element = u64;
///
///     fn variant(&self) -> ScanVariant {
///         ScanVariant::Key
///     }
///
///     async fn fetch(&self, cursor: &Cursor, _: &ScanOptions) -> Result<ScanPage<u64>, io::Error> {
///         if cursor.is_start_end() {
///             Ok(ScanPage::new(Cursor::new("1"), vec![1, 2]))
///         } else {
///             Ok(ScanPage::last(vec![3]))
///         }
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// The element shape this variant yields.
    type Element: Send + 'static;

    /// The scan command this fetcher issues.
    fn variant(&self) -> ScanVariant;

    /// Fetch the page that starts at `cursor`.
    async fn fetch(
        &self,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<Self::Element>, FetchError>;
}

#[async_trait::async_trait]
impl<T> Fetcher for &T
where T: Fetcher + ?Sized
{
    type Element = T::Element;

    fn variant(&self) -> ScanVariant {
        (**self).variant()
    }

    async fn fetch(
        &self,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<Self::Element>, FetchError> {
        (**self).fetch(cursor, options).await
    }
}

#[async_trait::async_trait]
impl<T> Fetcher for Arc<T>
where T: Fetcher + ?Sized
{
    type Element = T::Element;

    fn variant(&self) -> ScanVariant {
        (**self).variant()
    }

    async fn fetch(
        &self,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<Self::Element>, FetchError> {
        (**self).fetch(cursor, options).await
    }
}
