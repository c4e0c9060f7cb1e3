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

//! Defines the scan command family of a key-value store.
//!
//! [`ScanCommands`] is what a client connection provides. The variant bindings
//! in [`variants`](crate::variants) turn each command into a
//! [`Fetcher`](crate::Fetcher).

use std::io;
use std::sync::Arc;

use crate::Cursor;
use crate::KeyValue;
use crate::ScanOptions;
use crate::ScanPage;
use crate::ScoredValue;

/// The four cursor based scan commands.
///
/// Each call is one round trip. Connection handling, encoding and timeouts
/// belong to the implementation; any failure is reported as an [`io::Error`].
#[async_trait::async_trait]
pub trait ScanCommands: Send + Sync {
    /// `SCAN cursor [MATCH pattern] [COUNT count] [TYPE type]`
    async fn scan(
        &self,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<String>, io::Error>;

    /// `HSCAN key cursor [MATCH pattern] [COUNT count]`
    async fn hscan(
        &self,
        key: &str,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<KeyValue>, io::Error>;

    /// `SSCAN key cursor [MATCH pattern] [COUNT count]`
    async fn sscan(
        &self,
        key: &str,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<String>, io::Error>;

    /// `ZSCAN key cursor [MATCH pattern] [COUNT count]`
    async fn zscan(
        &self,
        key: &str,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<ScoredValue>, io::Error>;
}

#[async_trait::async_trait]
impl<T> ScanCommands for &T
where T: ScanCommands + ?Sized
{
    async fn scan(
        &self,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<String>, io::Error> {
        (**self).scan(cursor, options).await
    }

    async fn hscan(
        &self,
        key: &str,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<KeyValue>, io::Error> {
        (**self).hscan(key, cursor, options).await
    }

    async fn sscan(
        &self,
        key: &str,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<String>, io::Error> {
        (**self).sscan(key, cursor, options).await
    }

    async fn zscan(
        &self,
        key: &str,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<ScoredValue>, io::Error> {
        (**self).zscan(key, cursor, options).await
    }
}

#[async_trait::async_trait]
impl<T> ScanCommands for Arc<T>
where T: ScanCommands + ?Sized
{
    async fn scan(
        &self,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<String>, io::Error> {
        (**self).scan(cursor, options).await
    }

    async fn hscan(
        &self,
        key: &str,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<KeyValue>, io::Error> {
        (**self).hscan(key, cursor, options).await
    }

    async fn sscan(
        &self,
        key: &str,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<String>, io::Error> {
        (**self).sscan(key, cursor, options).await
    }

    async fn zscan(
        &self,
        key: &str,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<ScoredValue>, io::Error> {
        (**self).zscan(key, cursor, options).await
    }
}
