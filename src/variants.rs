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

//! Binds each scan command to a [`Fetcher`].
//!
//! Adding a scan variant means adding a binding here and nothing else: the
//! engine and both adapters only depend on [`Fetcher`].

use crate::commands::ScanCommands;
use crate::Cursor;
use crate::FetchError;
use crate::Fetcher;
use crate::KeyValue;
use crate::ScanOptions;
use crate::ScanPage;
use crate::ScanVariant;
use crate::ScoredValue;

/// Keys of the whole keyspace, via `SCAN`.
#[derive(Debug, Clone)]
pub struct KeyScan<C> {
    commands: C,
}

impl<C> KeyScan<C> {
    pub fn new(commands: C) -> Self {
        Self { commands }
    }
}

#[async_trait::async_trait]
impl<C> Fetcher for KeyScan<C>
where C: ScanCommands
{
    type Element = String;

    fn variant(&self) -> ScanVariant {
        ScanVariant::Key
    }

    async fn fetch(
        &self,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<String>, FetchError> {
        self.commands.scan(cursor, options).await
    }
}

/// Field-value pairs of the hash at `key`, via `HSCAN`.
#[derive(Debug, Clone)]
pub struct HashScan<C> {
    commands: C,
    key: String,
}

impl<C> HashScan<C> {
    pub fn new(commands: C, key: impl ToString) -> Self {
        Self {
            commands,
            key: key.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl<C> Fetcher for HashScan<C>
where C: ScanCommands
{
    type Element = KeyValue;

    fn variant(&self) -> ScanVariant {
        ScanVariant::HashField
    }

    async fn fetch(
        &self,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<KeyValue>, FetchError> {
        self.commands.hscan(&self.key, cursor, options).await
    }
}

/// Members of the set at `key`, via `SSCAN`.
#[derive(Debug, Clone)]
pub struct SetScan<C> {
    commands: C,
    key: String,
}

impl<C> SetScan<C> {
    pub fn new(commands: C, key: impl ToString) -> Self {
        Self {
            commands,
            key: key.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl<C> Fetcher for SetScan<C>
where C: ScanCommands
{
    type Element = String;

    fn variant(&self) -> ScanVariant {
        ScanVariant::SetMember
    }

    async fn fetch(
        &self,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<String>, FetchError> {
        self.commands.sscan(&self.key, cursor, options).await
    }
}

/// Member-score pairs of the sorted set at `key`, via `ZSCAN`.
#[derive(Debug, Clone)]
pub struct SortedSetScan<C> {
    commands: C,
    key: String,
}

impl<C> SortedSetScan<C> {
    pub fn new(commands: C, key: impl ToString) -> Self {
        Self {
            commands,
            key: key.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl<C> Fetcher for SortedSetScan<C>
where C: ScanCommands
{
    type Element = ScoredValue;

    fn variant(&self) -> ScanVariant {
        ScanVariant::SortedSet
    }

    async fn fetch(
        &self,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<ScoredValue>, FetchError> {
        self.commands.zscan(&self.key, cursor, options).await
    }
}
