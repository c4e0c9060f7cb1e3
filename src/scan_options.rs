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

//! Per-traversal options passed along with every round trip.

use std::fmt;
use std::num::NonZeroU64;

use log::warn;

/// Type of a top level entry in the keyspace, used as the `TYPE` filter of `SCAN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    String,
    Hash,
    Set,
    ZSet,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyType::String => "string",
            KeyType::Hash => "hash",
            KeyType::Set => "set",
            KeyType::ZSet => "zset",
        };
        f.write_str(name)
    }
}

/// Options of a scan traversal.
///
/// All fields are optional. They are forwarded verbatim to the store on every
/// round trip and never interpreted by the engine.
///
/// ```
/// use scan_stream::KeyType;
/// use scan_stream::ScanOptions;
///
/// let opts = ScanOptions::limit(200).with_match("user:*").with_type(KeyType::Hash);
/// assert_eq!(opts.count.map(|c| c.get()), Some(200));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Glob style pattern an element must match, `MATCH`.
    pub match_pattern: Option<String>,

    /// Advisory number of entries to examine per round trip, `COUNT`.
    ///
    /// The store may return more or fewer elements than this.
    pub count: Option<NonZeroU64>,

    /// Element type filter, `TYPE`. Which variants honor it is up to the store.
    pub key_type: Option<KeyType>,
}

impl ScanOptions {
    /// Options with only a batch size hint.
    pub fn limit(count: u64) -> Self {
        Self::default().with_count(count)
    }

    pub fn with_match(mut self, pattern: impl ToString) -> Self {
        self.match_pattern = Some(pattern.to_string());
        self
    }

    /// Set the batch size hint. A hint of 0 is ignored and the store default is used.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = NonZeroU64::new(count);
        if self.count.is_none() {
            warn!("ScanOptions: ignore batch size hint 0, use store default");
        }
        self
    }

    pub fn with_type(mut self, key_type: KeyType) -> Self {
        self.key_type = Some(key_type);
        self
    }
}
