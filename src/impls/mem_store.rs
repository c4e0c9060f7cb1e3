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

//! Provides a simple in-memory implementation of the scan commands.
//!
//! [`MemStore`] keeps its keyspace in a [`BTreeMap`] and pages through it
//! with store style cursors. It's primarily intended for testing and
//! demonstration purposes.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use log::warn;

use crate::commands::ScanCommands;
use crate::util::glob_match;
use crate::Cursor;
use crate::KeyType;
use crate::KeyValue;
use crate::ScanOptions;
use crate::ScanPage;
use crate::ScoredValue;

/// Entries examined per round trip if no `COUNT` is given.
pub const DEFAULT_COUNT: u64 = 10;

/// A value stored under a top level key.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    String(String),
    Hash(BTreeMap<String, String>),
    Set(BTreeSet<String>),
    ZSet(BTreeMap<String, f64>),
}

impl Entry {
    pub fn key_type(&self) -> KeyType {
        match self {
            Entry::String(_) => KeyType::String,
            Entry::Hash(_) => KeyType::Hash,
            Entry::Set(_) => KeyType::Set,
            Entry::ZSet(_) => KeyType::ZSet,
        }
    }
}

/// An in-memory keyspace that answers `SCAN`, `HSCAN`, `SSCAN` and `ZSCAN`.
///
/// The cursor is the offset of the next entry to examine, in key order.
/// `COUNT` bounds the number of entries *examined* per round trip, so a page
/// filtered by `MATCH` or `TYPE` may be empty although the traversal is not
/// finished. Entries added or removed during a traversal may be skipped or
/// returned twice, as with a real store.
///
/// # Examples
///
/// ```
/// use std::io;
///
/// use scan_stream::impls::mem_store::MemStore;
/// use scan_stream::ScanIterator;
/// use scan_stream::ScanOptions;
///
/// fn main() -> io::Result<()> {
///     let store = MemStore::default();
///     store.hset("user:1", "name", "alice")?;
///     store.hset("user:1", "city", "paris")?;
///
///     for kv in ScanIterator::hscan(&store, "user:1", ScanOptions::default()) {
///         let kv = kv?;
///         println!("{}", kv);
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug, Default)]
pub struct MemStore {
    data: Mutex<BTreeMap<String, Entry>>,
}

impl MemStore {
    fn data(&self) -> MutexGuard<'_, BTreeMap<String, Entry>> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of top level keys.
    pub fn len(&self) -> usize {
        self.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set a string value, replacing whatever is stored at `key`.
    pub fn set(&self, key: impl ToString, value: impl ToString) {
        self.data()
            .insert(key.to_string(), Entry::String(value.to_string()));
    }

    /// Remove a key, returns whether it existed.
    pub fn del(&self, key: &str) -> bool {
        self.data().remove(key).is_some()
    }

    /// Set a hash field, returns `true` if the field is new.
    pub fn hset(
        &self,
        key: impl ToString,
        field: impl ToString,
        value: impl ToString,
    ) -> Result<bool, io::Error> {
        let mut data = self.data();
        let key = key.to_string();
        let entry = data
            .entry(key.clone())
            .or_insert_with(|| Entry::Hash(BTreeMap::new()));

        match entry {
            Entry::Hash(h) => Ok(h.insert(field.to_string(), value.to_string()).is_none()),
            other => Err(wrong_type(&key, other)),
        }
    }

    /// Add a set member, returns `true` if the member is new.
    pub fn sadd(&self, key: impl ToString, member: impl ToString) -> Result<bool, io::Error> {
        let mut data = self.data();
        let key = key.to_string();
        let entry = data
            .entry(key.clone())
            .or_insert_with(|| Entry::Set(BTreeSet::new()));

        match entry {
            Entry::Set(s) => Ok(s.insert(member.to_string())),
            other => Err(wrong_type(&key, other)),
        }
    }

    /// Add or update a sorted set member, returns `true` if the member is new.
    pub fn zadd(
        &self,
        key: impl ToString,
        score: f64,
        member: impl ToString,
    ) -> Result<bool, io::Error> {
        let mut data = self.data();
        let key = key.to_string();
        let entry = data
            .entry(key.clone())
            .or_insert_with(|| Entry::ZSet(BTreeMap::new()));

        match entry {
            Entry::ZSet(z) => Ok(z.insert(member.to_string(), score).is_none()),
            other => Err(wrong_type(&key, other)),
        }
    }
}

#[async_trait::async_trait]
impl ScanCommands for MemStore {
    async fn scan(
        &self,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<String>, io::Error> {
        let data = self.data();

        paginate(
            data.iter(),
            cursor,
            options,
            |(k, v)| {
                options.key_type.map_or(true, |want| want == v.key_type()) && is_match(options, k)
            },
            |(k, _)| k.clone(),
        )
    }

    async fn hscan(
        &self,
        key: &str,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<KeyValue>, io::Error> {
        let data = self.data();

        match data.get(key) {
            None => no_such_key(cursor),
            Some(Entry::Hash(h)) => paginate(
                h.iter(),
                cursor,
                options,
                |(f, _)| is_match(options, f),
                |(f, v)| KeyValue::new(f, v),
            ),
            Some(other) => Err(wrong_type(key, other)),
        }
    }

    async fn sscan(
        &self,
        key: &str,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<String>, io::Error> {
        let data = self.data();

        match data.get(key) {
            None => no_such_key(cursor),
            Some(Entry::Set(members)) => paginate(
                members.iter(),
                cursor,
                options,
                |m| is_match(options, m),
                |m| m.clone(),
            ),
            Some(other) => Err(wrong_type(key, other)),
        }
    }

    async fn zscan(
        &self,
        key: &str,
        cursor: &Cursor,
        options: &ScanOptions,
    ) -> Result<ScanPage<ScoredValue>, io::Error> {
        let data = self.data();

        match data.get(key) {
            None => no_such_key(cursor),
            Some(Entry::ZSet(z)) => paginate(
                z.iter(),
                cursor,
                options,
                |(m, _)| is_match(options, m),
                |(m, score)| ScoredValue::new(*score, m),
            ),
            Some(other) => Err(wrong_type(key, other)),
        }
    }
}

fn is_match(options: &ScanOptions, s: &str) -> bool {
    match &options.match_pattern {
        None => true,
        Some(p) => glob_match(p.as_bytes(), s.as_bytes()),
    }
}

fn parse_cursor(cursor: &Cursor) -> Result<usize, io::Error> {
    cursor.as_str().parse::<usize>().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("ERR invalid cursor '{}': {}", cursor, e),
        )
    })
}

/// A missing key is scanned as an empty collection.
fn no_such_key<T>(cursor: &Cursor) -> Result<ScanPage<T>, io::Error> {
    parse_cursor(cursor)?;
    Ok(ScanPage::last(vec![]))
}

/// Examine up to `COUNT` items starting at `cursor`, and convert those accepted by `filter`.
///
/// Runs under the store lock. Only the examined window is copied out.
fn paginate<I, T>(
    items: I,
    cursor: &Cursor,
    options: &ScanOptions,
    filter: impl Fn(&I::Item) -> bool,
    to_owned: impl Fn(I::Item) -> T,
) -> Result<ScanPage<T>, io::Error>
where
    I: ExactSizeIterator,
{
    let start = parse_cursor(cursor)?;

    let count = options.count.map_or(DEFAULT_COUNT, |c| c.get());
    let count = usize::try_from(count).unwrap_or(usize::MAX);

    let total = items.len();
    if start >= total {
        if start > total {
            warn!("MemStore: cursor {} is beyond the end {}, data shrank", start, total);
        }
        return Ok(ScanPage::last(vec![]));
    }

    let end = start.saturating_add(count).min(total);
    let values = items
        .skip(start)
        .take(end - start)
        .filter(|x| filter(x))
        .map(to_owned)
        .collect();

    let next = if end == total {
        Cursor::START_END
    } else {
        Cursor::new(end.to_string())
    };

    Ok(ScanPage::new(next, values))
}

fn wrong_type(key: &str, entry: &Entry) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!(
            "WRONGTYPE Operation against a key holding the wrong kind of value: {} is a {}",
            key,
            entry.key_type()
        ),
    )
}
