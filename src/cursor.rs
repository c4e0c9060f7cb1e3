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

//! Continuation token and the per-traversal state built around it.

use std::borrow::Cow;
use std::fmt;

use crate::ScanOptions;

/// An opaque continuation token returned by a scan round trip.
///
/// The store defines the content. The only value the client interprets is
/// [`Cursor::START_END`], which both starts and ends a traversal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(Cow<'static, str>);

impl Cursor {
    /// The initial cursor, and the cursor a store returns when there is nothing left.
    pub const START_END: Cursor = Cursor(Cow::Borrowed("0"));

    pub fn new(token: impl Into<String>) -> Self {
        Self(Cow::Owned(token.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_start_end(&self) -> bool {
        self.as_str() == Self::START_END.as_str()
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::START_END
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The scan command family a traversal runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanVariant {
    /// `SCAN`: keys of the whole keyspace.
    Key,
    /// `HSCAN`: field-value pairs of a hash.
    HashField,
    /// `SSCAN`: members of a set.
    SetMember,
    /// `ZSCAN`: member-score pairs of a sorted set.
    SortedSet,
}

impl fmt::Display for ScanVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanVariant::Key => "SCAN",
            ScanVariant::HashField => "HSCAN",
            ScanVariant::SetMember => "SSCAN",
            ScanVariant::SortedSet => "ZSCAN",
        };
        f.write_str(name)
    }
}

/// Progress of a traversal.
///
/// The cursor alone can not tell "not started" from "finished", because both
/// are [`Cursor::START_END`]. The status carries that distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    NotStarted,
    InProgress,
    Exhausted,
}

/// Everything a traversal needs to issue its next round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorState {
    pub(crate) cursor: Cursor,
    pub(crate) variant: ScanVariant,
    pub(crate) options: ScanOptions,
    pub(crate) status: ScanStatus,
}

impl CursorState {
    pub fn new(variant: ScanVariant, options: ScanOptions) -> Self {
        Self {
            cursor: Cursor::START_END,
            variant,
            options,
            status: ScanStatus::NotStarted,
        }
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn variant(&self) -> ScanVariant {
        self.variant
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }

    pub fn is_exhausted(&self) -> bool {
        self.status == ScanStatus::Exhausted
    }

    /// Record the cursor returned by a completed round trip.
    ///
    /// Receiving [`Cursor::START_END`] here always means the end: the first
    /// round trip has happened by the time this is called.
    pub(crate) fn advance(&mut self, next: Cursor) {
        self.status = if next.is_start_end() {
            ScanStatus::Exhausted
        } else {
            ScanStatus::InProgress
        };
        self.cursor = next;
    }
}
