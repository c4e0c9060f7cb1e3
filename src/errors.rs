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

use std::io;

use crate::Cursor;
use crate::ScanVariant;

/// Errors surfaced to a scan consumer.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// A round trip failed.
    ///
    /// The traversal state is left untouched: asking for more retries `cursor`.
    #[error("{variant} failed at cursor {cursor}: {source}")]
    Fetch {
        variant: ScanVariant,
        cursor: Cursor,
        #[source]
        source: io::Error,
    },

    /// An element was asked for after the traversal has been exhausted.
    #[error("NoSuchElement: scan is exhausted")]
    NoSuchElement,
}

impl ScanError {
    pub fn fetch(variant: ScanVariant, cursor: Cursor, source: io::Error) -> Self {
        Self::Fetch {
            variant,
            cursor,
            source,
        }
    }
}

impl From<ScanError> for io::Error {
    fn from(e: ScanError) -> Self {
        let kind = match &e {
            ScanError::Fetch { source, .. } => source.kind(),
            ScanError::NoSuchElement => io::ErrorKind::UnexpectedEof,
        };
        io::Error::new(kind, e)
    }
}
