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

//! Utility functions for the scan API.

/// Match `s` against a glob style `MATCH` pattern.
///
/// Supported syntax:
/// - `*` matches any sequence, including an empty one;
/// - `?` matches one byte;
/// - `[abc]`, `[^abc]`, `[a-z]` match one byte in, or not in, a set;
/// - `\x` matches `x` literally.
///
/// An unterminated `[` matches as if it were closed at the end of the pattern.
pub fn glob_match(pattern: &[u8], s: &[u8]) -> bool {
    let mut p = 0;
    let mut t = 0;

    // Position after the last `*` seen, and where in `s` it currently resumes.
    let mut star: Option<(usize, usize)> = None;

    while t < s.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            p += 1;
            star = Some((p, t));
            continue;
        }

        if p < pattern.len() {
            if let Some(next) = match_token(pattern, p, s[t]) {
                p = next;
                t += 1;
                continue;
            }
        }

        // Mismatch: let the last `*` absorb one more byte.
        match star {
            Some((sp, st)) => {
                p = sp;
                t = st + 1;
                star = Some((sp, t));
            }
            None => return false,
        }
    }

    pattern[p..].iter().all(|&x| x == b'*')
}

/// Match byte `c` against the single-byte token at `pattern[p]`.
///
/// Returns the position of the next token if it matches.
fn match_token(pattern: &[u8], p: usize, c: u8) -> Option<usize> {
    match pattern[p] {
        b'?' => Some(p + 1),
        b'[' => match_class(pattern, p + 1, c),
        b'\\' if p + 1 < pattern.len() => (pattern[p + 1] == c).then_some(p + 2),
        x => (x == c).then_some(p + 1),
    }
}

/// Match `c` against a `[...]` class whose body starts at `pattern[p]`.
fn match_class(pattern: &[u8], mut p: usize, c: u8) -> Option<usize> {
    let negate = p < pattern.len() && pattern[p] == b'^';
    if negate {
        p += 1;
    }

    let mut matched = false;
    while p < pattern.len() {
        let x = pattern[p];
        if x == b'\\' && p + 1 < pattern.len() {
            p += 1;
            matched |= pattern[p] == c;
        } else if x == b']' {
            break;
        } else if p + 2 < pattern.len() && pattern[p + 1] == b'-' {
            let (lo, hi) = (x.min(pattern[p + 2]), x.max(pattern[p + 2]));
            matched |= lo <= c && c <= hi;
            p += 2;
        } else {
            matched |= x == c;
        }
        p += 1;
    }

    // `p` is at the closing `]`, or at the end of an unterminated class.
    (matched != negate).then_some((p + 1).min(pattern.len()))
}
