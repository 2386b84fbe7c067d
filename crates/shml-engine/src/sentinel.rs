//! Reserved marker code points.
//!
//! Placeholders are delimited by Unicode noncharacters: code points the
//! standard reserves for internal use and which never appear in interchanged
//! text. [`SentinelPool`] hands them out in a fixed order and detects input
//! that already contains one; [`Sentinels`] holds the markers drawn for one
//! engine.

use std::ops::Range;

use crate::error::EngineError;
use crate::fingerprint::Fingerprint;
use crate::rule::Scope;

/// Number of markers backing the hexadecimal digit encoding.
const DIGIT_COUNT: usize = 16;

/// Whether `c` is a Unicode noncharacter.
///
/// Noncharacters are `U+FDD0..=U+FDEF` plus the last two code points of every
/// plane (`U+xxFFFE` and `U+xxFFFF`).
pub fn is_noncharacter(c: char) -> bool {
    let cp = u32::from(c);
    (0xFDD0..=0xFDEF).contains(&cp) || cp & 0xFFFE == 0xFFFE
}

/// Finite, ordered supply of reserved markers.
#[derive(Clone, Debug)]
pub struct SentinelPool {
    /// Markers in draw order.
    universe: Vec<char>,
    /// Sorted copy of `universe` for membership tests.
    lookup: Vec<char>,
    /// Index of the next marker to hand out.
    cursor: usize,
}

impl SentinelPool {
    /// Pool of all 66 Unicode noncharacters.
    ///
    /// Plane-final pairs come first (`U+FFFE`, `U+FFFF`, `U+1FFFE`, ...),
    /// followed by the `U+FDD0..=U+FDEF` block.
    pub fn new() -> Self {
        let plane_final = (0..=16u32).flat_map(|plane| {
            let base = 0x10000 * plane;
            [base + 0xFFFE, base + 0xFFFF]
        });
        let universe = plane_final
            .chain(0xFDD0..=0xFDEF)
            .filter_map(char::from_u32)
            .collect();
        Self::from_markers(universe)
    }

    /// Pool over a caller-chosen marker list, drawn in the given order.
    ///
    /// Input is considered contaminated if it contains any of these markers.
    pub fn from_markers(markers: Vec<char>) -> Self {
        let mut lookup = markers.clone();
        lookup.sort_unstable();
        lookup.dedup();
        Self {
            universe: markers,
            lookup,
            cursor: 0,
        }
    }

    /// Hand out the next unused marker.
    pub fn next_marker(&mut self) -> Result<char, EngineError> {
        let marker = self
            .universe
            .get(self.cursor)
            .copied()
            .ok_or(EngineError::PoolExhausted {
                drawn: self.cursor,
            })?;
        self.cursor += 1;
        Ok(marker)
    }

    /// Markers not yet handed out.
    pub fn remaining(&self) -> usize {
        self.universe.len() - self.cursor
    }

    /// Whether `c` belongs to this pool.
    pub fn contains(&self, c: char) -> bool {
        self.lookup.binary_search(&c).is_ok()
    }

    /// Position and value of the first reserved marker in `text`.
    pub fn find_reserved(&self, text: &str) -> Option<(usize, char)> {
        text.char_indices().find(|&(_, c)| self.contains(c))
    }

    /// Whether `text` already contains a reserved marker.
    pub fn contains_reserved(&self, text: &str) -> bool {
        self.find_reserved(text).is_some()
    }

    /// Fail with [`EngineError::ContaminatedInput`] if `text` contains a reserved marker.
    pub fn validate(&self, text: &str) -> Result<(), EngineError> {
        match self.find_reserved(text) {
            Some((position, marker)) => Err(EngineError::ContaminatedInput { position, marker }),
            None => Ok(()),
        }
    }
}

impl Default for SentinelPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Markers drawn for one engine: one per scope plus sixteen digit markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sentinels {
    inline: char,
    block: char,
    digits: [char; DIGIT_COUNT],
}

impl Sentinels {
    /// Draw the inline marker, the block marker and the digit markers, in that order.
    pub fn draw(pool: &mut SentinelPool) -> Result<Self, EngineError> {
        let inline = pool.next_marker()?;
        let block = pool.next_marker()?;
        let mut digits = ['\0'; DIGIT_COUNT];
        for digit in &mut digits {
            *digit = pool.next_marker()?;
        }
        Ok(Self {
            inline,
            block,
            digits,
        })
    }

    /// Delimiter used by placeholders of `scope`.
    pub fn marker(&self, scope: Scope) -> char {
        match scope {
            Scope::Inline => self.inline,
            Scope::Block => self.block,
        }
    }

    /// Whether `c` is one of the two scope delimiters.
    pub fn is_delimiter(&self, c: char) -> bool {
        c == self.inline || c == self.block
    }

    /// Build the placeholder for a span: delimiter, fingerprint digits, delimiter.
    ///
    /// Every hexadecimal digit of the fingerprint is replaced by its digit
    /// marker, so placeholders consist of reserved code points only.
    pub fn placeholder(&self, scope: Scope, fingerprint: Fingerprint) -> String {
        let marker = self.marker(scope);
        let mut placeholder = String::with_capacity(18 * 4);
        placeholder.push(marker);
        let mut value = fingerprint.value();
        let mut encoded = [self.digits[0]; DIGIT_COUNT];
        for slot in encoded.iter_mut().rev() {
            // Masked to four bits, the cast cannot truncate.
            #[allow(clippy::cast_possible_truncation)]
            let nibble = (value & 0xF) as usize;
            *slot = self.digits[nibble];
            value >>= 4;
        }
        placeholder.extend(encoded);
        placeholder.push(marker);
        placeholder
    }

    /// Byte range of the first placeholder in `text`, if any.
    ///
    /// A delimiter without a matching closing delimiter of the same scope is
    /// reported as [`EngineError::UnresolvedBlock`].
    pub fn find_placeholder(&self, text: &str) -> Result<Option<Range<usize>>, EngineError> {
        let Some((start, marker)) = text.char_indices().find(|&(_, c)| self.is_delimiter(c)) else {
            return Ok(None);
        };
        let body = start + marker.len_utf8();
        match text[body..].find(marker) {
            Some(offset) => Ok(Some(start..body + offset + marker.len_utf8())),
            None => Err(EngineError::UnresolvedBlock {
                placeholder: text[start..].to_owned(),
            }),
        }
    }
}
