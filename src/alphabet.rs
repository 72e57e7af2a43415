//! Geohash alphabet: symbol validation and path construction.
//!
//! The alphabet is the standard geohash base-32 set: the ten digits followed by
//! the lowercase letters without `a`, `i`, `l` and `o`.
//!
//! ```text
//! value   0 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17 18 19 20 21 22 23 24 25 26 27 28 29 30 31
//! symbol  0 1 2 3 4 5 6 7 8 9 b  c  d  e  f  g  h  j  k  m  n  p  q  r  s  t  u  v  w  x  y  z
//! ```
//!
//! Symbol order is significant: genesis cells are minted in it, so it fixes
//! the first 32 positions of the supply index.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of symbols, and therefore the fan-out of every cell.
pub const FANOUT: usize = 32;

/// The 32 geohash symbols in value order.
pub const ALPHABET: [u8; FANOUT] = *b"0123456789bcdefghjkmnpqrstuvwxyz";

const INVALID: u8 = 0xFF;

/// ASCII → symbol value lookup, `INVALID` for everything outside the alphabet.
const DECODE: [u8; 128] = {
    let mut table = [INVALID; 128];
    let mut i = 0;
    while i < FANOUT {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Static assertion: no symbol appears twice.
const _: () = {
    let mut seen = 0u128;
    let mut i = 0;
    while i < FANOUT {
        let bit = 1u128 << ALPHABET[i];
        assert!(seen & bit == 0, "ALPHABET contains a duplicate symbol");
        seen |= bit;
        i += 1;
    }
};

/// 5-bit value of `c`, or `None` if it is not a geohash symbol.
#[inline]
pub const fn symbol_value(c: char) -> Option<u8> {
    if !c.is_ascii() {
        return None;
    }
    match DECODE[c as usize] {
        INVALID => None,
        v => Some(v),
    }
}

/// Raised when a string contains a character outside the alphabet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid geohash symbol {symbol:?} at position {position}")]
pub struct InvalidSymbol {
    /// The offending character.
    pub symbol: char,
    /// Zero-based character position within the input.
    pub position: usize,
}

// =============================================================================
// Symbol
// =============================================================================

/// One member of the alphabet, stored as its 5-bit value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u8);

impl Symbol {
    /// Every symbol, in alphabet order.
    pub const ALL: [Symbol; FANOUT] = {
        let mut all = [Symbol(0); FANOUT];
        let mut i = 0;
        while i < FANOUT {
            all[i] = Symbol(i as u8);
            i += 1;
        }
        all
    };

    /// Symbol with the given 5-bit value.
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if (index as usize) < FANOUT {
            Some(Symbol(index))
        } else {
            None
        }
    }

    #[inline]
    pub const fn from_char(c: char) -> Option<Self> {
        match symbol_value(c) {
            Some(v) => Some(Symbol(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn as_char(self) -> char {
        ALPHABET[self.0 as usize] as char
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl TryFrom<char> for Symbol {
    type Error = InvalidSymbol;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Symbol::from_char(c).ok_or(InvalidSymbol {
            symbol: c,
            position: 0,
        })
    }
}

// =============================================================================
// GeohashPath
// =============================================================================

/// A string that has passed [`validate`].
///
/// The empty path is the root of the grid. It is a valid path but never a
/// token of its own.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GeohashPath(String);

/// Check every character of `s` against the alphabet.
///
/// Pure; the first offending character is reported with its position.
pub fn validate(s: &str) -> Result<GeohashPath, InvalidSymbol> {
    if let Some((position, symbol)) = s
        .chars()
        .enumerate()
        .find(|&(_, c)| symbol_value(c).is_none())
    {
        return Err(InvalidSymbol { symbol, position });
    }
    Ok(GeohashPath(s.to_owned()))
}

impl GeohashPath {
    /// The empty path.
    #[inline]
    pub const fn root() -> Self {
        GeohashPath(String::new())
    }

    /// Build a path from symbols, root first.
    pub fn from_symbols(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        GeohashPath(symbols.into_iter().map(Symbol::as_char).collect())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical byte encoding, the input to the id hash.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Number of symbols. Every symbol is ASCII, so this is also the byte length.
    #[inline]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The enclosing cell, `None` for the root.
    pub fn parent(&self) -> Option<GeohashPath> {
        let depth = self.depth();
        (depth > 0).then(|| GeohashPath(self.0[..depth - 1].to_owned()))
    }

    /// The sub-cell selected by `symbol`.
    pub fn child(&self, symbol: Symbol) -> GeohashPath {
        let mut path = String::with_capacity(self.depth() + 1);
        path.push_str(&self.0);
        path.push(symbol.as_char());
        GeohashPath(path)
    }

    pub fn last_symbol(&self) -> Option<Symbol> {
        self.0.chars().last().and_then(Symbol::from_char)
    }

    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.0.chars().filter_map(Symbol::from_char)
    }

    /// Every non-root prefix, shortest first, ending with `self`.
    pub fn prefixes(&self) -> impl Iterator<Item = GeohashPath> + '_ {
        (1..=self.depth()).map(|n| GeohashPath(self.0[..n].to_owned()))
    }

    /// True if `ancestor` is a prefix of (or equal to) this path.
    #[inline]
    pub fn starts_with(&self, ancestor: &GeohashPath) -> bool {
        self.0.starts_with(&ancestor.0)
    }
}

impl fmt::Display for GeohashPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GeohashPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for GeohashPath {
    type Err = InvalidSymbol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate(s)
    }
}

impl TryFrom<&str> for GeohashPath {
    type Error = InvalidSymbol;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        validate(s)
    }
}

impl TryFrom<String> for GeohashPath {
    type Error = InvalidSymbol;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        validate(&s)?;
        Ok(GeohashPath(s))
    }
}

impl From<GeohashPath> for String {
    fn from(path: GeohashPath) -> Self {
        path.0
    }
}

// =============================================================================
// Tests
// =============================================================================
