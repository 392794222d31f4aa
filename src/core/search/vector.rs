//! Positional Term Vectors
//!
//! A term vector maps normalized stems to the set of positions at which they
//! occur in a source text. Positions are 1-based and may carry a weight class.
//!
//! The textual form follows the backing index engine:
//!
//! ```text
//! 'cat':1,4B 'dog':2A 'it''s':3
//! ```
//!
//! Stems are single-quoted (embedded quotes doubled, backslashes escaped),
//! positions are comma separated and the lowest weight class (`D`) is never
//! printed. Concatenation shifts the right-hand positions past the largest
//! left-hand position, exactly like the engine's `||` operator.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{Result, SearchError};

/// Largest position the index engine can store; larger positions are clamped.
pub const MAX_POSITION: u16 = 16383;

/// Maximum number of positions kept per stem.
pub const MAX_POSITIONS_PER_STEM: usize = 256;

// ============================================================================
// Weight
// ============================================================================

/// Weight class of a position, from most (`A`) to least (`D`) important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Weight {
    A,
    B,
    C,
    #[default]
    D,
}

impl Weight {
    /// Relative importance, higher is more important.
    fn rank(self) -> u8 {
        match self {
            Self::A => 3,
            Self::B => 2,
            Self::C => 1,
            Self::D => 0,
        }
    }

    /// Parse a weight letter (case-insensitive).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'D' => Some(Self::D),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
        }
    }

    /// The heavier of two weights.
    pub fn max(self, other: Self) -> Self {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

impl FromStr for Weight {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c)
                .ok_or_else(|| SearchError::MalformedVector(format!("unknown weight '{s}'"))),
            _ => Err(SearchError::MalformedVector(format!("unknown weight '{s}'"))),
        }
    }
}

// ============================================================================
// Positions
// ============================================================================

/// A single position tag: a 1-based position with an optional weight class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionTag {
    pub position: u16,
    pub weight: Weight,
}

impl PositionTag {
    /// Build a tag, clamping the position into `1..=MAX_POSITION`.
    pub fn new(position: u32, weight: Weight) -> Self {
        let clamped = position.clamp(1, MAX_POSITION as u32) as u16;
        Self {
            position: clamped,
            weight,
        }
    }
}

impl fmt::Display for PositionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.weight {
            Weight::D => write!(f, "{}", self.position),
            w => write!(f, "{}{}", self.position, w.as_char()),
        }
    }
}

/// Ordered set of positions for one stem.
///
/// A position appears at most once; inserting it again keeps the heavier
/// weight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionSet {
    positions: BTreeMap<u16, Weight>,
}

impl PositionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: PositionTag) {
        let full = self.positions.len() >= MAX_POSITIONS_PER_STEM;
        match self.positions.entry(tag.position) {
            btree_map::Entry::Occupied(mut slot) => {
                let merged = slot.get().max(tag.weight);
                slot.insert(merged);
            }
            btree_map::Entry::Vacant(slot) => {
                if !full {
                    slot.insert(tag.weight);
                }
            }
        }
    }

    /// Set union, in place.
    pub fn union_with(&mut self, other: &PositionSet) {
        for tag in other.iter() {
            self.insert(tag);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = PositionTag> + '_ {
        self.positions.iter().map(|(&position, &weight)| PositionTag { position, weight })
    }

    pub fn contains(&self, position: u16) -> bool {
        self.positions.contains_key(&position)
    }

    pub fn max_position(&self) -> Option<u16> {
        self.positions.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl FromIterator<PositionTag> for PositionSet {
    fn from_iter<I: IntoIterator<Item = PositionTag>>(iter: I) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

// ============================================================================
// Term Vector
// ============================================================================

/// Mapping from stem to the positions where it occurs.
///
/// Stems are kept in byte order, which is also the order the index engine
/// prints them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermVector {
    entries: BTreeMap<String, PositionSet>,
}

impl TermVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of `stem`.
    pub fn insert(&mut self, stem: impl Into<String>, tag: PositionTag) {
        self.entries.entry(stem.into()).or_default().insert(tag);
    }

    /// Union `positions` into the entry for `stem`, creating it if needed.
    pub fn merge_positions(&mut self, stem: impl Into<String>, positions: &PositionSet) {
        self.entries
            .entry(stem.into())
            .or_default()
            .union_with(positions);
    }

    /// Add a stem that carries no positions.
    pub fn insert_bare(&mut self, stem: impl Into<String>) {
        self.entries.entry(stem.into()).or_default();
    }

    pub fn get(&self, stem: &str) -> Option<&PositionSet> {
        self.entries.get(stem)
    }

    pub fn contains(&self, stem: &str) -> bool {
        self.entries.contains_key(stem)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PositionSet)> {
        self.entries.iter().map(|(stem, positions)| (stem.as_str(), positions))
    }

    /// Stems in byte order.
    pub fn stems(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest position over all stems, or 0 for a vector without positions.
    pub fn max_position(&self) -> u16 {
        self.entries
            .values()
            .filter_map(PositionSet::max_position)
            .max()
            .unwrap_or(0)
    }

    /// Copy of this vector with every position re-weighted to `weight`.
    pub fn with_weight(&self, weight: Weight) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(stem, positions)| {
                let reweighted = positions
                    .iter()
                    .map(|tag| PositionTag {
                        position: tag.position,
                        weight,
                    })
                    .collect();
                (stem.clone(), reweighted)
            })
            .collect();
        Self { entries }
    }

    /// Concatenate two vectors.
    ///
    /// `self` keeps its positions; every position of `other` is shifted by
    /// the largest position of `self` (clamped at [`MAX_POSITION`]). Weights
    /// are preserved. Neither input is modified.
    pub fn concat(&self, other: &TermVector) -> TermVector {
        let shift = self.max_position() as u32;
        let mut result = self.clone();

        for (stem, positions) in &other.entries {
            let entry = result.entries.entry(stem.clone()).or_default();
            for tag in positions.iter() {
                entry.insert(PositionTag::new(tag.position as u32 + shift, tag.weight));
            }
        }

        result
    }

    /// Parse the engine's textual representation.
    pub fn parse(input: &str) -> Result<Self> {
        Parser::new(input).parse()
    }
}

impl fmt::Display for TermVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (stem, positions) in &self.entries {
            if !first {
                f.write_str(" ")?;
            }
            first = false;

            f.write_str("'")?;
            for c in stem.chars() {
                match c {
                    '\'' => f.write_str("''")?,
                    '\\' => f.write_str("\\\\")?,
                    c => write!(f, "{c}")?,
                }
            }
            f.write_str("'")?;

            let mut sep = ':';
            for tag in positions.iter() {
                write!(f, "{sep}{tag}")?;
                sep = ',';
            }
        }
        Ok(())
    }
}

impl FromStr for TermVector {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Concatenate any number of vectors left to right.
pub fn concatenate<'a, I>(vectors: I) -> TermVector
where
    I: IntoIterator<Item = &'a TermVector>,
{
    let mut iter = vectors.into_iter();
    let Some(first) = iter.next() else {
        return TermVector::new();
    };
    iter.fold(first.clone(), |acc, next| acc.concat(next))
}

// ============================================================================
// Parsing
// ============================================================================

struct Parser<'a> {
    input: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn error(&self, message: impl fmt::Display) -> SearchError {
        SearchError::MalformedVector(format!("{message} in \"{}\"", self.input))
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some((_, c)) if c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn parse(mut self) -> Result<TermVector> {
        let mut vector = TermVector::new();

        loop {
            self.skip_whitespace();
            if self.chars.peek().is_none() {
                break;
            }

            let stem = self.parse_stem()?;
            if stem.is_empty() {
                return Err(self.error("empty stem"));
            }

            if matches!(self.chars.peek(), Some((_, ':'))) {
                self.chars.next();
                let positions = self.parse_positions()?;
                vector.merge_positions(stem, &positions);
            } else {
                vector.insert_bare(stem);
            }

            match self.chars.peek().copied() {
                None => break,
                Some((_, c)) if c.is_whitespace() => continue,
                Some((idx, c)) => {
                    return Err(self.error(format!("unexpected '{c}' at byte {idx}")));
                }
            }
        }

        Ok(vector)
    }

    fn parse_stem(&mut self) -> Result<String> {
        let mut stem = String::new();

        if matches!(self.chars.peek(), Some((_, '\''))) {
            self.chars.next();
            loop {
                match self.chars.next() {
                    Some((_, '\'')) => {
                        if matches!(self.chars.peek(), Some((_, '\''))) {
                            self.chars.next();
                            stem.push('\'');
                        } else {
                            return Ok(stem);
                        }
                    }
                    Some((_, '\\')) => match self.chars.next() {
                        Some((_, c)) => stem.push(c),
                        None => return Err(self.error("dangling escape")),
                    },
                    Some((_, c)) => stem.push(c),
                    None => return Err(self.error("unterminated quoted stem")),
                }
            }
        }

        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() || c == ':' {
                break;
            }
            if c == '\\' {
                self.chars.next();
                match self.chars.next() {
                    Some((_, escaped)) => stem.push(escaped),
                    None => return Err(self.error("dangling escape")),
                }
                continue;
            }
            stem.push(c);
            self.chars.next();
        }
        Ok(stem)
    }

    fn parse_positions(&mut self) -> Result<PositionSet> {
        let mut positions = PositionSet::new();

        loop {
            let mut digits = String::new();
            while let Some(&(_, c)) = self.chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                digits.push(c);
                self.chars.next();
            }
            if digits.is_empty() {
                return Err(self.error("missing position"));
            }
            let position: u32 = digits
                .parse()
                .map_err(|_| self.error(format!("position '{digits}' out of range")))?;
            if position == 0 {
                return Err(self.error("position must be positive"));
            }

            let weight = match self.chars.peek() {
                Some(&(_, c)) if c.is_ascii_alphabetic() => {
                    self.chars.next();
                    Weight::from_char(c).ok_or_else(|| self.error(format!("unknown weight '{c}'")))?
                }
                _ => Weight::D,
            };
            positions.insert(PositionTag::new(position, weight));

            if matches!(self.chars.peek(), Some((_, ','))) {
                self.chars.next();
            } else {
                return Ok(positions);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tv(s: &str) -> TermVector {
        TermVector::parse(s).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        let vector = tv("'hello':1 'world':2,5B");
        assert_eq!(vector.len(), 2);
        assert!(vector.get("world").unwrap().contains(5));
        assert_eq!(vector.to_string(), "'hello':1 'world':2,5B");
    }

    #[test]
    fn test_display_orders_stems_and_positions() {
        let vector = tv("'zebra':9,3 'apple':2");
        assert_eq!(vector.to_string(), "'apple':2 'zebra':3,9");
    }

    #[test]
    fn test_weight_d_is_not_printed() {
        assert_eq!(tv("'x':1D").to_string(), "'x':1");
    }

    #[test]
    fn test_quotes_and_backslashes_are_escaped() {
        let mut vector = TermVector::new();
        vector.insert("it's", PositionTag::new(1, Weight::D));
        vector.insert("a\\b", PositionTag::new(2, Weight::A));
        let text = vector.to_string();
        assert_eq!(text, "'a\\\\b':2A 'it''s':1");
        assert_eq!(tv(&text), vector);
    }

    #[test]
    fn test_bare_stems() {
        let vector = tv("'alone' 'other':3");
        assert!(vector.get("alone").unwrap().is_empty());
        assert_eq!(vector.to_string(), "'alone' 'other':3");
    }

    #[test]
    fn test_unquoted_stems_are_accepted() {
        let vector = tv("cat:1 dog:2");
        assert_eq!(vector.to_string(), "'cat':1 'dog':2");
    }

    #[rstest]
    #[case("'cat':")]
    #[case("'cat':0")]
    #[case("'cat':1X")]
    #[case("'cat")]
    #[case("'cat':1;")]
    #[case("'':1")]
    fn test_malformed_vectors(#[case] input: &str) {
        assert!(matches!(
            TermVector::parse(input),
            Err(SearchError::MalformedVector(_))
        ));
    }

    #[test]
    fn test_duplicate_position_keeps_heaviest_weight() {
        let vector = tv("'a':3C,3A,3B");
        let tags: Vec<_> = vector.get("a").unwrap().iter().collect();
        assert_eq!(
            tags,
            vec![PositionTag {
                position: 3,
                weight: Weight::A
            }]
        );
    }

    #[test]
    fn test_positions_are_clamped() {
        let vector = tv("'far':99999");
        assert_eq!(vector.max_position(), MAX_POSITION);
    }

    #[test]
    fn test_positions_per_stem_capped() {
        let mut vector = TermVector::new();
        for i in 1..=400 {
            vector.insert("same", PositionTag::new(i, Weight::D));
        }
        assert_eq!(vector.get("same").unwrap().len(), MAX_POSITIONS_PER_STEM);
    }

    #[rstest]
    #[case("'cat':1", "'dog':1", "'cat':1 'dog':2")]
    #[case("'cat':1B", "'dog':1C", "'cat':1B 'dog':2C")]
    #[case(
        "'cat':1 'whatever':11",
        "'dog':9 'hospital':11 'life':13",
        "'cat':1 'dog':20 'hospital':22 'life':24 'whatever':11"
    )]
    #[case(
        "'cat':1B 'whatever':11C",
        "'dog':9 'hospital':11A 'life':13",
        "'cat':1B 'dog':20 'hospital':22A 'life':24 'whatever':11C"
    )]
    fn test_concat(#[case] left: &str, #[case] right: &str, #[case] expected: &str) {
        assert_eq!(tv(left).concat(&tv(right)).to_string(), expected);
    }

    #[test]
    fn test_concatenate_three_vectors() {
        let a = tv("'cat':1B 'whatever':11C");
        let b = tv("'dog':9 'hospital':11A 'life':13");
        let c = tv("'whatever':1B");

        let result = concatenate([&a, &b, &c]);
        assert_eq!(
            result.to_string(),
            "'cat':1B 'dog':20 'hospital':22A 'life':24 'whatever':11C,25B"
        );
        assert_eq!(result, a.concat(&b).concat(&c));

        // inputs untouched
        assert_eq!(a.to_string(), "'cat':1B 'whatever':11C");
        assert_eq!(c.to_string(), "'whatever':1B");
    }

    #[test]
    fn test_concatenate_edge_cases() {
        assert!(concatenate(std::iter::empty()).is_empty());

        let only = tv("'one':4");
        assert_eq!(concatenate([&only]), only);

        let empty = TermVector::new();
        assert_eq!(empty.concat(&only).to_string(), "'one':4");
        assert_eq!(only.concat(&empty).to_string(), "'one':4");
    }

    #[test]
    fn test_with_weight() {
        let vector = tv("'a':1 'b':2C,3").with_weight(Weight::A);
        assert_eq!(vector.to_string(), "'a':1A 'b':2A,3A");
    }

    #[test]
    fn test_weight_parsing() {
        assert_eq!("b".parse::<Weight>().unwrap(), Weight::B);
        assert!("E".parse::<Weight>().is_err());
        assert!("AB".parse::<Weight>().is_err());
    }
}
