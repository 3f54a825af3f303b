//! Cell names.
//!
//! Provides the two naming conventions a sheet can be configured with:
//! plain identifiers (`[A-Za-z_][A-Za-z0-9_]*`) and A1 references
//! (`[A-Za-z]+[0-9]+`), plus bidirectional conversion between A1 names and
//! zero-indexed column/row coordinates.
//!
//! # Examples
//!
//! ```
//! use cellwise_engine::engine::CellRef;
//!
//! let cell = CellRef::from_str("B3").unwrap();
//! assert_eq!(cell.col, 1);  // 0-indexed
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use super::token;

/// Zero-indexed column/row coordinates of an A1-style name.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// `None` unless `name` is letters then a row number of at least 1.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Option<CellRef> {
        let caps = a1_re().captures(name)?;
        let col = letters_to_col(&caps["letters"])?;
        let row = caps["numbers"].parse::<usize>().ok()?.checked_sub(1)?;
        Some(CellRef::new(col, row))
    }

    /// Bijective base-26 column letters: 0 is `A`, 25 is `Z`, 26 is `AA`.
    pub fn col_to_letters(col: usize) -> String {
        let mut letters = Vec::new();
        let mut rest = col as u128 + 1;
        while rest > 0 {
            let rem = ((rest - 1) % 26) as u8;
            letters.push(char::from(b'A' + rem));
            rest = (rest - 1) / 26;
        }
        letters.iter().rev().collect()
    }
}

fn letters_to_col(letters: &str) -> Option<usize> {
    letters
        .bytes()
        .map(|b| usize::from(b.to_ascii_uppercase() - b'A') + 1)
        .try_fold(0usize, |acc, d| acc.checked_mul(26)?.checked_add(d))?
        .checked_sub(1)
}

impl std::str::FromStr for CellRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellRef::from_str(s).ok_or_else(|| format!("not an A1 cell name: {}", s))
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::col_to_letters(self.col), self.row + 1)
    }
}

/// Row-major: A1, B1, ..., A2, B2.
impl Ord for CellRef {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row.cmp(&other.row).then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for CellRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Letters followed by digits, e.g. `A1`, `zz10`.
pub fn is_a1_name(name: &str) -> bool {
    a1_re().is_match(name)
}

/// A letter or underscore followed by letters, digits or underscores.
pub fn is_identifier_name(name: &str) -> bool {
    token::is_variable(name)
}

fn a1_re() -> &'static Regex {
    static A1_RE: OnceLock<Regex> = OnceLock::new();
    A1_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$").expect("A1 regex must compile")
    })
}
