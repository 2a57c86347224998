//! Inner-grid keyboard layouts.
//!
//! A layout is a small block of keys (8x3 for the built-in presets). Its shape
//! decides how every outer cell is subdivided, and each key names one sub-cell.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Key the space bar stands in for in the built-in layouts.
pub const DEFAULT_HOME_KEY: char = 'f';

const ENGLISH_ROWS: [&str; 3] = ["qweruiop", "asdfjkl;", "zxcvm,.?"];
const BRAZILIAN_ROWS: [&str; 3] = ["qweruiop", "asdfjklç", "zxcvm,.;"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("layout has no rows")]
    Empty,
    #[error("layout row {0} is empty")]
    EmptyRow(usize),
    #[error("key {0:?} appears more than once in the layout")]
    DuplicateKey(char),
    #[error("home key {0:?} is not part of the layout")]
    MissingHomeKey(char),
}

/// Keyboard language of the user. Only changes two punctuation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Brazilian,
}

impl Language {
    /// Interpret a settings language code such as `"EN"` or `"PT-BR"`.
    pub fn from_code(code: &str) -> Self {
        if code.to_ascii_uppercase().contains("BR") {
            Language::Brazilian
        } else {
            Language::English
        }
    }
}

/// Validated inner-grid layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardLayout {
    rows: Vec<Vec<char>>,
    positions: HashMap<char, (usize, usize)>,
    columns: usize,
    home: char,
}

impl KeyboardLayout {
    /// Build a layout from rows of keys. Keys are stored lowercase.
    pub fn new(rows: Vec<Vec<char>>, home: char) -> Result<Self, LayoutError> {
        if rows.is_empty() {
            return Err(LayoutError::Empty);
        }

        let rows: Vec<Vec<char>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(normalize).collect())
            .collect();

        let mut positions = HashMap::new();
        for (r, row) in rows.iter().enumerate() {
            if row.is_empty() {
                return Err(LayoutError::EmptyRow(r));
            }
            for (c, &key) in row.iter().enumerate() {
                if positions.insert(key, (r, c)).is_some() {
                    return Err(LayoutError::DuplicateKey(key));
                }
            }
        }

        let home = normalize(home);
        if !positions.contains_key(&home) {
            return Err(LayoutError::MissingHomeKey(home));
        }

        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        Ok(Self {
            rows,
            positions,
            columns,
            home,
        })
    }

    /// Build a layout from one string per row.
    pub fn from_rows(rows: &[&str], home: char) -> Result<Self, LayoutError> {
        Self::new(rows.iter().map(|r| r.chars().collect()).collect(), home)
    }

    pub fn english() -> Self {
        Self::preset(&ENGLISH_ROWS)
    }

    pub fn brazilian() -> Self {
        Self::preset(&BRAZILIAN_ROWS)
    }

    pub fn for_language(language: Language) -> Self {
        match language {
            Language::English => Self::english(),
            Language::Brazilian => Self::brazilian(),
        }
    }

    fn preset(rows: &[&str]) -> Self {
        Self::from_rows(rows, DEFAULT_HOME_KEY).expect("built-in layout is valid")
    }

    /// Number of inner columns (longest row).
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of inner rows.
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn home_key(&self) -> char {
        self.home
    }

    /// (row, column) of a key, case-insensitive.
    pub fn position(&self, key: char) -> Option<(usize, usize)> {
        self.positions.get(&normalize(key)).copied()
    }

    pub fn key_at(&self, row: usize, col: usize) -> Option<char> {
        self.rows.get(row)?.get(col).copied()
    }

    /// Every key with its (row, column), row-major.
    pub fn keys(&self) -> impl Iterator<Item = (char, usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, &k)| (k, r, c)))
    }
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self::english()
    }
}

fn normalize(key: char) -> char {
    key.to_lowercase().next().unwrap_or(key)
}
