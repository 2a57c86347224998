//! Two-level screen addressing.
//!
//! The screen is split into a fixed 26x26 outer grid addressed by two letters
//! (row first, then column). Each outer cell is split again into an inner grid
//! shaped like the configured [`KeyboardLayout`], and one layout key picks the
//! final sub-cell. The resolved point is always the exact center of that
//! sub-cell, so the same keys always produce the same pixel.

use crate::layout::KeyboardLayout;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of rows and columns of the outer grid (one per letter A-Z).
pub const GRID_SIZE: usize = 26;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid grid letter: {0:?}")]
    InvalidLetter(char),
    #[error("key {0:?} is not part of the keyboard layout")]
    InvalidInnerKey(char),
}

/// Size of the addressable region in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width and height of one outer cell.
    pub fn cell_size(&self) -> (f64, f64) {
        (
            self.width / GRID_SIZE as f64,
            self.height / GRID_SIZE as f64,
        )
    }
}

/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A confirmed (row, column) pair in the outer grid.
///
/// Both indices are always below [`GRID_SIZE`]; the only ways to build one
/// check the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OuterAddress {
    row: usize,
    col: usize,
}

impl OuterAddress {
    /// Build an address from raw indices, `None` if either is out of range.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < GRID_SIZE && col < GRID_SIZE).then_some(Self { row, col })
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }
}

/// A resolved pointer target. Not clamped or rounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPoint {
    pub x: f64,
    pub y: f64,
}

impl ResolvedPoint {
    /// Integer pixel coordinates, truncated toward zero.
    pub fn to_pixel(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// Map 'A'..='Z' (either case) to 0..=25.
pub fn letter_to_index(letter: char) -> Result<usize, AddressError> {
    let upper = letter.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Ok((upper as u8 - b'A') as usize)
    } else {
        Err(AddressError::InvalidLetter(letter))
    }
}

/// Uppercase letter for an outer grid index.
pub fn index_to_letter(index: usize) -> Option<char> {
    (index < GRID_SIZE).then(|| (b'A' + index as u8) as char)
}

/// Bounds of an outer cell on the given screen.
pub fn cell_bounds(outer: OuterAddress, screen: &ScreenRect) -> Rect {
    let (width, height) = screen.cell_size();
    Rect {
        x: outer.col as f64 * width,
        y: outer.row as f64 * height,
        width,
        height,
    }
}

/// Center of the sub-cell selected by `inner` inside the outer cell.
pub fn resolve_point(
    outer: OuterAddress,
    inner: char,
    layout: &KeyboardLayout,
    screen: &ScreenRect,
) -> Result<ResolvedPoint, AddressError> {
    let (sub_row, sub_col) = layout
        .position(inner)
        .ok_or(AddressError::InvalidInnerKey(inner))?;

    let cell = cell_bounds(outer, screen);
    let sub_width = cell.width / layout.columns() as f64;
    let sub_height = cell.height / layout.rows() as f64;

    Ok(ResolvedPoint {
        x: cell.x + sub_col as f64 * sub_width + sub_width / 2.0,
        y: cell.y + sub_row as f64 * sub_height + sub_height / 2.0,
    })
}
