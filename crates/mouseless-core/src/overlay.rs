//! Render model for the overlay.
//!
//! Describes what a presentation layer draws for the current selection:
//! grid lines, the two-letter label of every outer cell, and once a cell is
//! chosen, the layout keys inside it. Coordinates are in screen pixels.

use crate::address::{cell_bounds, index_to_letter, OuterAddress, Rect, ScreenRect, GRID_SIZE};
use crate::layout::KeyboardLayout;
use crate::session::{Phase, SelectionSession};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long an action label stays visible.
pub const FLASH_DURATION: Duration = Duration::from_millis(1500);

/// A straight line between two integer pixel positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Text centered in a rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: char,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OverlayContent {
    /// No cell chosen yet: every cell shows its row and column letter.
    OuterLabels(Vec<Label>),
    /// Cell chosen: its sub-cells show their layout keys.
    Subgrid { cell: Rect, labels: Vec<Label> },
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayView {
    pub grid_lines: Vec<Line>,
    pub subgrid_lines: Vec<Line>,
    pub content: OverlayContent,
    pub holding: bool,
}

impl OverlayView {
    pub fn from_session(session: &SelectionSession) -> Self {
        let screen = session.screen();
        let layout = session.layout();
        let state = session.state();

        let content = match (session.phase(), state.outer) {
            (Phase::CellChosen, Some(outer)) => OverlayContent::Subgrid {
                cell: cell_bounds(outer, screen),
                labels: subgrid_labels(outer, layout, screen),
            },
            _ => OverlayContent::OuterLabels(outer_labels(screen)),
        };

        Self {
            grid_lines: grid_lines(screen),
            subgrid_lines: subgrid_lines(screen, layout),
            content,
            holding: state.holding,
        }
    }
}

/// Outer grid: 27 vertical then 27 horizontal lines.
pub fn grid_lines(screen: &ScreenRect) -> Vec<Line> {
    let (cw, ch) = screen.cell_size();
    let (w, h) = (screen.width as i32, screen.height as i32);

    let vertical = (0..=GRID_SIZE).map(|i| {
        let x = (i as f64 * cw) as i32;
        Line {
            x1: x,
            y1: 0,
            x2: x,
            y2: h,
        }
    });
    let horizontal = (0..=GRID_SIZE).map(|i| {
        let y = (i as f64 * ch) as i32;
        Line {
            x1: 0,
            y1: y,
            x2: w,
            y2: y,
        }
    });
    vertical.chain(horizontal).collect()
}

/// Inner dividers of every outer cell, spanning the whole screen.
pub fn subgrid_lines(screen: &ScreenRect, layout: &KeyboardLayout) -> Vec<Line> {
    let (cw, ch) = screen.cell_size();
    let (w, h) = (screen.width as i32, screen.height as i32);
    let sub_w = cw / layout.columns() as f64;
    let sub_h = ch / layout.rows() as f64;

    let mut lines = Vec::new();
    for col in 0..GRID_SIZE {
        for i in 1..layout.columns() {
            let x = (col as f64 * cw + i as f64 * sub_w) as i32;
            lines.push(Line {
                x1: x,
                y1: 0,
                x2: x,
                y2: h,
            });
        }
    }
    for row in 0..GRID_SIZE {
        for j in 1..layout.rows() {
            let y = (row as f64 * ch + j as f64 * sub_h) as i32;
            lines.push(Line {
                x1: 0,
                y1: y,
                x2: w,
                y2: y,
            });
        }
    }
    lines
}

/// Two labels per outer cell: row letter on the left half, column letter on
/// the right half, nudged down by a fifth of the cell height.
pub fn outer_labels(screen: &ScreenRect) -> Vec<Label> {
    let (cw, ch) = screen.cell_size();
    let offset = ch / 5.0;

    let mut labels = Vec::with_capacity(GRID_SIZE * GRID_SIZE * 2);
    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let (Some(first), Some(second)) = (index_to_letter(row), index_to_letter(col)) else {
                continue;
            };
            let x = col as f64 * cw;
            let y = row as f64 * ch + offset;
            labels.push(Label {
                text: first,
                rect: Rect {
                    x,
                    y,
                    width: cw / 2.0,
                    height: ch / 2.0,
                },
            });
            labels.push(Label {
                text: second,
                rect: Rect {
                    x: x + cw / 2.0,
                    y,
                    width: cw / 2.0,
                    height: ch / 2.0,
                },
            });
        }
    }
    labels
}

/// Uppercase layout keys placed in the sub-cells of one outer cell.
pub fn subgrid_labels(
    outer: OuterAddress,
    layout: &KeyboardLayout,
    screen: &ScreenRect,
) -> Vec<Label> {
    let cell = cell_bounds(outer, screen);
    let sub_w = cell.width / layout.columns() as f64;
    let sub_h = cell.height / layout.rows() as f64;

    layout
        .keys()
        .map(|(key, row, col)| Label {
            text: key.to_uppercase().next().unwrap_or(key),
            rect: Rect {
                x: cell.x + col as f64 * sub_w,
                y: cell.y + row as f64 * sub_h,
                width: sub_w,
                height: sub_h,
            },
        })
        .collect()
}
