//! Screen geometry shared by drawing and mouse hit-testing.
//!
//! Both sides compute positions from the same pure functions, so a click
//! always lands on what was drawn in that cell.

use ratatui::layout::{Constraint, Direction, Layout, Margin, Position, Rect};
use unicode_width::UnicodeWidthStr;

use crate::chips::{Chip, ChipId};

const CHIP_GAP: u16 = 1;
const MAX_CHIP_ROWS: u16 = 4;

/// Top-level areas of the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Regions {
    pub status: Rect,
    pub chips: Rect,
    pub input: Rect,
    pub candidates: Rect,
    pub footer: Rect,
}

/// Where a chip badge sits, and its remove control inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipSlot {
    pub id: ChipId,
    pub area: Rect,
    pub remove: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    RemoveChip(ChipId),
    Input,
    /// Index into the visible candidate list
    Candidate(usize),
}

/// Badge is rendered as ` label x `
pub fn badge_width(label: &str) -> u16 {
    u16::try_from(label.width())
        .unwrap_or(u16::MAX)
        .saturating_add(4)
}

/// (row, x, width) for every chip, wrapping at `width`
fn place(width: u16, chips: &[Chip]) -> Vec<(u16, u16, u16)> {
    let mut placed = Vec::with_capacity(chips.len());
    if width == 0 {
        return placed;
    }

    let (mut row, mut x) = (0u16, 0u16);
    for chip in chips {
        let w = badge_width(&chip.label).min(width);
        if x > 0 && x.saturating_add(w) > width {
            row += 1;
            x = 0;
        }
        placed.push((row, x, w));
        x = x.saturating_add(w + CHIP_GAP);
    }
    placed
}

pub fn chip_row_count(width: u16, chips: &[Chip]) -> u16 {
    place(width, chips).last().map(|(row, _, _)| row + 1).unwrap_or(1)
}

/// Badge slots inside the chip box's inner area. When the rows don't fit,
/// the box scrolls so the last row (newest chips, the one Backspace arms)
/// stays on screen.
pub fn chip_slots(inner: Rect, chips: &[Chip]) -> Vec<ChipSlot> {
    let placed = place(inner.width, chips);
    let rows = placed.last().map(|(row, _, _)| row + 1).unwrap_or(0);
    let first_row = rows.saturating_sub(inner.height);

    placed
        .into_iter()
        .zip(chips)
        .filter(|((row, _, _), _)| *row >= first_row)
        .map(|((row, x, w), chip)| {
            let area = Rect::new(inner.x + x, inner.y + row - first_row, w, 1);
            let remove = Rect::new(area.x + w.saturating_sub(2), area.y, 1.min(w), 1);
            ChipSlot { id: chip.id, area, remove }
        })
        .collect()
}

pub fn regions(area: Rect, chips: &[Chip]) -> Regions {
    let rows = chip_row_count(area.width.saturating_sub(2), chips).clamp(1, MAX_CHIP_ROWS);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),        // Status line
            Constraint::Length(rows + 2), // Chips box
            Constraint::Length(3),        // Input field
            Constraint::Min(3),           // Candidates
            Constraint::Length(1),        // Footer
        ])
        .split(area);

    Regions {
        status: chunks[0],
        chips: chunks[1],
        input: chunks[2],
        candidates: chunks[3],
        footer: chunks[4],
    }
}

pub fn inner(area: Rect) -> Rect {
    area.inner(Margin::new(1, 1))
}

/// Horizontal scroll for the input field, keeping one free column for the
/// cursor after the typed text
pub fn input_offset(text: &str, field_width: u16) -> u16 {
    let typed = u16::try_from(text.width()).unwrap_or(u16::MAX);
    typed.saturating_sub(field_width.saturating_sub(1))
}

/// First visible candidate row, keeping `cursor` on screen
pub fn candidate_offset(cursor: usize, height: u16) -> usize {
    let height = usize::from(height);
    if height == 0 {
        0
    } else {
        (cursor + 1).saturating_sub(height)
    }
}

pub fn hit_test(
    area: Rect,
    chips: &[Chip],
    visible_len: usize,
    cursor: usize,
    pos: Position,
) -> Option<Target> {
    let regions = regions(area, chips);

    if regions.chips.contains(pos) {
        return chip_slots(inner(regions.chips), chips)
            .into_iter()
            .find(|slot| slot.remove.contains(pos))
            .map(|slot| Target::RemoveChip(slot.id));
    }

    if regions.input.contains(pos) {
        return Some(Target::Input);
    }

    let list = inner(regions.candidates);
    if list.contains(pos) {
        let index = candidate_offset(cursor, list.height) + usize::from(pos.y - list.y);
        return (index < visible_len).then_some(Target::Candidate(index));
    }

    None
}
