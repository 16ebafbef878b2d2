//! Drag-release snapping.
//!
//! A released node is first quantized to the grid, then pulled onto the
//! nearest edge or centre line of a neighbour on each axis independently.

use crate::config::EditorConfig;
use crate::grid::snap_position_to_grid;
use crate::state::{Node, Position};

/// Which of the moving node's lines matched which neighbour line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    StartStart,
    EndEnd,
    StartEnd,
    EndStart,
    CenterCenter,
}

/// A winning magnetic pull on one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisSnap {
    pub target: String,
    pub alignment: Alignment,
    pub distance: f32,
    /// Snapped coordinate of the moving node's origin on this axis.
    pub value: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapOutcome {
    pub position: Position,
    pub horizontal: Option<AxisSnap>,
    pub vertical: Option<AxisSnap>,
}

/// Final position for `moving` released at `raw`.
pub fn snap_position<'a, I>(moving: &Node, raw: Position, nodes: I, config: &EditorConfig) -> Position
where
    I: IntoIterator<Item = &'a Node>,
{
    snap_with_guides(moving, raw, nodes, config).position
}

/// Like [`snap_position`] but also reports which neighbours won, for drawing
/// alignment guides.
///
/// `nodes` may contain `moving` itself and groups; both are skipped. Ties keep
/// the first neighbour in iteration order.
pub fn snap_with_guides<'a, I>(
    moving: &Node,
    raw: Position,
    nodes: I,
    config: &EditorConfig,
) -> SnapOutcome
where
    I: IntoIterator<Item = &'a Node>,
{
    let gridded = snap_position_to_grid(raw, config.grid_size);
    let size = moving.footprint();

    let mut horizontal: Option<AxisSnap> = None;
    let mut vertical: Option<AxisSnap> = None;

    for other in nodes {
        if other.id == moving.id || other.is_group() {
            continue;
        }
        let rect = other.rect();

        let best_x = horizontal.as_ref().map_or(config.snap_distance, |s| s.distance);
        if let Some((alignment, distance, value)) =
            closest_line(gridded.x, size.width, rect.left(), rect.width, best_x)
        {
            horizontal = Some(AxisSnap {
                target: other.id.clone(),
                alignment,
                distance,
                value,
            });
        }

        let best_y = vertical.as_ref().map_or(config.snap_distance, |s| s.distance);
        if let Some((alignment, distance, value)) =
            closest_line(gridded.y, size.height, rect.top(), rect.height, best_y)
        {
            vertical = Some(AxisSnap {
                target: other.id.clone(),
                alignment,
                distance,
                value,
            });
        }
    }

    let position = Position::new(
        horizontal.as_ref().map_or(gridded.x, |s| s.value),
        vertical.as_ref().map_or(gridded.y, |s| s.value),
    );

    SnapOutcome {
        position,
        horizontal,
        vertical,
    }
}

/// Compare the five line pairings on one axis and return the closest one
/// strictly under `threshold`.
fn closest_line(
    start: f32,
    extent: f32,
    other_start: f32,
    other_extent: f32,
    threshold: f32,
) -> Option<(Alignment, f32, f32)> {
    let end = start + extent;
    let center = start + extent / 2.0;
    let other_end = other_start + other_extent;
    let other_center = other_start + other_extent / 2.0;

    let pairings = [
        (Alignment::StartStart, start, other_start),
        (Alignment::EndEnd, end, other_end),
        (Alignment::StartEnd, start, other_end),
        (Alignment::EndStart, end, other_start),
        (Alignment::CenterCenter, center, other_center),
    ];

    let mut best: Option<(Alignment, f32, f32)> = None;
    let mut best_distance = threshold;
    for (alignment, line, other_line) in pairings {
        let distance = (line - other_line).abs();
        if distance < best_distance {
            best_distance = distance;
            best = Some((alignment, distance, start + (other_line - line)));
        }
    }
    best
}
