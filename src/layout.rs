//! Auto-align.
//!
//! Tidies a hand-placed board: nodes that roughly share a row get the same y
//! and are pushed apart so they no longer overlap, then nodes that roughly
//! share a column get the same x. Rows and columns are found by bucketing
//! coordinates to a coarse grid.

use std::collections::BTreeMap;

use crate::changes::PositionUpdate;
use crate::state::{Node, Position};

/// Settings for [`auto_align`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignConfig {
    /// Bucket size for deciding which nodes share a row or column.
    pub grid: f32,
    /// Gap left between neighbours pushed apart.
    pub gap: f32,
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            grid: 40.0,
            gap: 2.0,
        }
    }
}

/// Compute the position updates that align `nodes`.
///
/// Groups are ignored (their geometry follows their children). Returns an
/// empty list when fewer than two nodes take part. Updates are ordered rows
/// first (top to bottom), then nodes only touched by a column pass.
pub fn auto_align<'a, I>(nodes: I, config: &AlignConfig) -> Vec<PositionUpdate>
where
    I: IntoIterator<Item = &'a Node>,
{
    let nodes: Vec<&Node> = nodes.into_iter().filter(|n| !n.is_group()).collect();
    if nodes.len() < 2 {
        return Vec::new();
    }

    let mut rows: BTreeMap<i64, Vec<&Node>> = BTreeMap::new();
    let mut columns: BTreeMap<i64, Vec<&Node>> = BTreeMap::new();
    for &node in &nodes {
        rows.entry(bucket(node.position.y, config.grid))
            .or_default()
            .push(node);
        columns
            .entry(bucket(node.position.x, config.grid))
            .or_default()
            .push(node);
    }

    let mut updates: Vec<PositionUpdate> = Vec::new();

    for row in rows.values_mut().filter(|row| row.len() > 1) {
        row.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
        let aligned_y = average(row.iter().map(|n| n.position.y));

        let mut last_right = f32::NEG_INFINITY;
        for node in row.iter() {
            let x = node.position.x.max(last_right + config.gap);
            updates.push(PositionUpdate::new(node.id.clone(), Position::new(x, aligned_y)));
            last_right = x + node.footprint().width;
        }
    }

    for column in columns.values_mut().filter(|column| column.len() > 1) {
        column.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));
        let aligned_x = average(column.iter().map(|n| n.position.x));

        let mut last_bottom = f32::NEG_INFINITY;
        for node in column.iter() {
            let y = node.position.y.max(last_bottom + config.gap);
            match updates.iter_mut().find(|u| u.id == node.id) {
                Some(existing) => existing.position.x = aligned_x,
                None => updates.push(PositionUpdate::new(node.id.clone(), Position::new(aligned_x, y))),
            }
            last_bottom = y + node.footprint().height;
        }
    }

    updates
}

fn bucket(value: f32, grid: f32) -> i64 {
    if grid <= 0.0 {
        return value.round() as i64;
    }
    (value / grid).round() as i64
}

fn average(values: impl Iterator<Item = f32>) -> f32 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{NodeConfig, NodeType, ShapeKind};

    fn shape(id: &str, x: f32, y: f32) -> Node {
        Node::standard(id, &NodeConfig::new("Domain Event"), Position::new(x, y))
    }

    fn update_for<'a>(updates: &'a [PositionUpdate], id: &str) -> &'a PositionUpdate {
        updates.iter().find(|u| u.id == id).unwrap()
    }

    // ========================================================================
    // Degenerate input
    // ========================================================================

    #[test]
    fn test_fewer_than_two_nodes_is_noop() {
        let only = shape("node_1", 13.0, 17.0);
        assert!(auto_align([&only], &AlignConfig::default()).is_empty());
        assert!(auto_align(std::iter::empty(), &AlignConfig::default()).is_empty());
    }

    #[test]
    fn test_scattered_nodes_get_no_updates() {
        let a = shape("node_1", 0.0, 0.0);
        let b = shape("node_2", 400.0, 400.0);
        assert!(auto_align([&a, &b], &AlignConfig::default()).is_empty());
    }

    #[test]
    fn test_groups_do_not_take_part() {
        let a = shape("node_1", 0.0, 0.0);
        let mut group = shape("group_2", 300.0, 5.0);
        group.node_type = NodeType::Group;
        assert!(auto_align([&a, &group], &AlignConfig::default()).is_empty());
    }

    // ========================================================================
    // Rows
    // ========================================================================

    #[test]
    fn test_row_gets_average_y() {
        let a = shape("node_1", 0.0, 10.0);
        let b = shape("node_2", 300.0, 14.0);
        let updates = auto_align([&a, &b], &AlignConfig::default());

        assert_eq!(update_for(&updates, "node_1").position, Position::new(0.0, 12.0));
        assert_eq!(update_for(&updates, "node_2").position, Position::new(300.0, 12.0));
    }

    #[test]
    fn test_row_pushes_overlapping_nodes_apart() {
        let a = shape("node_1", 0.0, 0.0);
        let b = shape("node_2", 60.0, 0.0);
        let c = Node::standard(
            "node_3",
            &NodeConfig::new("Consistent Business Rule").with_kind(ShapeKind::ConsistentBusinessRule),
            Position::new(100.0, 0.0),
        );
        let updates = auto_align([&c, &b, &a], &AlignConfig::default());

        assert_eq!(update_for(&updates, "node_1").position.x, 0.0);
        assert_eq!(update_for(&updates, "node_2").position.x, 122.0);
        assert_eq!(update_for(&updates, "node_3").position.x, 244.0);
    }

    // ========================================================================
    // Columns
    // ========================================================================

    #[test]
    fn test_column_gets_average_x_and_stacks() {
        let a = shape("node_1", 0.0, 0.0);
        let b = shape("node_2", 10.0, 60.0);
        let updates = auto_align([&a, &b], &AlignConfig::default());

        assert_eq!(update_for(&updates, "node_1").position, Position::new(5.0, 0.0));
        assert_eq!(update_for(&updates, "node_2").position, Position::new(5.0, 122.0));
    }

    #[test]
    fn test_column_keeps_row_aligned_y() {
        // node_1 and node_2 share a row, node_1 and node_3 share a column
        let a = shape("node_1", 0.0, 0.0);
        let b = shape("node_2", 300.0, 10.0);
        let c = shape("node_3", 10.0, 400.0);
        let updates = auto_align([&a, &b, &c], &AlignConfig::default());

        assert_eq!(updates.len(), 3);
        assert_eq!(update_for(&updates, "node_1").position, Position::new(5.0, 5.0));
        assert_eq!(update_for(&updates, "node_3").position, Position::new(5.0, 400.0));
    }
}
