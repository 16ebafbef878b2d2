//! Group geometry.
//!
//! A group node never owns its geometry: its position and size are always the
//! union of its children's footprints grown by [`GroupPadding`]. Groups do not
//! nest, so group ids in a member list are ignored.

use std::collections::HashMap;

use crate::config::GroupPadding;
use crate::state::{group_id, Node, NodeData, NodeType, Rect};

pub const GROUP_LABEL: &str = "Behavior";
pub const GROUP_ICON: &str = "🗂️";
pub const GROUP_COLOR: &str = "#e0e0e0";
pub const GROUP_TEXT_COLOR: &str = "#000000";

/// Bounds of a group enclosing `children`, or `None` when there are none.
pub fn group_bounds<'a, I>(children: I, padding: &GroupPadding) -> Option<Rect>
where
    I: IntoIterator<Item = &'a Node>,
{
    let union = children
        .into_iter()
        .filter(|child| !child.is_group())
        .map(Node::rect)
        .reduce(|acc, rect| acc.union(&rect))?;

    Some(Rect::new(
        union.left() - padding.horizontal,
        union.top() - padding.vertical - padding.header,
        union.width + padding.horizontal * 2.0,
        union.height + padding.vertical * 2.0 + padding.header,
    ))
}

/// Recompute every group from its current children.
///
/// Groups whose members all fail to resolve are left untouched. Returns
/// whether any group moved or resized. Running it twice in a row is a no-op
/// the second time.
pub fn sync_groups(nodes: &mut [Node], padding: &GroupPadding) -> bool {
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let updates: Vec<(usize, Rect)> = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.is_group())
        .filter_map(|(i, group)| {
            let children = group
                .child_ids()
                .iter()
                .filter_map(|id| index.get(id.as_str()).map(|&j| &nodes[j]));
            group_bounds(children, padding).map(|bounds| (i, bounds))
        })
        .collect();

    let mut changed = false;
    for (i, bounds) in updates {
        let group = &mut nodes[i];
        if group.position != bounds.position() || group.size != Some(bounds.size()) {
            group.position = bounds.position();
            group.size = Some(bounds.size());
            changed = true;
        }
    }
    changed
}

/// Build a behavior group around `members` (already filtered to non-group
/// nodes). The returned node is selected and sized to its members.
pub fn build_group(counter: u64, members: &[&Node], padding: &GroupPadding) -> Option<Node> {
    let bounds = group_bounds(members.iter().copied(), padding)?;
    Some(Node {
        id: group_id(counter),
        node_type: NodeType::Group,
        position: bounds.position(),
        data: NodeData {
            label: GROUP_LABEL.to_string(),
            default_label: GROUP_LABEL.to_string(),
            icon: GROUP_ICON.to_string(),
            color: GROUP_COLOR.to_string(),
            text_color: GROUP_TEXT_COLOR.to_string(),
            node_type: None,
            is_edited: false,
            child_node_ids: Some(members.iter().map(|m| m.id.clone()).collect()),
        },
        selected: true,
        size: Some(bounds.size()),
    })
}
