use crate::menu::MenuNode;
use crate::permission::PermissionSet;
use crate::types::Action;

/// Prune `root` down to the nodes the permission set may view.
///
/// Leaves are kept iff a grant for `view` exists on the leaf's `id`. Nested
/// groups and collapses with no surviving children are dropped. The root
/// itself is always returned (possibly with no children), and a root that is
/// already a leaf comes back unchanged. Sibling order is preserved and the
/// input is never mutated.
pub fn filter_menu(root: &MenuNode, permissions: &PermissionSet) -> MenuNode {
    match root {
        MenuNode::Group { id, title, children } => MenuNode::Group {
            id: id.clone(),
            title: title.clone(),
            children: filter_children(children, permissions),
        },
        MenuNode::Collapse { id, title, icon, children } => MenuNode::Collapse {
            id: id.clone(),
            title: title.clone(),
            icon: icon.clone(),
            children: filter_children(children, permissions),
        },
        MenuNode::Item { .. } => root.clone(),
    }
}

fn filter_children(children: &[MenuNode], permissions: &PermissionSet) -> Vec<MenuNode> {
    children
        .iter()
        .filter_map(|child| filter_child(child, permissions))
        .collect()
}

fn filter_child(node: &MenuNode, permissions: &PermissionSet) -> Option<MenuNode> {
    match node {
        MenuNode::Item { id, .. } => {
            if permissions.has_permission(id, Action::View) {
                Some(node.clone())
            } else {
                None
            }
        }
        MenuNode::Group { .. } | MenuNode::Collapse { .. } => {
            let filtered = filter_menu(node, permissions);
            if filtered.children().is_empty() {
                None
            } else {
                Some(filtered)
            }
        }
    }
}
