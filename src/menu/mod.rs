pub mod catalog;
pub mod error;
pub mod filter;

pub use catalog::{default_menu, masters_menu};
pub use error::MenuError;
pub use filter::filter_menu;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::permission::PermissionSet;
use crate::types::Action;

/// Navigation tree node. Only `Item` nodes are permission-checked; groups and
/// collapses survive as long as one descendant does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MenuNode {
    Group {
        id: String,
        title: String,
        #[serde(default)]
        children: Vec<MenuNode>,
    },
    Collapse {
        id: String,
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        #[serde(default)]
        children: Vec<MenuNode>,
    },
    Item {
        id: String,
        title: String,
        #[serde(rename = "url")]
        route: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
        #[serde(default)]
        breadcrumbs: bool,
    },
}

impl MenuNode {
    pub fn group(id: impl Into<String>, title: impl Into<String>, children: Vec<MenuNode>) -> Self {
        MenuNode::Group { id: id.into(), title: title.into(), children }
    }

    pub fn collapse(id: impl Into<String>, title: impl Into<String>, children: Vec<MenuNode>) -> Self {
        MenuNode::Collapse { id: id.into(), title: title.into(), icon: None, children }
    }

    pub fn item(id: impl Into<String>, title: impl Into<String>, route: impl Into<String>) -> Self {
        MenuNode::Item {
            id: id.into(),
            title: title.into(),
            route: route.into(),
            icon: None,
            breadcrumbs: false,
        }
    }

    pub fn with_icon(mut self, name: &str) -> Self {
        match &mut self {
            MenuNode::Collapse { icon, .. } | MenuNode::Item { icon, .. } => {
                *icon = Some(name.to_string());
            }
            MenuNode::Group { .. } => {}
        }
        self
    }

    pub fn id(&self) -> &str {
        match self {
            MenuNode::Group { id, .. } | MenuNode::Collapse { id, .. } | MenuNode::Item { id, .. } => id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            MenuNode::Group { title, .. } | MenuNode::Collapse { title, .. } | MenuNode::Item { title, .. } => title,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MenuNode::Group { .. } => "group",
            MenuNode::Collapse { .. } => "collapse",
            MenuNode::Item { .. } => "item",
        }
    }

    pub fn route(&self) -> Option<&str> {
        match self {
            MenuNode::Item { route, .. } => Some(route),
            _ => None,
        }
    }

    pub fn children(&self) -> &[MenuNode] {
        match self {
            MenuNode::Group { children, .. } | MenuNode::Collapse { children, .. } => children,
            MenuNode::Item { .. } => &[],
        }
    }

    /// Depth-first, in sibling order
    pub fn leaves(&self) -> Vec<&MenuNode> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }
}

fn collect_leaves<'a>(node: &'a MenuNode, out: &mut Vec<&'a MenuNode>) {
    match node {
        MenuNode::Item { .. } => out.push(node),
        MenuNode::Group { children, .. } | MenuNode::Collapse { children, .. } => {
            for child in children {
                collect_leaves(child, out);
            }
        }
    }
}

/// The sidebar: an ordered list of top-level groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub items: Vec<MenuNode>,
}

impl Menu {
    pub fn new(items: Vec<MenuNode>) -> Self {
        Self { items }
    }

    /// Filter every top-level node and drop the groups left without children.
    /// Top-level items get the same `view` check as nested ones.
    pub fn visible(&self, permissions: &PermissionSet) -> Menu {
        let items = self
            .items
            .iter()
            .filter_map(|node| match node {
                MenuNode::Item { id, .. } => permissions
                    .has_permission(id, Action::View)
                    .then(|| node.clone()),
                _ => {
                    let filtered = filter_menu(node, permissions);
                    (!filtered.children().is_empty()).then_some(filtered)
                }
            })
            .collect();
        Menu { items }
    }

    pub fn leaves(&self) -> Vec<&MenuNode> {
        self.items.iter().flat_map(|n| n.leaves()).collect()
    }

    pub fn find_by_route(&self, route: &str) -> Option<&MenuNode> {
        self.leaves().into_iter().find(|n| n.route() == Some(route))
    }

    pub fn from_json_str(s: &str) -> Result<Self, MenuError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, MenuError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Load a menu definition, picking the format from the file extension
    pub fn load(path: &Path) -> Result<Self, MenuError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(MenuError::UnsupportedFormat(other.unwrap_or("").to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::Permission;

    #[test]
    fn json_uses_type_tag_and_url_key() {
        let node: MenuNode = serde_json::from_str(
            r#"{ "type": "group", "id": "masters", "title": "Masters", "children": [
                { "type": "item", "id": "TEACHER", "title": "Teachers", "url": "/masters/teachers" }
            ] }"#,
        )
        .unwrap();
        assert_eq!(node.kind(), "group");
        assert_eq!(node.children()[0].route(), Some("/masters/teachers"));
    }

    #[test]
    fn yaml_menu_loads() {
        let menu = Menu::from_yaml_str(
            "items:\n  - type: group\n    id: masters\n    title: Masters\n    children:\n      - type: item\n        id: ROLE\n        title: Roles\n        url: /masters/roles\n",
        )
        .unwrap();
        assert_eq!(menu.leaves().len(), 1);
        assert!(menu.find_by_route("/masters/roles").is_some());
    }

    #[test]
    fn visible_drops_empty_groups() {
        let menu = Menu::new(vec![
            MenuNode::group("dashboard", "Dashboard", vec![MenuNode::item("DASHBOARD", "Dashboard", "/dashboard/default")]),
            MenuNode::group("masters", "Masters", vec![MenuNode::item("ROLE", "Roles", "/masters/roles")]),
        ]);
        let perms = PermissionSet::new(vec![Permission::new("role").grant(Action::View)]);
        let visible = menu.visible(&perms);
        assert_eq!(visible.items.len(), 1);
        assert_eq!(visible.items[0].id(), "masters");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = std::env::temp_dir().join("scm-menu-ext-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("menu.toml");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(Menu::load(&path), Err(MenuError::UnsupportedFormat(_))));
    }
}
