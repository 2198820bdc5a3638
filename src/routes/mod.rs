//! Route table built through the same permission predicate as the menu.
//!
//! Unauthorized entries never make it into a [`RouteTable`], so a path that
//! is hidden from the sidebar cannot be reached by typing it either.

pub mod catalog;

pub use catalog::main_routes;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::menu::Menu;
use crate::permission::PermissionSet;
use crate::types::Action;

/// Entity/action pair a route requires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteGuard {
    pub entity: String,
    pub action: Action,
}

impl RouteGuard {
    pub fn allows(&self, permissions: &PermissionSet) -> bool {
        permissions.has_permission(&self.entity, self.action)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Absolute path; `:name` segments capture parameters
    pub path: String,
    /// Screen rendered for this path
    pub screen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard: Option<RouteGuard>,
}

impl RouteEntry {
    pub fn open(path: impl Into<String>, screen: impl Into<String>) -> Self {
        Self { path: path.into(), screen: screen.into(), guard: None }
    }

    pub fn guarded(path: impl Into<String>, screen: impl Into<String>, entity: &str, action: Action) -> Self {
        Self {
            path: path.into(),
            screen: screen.into(),
            guard: Some(RouteGuard { entity: entity.to_string(), action }),
        }
    }

    pub fn is_authorized(&self, permissions: &PermissionSet) -> bool {
        self.guard.as_ref().map_or(true, |g| g.allows(permissions))
    }

    fn match_path(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let pattern: Vec<&str> = segments(&self.path).collect();
        let actual: Vec<&str> = segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (p, a) in pattern.iter().zip(actual.iter()) {
            if let Some(name) = p.strip_prefix(':') {
                params.insert(name.to_string(), a.to_string());
            } else if p != a {
                return None;
            }
        }
        Some(params)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Every route the application knows about, before permission gating
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCatalog {
    pub entries: Vec<RouteEntry>,
}

impl RouteCatalog {
    pub fn new(entries: Vec<RouteEntry>) -> Self {
        Self { entries }
    }

    /// Register only the entries the permission set may reach
    pub fn build(&self, permissions: &PermissionSet) -> RouteTable {
        let entries: Vec<RouteEntry> = self
            .entries
            .iter()
            .filter(|e| e.is_authorized(permissions))
            .cloned()
            .collect();

        tracing::debug!(
            "Route table built: {} of {} routes enabled",
            entries.len(),
            self.entries.len()
        );

        RouteTable { entries }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub params: BTreeMap<String, String>,
}

/// Routes registered for the current session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First registered entry matching `path`, in registration order
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        self.entries.iter().find_map(|entry| {
            entry.match_path(path).map(|params| RouteMatch { entry, params })
        })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.resolve(path).is_some()
    }
}

/// Menu and route table for one session. Rebuilt from scratch whenever the
/// permission set changes.
#[derive(Debug, Clone)]
pub struct Navigation {
    pub menu: Menu,
    pub routes: RouteTable,
}

impl Navigation {
    pub fn build(menu: &Menu, routes: &RouteCatalog, permissions: &PermissionSet) -> Self {
        Self {
            menu: menu.visible(permissions),
            routes: routes.build(permissions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::default_menu;
    use crate::permission::Permission;

    fn teacher_viewer() -> PermissionSet {
        PermissionSet::new(vec![Permission::new("TEACHER").grant(Action::View)])
    }

    #[test]
    fn unauthorized_routes_are_not_registered() {
        let table = main_routes().build(&teacher_viewer());
        assert!(table.contains("/masters/teachers"));
        assert!(!table.contains("/masters/teacher/edit/4"));
        assert!(!table.contains("/masters/teacher/add"));
        assert!(!table.contains("/masters/students"));
    }

    #[test]
    fn open_routes_survive_empty_permissions() {
        let table = main_routes().build(&PermissionSet::empty());
        assert!(table.contains("/"));
        assert!(table.contains("/dashboard/default"));
        assert!(table.contains("/masters/student-attendance"));
        assert!(table.entries().iter().all(|e| e.guard.is_none()));
    }

    #[test]
    fn resolve_captures_params() {
        let perms = PermissionSet::new(vec![Permission::new("class").grant(Action::Edit)]);
        let table = main_routes().build(&perms);
        let matched = table.resolve("/masters/class/edit/42?tab=info").unwrap();
        assert_eq!(matched.entry.screen, "class.edit");
        assert_eq!(matched.params.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn add_and_edit_are_gated_separately() {
        let perms = PermissionSet::new(vec![Permission::new("EXAM").grant(Action::Add)]);
        let table = main_routes().build(&perms);
        assert!(table.contains("/masters/exam/add"));
        assert!(!table.contains("/masters/exam/edit/1"));
        assert!(!table.contains("/masters/exams"));
    }

    #[test]
    fn navigation_agrees_with_menu_filter() {
        let nav = Navigation::build(&default_menu(), &main_routes(), &teacher_viewer());
        let routes: Vec<_> = nav.menu.leaves().iter().filter_map(|n| n.route()).collect();
        assert_eq!(routes, vec!["/masters/teachers"]);
        for route in routes {
            assert!(nav.routes.contains(route));
        }
    }
}
