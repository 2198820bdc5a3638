//! Role permissions as delivered in the session payload.
//!
//! Lookups are fail-closed: an entity with no matching grant is denied every
//! action, and an empty permission set denies everything.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::Action;

/// One permission record from `role.permissions`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub actions: BTreeMap<String, bool>,
}

impl Permission {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity_name: Some(entity.into()),
            name: None,
            actions: BTreeMap::new(),
        }
    }

    pub fn grant(mut self, action: Action) -> Self {
        self.actions.insert(action.as_str().to_string(), true);
        self
    }

    pub fn deny(mut self, action: Action) -> Self {
        self.actions.insert(action.as_str().to_string(), false);
        self
    }

    /// Either `entityName` or `name` may carry the key
    pub fn matches_entity(&self, entity: &str) -> bool {
        [self.entity_name.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .any(|key| key.eq_ignore_ascii_case(entity))
    }

    pub fn allows(&self, action: Action) -> bool {
        self.actions.get(action.as_str()).copied().unwrap_or(false)
    }
}

/// The permission set of the signed-in role, passed explicitly to the menu
/// filter and the route builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(Vec<Permission>);

impl PermissionSet {
    pub fn new(permissions: Vec<Permission>) -> Self {
        Self(permissions)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }

    /// True when some record keyed on `entity` grants `action`
    pub fn has_permission(&self, entity: &str, action: Action) -> bool {
        self.0
            .iter()
            .any(|p| p.matches_entity(entity) && p.allows(action))
    }

    /// Actions granted for `entity`, in `view`, `edit`, `add` order
    pub fn granted_actions(&self, entity: &str) -> Vec<Action> {
        [Action::View, Action::Edit, Action::Add]
            .into_iter()
            .filter(|a| self.has_permission(entity, *a))
            .collect()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
