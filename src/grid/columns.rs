use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub field: String,
    pub header: String,
    pub width: u32,
    #[serde(default)]
    pub editable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flex: Option<u32>,
    #[serde(default = "default_sortable")]
    pub sortable: bool,
}

fn default_sortable() -> bool {
    true
}

impl ColumnSpec {
    pub fn new(field: impl Into<String>, header: impl Into<String>, width: u32) -> Self {
        Self {
            field: field.into(),
            header: header.into(),
            width,
            editable: false,
            flex: None,
            sortable: true,
        }
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    pub fn flex(mut self, flex: u32) -> Self {
        self.flex = Some(flex);
        self
    }

    /// Display text for this column in `row`; missing and null cells are blank
    pub fn cell(&self, row: &Value) -> String {
        match row.get(&self.field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Inputs that fully determine the action column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfig {
    pub show_edit: bool,
    pub show_delete: bool,
    pub show_view: bool,
    pub edit_url: Option<String>,
    pub view_url: Option<String>,
    pub delete_url: Option<String>,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            show_edit: true,
            show_delete: true,
            show_view: false,
            edit_url: None,
            view_url: None,
            delete_url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    View,
    Edit,
    Delete,
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::View => "View",
            ActionKind::Edit => "Edit",
            ActionKind::Delete => "Delete",
        }
    }
}

/// What pressing a row button does
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum RowAction {
    Navigate { kind: ActionKind, path: String },
    Delete { id: EntityId },
}

impl RowAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            RowAction::Navigate { kind, .. } => *kind,
            RowAction::Delete { .. } => ActionKind::Delete,
        }
    }
}

/// Trailing `actions` column. A button is present only when its flag is set
/// and it has somewhere to go; order is View, Edit, Delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionColumn {
    config: ActionConfig,
    column: ColumnSpec,
    buttons: Vec<ActionKind>,
}

impl ActionColumn {
    pub fn build(config: &ActionConfig) -> Self {
        let mut buttons = Vec::with_capacity(3);
        if config.show_view && config.view_url.is_some() {
            buttons.push(ActionKind::View);
        }
        if config.show_edit && config.edit_url.is_some() {
            buttons.push(ActionKind::Edit);
        }
        if config.show_delete && config.delete_url.is_some() {
            buttons.push(ActionKind::Delete);
        }

        let column = ColumnSpec {
            sortable: false,
            ..ColumnSpec::new("actions", "Actions", 200)
        };

        Self {
            config: config.clone(),
            column,
            buttons,
        }
    }

    pub fn config(&self) -> &ActionConfig {
        &self.config
    }

    pub fn column(&self) -> &ColumnSpec {
        &self.column
    }

    pub fn buttons(&self) -> &[ActionKind] {
        &self.buttons
    }

    /// Actions for one row. Rows without an id get no buttons.
    pub fn actions_for(&self, row: &Value) -> Vec<RowAction> {
        let Some(id) = EntityId::from_row(row) else {
            return Vec::new();
        };

        self.buttons
            .iter()
            .filter_map(|kind| match kind {
                ActionKind::View => self.config.view_url.as_deref().map(|base| RowAction::Navigate {
                    kind: ActionKind::View,
                    path: join_id(base, &id),
                }),
                ActionKind::Edit => self.config.edit_url.as_deref().map(|base| RowAction::Navigate {
                    kind: ActionKind::Edit,
                    path: join_id(base, &id),
                }),
                ActionKind::Delete => Some(RowAction::Delete { id: id.clone() }),
            })
            .collect()
    }
}

fn join_id(base: &str, id: &EntityId) -> String {
    format!("{}/{}", base.trim_end_matches('/'), id)
}
