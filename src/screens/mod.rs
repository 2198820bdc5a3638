//! Stock entity list screens: where each one fetches from, what it shows and
//! where its row buttons lead.

use serde::Serialize;

use crate::api::ListMethod;
use crate::grid::{ActionConfig, ColumnSpec, FilterSet, ResourceConfig};
use crate::permission::PermissionSet;
use crate::types::Action;

/// Placeholder substituted with the session's account id
pub const ACCOUNT_ID: &str = "{accountId}";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSpec {
    /// Also the last segment of the screen's list route
    pub key: String,
    pub title: String,
    /// Permission entity gating the screen
    pub entity: String,
    pub fetch_url: String,
    pub delete_url: Option<String>,
    pub method: ListMethod,
    pub columns: Vec<ColumnSpec>,
    pub actions: ActionConfig,
    /// Filters the screen's selectors feed into the list request
    pub filter_keys: Vec<String>,
    pub get_by_id_url: Option<String>,
    pub save_url: Option<String>,
    pub update_url: Option<String>,
}

impl ScreenSpec {
    fn new(key: &str, title: &str, entity: &str, fetch_url: &str) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            entity: entity.to_string(),
            fetch_url: fetch_url.to_string(),
            delete_url: None,
            method: ListMethod::Post,
            columns: Vec::new(),
            actions: ActionConfig::default(),
            filter_keys: Vec::new(),
            get_by_id_url: None,
            save_url: None,
            update_url: None,
        }
    }

    fn delete(mut self, url: &str) -> Self {
        self.delete_url = Some(url.to_string());
        self
    }

    fn edit(mut self, url: &str) -> Self {
        self.actions.edit_url = Some(url.to_string());
        self
    }

    fn view(mut self, url: &str) -> Self {
        self.actions.show_view = true;
        self.actions.view_url = Some(url.to_string());
        self
    }

    fn columns(mut self, columns: Vec<ColumnSpec>) -> Self {
        self.columns = columns;
        self
    }

    fn filters(mut self, keys: &[&str]) -> Self {
        self.filter_keys = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    /// `getById`, `save` and `update` under one resource prefix
    fn crud(mut self, prefix: &str) -> Self {
        self.get_by_id_url = Some(format!("{prefix}/getById"));
        self.save_url = Some(format!("{prefix}/save"));
        self.update_url = Some(format!("{prefix}/update"));
        self
    }

    fn save(mut self, url: &str) -> Self {
        self.save_url = Some(url.to_string());
        self
    }

    pub fn list_route(&self) -> String {
        format!("/masters/{}", self.key)
    }

    pub fn fetch_endpoint(&self, account_id: &str) -> String {
        render_template(&self.fetch_url, account_id)
    }

    pub fn is_visible(&self, permissions: &PermissionSet) -> bool {
        permissions.has_permission(&self.entity, Action::View)
    }

    /// Resource configuration for this screen under `account_id`
    pub fn resource_config(&self, account_id: &str, filters: FilterSet) -> ResourceConfig {
        let mut config = ResourceConfig::new(self.fetch_endpoint(account_id))
            .columns(self.columns.clone())
            .filters(filters)
            .use_get_method(self.method == ListMethod::Get)
            .actions(self.actions.clone());
        if let Some(url) = &self.delete_url {
            config = config.delete_endpoint(url.clone());
        }
        config
    }
}

/// Substitute the account id into an endpoint template
pub fn render_template(template: &str, account_id: &str) -> String {
    template.replace(ACCOUNT_ID, account_id)
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ScreenCatalog {
    screens: Vec<ScreenSpec>,
}

impl ScreenCatalog {
    pub fn new(screens: Vec<ScreenSpec>) -> Self {
        Self { screens }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScreenSpec> {
        self.screens.iter()
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }

    /// Look up by key, case-insensitively
    pub fn get(&self, key: &str) -> Option<&ScreenSpec> {
        self.screens.iter().find(|s| s.key.eq_ignore_ascii_case(key))
    }

    pub fn visible(&self, permissions: &PermissionSet) -> Vec<&ScreenSpec> {
        self.screens.iter().filter(|s| s.is_visible(permissions)).collect()
    }
}

fn col(field: &str, header: &str, width: u32) -> ColumnSpec {
    ColumnSpec::new(field, header, width)
}

fn id_col() -> ColumnSpec {
    col("id", "ID", 90)
}

fn person_columns() -> Vec<ColumnSpec> {
    vec![
        col("userName", "User Name", 150).flex(1),
        col("email", "Email", 110).flex(1),
        col("mobile", "Mobile", 110).flex(1),
        col("address", "Address", 110).flex(1),
    ]
}

pub fn builtin_screens() -> ScreenCatalog {
    let teachers = ScreenSpec::new("teachers", "Teachers", "TEACHER", "/api/users/getAll/{accountId}?type=TEACHER")
        .delete("/api/users/delete")
        .edit("/masters/teacher/edit")
        .columns([vec![id_col()], person_columns()].concat())
        .crud("/api/users");

    let mut student_columns = vec![col("rollno", "Roll No", 90), col("name", "Name", 150).flex(1)];
    student_columns.extend(person_columns());
    student_columns.push(col("className", "Class", 110).flex(1));
    student_columns.push(col("divisionName", "Division", 110).flex(1));
    let students = ScreenSpec::new("students", "Students", "STUDENT", "/api/users/getAll/{accountId}?type=STUDENT")
        .delete("/api/users/delete")
        .edit("/masters/student/edit")
        .columns(student_columns)
        .filters(&["classId", "divisionId"])
        .crud("/api/users");

    let mut parent_columns = vec![col("rollno", "Roll No", 90), col("name", "Name", 150).flex(1)];
    parent_columns.extend(person_columns());
    let student_parents = ScreenSpec::new(
        "studentParents",
        "Student Parents",
        "STUDENT_PARENT",
        "/api/users/getAll/{accountId}?type=STUDENTPARENT",
    )
    .delete("/api/users/delete")
    .edit("/masters/studentParent/edit")
    .columns(parent_columns)
    .crud("/api/users");

    let institutes = ScreenSpec::new("institutes", "Institutes", "INSTITUTE", "/api/institutes/getAll/{accountId}")
        .delete("/api/institutes/delete")
        .edit("/masters/institute/edit")
        .columns(vec![
            id_col(),
            col("name", "Name", 150).flex(1),
            col("mobileNumber", "Mobile", 150).flex(1),
            col("email", "Email", 150).flex(1),
            col("faxNumber", "Fax", 150).flex(1),
            col("code", "Code", 110).flex(1),
        ])
        .crud("/api/institutes");

    let schools = ScreenSpec::new("schools", "Schools", "SCHOOL", "/api/schoolBranches/getAll/{accountId}")
        .delete("/api/schoolBranches/delete")
        .edit("/masters/school/edit")
        .columns(vec![
            id_col(),
            col("name", "Name", 150).flex(1),
            col("instituteName", "Institute", 150).flex(1),
        ])
        .crud("/api/schoolBranches");

    let classes = ScreenSpec::new("classes", "Classes", "CLASS", "/api/schoolClasses/getAll/{accountId}")
        .delete("/api/schoolClasses/delete")
        .edit("/masters/class/edit")
        .columns(vec![
            id_col(),
            col("name", "Name", 150).flex(1),
            col("schoolbranchId", "School", 150).flex(1),
            col("instituteId", "Institute", 150).flex(1),
        ])
        .crud("/api/schoolClasses");

    // The backend spells this delete route "devisions"
    let divisions = ScreenSpec::new("divisions", "Divisions", "DIVISION", "/api/divisions/getAll/{accountId}")
        .delete("/api/devisions/delete")
        .edit("/masters/division/edit")
        .columns(vec![
            id_col(),
            col("name", "Name", 150).flex(1),
            col("schoolbranchName", "School", 150).flex(1),
            col("instituteName", "Institute", 150).flex(1),
        ])
        .crud("/api/divisions");

    let subjects = ScreenSpec::new("subjects", "Subjects", "SUBJECT", "/api/subjects/getAll/{accountId}")
        .delete("/api/subjects/delete")
        .edit("/masters/subject/edit")
        .columns(vec![id_col(), col("name", "Name", 150).flex(1)])
        .crud("/api/subjects");

    let assignments = ScreenSpec::new("assignments", "Assignments", "ASSIGNMENT", "/api/assignments/getAll/{accountId}")
        .delete("/api/assignments/delete")
        .edit("/masters/assignment/edit")
        .columns(vec![
            id_col(),
            col("name", "Name", 150).flex(1),
            col("std", "Standard", 150).editable(),
            col("subjectName", "Subject", 150).editable(),
            col("createdBy", "Created By", 150).editable(),
            col("deadLine", "Deadline", 150).editable(),
        ])
        .crud("/api/assignments");

    let roles = ScreenSpec::new("roles", "Roles", "ROLE", "/api/roles/getAll/{accountId}")
        .delete("/api/roles/delete")
        .edit("/masters/role/edit")
        .columns(vec![id_col(), col("name", "Role Name", 200).flex(1)])
        .crud("/api/roles");

    let exams = ScreenSpec::new("exams", "Exams", "EXAM", "/api/users/getAll/{accountId}?type=EXAM")
        .delete("/api/users/delete")
        .edit("/masters/exam/edit")
        .columns(vec![
            col("examType", "Exam Type", 150).flex(1),
            col("examScore", "Score", 110),
            col("maxScore", "Max Score", 110),
            col("examDate", "Exam Date", 150),
            col("grade", "Grade", 90),
            col("passStatus", "Pass Status", 130),
        ])
        .save("/api/exam/create");

    let timetables = ScreenSpec::new("timetables", "TimeTables", "TIMETABLE", "/api/timetable/getAll/{accountId}?type=TEACHER")
        .delete("/api/timetable/delete")
        .edit("/masters/timetable/edit")
        .view("/masters/timetable/view")
        .columns(vec![
            id_col(),
            col("className", "Class Name", 150).flex(1),
            col("divisionName", "Division Name", 150).flex(1),
        ])
        .crud("/api/timetable");

    ScreenCatalog::new(vec![
        teachers,
        students,
        student_parents,
        institutes,
        schools,
        classes,
        divisions,
        subjects,
        assignments,
        roles,
        exams,
        timetables,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ActionKind;
    use crate::permission::Permission;
    use crate::routes::catalog::main_routes;
    use crate::testing::permissions;

    #[test]
    fn account_id_is_substituted() {
        let catalog = builtin_screens();
        let teachers = catalog.get("teachers").unwrap();
        assert_eq!(teachers.fetch_endpoint("42"), "/api/users/getAll/42?type=TEACHER");
        assert_eq!(render_template("/plain", "42"), "/plain");
    }

    #[test]
    fn every_screen_has_reachable_routes() {
        let everything: PermissionSet = builtin_screens()
            .iter()
            .map(|s| Permission::new(s.entity.clone()).grant(Action::View).grant(Action::Edit))
            .collect();
        let table = main_routes().build(&everything);

        for screen in builtin_screens().iter() {
            assert!(table.contains(&screen.list_route()), "no list route for {}", screen.key);
            if let Some(edit) = &screen.actions.edit_url {
                assert!(table.contains(&format!("{edit}/1")), "no edit route for {}", screen.key);
            }
            if let Some(view) = &screen.actions.view_url {
                assert!(table.contains(&format!("{view}/1")), "no view route for {}", screen.key);
            }
        }
    }

    #[test]
    fn visibility_follows_view_permission() {
        let perms = permissions(&[("teacher", &[Action::View]), ("STUDENT", &[Action::Edit])]);
        let keys: Vec<_> = builtin_screens().visible(&perms).into_iter().map(|s| s.key.clone()).collect();
        assert_eq!(keys, vec!["teachers"]);
    }

    #[test]
    fn resource_config_carries_delete_and_filters() {
        let catalog = builtin_screens();
        let students = catalog.get("Students").unwrap();
        let config = students.resource_config("7", FilterSet::new().with("classId", 3));

        assert_eq!(config.fetch_endpoint, "/api/users/getAll/7?type=STUDENT");
        assert_eq!(config.delete_endpoint.as_deref(), Some("/api/users/delete"));
        assert_eq!(config.method, ListMethod::Post);
        assert_eq!(config.filters, FilterSet::new().with("classId", 3));
        assert_eq!(students.filter_keys, vec!["classId", "divisionId"]);
    }

    #[test]
    fn timetables_show_view_button() {
        let catalog = builtin_screens();
        let mut actions = catalog.get("timetables").unwrap().actions.clone();
        actions.delete_url = Some("/api/timetable/delete".into());
        let column = crate::grid::ActionColumn::build(&actions);
        assert_eq!(column.buttons(), &[ActionKind::View, ActionKind::Edit, ActionKind::Delete]);
    }
}
