use crate::routes::{RouteCatalog, RouteEntry};
use crate::types::Action;

/// (entity key, list path, singular path segment, screen prefix)
const MASTERS: &[(&str, &str, &str, &str)] = &[
    ("TEACHER", "teachers", "teacher", "teacher"),
    ("STUDENT", "students", "student", "student"),
    ("INSTITUTE", "institutes", "institute", "institute"),
    ("SCHOOL", "schools", "school", "school"),
    ("CLASS", "classes", "class", "class"),
    ("DIVISION", "divisions", "division", "division"),
    ("SUBJECT", "subjects", "subject", "subject"),
    ("ASSIGNMENT", "assignments", "assignment", "assignment"),
    ("ATTENDANCE", "attendances", "attendance", "attendance"),
    ("ROLE", "roles", "role", "role"),
    ("EXAM", "exams", "exam", "exam"),
    ("STUDENT_PARENT", "studentParents", "studentParent", "student_parent"),
    ("TIMETABLE", "timetables", "timetable", "timetable"),
];

/// Application routes. Dashboards and the student attendance list are open
/// to every session; master screens are gated by entity and action.
pub fn main_routes() -> RouteCatalog {
    let mut entries = vec![
        RouteEntry::open("/", "dashboard.default"),
        RouteEntry::open("/dashboard/default", "dashboard.default"),
        RouteEntry::open("/student-dashboard", "dashboard.student"),
    ];

    for (entity, list, single, screen) in MASTERS {
        entries.push(RouteEntry::guarded(
            format!("/masters/{list}"),
            format!("{screen}.list"),
            entity,
            Action::View,
        ));
        entries.push(RouteEntry::guarded(
            format!("/masters/{single}/edit/:id"),
            format!("{screen}.edit"),
            entity,
            Action::Edit,
        ));
        entries.push(RouteEntry::guarded(
            format!("/masters/{single}/add"),
            format!("{screen}.edit"),
            entity,
            Action::Add,
        ));
    }

    entries.push(RouteEntry::guarded("/masters/timetable/view/:id", "timetable.view", "TIMETABLE", Action::View));
    entries.push(RouteEntry::guarded("/masters/profile", "profile", "USER_PROFILE", Action::View));
    entries.push(RouteEntry::open("/masters/student-attendance", "attendance.student_list"));

    RouteCatalog::new(entries)
}
