// Built-in navigation. Item ids double as permission entity keys.

use crate::menu::{Menu, MenuNode};

pub fn default_menu() -> Menu {
    Menu::new(vec![masters_menu()])
}

pub fn masters_menu() -> MenuNode {
    MenuNode::group(
        "masters",
        "Masters",
        vec![
            MenuNode::collapse(
                "USERS_MANAGEMENT",
                "Users",
                vec![
                    MenuNode::item("TEACHER", "Teachers", "/masters/teachers").with_icon("user-check"),
                    MenuNode::item("STUDENT", "Students", "/masters/students").with_icon("users"),
                ],
            )
            .with_icon("users"),
            MenuNode::collapse(
                "INSTITUTE",
                "Institutes",
                vec![
                    MenuNode::item("INSTITUTE", "Institutes", "/masters/institutes").with_icon("building-community"),
                    MenuNode::item("SCHOOL", "Schools", "/masters/schools").with_icon("school"),
                    MenuNode::item("CLASS", "Classes", "/masters/classes").with_icon("box"),
                    MenuNode::item("DIVISION", "Divisions", "/masters/divisions").with_icon("layout-grid"),
                    MenuNode::item("SUBJECT", "Subjects", "/masters/subjects").with_icon("book"),
                ],
            )
            .with_icon("building-community"),
            MenuNode::item("ATTENDANCE", "Attendance", "/masters/attendances").with_icon("calendar-event"),
            MenuNode::item("STUDENT_ATTENDANCE", "Student Attendance", "/masters/student-attendance")
                .with_icon("user-check"),
            MenuNode::item("ASSIGNMENT", "Assignments", "/masters/assignments").with_icon("clipboard-list"),
            MenuNode::item("ROLE", "Roles", "/masters/roles").with_icon("key"),
            MenuNode::item("STUDENT_PARENT", "Student Parents", "/masters/studentParents").with_icon("users-group"),
            MenuNode::item("EXAM", "Exams", "/masters/exams").with_icon("file-text"),
            MenuNode::item("TIMETABLE", "Timetables", "/masters/timetables").with_icon("clock"),
            MenuNode::item("LMS", "LMS", "/masters/lms").with_icon("users"),
            MenuNode::item("USER_PROFILE", "Profile", "/masters/profile").with_icon("user-circle"),
            MenuNode::collapse(
                "QUIZ_MANAGEMENT",
                "Quiz & Tests",
                vec![
                    MenuNode::item("QUIZ", "Manage Quizzes", "/masters/quiz").with_icon("users"),
                    MenuNode::item("QUIZ_STUDENT", "Available Quizzes", "/masters/student/quizzes").with_icon("users"),
                ],
            )
            .with_icon("users"),
        ],
    )
}
