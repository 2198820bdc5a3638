pub mod dashboard;
pub mod nav;
pub mod records;
pub mod session;
