pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod grid;
pub mod menu;
pub mod permission;
pub mod routes;
pub mod screens;
pub mod session;
pub mod types;

#[cfg(test)]
pub mod testing;
