pub mod app;
pub mod auth;
pub mod books;
pub mod client;
pub mod config;
pub mod contact;
pub mod db;
pub mod error;
pub mod extract;
pub mod memory;
pub mod state;
pub mod validation;
