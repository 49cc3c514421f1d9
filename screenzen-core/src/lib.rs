// src/lib.rs

pub mod auth;
pub mod clients;
pub mod db;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

pub use db::Database;
pub use error::Error;
