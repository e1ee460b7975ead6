//! orcrview - opening/closing rank browser for Indian engineering and
//! medical counseling data.
//!
//! A small web application over a SQLite store: filter and page through
//! tabular counseling-round data, browse and search a college directory,
//! and view or add lightweight community content (reviews, gallery
//! images, a popularity counter).

pub mod cache;
pub mod cli;
pub mod config;
pub mod listing;
pub mod models;
pub mod repository;
pub mod server;
