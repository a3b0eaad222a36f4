#[macro_use]
extern crate diesel;

pub mod cache;
pub mod charts;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod insights;
pub mod metrics;
pub mod metrics_middleware;
pub mod models;
pub mod pages;
pub mod render;
pub mod routes;
pub mod schema;
pub mod store;
