pub mod db;
pub mod error;
pub mod feed;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
