pub mod audit;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod models;
pub mod notify;

pub use db::create_pool;
pub use engine::Engine;
pub use error::CoreError;
