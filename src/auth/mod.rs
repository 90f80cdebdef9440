pub mod authorization;
pub mod middleware;
