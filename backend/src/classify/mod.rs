pub mod filter;
pub mod models;
pub mod resolver;
pub mod router;
pub mod rules;
