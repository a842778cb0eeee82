pub mod analysis;
pub mod classify;
pub mod config;
pub mod db;
pub mod detection;
pub mod routes;
pub mod storage;
