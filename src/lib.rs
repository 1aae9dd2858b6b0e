pub mod api;
pub mod client;
pub mod config;
pub mod datastore;
pub mod log;
pub mod model;
pub mod service;

#[cfg(all(test, feature = "e2e"))]
mod e2e_tests;
