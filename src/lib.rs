//! Client-side workflow layer for the hospital portal.
//!
//! The backend owns every record; this crate owns what happens between a
//! user action and the REST call: attendance check-in/out, task and KYC
//! assistance queues, the notification inbox, role-based menus, and the
//! read caches behind the dashboards. The data source is a trait with a
//! live HTTP implementation and a fixture one, picked by configuration.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod model;
pub mod models;
pub mod routes;
pub mod store;
pub mod utils;
pub mod workflow;
