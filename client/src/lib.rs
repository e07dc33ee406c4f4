//! Session, login-history and activity tracking for the WardWatch dashboard
//! client.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;
pub mod storage;
pub mod utils;
