// FindMe account authentication service

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod validation;
