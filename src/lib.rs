//! SharePoint document library browser
//!
//! Exposes the REST client, pure logic and folder walk for the binary and tests

pub mod api;
pub mod config;
pub mod logic;
pub mod services;
pub mod ui;
pub mod utils;
