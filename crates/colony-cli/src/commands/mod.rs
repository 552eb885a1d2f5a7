//! Command implementations

pub mod actor;
pub mod bootstrap;
pub mod config;
pub mod run;
