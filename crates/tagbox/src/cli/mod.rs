//! Command handlers for the tagbox CLI.

pub mod autotag;
pub mod clip;
pub mod config;
pub mod models;
pub mod sort;
pub mod tags;
