#[macro_use]
extern crate tracing;

pub mod activities;
pub mod answers;
pub mod config;
pub mod db;
pub mod error;
pub mod questions;
pub mod startup;
pub mod stats;
pub mod users;
pub mod ws;
