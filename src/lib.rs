// src/lib.rs — Library root for selfcare

pub mod cli;
pub mod client;
pub mod infra;
pub mod models;
pub mod phone;
pub mod portal;
pub mod profile;
pub mod session;
