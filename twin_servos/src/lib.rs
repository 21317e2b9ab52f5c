#![allow(async_fn_in_trait)]

pub mod command_executor;
pub mod commands;
pub mod config;
pub mod console;
pub mod controllers;
pub mod logging;
pub mod models;

#[cfg(test)]
mod testing;
