pub mod api;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod handler;
pub mod recording;
pub mod teams;

pub use handler::Handler;
