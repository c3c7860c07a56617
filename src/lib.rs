pub mod client;
pub mod common;
pub mod server;
pub mod utils;

pub use client::FormController;
pub use server::ServerConfig;
