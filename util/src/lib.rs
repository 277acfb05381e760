pub mod cache;
pub mod clock;
pub mod config;
pub mod scanner;
pub mod state;
pub mod ws;
