pub mod channels;
pub mod config;
pub mod relay;
pub mod webhook;
