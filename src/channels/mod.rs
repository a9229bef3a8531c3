#[cfg(feature = "discord")]
pub mod discord;
