pub mod assets;
pub mod error;
pub mod server;
pub mod upload;
