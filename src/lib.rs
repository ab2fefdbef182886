pub mod common;
pub mod configs;
pub mod relay;
pub mod server;
pub mod sources;
pub mod transport;
