pub mod policies;
pub mod server;
pub mod support;
