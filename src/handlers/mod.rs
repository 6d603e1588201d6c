pub mod friends;
pub mod http;
pub mod relay;
pub mod ws;
