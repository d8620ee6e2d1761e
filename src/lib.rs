pub mod api;
pub mod config;
pub mod demo_source;
pub mod export;
pub mod format;
pub mod http_cache;
pub mod http_client;
pub mod memo;
pub mod persist;
pub mod provider;
pub mod radar;
pub mod search;
pub mod state;
pub mod store;
