// Infrastructure layer - External dependencies and adapters
pub mod alert_sink;
pub mod config;
pub mod event_stream;
pub mod file_store;
pub mod http_response;
pub mod memory_store;
pub mod record_codec;
