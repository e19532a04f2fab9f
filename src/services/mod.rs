pub mod config;
pub mod dispatch;
pub mod encoding;
pub mod reconcile;
pub mod sanitize;
pub mod store;
pub mod tts;
