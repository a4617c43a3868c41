// Application layer - Stateful services and the seams they depend on
pub mod alert;
pub mod engine;
pub mod history_store;
pub mod persistence;
pub mod series;
pub mod simulator;
pub mod threshold_settings;
pub mod warning_log;
