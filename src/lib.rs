pub mod batch;
pub mod cli;
pub mod column_selector;
pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod source;
