pub mod config;
pub mod fetch;
pub mod growth;
pub mod insight;
pub mod sheets;
pub mod transcript;
