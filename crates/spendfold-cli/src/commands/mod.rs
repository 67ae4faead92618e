pub mod common;
pub mod export;
pub mod history;
pub mod ingest;
pub mod report;
