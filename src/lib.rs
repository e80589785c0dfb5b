pub mod analytics_fetch;
pub mod assemble;
pub mod config;
pub mod error;
pub mod http_client;
pub mod matching;
pub mod names;
pub mod player;
pub mod rank;
pub mod rankings_fetch;
pub mod report_export;
pub mod rows;
pub mod salary_export;
pub mod snapshot;
pub mod snapshot_fetch;
pub mod usage_fetch;
pub mod vegas_fetch;
pub mod weekly;
