pub mod cache_tests;
pub mod config_tests;
pub mod error_tests;
