
mod cache_tests;
mod cli_tests;
mod config_tests;
