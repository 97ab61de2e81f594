mod config_tests;
mod persistence_tests;
mod warm_start_tests;
