pub mod config_cmd;
pub mod cook;
pub mod menu;
pub mod trace;
