//! `souschef config`: Print the effective configuration.

use souschef_config::SousChefConfig;
use std::path::Path;

pub fn show(config: &SousChefConfig, path: Option<&Path>) {
    let default_path = SousChefConfig::config_dir().join("config.toml");
    let path = path.unwrap_or(&default_path);
    if path.exists() {
        println!("# {}", path.display());
    } else {
        println!("# {} (not found, showing defaults)", path.display());
    }
    println!("{}", config.to_toml());
}
