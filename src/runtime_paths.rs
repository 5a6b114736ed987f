use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

const APP_NAME: &str = "growthflow";
pub const CONFIG_FILE_NAME: &str = "config.json";

fn platform_config_root() -> PathBuf {
    if let Some(project_dirs) = ProjectDirs::from("", "", APP_NAME) {
        return project_dirs.config_dir().to_path_buf();
    }

    if let Some(base_dirs) = BaseDirs::new() {
        return base_dirs.config_dir().join(APP_NAME);
    }

    std::env::temp_dir().join(APP_NAME)
}

pub fn config_root() -> PathBuf {
    platform_config_root()
}

pub fn default_config_path() -> PathBuf {
    config_root().join(CONFIG_FILE_NAME)
}
