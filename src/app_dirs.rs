use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> PathBuf {
        if let Some(pd) = ProjectDirs::from("", "", "bananas") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("bananas_config.json")
        }
    }
}
