pub mod settings;

use settings::Settings;
use std::path::Path;

/// Settings file picked up from the working directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "proj4_shim.yaml";

/// 設定ファイルを読み込む。存在しなければデフォルト設定を返す。
pub fn load_settings(path: &Path) -> crate::error::Result<Settings> {
    if path.exists() {
        Settings::from_file(path)
    } else {
        Ok(Settings::default())
    }
}
