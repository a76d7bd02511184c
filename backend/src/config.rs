use std::env;
use std::path::PathBuf;

/// Runtime configuration, shared with every handler as actix app data.
/// Values come from environment variables with defaults suitable for a
/// local demo setup.
#[derive(Clone)]
pub struct AppConfig {
    /// Path of the SQLite database file.
    pub db_path: PathBuf,
    /// Directory containing the TTF font families used for PDF output.
    pub fonts_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let db_path = env::var("ALBUMS_DB")
            .unwrap_or_else(|_| "albums.sqlite".to_string())
            .into();
        let fonts_dir = env::var("ALBUMS_FONTS_DIR")
            .unwrap_or_else(|_| "./fonts".to_string())
            .into();
        let host = env::var("ALBUMS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("ALBUMS_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        AppConfig {
            db_path,
            fonts_dir,
            host,
            port,
        }
    }
}
