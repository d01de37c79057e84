use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Cookie and header names used for CSRF token propagation (`[xsrf]` section).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XsrfConfig {
    /// Cookie whose value is mirrored into the request header.
    pub cookie_name: String,
    /// Request header that receives the cookie value.
    pub header_name: String,
}

impl Default for XsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: "csrftoken".to_string(),
            header_name: "X-CSRFToken".to_string(),
        }
    }
}

/// Global configuration loaded from `~/.config/formup/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormupConfig {
    /// Base URL that relative upload addresses are joined onto.
    pub base_url: String,
    #[serde(default)]
    pub xsrf: XsrfConfig,
    /// Optional `User-Agent` header (None = libcurl sends none).
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Follow 3xx redirects (None = do not follow).
    #[serde(default)]
    pub follow_redirects: Option<bool>,
}

impl Default for FormupConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8088/".to_string(),
            xsrf: XsrfConfig::default(),
            user_agent: None,
            follow_redirects: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("formup")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FormupConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FormupConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: FormupConfig = toml::from_str(&data)?;
    Ok(cfg)
}
