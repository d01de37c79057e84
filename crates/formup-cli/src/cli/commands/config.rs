//! `formup config` – print config location and values.

use anyhow::Result;
use formup_core::config::{self, FormupConfig};

pub fn run_config(cfg: &FormupConfig) -> Result<()> {
    let path = config::config_path()?;
    println!("config: {}", path.display());
    println!("base_url: {}", cfg.base_url);
    println!(
        "xsrf: cookie {} -> header {}",
        cfg.xsrf.cookie_name, cfg.xsrf.header_name
    );
    if let Some(ua) = &cfg.user_agent {
        println!("user_agent: {}", ua);
    }
    println!("follow_redirects: {}", cfg.follow_redirects.unwrap_or(false));
    Ok(())
}
