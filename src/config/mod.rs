use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    pub endpoint: Option<String>,
    pub page_url: Option<String>,
    #[serde(alias = "max_rows")]
    pub send: Option<u64>,
    pub clear_cache: Option<bool>,
    pub clear_cache_command: Option<String>,
    pub timeout: Option<u64>,
    pub proxy: Option<String>,
    pub system_proxy: Option<bool>,
    pub max_cell_length: Option<usize>,
    pub terminal_rows: Option<usize>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub show_stats: Option<bool>,
    pub no_color: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".qpanel").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

pub fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    // an empty or all-comment file is a valid, empty config
    if contents.lines().all(|l| {
        let l = l.trim();
        l.is_empty() || l.starts_with('#')
    }) {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents)
}

fn default_config_yaml() -> String {
    r#"# qpanel config
#
# Location (default):
#   ~/.qpanel/config.yml

# Query service
endpoint: http://localhost:7001/
# Base of shareable result links (defaults to the endpoint)
# page_url: https://qlever.example/wikidata
# proxy: http://127.0.0.1:8080
# Use HTTP_PROXY/HTTPS_PROXY from the environment when no proxy is set
system_proxy: true
# Seconds, 0 = wait forever
timeout: 0

# Requests
# Row cap for typed queries, 0 = send everything
send: 100
clear_cache: false
# Older servers only understand "clearcache"
clear_cache_command: clear-cache

# Display
max_cell_length: 50
terminal_rows: 50
show_stats: true
no_color: false

# Output (optional)
# output: ./result.html
# output_format: html
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}
