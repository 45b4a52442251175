use reqwest::Url;
use thiserror::Error;

use crate::state::QueryState;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("unsupported URL scheme '{scheme}' in '{url}', expected http or https")]
    UnsupportedScheme { url: String, scheme: String },
}

/// Spelling of the clear-cache command. Older servers only know `clearcache`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClearCacheCommand {
    #[default]
    Dashed,
    Legacy,
}

impl ClearCacheCommand {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "clear-cache" => Some(Self::Dashed),
            "clearcache" => Some(Self::Legacy),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dashed => "clear-cache",
            Self::Legacy => "clearcache",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "csv" | "csv_export" => Some(Self::Csv),
            "tsv" | "tsv_export" => Some(Self::Tsv),
            _ => None,
        }
    }

    pub fn action(self) -> &'static str {
        match self {
            Self::Csv => "csv_export",
            Self::Tsv => "tsv_export",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
        }
    }
}

pub fn parse_http_url(raw: &str) -> Result<Url, RequestError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|e| RequestError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(RequestError::UnsupportedScheme {
            url: raw.to_string(),
            scheme: scheme.to_string(),
        }),
    }
}

/// Base address of the query service plus the request conventions it speaks.
#[derive(Clone, Debug)]
pub struct Endpoint {
    base: Url,
    clear_cache_command: ClearCacheCommand,
}

impl Endpoint {
    pub fn parse(raw: &str) -> Result<Self, RequestError> {
        let mut base = parse_http_url(raw)?;
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self {
            base,
            clear_cache_command: ClearCacheCommand::default(),
        })
    }

    pub fn with_clear_cache_command(mut self, command: ClearCacheCommand) -> Self {
        self.clear_cache_command = command;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn clear_cache_command(&self) -> ClearCacheCommand {
        self.clear_cache_command
    }

    /// `<base>?query=..[&cmd=clear-cache][&send=N]`
    pub fn query_url(&self, state: &QueryState) -> Url {
        let mut url = self.base.clone();
        state.write_params(&mut url, self.clear_cache_command);
        url
    }

    /// `<base>?cmd=stats`
    pub fn stats_url(&self) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut().append_pair("cmd", "stats");
        url
    }

    /// `<base>?query=..[&cmd=..]&action=csv_export|tsv_export`. The row cap is
    /// never forwarded, so a download always holds the full result.
    pub fn export_url(&self, state: &QueryState, format: ExportFormat) -> Url {
        let mut url = self.base.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &state.query);
            if state.clear_cache {
                pairs.append_pair("cmd", self.clear_cache_command.as_str());
            }
            pairs.append_pair("action", format.action());
        }
        url
    }
}
