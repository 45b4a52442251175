use std::io::Write;
use std::time::Duration;

use super::{ClientError, ClientOptions, USER_AGENT};
use crate::request::{Endpoint, ExportFormat};
use crate::state::QueryState;

/// Downloads the CSV/TSV rendition of a query straight into `out`.
///
/// This is a plain blocking download: the body is never parsed, and it must
/// not be called from inside an async runtime.
pub fn download_export<W: Write>(
    endpoint: &Endpoint,
    state: &QueryState,
    format: ExportFormat,
    options: &ClientOptions,
    out: &mut W,
) -> Result<u64, ClientError> {
    let mut builder = reqwest::blocking::Client::builder().user_agent(USER_AGENT);
    if options.timeout_seconds > 0 {
        builder = builder.timeout(Duration::from_secs(options.timeout_seconds));
    } else {
        builder = builder.timeout(None::<Duration>);
    }
    if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| ClientError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    } else if !options.system_proxy {
        builder = builder.no_proxy();
    }
    let client = builder
        .build()
        .map_err(|e| ClientError::HttpClientBuild { source: e })?;

    let url = endpoint.export_url(state, format);
    let url_text = url.to_string();
    let mut resp = client.get(url).send().map_err(|e| ClientError::Transport {
        url: url_text.clone(),
        source: e,
    })?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ClientError::Status {
            url: url_text,
            status: status.as_u16(),
        });
    }
    let written = resp.copy_to(out).map_err(|e| ClientError::Transport {
        url: url_text,
        source: e,
    })?;
    out.flush()
        .map_err(|e| ClientError::ExportWrite { source: e })?;
    Ok(written)
}
