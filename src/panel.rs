use reqwest::Url;
use thiserror::Error;

use crate::client::{ClientError, ClientOptions, QueryClient, QueryOutcome};
use crate::payload::StatsPayload;
use crate::render::{self, RenderContext};
use crate::request::{self, ClearCacheCommand, Endpoint, RequestError};
use crate::state::{History, QueryState};

#[derive(Clone, Debug)]
pub struct Options {
    pub endpoint: String,
    /// Base of the shareable page links; the endpoint when unset.
    pub page_url: Option<String>,
    pub clear_cache_command: ClearCacheCommand,
    pub timeout_seconds: u64,
    pub proxy: Option<String>,
    pub system_proxy: bool,
    pub max_cell_length: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:7001/".to_string(),
            page_url: None,
            clear_cache_command: ClearCacheCommand::default(),
            timeout_seconds: 0,
            proxy: None,
            system_proxy: true,
            max_cell_length: render::DEFAULT_MAX_CELL_LENGTH,
        }
    }
}

#[derive(Debug, Error)]
pub enum PanelError {
    #[error("invalid endpoint: {source}")]
    InvalidEndpoint {
        #[source]
        source: RequestError,
    },

    #[error("invalid page URL: {source}")]
    InvalidPageUrl {
        #[source]
        source: RequestError,
    },

    #[error("invalid link: {source}")]
    InvalidLink {
        #[source]
        source: RequestError,
    },

    #[error("query text is empty")]
    EmptyQuery,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// One dispatched query and everything rendered from it.
#[derive(Debug)]
pub struct Rendered {
    pub state: QueryState,
    /// The page link that was pushed onto the history for this query.
    pub link: Url,
    pub outcome: QueryOutcome,
    /// The answer panel (result table, error panel or connection error).
    pub html: String,
}

/// The query panel: URL state, dispatch, rendering and history.
#[derive(Debug)]
pub struct Panel {
    client: QueryClient,
    page_base: Url,
    history: History,
    max_cell_length: usize,
}

impl Panel {
    pub fn new(options: Options) -> Result<Self, PanelError> {
        let endpoint = Endpoint::parse(&options.endpoint)
            .map_err(|e| PanelError::InvalidEndpoint { source: e })?
            .with_clear_cache_command(options.clear_cache_command);
        let page_base = match options.page_url.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(raw) => {
                request::parse_http_url(raw).map_err(|e| PanelError::InvalidPageUrl { source: e })?
            }
            None => endpoint.base().clone(),
        };
        let client = QueryClient::new(
            endpoint,
            &ClientOptions {
                timeout_seconds: options.timeout_seconds,
                proxy: options.proxy,
                system_proxy: options.system_proxy,
            },
        )?;
        Ok(Self {
            client,
            page_base,
            history: History::new(),
            max_cell_length: options.max_cell_length,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.client.endpoint()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn page_link(&self, state: &QueryState) -> Url {
        state.to_page_url(&self.page_base, self.endpoint().clear_cache_command())
    }

    pub fn request_url(&self, state: &QueryState) -> Url {
        self.endpoint().query_url(state)
    }

    /// Pushes the page link for `state`, then dispatches it.
    pub async fn submit(&mut self, state: QueryState) -> Result<Rendered, PanelError> {
        let link = self.push(&state)?;
        Ok(self.dispatch(state, link).await)
    }

    /// Like [`Panel::submit`], with the stats request running alongside.
    pub async fn submit_with_stats(
        &mut self,
        state: QueryState,
    ) -> Result<(Rendered, Result<StatsPayload, ClientError>), PanelError> {
        let link = self.push(&state)?;
        let (rendered, stats) =
            futures::future::join(self.dispatch(state, link), self.client.fetch_stats()).await;
        Ok((rendered, stats))
    }

    /// Opens a shared page link. Returns `None` when the link holds no query.
    pub async fn open_link(&mut self, link: &str) -> Result<Option<Rendered>, PanelError> {
        let state = QueryState::from_link(link).map_err(|e| PanelError::InvalidLink { source: e })?;
        if !state.has_query() {
            return Ok(None);
        }
        self.submit(state).await.map(Some)
    }

    /// Re-runs the previous history entry without pushing a new one.
    pub async fn back(&mut self) -> Option<Rendered> {
        let link = self.history.back()?.clone();
        Some(self.replay(link).await)
    }

    /// Re-runs the next history entry without pushing a new one.
    pub async fn forward(&mut self) -> Option<Rendered> {
        let link = self.history.forward()?.clone();
        Some(self.replay(link).await)
    }

    pub async fn stats(&self) -> Result<StatsPayload, ClientError> {
        self.client.fetch_stats().await
    }

    pub fn render_context(&self, link: &Url) -> RenderContext {
        RenderContext {
            page_url: link.to_string(),
            max_cell_length: self.max_cell_length,
        }
    }

    fn push(&mut self, state: &QueryState) -> Result<Url, PanelError> {
        if !state.has_query() {
            return Err(PanelError::EmptyQuery);
        }
        let link = self.page_link(state);
        self.history.push(link.clone());
        Ok(link)
    }

    async fn replay(&self, link: Url) -> Rendered {
        let state = QueryState::from_url(&link);
        self.dispatch(state, link).await
    }

    async fn dispatch(&self, state: QueryState, link: Url) -> Rendered {
        let outcome = self.client.fetch_result(&state).await;
        let html = render::render_outcome(&outcome, &state, &self.render_context(&link));
        Rendered {
            state,
            link,
            outcome,
            html,
        }
    }
}
