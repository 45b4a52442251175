pub mod history;

pub use history::History;

use reqwest::Url;

use crate::request::{self, ClearCacheCommand, RequestError};

/// What the user asked for: the query text and its request modifiers.
///
/// The only place this value lives outside the process is the page link
/// (see [`QueryState::to_page_url`]), which makes results bookmarkable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryState {
    pub query: String,
    pub clear_cache: bool,
    pub max_rows: Option<u64>,
}

impl QueryState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_clear_cache(mut self, clear_cache: bool) -> Self {
        self.clear_cache = clear_cache;
        self
    }

    pub fn with_max_rows(mut self, max_rows: Option<u64>) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    /// Reads `query`, `cmd` and `send` from a URL. Unknown parameters, an
    /// unknown `cmd` and a `send` that is not a number are ignored, and the
    /// order of the parameters does not matter.
    pub fn from_url(url: &Url) -> Self {
        let mut state = Self::default();
        let mut query_seen = false;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "query" if !query_seen => {
                    state.query = value.into_owned();
                    query_seen = true;
                }
                "cmd" => {
                    if ClearCacheCommand::parse(&value).is_some() {
                        state.clear_cache = true;
                    }
                }
                "send" => {
                    if let Ok(n) = value.trim().parse::<u64>() {
                        state.max_rows = Some(n);
                    }
                }
                _ => {}
            }
        }
        state
    }

    pub fn from_link(link: &str) -> Result<Self, RequestError> {
        let url = request::parse_http_url(link)?;
        Ok(Self::from_url(&url))
    }

    /// Appends the parameters in the fixed order `query`, `cmd`, `send`.
    pub(crate) fn write_params(&self, url: &mut Url, command: ClearCacheCommand) {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("query", &self.query);
        if self.clear_cache {
            pairs.append_pair("cmd", command.as_str());
        }
        if let Some(n) = self.max_rows {
            pairs.append_pair("send", &n.to_string());
        }
    }

    /// The shareable page address for this state. Whatever query string
    /// `page` carried is replaced.
    pub fn to_page_url(&self, page: &Url, command: ClearCacheCommand) -> Url {
        let mut url = page.clone();
        url.set_query(None);
        url.set_fragment(None);
        self.write_params(&mut url, command);
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("http://localhost:7001/index.html").unwrap()
    }

    #[test]
    fn reserved_characters_survive_the_page_link() {
        let texts = [
            "SELECT ?x WHERE { ?x <http://a/b#c> \"x&y=z\" } LIMIT 10",
            "a+b c%20d ? / # & = ;",
            "PREFIX : <http://ü.example/> SELECT * {}",
            "",
            "line1\nline2\ttab",
        ];
        for text in texts {
            let state = QueryState::new(text)
                .with_clear_cache(true)
                .with_max_rows(Some(42));
            let url = state.to_page_url(&page(), ClearCacheCommand::Dashed);
            let reparsed = QueryState::from_link(url.as_str()).unwrap();
            assert_eq!(reparsed, state, "round trip failed for {text:?}");
        }
    }

    #[test]
    fn flags_are_read_in_any_order() {
        let a = QueryState::from_link("http://h/?send=10&cmd=clearcache&query=foo").unwrap();
        let b = QueryState::from_link("http://h/?query=foo&send=10&cmd=clear-cache").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.query, "foo");
        assert!(a.clear_cache);
        assert_eq!(a.max_rows, Some(10));
    }

    #[test]
    fn bad_send_and_unknown_cmd_are_ignored() {
        let s = QueryState::from_link("http://h/?query=q&send=lots&cmd=stats").unwrap();
        assert_eq!(s.max_rows, None);
        assert!(!s.clear_cache);
        assert!(s.has_query());
    }

    #[test]
    fn link_without_query_has_no_query() {
        let s = QueryState::from_link("http://h/?send=5").unwrap();
        assert!(!s.has_query());
        assert_eq!(s.max_rows, Some(5));
    }

    #[test]
    fn page_url_replaces_previous_parameters() {
        let old = Url::parse("http://h/ui?query=old&send=3#top").unwrap();
        let url = QueryState::new("new").to_page_url(&old, ClearCacheCommand::Dashed);
        assert_eq!(url.as_str(), "http://h/ui?query=new");
    }
}
