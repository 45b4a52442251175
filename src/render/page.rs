use super::escape_html;
use crate::state::QueryState;

/// Pieces of a standalone result page. Fragments are inserted verbatim and
/// must already be escaped.
#[derive(Clone, Debug, Default)]
pub struct PageParts {
    pub endpoint: String,
    pub page_url: String,
    pub state: QueryState,
    pub answer_html: Option<String>,
    pub stats_html: Option<String>,
}

pub fn render_page(parts: &PageParts) -> String {
    let answer = parts
        .answer_html
        .clone()
        .unwrap_or_else(|| "<div id=\"answer\" class=\"answer\"></div>\n".to_string());
    let stats = parts.stats_html.clone().unwrap_or_default();
    let send = parts
        .state
        .max_rows
        .map(|n| n.to_string())
        .unwrap_or_default();
    let link = if parts.page_url.is_empty() {
        String::new()
    } else {
        format!(
            "<p class=\"link\">Link to this result: <a id=\"permalink\" href=\"{0}\">{0}</a></p>",
            escape_html(&parts.page_url)
        )
    };

    format!(
        r####"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>qpanel: {endpoint}</title>
  <style>
    body {{ font-family: 'Inter', sans-serif; margin: 0; background: #f8fafc; color: #0f172a; }}
    header {{ padding: 1rem 2rem; background: #fff; border-bottom: 1px solid #e2e8f0; }}
    main {{ max-width: 1440px; margin: 0 auto; padding: 2rem; }}
    textarea {{ width: 100%; min-height: 8rem; font-family: monospace; }}
    table {{ border-collapse: collapse; width: 100%; background: #fff; }}
    th, td {{ border: 1px solid #e2e8f0; padding: 0.25rem 0.5rem; text-align: left; }}
    .notice {{ background: #fef9c3; padding: 0.5rem; margin: 0.5rem 0; }}
    .answer.error {{ background: #fee2e2; padding: 1rem; }}
    .error-span {{ background: #fca5a5; font-weight: 700; }}
    .detail {{ font-family: monospace; font-size: 0.85rem; color: #475569; }}
    .stats dl {{ display: grid; grid-template-columns: max-content auto; gap: 0.25rem 1rem; }}
  </style>
</head>
<body>
  <header>
    <h2>qpanel</h2>
    <span class="endpoint">{endpoint}</span>
  </header>
  <main>
    <form id="queryForm" method="get">
      <textarea id="query" name="query">{query}</textarea>
      <label><input id="clear" type="checkbox" name="cmd" value="clear-cache"{clear}/> clear cache</label>
      <input id="send" type="hidden" name="send" value="{send}"/>
      <button id="runbtn" type="submit">Run query</button>
    </form>
    {link}
    <section id="answerPanel">
{answer}    </section>
    <section id="statsPanel">
{stats}    </section>
  </main>
</body>
</html>
"####,
        endpoint = escape_html(&parts.endpoint),
        query = escape_html(&parts.state.query),
        clear = if parts.state.clear_cache { " checked" } else { "" },
        send = send,
        link = link,
        answer = answer,
        stats = stats,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_escapes_query_and_link() {
        let parts = PageParts {
            endpoint: "http://h/".to_string(),
            page_url: "http://h/?query=%3C&send=1".to_string(),
            state: QueryState::new("</textarea><script>").with_clear_cache(true),
            answer_html: None,
            stats_html: Some("<div id=\"stats\"></div>\n".to_string()),
        };
        let html = render_page(&parts);
        assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("href=\"http://h/?query=%3C&amp;send=1\""));
        assert!(html.contains(" checked/>"));
        assert!(html.contains("<div id=\"stats\"></div>"));
    }
}
