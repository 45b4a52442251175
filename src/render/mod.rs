pub mod page;
pub mod shorten;

pub use shorten::shorten;

use crate::client::{ClientError, QueryOutcome};
use crate::payload::{ResultPayload, Timing};
use crate::state::QueryState;
use crate::utils;

pub const DEFAULT_MAX_CELL_LENGTH: usize = 50;

/// Escapes text for use in HTML content and double-quoted attributes.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Clone, Debug)]
pub struct RenderContext {
    /// Page link of the rendered state, used for the "show all" link.
    pub page_url: String,
    pub max_cell_length: usize,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            page_url: String::new(),
            max_cell_length: DEFAULT_MAX_CELL_LENGTH,
        }
    }
}

/// Link that requests the full result: the current page link cut at the
/// first `&send=`. Anything after the row cap is lost as well, which only
/// works because the cap is always written last.
pub fn show_all_link(page_url: &str) -> String {
    match page_url.find("&send=") {
        Some(idx) => page_url[..idx].to_string(),
        None => page_url.to_string(),
    }
}

pub fn render_outcome(outcome: &QueryOutcome, state: &QueryState, ctx: &RenderContext) -> String {
    match outcome {
        Ok(payload) if payload.is_error() => render_error(payload, state),
        Ok(payload) => render_result(payload, state, ctx),
        Err(err) => render_transport_error(err),
    }
}

pub fn render_result(payload: &ResultPayload, state: &QueryState, ctx: &RenderContext) -> String {
    if payload.is_error() {
        return render_error(payload, state);
    }
    let mut out = String::new();
    out.push_str("<div id=\"answer\" class=\"answer ok\">\n");
    out.push_str(&format!(
        "  <p class=\"summary\"><span id=\"resultsize\">{}</span> results</p>\n",
        utils::format_thousands(payload.resultsize)
    ));
    out.push_str(&render_timing(&payload.time));
    if let Some(banner) = truncation_banner(payload, state, ctx) {
        out.push_str(&banner);
    }
    out.push_str(&render_table(payload, ctx.max_cell_length));
    out.push_str("</div>\n");
    out
}

pub fn render_timing(time: &Timing) -> String {
    let show = |v: Option<f64>| v.map(utils::format_millis).unwrap_or_else(|| "-".to_string());
    format!(
        "  <p class=\"timing\">Total: <span id=\"totalTime\">{}</span> \
         Computation: <span id=\"computationTime\">{}</span> \
         Overhead: <span id=\"jsonTime\">{}</span></p>\n",
        show(time.total_ms()),
        show(time.compute_ms()),
        show(time.overhead_ms())
    )
}

pub fn truncation_banner(
    payload: &ResultPayload,
    state: &QueryState,
    ctx: &RenderContext,
) -> Option<String> {
    let cap = state.max_rows;
    if !payload.truncated_by(cap) {
        return None;
    }
    let mut out = format!(
        "  <div id=\"truncated\" class=\"notice\">Showing only {} of {} rows",
        utils::format_thousands(payload.rows_sent()),
        utils::format_thousands(payload.resultsize)
    );
    if let Some(cap) = cap {
        out.push_str(&format!(" (limit {})", utils::format_thousands(cap)));
    }
    out.push('.');
    let link = show_all_link(&ctx.page_url);
    if !ctx.page_url.is_empty() && link != ctx.page_url {
        out.push_str(&format!(
            " <a id=\"showAll\" href=\"{}\">Show all</a>",
            escape_html(&link)
        ));
    }
    out.push_str("</div>\n");
    Some(out)
}

pub fn render_table(payload: &ResultPayload, max_cell_length: usize) -> String {
    let columns = payload.column_count();
    let mut out = String::from("  <table id=\"resTable\">\n");
    if !payload.selected.is_empty() {
        out.push_str("    <thead><tr>");
        for col in 0..columns {
            let name = payload.selected.get(col).map(String::as_str).unwrap_or("");
            out.push_str(&format!("<th>{}</th>", escape_html(name)));
        }
        out.push_str("</tr></thead>\n");
    }
    out.push_str("    <tbody>\n");
    for row in 0..payload.res.len() {
        out.push_str("      <tr>");
        for col in 0..columns {
            out.push_str(&render_cell(payload.cell(row, col), max_cell_length));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("    </tbody>\n  </table>\n");
    out
}

/// One `<td>`: shortened display text, full value as tooltip, both escaped.
pub fn render_cell(value: &str, max_cell_length: usize) -> String {
    format!(
        "<td title=\"{}\">{}</td>",
        escape_html(value),
        escape_html(&shorten(value, max_cell_length))
    )
}

pub fn render_error(payload: &ResultPayload, state: &QueryState) -> String {
    let query = if payload.query.is_empty() {
        state.query.as_str()
    } else {
        payload.query.as_str()
    };
    let query_html = match payload.metadata.as_ref() {
        Some(meta) => highlight_span(query, meta.start_index, meta.stop_index),
        None => escape_html(query),
    };
    format!(
        "<div id=\"answer\" class=\"answer error\">\n  \
         <h4>Error processing query</h4>\n  \
         <p><strong>Query:</strong> <span id=\"queryErrorText\">{}</span></p>\n  \
         <p><strong>Message:</strong> <span id=\"queryErrorMessage\">{}</span></p>\n\
         </div>\n",
        query_html,
        escape_html(&payload.exception)
    )
}

// Marks the characters `start..=stop` of `query`; an out-of-range span leaves
// the query unmarked.
fn highlight_span(query: &str, start: usize, stop: usize) -> String {
    let chars: Vec<char> = query.chars().collect();
    if start > stop || stop >= chars.len() {
        return escape_html(query);
    }
    let before: String = chars[..start].iter().collect();
    let marked: String = chars[start..=stop].iter().collect();
    let after: String = chars[stop + 1..].iter().collect();
    format!(
        "{}<span class=\"error-span\">{}</span>{}",
        escape_html(&before),
        escape_html(&marked),
        escape_html(&after)
    )
}

pub fn render_transport_error(err: &ClientError) -> String {
    let headline = if err.is_transport() {
        "Could not reach the query service. Check your connection and try again."
    } else {
        "The query service sent an answer that could not be read."
    };
    format!(
        "<div id=\"answer\" class=\"answer error\">\n  \
         <h4>Connection problem</h4>\n  \
         <p>{}</p>\n  \
         <p class=\"detail\">{}</p>\n\
         </div>\n",
        headline,
        escape_html(&err.to_string())
    )
}
