pub mod console;

use colored::Colorize;
use itertools::Itertools;
use serde::Serialize;

use crate::client::QueryOutcome;
use crate::payload::{ResultPayload, StatsPayload};
use crate::render;
use crate::stats;
use crate::utils;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

/// What gets written for `--output json`.
#[derive(Clone, Debug, Serialize)]
pub struct OutputRecord<'a> {
    pub link: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<&'a ResultPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<&'a StatsPayload>,
}

pub fn render_json(
    link: &str,
    outcome: Option<&QueryOutcome>,
    stats: Option<&StatsPayload>,
) -> Vec<u8> {
    let record = OutputRecord {
        link,
        result: outcome.and_then(|o| o.as_ref().ok()),
        error: outcome.and_then(|o| o.as_ref().err()).map(|e| e.to_string()),
        stats,
    };
    let mut out = serde_json::to_vec_pretty(&record).unwrap_or_else(|_| b"{}".to_vec());
    out.push(b'\n');
    out
}

/// Plain-text table with shortened cells, one line per row.
pub fn render_text(outcome: &QueryOutcome, max_cell_length: usize) -> Vec<u8> {
    let mut out = String::new();
    match outcome {
        Ok(payload) if payload.is_error() => {
            out.push_str(&format!("error: {}\n", payload.exception));
            out.push_str(&format!("query: {}\n", payload.query));
        }
        Ok(payload) => {
            if !payload.selected.is_empty() {
                out.push_str(&payload.selected.iter().join("\t"));
                out.push('\n');
            }
            for row in 0..payload.res.len() {
                let line = (0..payload.column_count())
                    .map(|col| render::shorten(payload.cell(row, col), max_cell_length))
                    .join("\t");
                out.push_str(&line);
                out.push('\n');
            }
        }
        Err(err) => {
            out.push_str(&format!("error: {err}\n"));
        }
    }
    out.into_bytes()
}

/// Colored summary of an outcome for the terminal.
pub fn print_outcome(
    outcome: &QueryOutcome,
    cap: Option<u64>,
    max_cell_length: usize,
    max_terminal_rows: usize,
) {
    match outcome {
        Ok(payload) if payload.is_error() => {
            console::error("the query service rejected the query");
            console::format_kv_line("Query", &payload.query);
            console::format_kv_line("Message", &payload.exception);
        }
        Ok(payload) => {
            let show = |v: Option<f64>| v.map(utils::format_millis).unwrap_or_else(|| "-".to_string());
            console::format_kv_line("Results", &utils::format_thousands(payload.resultsize));
            console::format_kv_line("Total", &show(payload.time.total_ms()));
            console::format_kv_line("Compute", &show(payload.time.compute_ms()));
            console::format_kv_line("Overhead", &show(payload.time.overhead_ms()));
            println!();
            if !payload.selected.is_empty() {
                println!("{}", payload.selected.iter().join(" | ").bold().green());
            }
            for row in 0..payload.res.len().min(max_terminal_rows) {
                let line = (0..payload.column_count())
                    .map(|col| render::shorten(payload.cell(row, col), max_cell_length))
                    .join(" | ");
                println!("{line}");
            }
            if payload.res.len() > max_terminal_rows {
                println!(
                    "{}",
                    format!("... {} more rows", payload.res.len() - max_terminal_rows).dimmed()
                );
            }
            if payload.truncated_by(cap) {
                println!();
                console::warn(&format!(
                    "showing only {} of {} rows, rerun without --send to fetch all",
                    utils::format_thousands(payload.rows_sent()),
                    utils::format_thousands(payload.resultsize)
                ));
            }
        }
        Err(err) => {
            console::error("could not get an answer from the query service");
            console::format_kv_line("Reason", &err.to_string());
        }
    }
}

pub fn print_stats(stats: &StatsPayload) {
    for (label, value) in stats::stats_lines(stats) {
        if !value.is_empty() {
            console::format_kv_line(label, &value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;

    fn ok_payload() -> ResultPayload {
        serde_json::from_str(
            r#"{"status":"OK","selected":["?s","?n"],
                "res":[["<http://e.org/a/Alice>","\"Alice\"@en"],["<http://e.org/a/Bob>",null]],
                "resultsize":2,"time":{"total":"3ms","computeResult":"1ms"}}"#,
        )
        .unwrap()
    }

    #[test]
    fn text_output_is_tab_separated_and_shortened() {
        let out = render_text(&Ok(ok_payload()), 50);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "?s\t?n\nAlice\t\"Alice\"\nBob\t\n");
    }

    #[test]
    fn json_output_carries_link_and_error() {
        let err: QueryOutcome = Err(ClientError::Status {
            url: "http://h/".to_string(),
            status: 503,
        });
        let out = render_json("http://h/?query=x", Some(&err), None);
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(v["link"], "http://h/?query=x");
        assert!(v["error"].as_str().unwrap().contains("503"));
        assert!(v.get("result").is_none());
    }

    #[test]
    fn format_is_inferred_from_extension() {
        assert_eq!(infer_format_from_path("out.HTML"), Some(OutputFormat::Html));
        assert_eq!(infer_format_from_path("r.json"), Some(OutputFormat::Json));
        assert_eq!(infer_format_from_path("r.csv"), None);
        assert_eq!(OutputFormat::parse(" txt "), Some(OutputFormat::Text));
    }
}
