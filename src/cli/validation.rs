use crate::cli::args::CliArgs;
use crate::output::OutputFormat;
use crate::request::{ClearCacheCommand, ExportFormat};

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if args.query.is_some() && args.query_file.is_some() {
        return Err("use either --query or --query-file, not both".to_string());
    }
    if args.link.is_some() && (args.query.is_some() || args.query_file.is_some()) {
        return Err("a --link already carries a query, drop --query/--query-file".to_string());
    }
    if args.interactive && args.export.is_some() {
        return Err("--export cannot be combined with --interactive".to_string());
    }
    if let Some(raw) = args.export.as_deref() {
        ExportFormat::parse(raw)
            .ok_or_else(|| format!("invalid --export '{raw}', expected csv or tsv"))?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid --output-format '{raw}', expected text, json or html"))?;
    }
    if let Some(raw) = args.clear_cache_command.as_deref() {
        ClearCacheCommand::parse(raw).ok_or_else(|| {
            format!("invalid --clear-cache-command '{raw}', expected clear-cache or clearcache")
        })?;
    }
    if let Some(n) = args.max_cell_length {
        if n < 2 {
            return Err("invalid max-cell-length, expected at least 2".to_string());
        }
    }
    if let Some(n) = args.terminal_rows {
        if n == 0 {
            return Err("invalid terminal-rows, expected positive integer".to_string());
        }
    }
    Ok(())
}
