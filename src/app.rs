use std::io::Write;

use clap::{error::ErrorKind, Parser};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::Instant;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::client::{self, ClientError, ClientOptions};
use crate::config::{self, ConfigFile};
use crate::output::{self, console, OutputFormat};
use crate::panel::{self, Panel, Rendered};
use crate::payload::StatsPayload;
use crate::render::{self, page::PageParts};
use crate::request::{self, ClearCacheCommand, Endpoint, ExportFormat};
use crate::state::QueryState;
use crate::stats;

const DEFAULT_ENDPOINT: &str = "http://localhost:7001/";
const DEFAULT_TERMINAL_ROWS: usize = 50;
/// Row cap of a query typed on the command line, as the run button sends it.
const DEFAULT_SEND: u64 = 100;

fn print_banner() {
    const BANNER: &str = r#"
   ____  ____  ____ _____  ___  / /
  / __ `/ __ \/ __ `/ __ \/ _ \/ /
 / /_/ / /_/ / /_/ / / / /  __/ /
 \__, / .___/\__,_/_/ /_/\___/_/
   /_/_/
       v0.1.0 - query panel for QLever-style endpoints
    "#;
    print!("{}", BANNER);
    println!();
}

fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[derive(Clone, Debug)]
struct RunConfig {
    endpoint: String,
    page_url: Option<String>,
    state: QueryState,
    clear_cache_command: ClearCacheCommand,
    timeout: u64,
    proxy: Option<String>,
    system_proxy: bool,
    max_cell_length: usize,
    terminal_rows: usize,
    export: Option<ExportFormat>,
    output: Option<String>,
    output_format: Option<OutputFormat>,
    show_stats: bool,
    interactive: bool,
    no_color: bool,
    verbose: u8,
}

impl RunConfig {
    fn panel_options(&self) -> panel::Options {
        panel::Options {
            endpoint: self.endpoint.clone(),
            page_url: self.page_url.clone(),
            clear_cache_command: self.clear_cache_command,
            timeout_seconds: self.timeout,
            proxy: self.proxy.clone(),
            system_proxy: self.system_proxy,
            max_cell_length: self.max_cell_length,
        }
    }

    fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout_seconds: self.timeout,
            proxy: self.proxy.clone(),
            system_proxy: self.system_proxy,
        }
    }
}

/// Scheme, host and path of a link, without its query string.
fn strip_link_query(link: &str) -> Result<String, String> {
    let mut url = request::parse_http_url(link).map_err(|e| format!("invalid --link: {e}"))?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(url.to_string())
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let link_state = match args.link.as_deref() {
        Some(link) => {
            Some(QueryState::from_link(link).map_err(|e| format!("invalid --link: {e}"))?)
        }
        None => None,
    };
    let link_base = args.link.as_deref().map(strip_link_query).transpose()?;

    let endpoint = args
        .endpoint
        .or(cfg.endpoint)
        .or_else(|| link_base.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    Endpoint::parse(&endpoint).map_err(|e| format!("invalid endpoint: {e}"))?;

    let page_url = args.page_url.or(cfg.page_url).or(link_base);

    let clear_cache_command = match args.clear_cache_command.or(cfg.clear_cache_command) {
        Some(raw) => ClearCacheCommand::parse(&raw)
            .ok_or_else(|| format!("invalid clear_cache_command '{raw}'"))?,
        None => ClearCacheCommand::default(),
    };

    // A link is authoritative for its own flags; config defaults only fill in
    // for queries given on the command line.
    let state = match link_state {
        Some(state) => {
            let clear_cache = state.clear_cache || args.clear_cache;
            let max_rows = args.send.or(state.max_rows).filter(|n| *n > 0);
            state.with_clear_cache(clear_cache).with_max_rows(max_rows)
        }
        None => {
            let query = match (args.query, args.query_file) {
                (Some(q), _) => q,
                (None, Some(path)) => std::fs::read_to_string(config::expand_tilde(&path))
                    .map_err(|e| format!("failed to read query file '{path}': {e}"))?,
                (None, None) => String::new(),
            };
            QueryState::new(query.trim().to_string())
                .with_clear_cache(args.clear_cache || cfg.clear_cache.unwrap_or(false))
                .with_max_rows(
                    args.send
                        .or(cfg.send)
                        .or(Some(DEFAULT_SEND))
                        .filter(|n| *n > 0),
                )
        }
    };

    let export = match args.export.as_deref() {
        Some(raw) => Some(
            ExportFormat::parse(raw).ok_or_else(|| format!("invalid --export '{raw}'"))?,
        ),
        None => None,
    };

    let output = args.output.or(cfg.output);
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => Some(
            OutputFormat::parse(&raw).ok_or_else(|| format!("invalid output format '{raw}'"))?,
        ),
        None => output
            .as_deref()
            .map(|p| output::infer_format_from_path(p).unwrap_or(OutputFormat::Text)),
    };

    let show_stats = args.stats.or(cfg.show_stats).unwrap_or(true);
    let interactive = args.interactive;

    if export.is_some() && !state.has_query() {
        return Err("--export needs a query (--query, --query-file or --link)".to_string());
    }
    if !state.has_query() && !interactive && !show_stats {
        return Err(
            "nothing to do: give a query (--query, --query-file, --link), --stats or --interactive"
                .to_string(),
        );
    }

    let max_cell_length = args
        .max_cell_length
        .or(cfg.max_cell_length)
        .unwrap_or(render::DEFAULT_MAX_CELL_LENGTH);
    if max_cell_length < 2 {
        return Err("invalid max_cell_length, expected at least 2".to_string());
    }

    Ok(RunConfig {
        endpoint,
        page_url,
        state,
        clear_cache_command,
        timeout: args.timeout.or(cfg.timeout).unwrap_or(0),
        proxy: args.proxy.or(cfg.proxy).filter(|p| !p.trim().is_empty()),
        system_proxy: cfg.system_proxy.unwrap_or(true),
        max_cell_length,
        terminal_rows: args
            .terminal_rows
            .or(cfg.terminal_rows)
            .unwrap_or(DEFAULT_TERMINAL_ROWS)
            .max(1),
        export,
        output,
        output_format,
        show_stats,
        interactive,
        no_color,
        verbose: args.verbose,
    })
}

fn run_export(run: &RunConfig, format: ExportFormat) -> Result<(), String> {
    let endpoint = Endpoint::parse(&run.endpoint)
        .map_err(|e| format!("invalid endpoint: {e}"))?
        .with_clear_cache_command(run.clear_cache_command);
    let options = run.client_options();

    match run.output.as_deref() {
        Some(path) => {
            let path = config::expand_tilde(path);
            let mut file = std::fs::File::create(&path)
                .map_err(|e| format!("failed to open output file '{}': {e}", path.display()))?;
            let started = Instant::now();
            let written =
                client::export::download_export(&endpoint, &run.state, format, &options, &mut file)
                    .map_err(|e| e.to_string())?;
            console::info(&format!(
                "{} export written to {} ({} bytes, {}ms)",
                format.extension(),
                path.display(),
                written,
                started.elapsed().as_millis()
            ));
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            client::export::download_export(&endpoint, &run.state, format, &options, &mut lock)
                .map_err(|e| e.to_string())?;
            lock.flush().map_err(|e| format!("failed to flush stdout: {e}"))?;
        }
    }
    Ok(())
}

async fn write_output(path: &str, bytes: &[u8]) -> Result<(), String> {
    let path = config::expand_tilde(path);
    let mut outfile = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .await
        .map_err(|e| format!("failed to open output file: {e}"))?;
    outfile
        .write_all(bytes)
        .await
        .map_err(|_| "failed to write output file".to_string())?;
    Ok(())
}

fn render_output(
    run: &RunConfig,
    panel: &Panel,
    format: OutputFormat,
    rendered: Option<&Rendered>,
    stats: Option<&Result<StatsPayload, ClientError>>,
) -> Vec<u8> {
    let stats_ok = stats.and_then(|s| s.as_ref().ok());
    match format {
        OutputFormat::Text => match rendered {
            Some(r) => output::render_text(&r.outcome, run.max_cell_length),
            None => Vec::new(),
        },
        OutputFormat::Json => {
            let link = rendered.map(|r| r.link.to_string()).unwrap_or_default();
            output::render_json(&link, rendered.map(|r| &r.outcome), stats_ok)
        }
        OutputFormat::Html => {
            let stats_html = stats.map(|s| match s {
                Ok(payload) => stats::render_stats(payload),
                Err(e) => stats::render_stats_unavailable(e),
            });
            let parts = PageParts {
                endpoint: panel.endpoint().base().to_string(),
                page_url: rendered.map(|r| r.link.to_string()).unwrap_or_default(),
                state: rendered.map(|r| r.state.clone()).unwrap_or_default(),
                answer_html: rendered.map(|r| r.html.clone()),
                stats_html,
            };
            render::page::render_page(&parts).into_bytes()
        }
    }
}

async fn emit(
    run: &RunConfig,
    panel: &Panel,
    rendered: Option<&Rendered>,
    stats: Option<&Result<StatsPayload, ClientError>>,
) -> Result<(), String> {
    if let Some(r) = rendered {
        println!();
        output::print_outcome(
            &r.outcome,
            r.state.max_rows,
            run.max_cell_length,
            run.terminal_rows,
        );
        println!();
        console::format_kv_line("Link", r.link.as_str());
    }
    if let Some(stats) = stats {
        println!();
        match stats {
            Ok(payload) => output::print_stats(payload),
            Err(e) => console::warn(&format!("index statistics unavailable: {e}")),
        }
    }
    if let (Some(path), Some(format)) = (run.output.as_deref(), run.output_format) {
        let bytes = render_output(run, panel, format, rendered, stats);
        write_output(path, &bytes).await?;
        console::info(&format!("output written to {path}"));
    }
    Ok(())
}

async fn run_interactive(mut panel: Panel, run: &RunConfig) -> Result<(), String> {
    let mut clear_cache = run.state.clear_cache;
    let mut max_rows = run.state.max_rows;

    if run.show_stats {
        let stats = panel.stats().await;
        emit(run, &panel, None, Some(&stats)).await?;
    }
    if run.state.has_query() {
        let rendered = dispatch(&mut panel, run, run.state.clone()).await?;
        emit(run, &panel, Some(&rendered), None).await?;
    }

    console::info("enter a query per line; :back, :forward, :history, :send N, :cc, :stats, :quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            ":quit" | ":q" => break,
            ":back" | ":forward" => {
                let waiting = console::WaitingIndicator::start("waiting for the query service");
                let rendered = if line == ":back" {
                    panel.back().await
                } else {
                    panel.forward().await
                };
                drop(waiting);
                match rendered {
                    Some(r) => emit(run, &panel, Some(&r), None).await?,
                    None => console::warn("no history entry in that direction"),
                }
            }
            ":history" => {
                for (i, url) in panel.history().entries().iter().enumerate() {
                    println!("{:>3}  {}", i + 1, url);
                }
            }
            ":stats" => {
                let stats = panel.stats().await;
                emit(run, &panel, None, Some(&stats)).await?;
            }
            ":cc" => {
                clear_cache = !clear_cache;
                console::format_kv_line("ClearCache", format_bool(clear_cache));
            }
            _ if line.starts_with(":send") => {
                match crate::utils::parse_u64_opt(line.trim_start_matches(":send")) {
                    Ok(n) => {
                        let n = n.filter(|n| *n > 0);
                        max_rows = n;
                        console::format_kv_line(
                            "Send",
                            &n.map(|n| n.to_string()).unwrap_or_else(|| "all".to_string()),
                        );
                    }
                    Err(e) => console::warn(&format!("invalid :send value: {e}")),
                }
            }
            _ if line.starts_with(':') => console::warn(&format!("unknown command {line}")),
            query => {
                let state = QueryState::new(query)
                    .with_clear_cache(clear_cache)
                    .with_max_rows(max_rows);
                let rendered = dispatch(&mut panel, run, state).await?;
                emit(run, &panel, Some(&rendered), None).await?;
            }
        }
    }
    Ok(())
}

async fn dispatch(panel: &mut Panel, run: &RunConfig, state: QueryState) -> Result<Rendered, String> {
    console::debug(run.verbose, &format!("GET {}", panel.request_url(&state)));
    let waiting = console::WaitingIndicator::start("waiting for the query service");
    let rendered = panel.submit(state).await.map_err(|e| e.to_string());
    drop(waiting);
    rendered
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    print_banner();

    let now = Instant::now();
    let mut panel = Panel::new(run.panel_options()).map_err(|e| e.to_string())?;

    console::format_kv_line("Endpoint", panel.endpoint().base().as_str());
    console::format_kv_line(
        "Send",
        &run.state
            .max_rows
            .map(|n| n.to_string())
            .unwrap_or_else(|| "all".to_string()),
    );
    console::format_kv_line("ClearCache", format_bool(run.state.clear_cache));
    if let Some(path) = run.output.as_deref() {
        console::format_kv_line("Output", path);
    }

    if run.interactive {
        return run_interactive(panel, &run).await;
    }

    let mut failed = false;
    if run.state.has_query() {
        console::debug(run.verbose, &format!("GET {}", panel.request_url(&run.state)));
        let waiting = console::WaitingIndicator::start("waiting for the query service");
        let result = if run.show_stats {
            panel
                .submit_with_stats(run.state.clone())
                .await
                .map(|(r, s)| (r, Some(s)))
        } else {
            panel.submit(run.state.clone()).await.map(|r| (r, None))
        };
        drop(waiting);
        let (rendered, stats) = result.map_err(|e| e.to_string())?;
        failed = matches!(rendered.outcome, Err(ref e) if e.is_transport());
        emit(&run, &panel, Some(&rendered), stats.as_ref()).await?;
    } else {
        console::debug(run.verbose, &format!("GET {}", panel.endpoint().stats_url()));
        let waiting = console::WaitingIndicator::start("waiting for the query service");
        let stats = panel.stats().await;
        drop(waiting);
        emit(&run, &panel, None, Some(&stats)).await?;
    }

    println!();
    println!(":: Completed :: took {}ms ::", now.elapsed().as_millis());

    if failed {
        return Err("the query service could not be reached".to_string());
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));

    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "could not determine a config path".to_string())?;
        if config::ensure_default_config_file(&path)? {
            console::info(&format!("wrote default config to {}", path.display()));
        } else {
            console::warn(&format!("config already exists at {}", path.display()));
        }
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    if let Some(format) = run.export {
        if run.no_color {
            colored::control::set_override(false);
        }
        return run_export(&run, format);
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
