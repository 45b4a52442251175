use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "qpanel",
    version,
    about = "query panel for QLever-style SPARQL endpoints",
    long_about = "qpanel sends a query to a QLever-style endpoint, renders the answer as a table and prints a shareable link to the result.\n\nExamples:\n  qpanel -e http://localhost:7001/ -q 'SELECT * WHERE { ?s ?p ?o } LIMIT 10'\n  qpanel -l 'http://localhost:7001/?query=SELECT...&send=100' -o result.html\n  qpanel -e http://localhost:7001/ -q '...' --export csv -o result.csv\n  qpanel -e http://localhost:7001/ --stats\n\nTip: Use --config to persist the endpoint and display settings."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v prints request URLs)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'e',
        long = "ep",
        visible_alias = "endpoint",
        value_name = "URL",
        help_heading = "Input",
        help = "Base URL of the query service."
    )]
    pub endpoint: Option<String>,

    #[arg(
        short = 'q',
        long = "q",
        visible_alias = "query",
        value_name = "QUERY",
        help_heading = "Input",
        help = "Query text."
    )]
    pub query: Option<String>,

    #[arg(
        short = 'f',
        long = "qf",
        visible_alias = "query-file",
        value_name = "FILE",
        help_heading = "Input",
        help = "Read the query text from a file."
    )]
    pub query_file: Option<String>,

    #[arg(
        short = 'l',
        long = "ln",
        visible_alias = "link",
        value_name = "URL",
        help_heading = "Input",
        help = "Open a shared result link (query, cmd and send are taken from it)."
    )]
    pub link: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.qpanel/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a commented default config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'i',
        long = "it",
        visible_alias = "interactive",
        help_heading = "Input",
        help = "Read queries from stdin, one per line (:back, :forward, :history, :stats, :quit)."
    )]
    pub interactive: bool,

    #[arg(
        short = 's',
        long = "send",
        visible_alias = "max-rows",
        value_name = "N",
        help_heading = "Request",
        help = "Ask the service to send at most N rows (default 100, 0 = all)."
    )]
    pub send: Option<u64>,

    #[arg(
        long = "cc",
        visible_alias = "clear-cache",
        help_heading = "Request",
        help = "Ask the service to clear its cache before answering."
    )]
    pub clear_cache: bool,

    #[arg(
        long = "ccc",
        visible_alias = "clear-cache-command",
        value_name = "CMD",
        help_heading = "Request",
        help = "Spelling of the clear-cache command: clear-cache or clearcache."
    )]
    pub clear_cache_command: Option<String>,

    #[arg(
        short = 'p',
        long = "pu",
        visible_alias = "page-url",
        value_name = "URL",
        help_heading = "Request",
        help = "Base URL for shareable links (defaults to the endpoint)."
    )]
    pub page_url: Option<String>,

    #[arg(
        short = 'x',
        long = "px",
        visible_alias = "proxy",
        value_name = "URL",
        help_heading = "Request",
        help = "HTTP proxy."
    )]
    pub proxy: Option<String>,

    #[arg(
        short = 't',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "Request",
        help = "Request timeout in seconds (0 = none)."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'E',
        long = "ex",
        visible_alias = "export",
        value_name = "FORMAT",
        help_heading = "Export",
        help = "Download the result as csv or tsv instead of rendering it."
    )]
    pub export: Option<String>,

    #[arg(
        short = 'S',
        long = "st",
        visible_alias = "stats",
        num_args = 0..=1,
        default_missing_value = "true",
        help_heading = "Output",
        help = "Fetch and show index statistics."
    )]
    pub stats: Option<bool>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the result to a file (format from --output-format or the extension)."
    )]
    pub output: Option<String>,

    #[arg(
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output file format: text, json or html."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'm',
        long = "mcl",
        visible_alias = "max-cell-length",
        value_name = "N",
        help_heading = "Output",
        help = "Maximum displayed length of a cell."
    )]
    pub max_cell_length: Option<usize>,

    #[arg(
        long = "tr",
        visible_alias = "terminal-rows",
        value_name = "N",
        help_heading = "Output",
        help = "Maximum number of rows printed to the terminal."
    )]
    pub terminal_rows: Option<usize>,
}
