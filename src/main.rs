use std::cell::RefCell;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sitesaver::core::{
    format_result_report, parse_kind_list, print_error_message, print_info_message, use_colors,
    Document, ResourceKind, SiteSaverError,
};
use sitesaver::env::EnvConfig;
use sitesaver::guard::{ActivationGuard, DOWNLOAD_ALL};
use sitesaver::locator::LocatorConfig;
use sitesaver::network::{Session, SessionOptions};
use sitesaver::pipeline::{FsSink, Pipeline, RunOptions, TerminalConfirm, WorkItem};
use sitesaver::readiness::PollConfig;

const EXIT_ERROR: i32 = 1;
const EXIT_PARTIAL_FAILURE: i32 = 2;

#[derive(Clone, Debug)]
struct KindList(Vec<ResourceKind>);

fn parse_types(value: &str) -> Result<KindList, String> {
    let kinds = parse_kind_list(value).map_err(|e| e.to_string())?;
    if kinds.is_empty() {
        return Err("at least one kind is required".to_string());
    }
    Ok(KindList(kinds))
}

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version,
    author = format!("\n{}\n\n", env!("CARGO_PKG_AUTHORS").replace(':', "\n")),
    about = env!("CARGO_PKG_DESCRIPTION")
)]
struct Cli {
    /// URL, path or data URL of the page to scan
    #[arg(required_unless_present = "urls")]
    target: Option<String>,

    /// Download this URL instead of scanning the page (repeatable)
    #[arg(short = 'u', long = "url", value_name = "URL")]
    urls: Vec<String>,

    /// Resource kinds to download: css, xml, html
    #[arg(short = 't', long, value_name = "KINDS", value_parser = parse_types)]
    types: Option<KindList>,

    /// Do not ask before downloading several resources
    #[arg(short = 'y', long)]
    yes: bool,

    /// Also download located resources of unrecognized kind
    #[arg(long)]
    include_unknown: bool,

    /// Per-resource timeout in milliseconds
    #[arg(short = 'T', long, value_name = "MILLISECONDS", value_parser = clap::value_parser!(u64).range(1..=600_000))]
    timeout: Option<u64>,

    /// Number of downloads in flight at once
    #[arg(short = 'j', long, value_parser = clap::value_parser!(u16).range(1..=32))]
    concurrency: Option<u16>,

    /// Directory to save files into
    #[arg(short = 'o', long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Resolve references against this URL instead of the page URL
    #[arg(short = 'b', long, value_name = "URL")]
    base_url: Option<String>,

    /// Well-known endpoint of the host application to consider (repeatable)
    #[arg(short = 'e', long = "endpoint", value_name = "URL")]
    endpoints: Vec<String>,

    /// Reload the page until it contains this element
    #[arg(short = 'w', long, value_name = "ELEMENT")]
    wait_for: Option<String>,

    /// How long to wait for --wait-for, in milliseconds
    #[arg(long, value_name = "MILLISECONDS")]
    wait_timeout: Option<u64>,

    /// Delay between --wait-for checks, in milliseconds
    #[arg(long, value_name = "MILLISECONDS", value_parser = clap::value_parser!(u64).range(1..=60_000))]
    poll_interval: Option<u64>,

    /// Set custom User-Agent string
    #[arg(short = 'a', long, value_name = "User-Agent")]
    user_agent: Option<String>,

    /// Allow invalid X.509 (TLS) certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Only print the targets that would be downloaded
    #[arg(long)]
    list: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Suppress verbosity
    #[arg(short = 's', long)]
    silent: bool,
}

impl Cli {
    fn run_options(&self, env_config: &EnvConfig) -> RunOptions {
        let mut options = env_config.run_options();

        if !self.urls.is_empty() {
            options.urls = Some(self.urls.clone());
        }
        if let Some(KindList(kinds)) = &self.types {
            options.types = kinds.clone();
        }
        if let Some(timeout) = self.timeout {
            options.timeout = Duration::from_millis(timeout);
        }
        if let Some(concurrency) = self.concurrency {
            options.concurrency = concurrency as usize;
        }
        options.auto_confirm |= self.yes;
        options.include_unknown_kinds |= self.include_unknown;

        options
    }

    fn poll_config(&self, env_config: &EnvConfig) -> PollConfig {
        let defaults = env_config.poll_config();

        PollConfig::new(
            self.wait_timeout
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            self.poll_interval
                .map(Duration::from_millis)
                .unwrap_or(defaults.interval),
        )
        .unwrap_or(defaults)
    }
}

fn init_logging(cli: &Cli, env_config: &EnvConfig) {
    let level = if cli.silent {
        "error"
    } else {
        env_config.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(use_colors() && !env_config.no_color)
        .with_target(false)
        .init();
}

/// Loads the page, reloading it until `--wait-for` is satisfied when given
async fn load_document(
    session: &Session,
    target: &str,
    cli: &Cli,
    env_config: &EnvConfig,
) -> Result<Document, SiteSaverError> {
    let document = Document::load(session, target).await?;

    let Some(element) = cli.wait_for.as_deref() else {
        return Ok(document);
    };
    if document.contains_element(element) {
        return Ok(document);
    }

    let poll_config = cli.poll_config(env_config);
    let latest_cell: RefCell<Option<Document>> = RefCell::new(None);
    let latest = &latest_cell;

    let outcome = poll_config
        .poll_async(move || async move {
            let reloaded = Document::load(session, target).await?;
            let ready = reloaded.contains_element(element);
            *latest.borrow_mut() = Some(reloaded);
            Ok::<bool, SiteSaverError>(ready)
        })
        .await;

    if !outcome.is_satisfied() {
        return Err(SiteSaverError::NotReady {
            element: element.to_string(),
            waited: poll_config.timeout,
        });
    }

    Ok(latest_cell.into_inner().unwrap_or(document))
}

fn print_targets(items: &[WorkItem], json: bool) -> Result<(), serde_json::Error> {
    if json {
        let targets: Vec<_> = items
            .iter()
            .filter_map(|item| match item {
                WorkItem::Target(target) => Some(target),
                WorkItem::Unresolved { .. } => None,
            })
            .collect();
        print_info_message(&serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }

    for item in items {
        match item {
            WorkItem::Target(target) => print_info_message(&format!("{}\t{}", target.kind, target.url)),
            WorkItem::Unresolved { input, reason } => {
                print_info_message(&format!("invalid\t{} ({})", input, reason))
            }
        }
    }
    Ok(())
}

async fn run(cli: &Cli, env_config: &EnvConfig) -> Result<i32, SiteSaverError> {
    let options = cli.run_options(env_config);

    let session = Session::new(SessionOptions {
        user_agent: cli.user_agent.clone().or_else(|| env_config.user_agent.clone()),
        insecure: cli.insecure,
        timeout: Some(options.timeout),
    })?;

    let document = match cli.target.as_deref() {
        Some(target) => {
            let mut document = load_document(&session, target, cli, env_config).await?;
            if let Some(base_url) = &cli.base_url {
                document = document.with_base_url(base_url)?;
            }
            if let Some(title) = document.title() {
                tracing::info!("scanning \"{}\"", title.trim());
            }
            Some(document)
        }
        None => None,
    };

    let output_dir = cli
        .output
        .clone()
        .unwrap_or_else(|| env_config.output_dir.clone());
    let pipeline = Pipeline::new(session, FsSink::new(output_dir), TerminalConfirm)
        .with_locator_config(LocatorConfig {
            well_known: cli.endpoints.clone(),
        });

    if cli.list {
        let items = pipeline.resolve(&options, document.as_ref());
        if let Err(e) = print_targets(&items, cli.json) {
            print_error_message(&format!("Error: {}", e));
            return Ok(EXIT_ERROR);
        }
        return Ok(0);
    }

    let result = pipeline.run(&options, document.as_ref()).await;

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => print_info_message(&json),
            Err(e) => {
                print_error_message(&format!("Error: {}", e));
                return Ok(EXIT_ERROR);
            }
        }
    } else if !cli.silent {
        eprint!("{}", format_result_report(&result, use_colors()));
    }

    Ok(if result.has_failures() {
        EXIT_PARTIAL_FAILURE
    } else {
        0
    })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let env_config = match EnvConfig::from_env() {
        Ok(env_config) => env_config,
        Err(e) => {
            print_error_message(&format!("Error: {}", e));
            process::exit(EXIT_ERROR);
        }
    };

    init_logging(&cli, &env_config);

    let guard = ActivationGuard::new();
    let exit_code = match guard
        .activate_once(DOWNLOAD_ALL, || run(&cli, &env_config))
        .await
    {
        Some(Ok(exit_code)) => exit_code,
        Some(Err(e)) => {
            print_error_message(&format!("Error: {}", e));
            EXIT_ERROR
        }
        None => 0,
    };

    process::exit(exit_code);
}
