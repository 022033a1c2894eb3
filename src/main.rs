use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use pagetoast::scenario::{run_scenario, Observation, Scenario, ScenarioStep};
use pagetoast::stylesheet::StylesheetIndex;
use pagetoast::{Document, Page, PageConfig, ToastConfig, ToastPresenter};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pagetoast", version, about = "Show transient toasts on a headless page")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON toast configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show one toast and print the surface at the given instants
    Show {
        message: String,
        #[arg(short, long)]
        category: Option<String>,
        /// HTML page to show the toast on (blank page by default)
        #[arg(long)]
        page: Option<PathBuf>,
        /// Instants (ms) to observe; defaults to 0 and the hide delay
        #[arg(long = "at")]
        at: Vec<u64>,
        /// Print observations as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay a JSON scenario and print the observations as JSON
    Replay {
        scenario: PathBuf,
        #[arg(long)]
        page: Option<PathBuf>,
    },
    /// List toast classes the page stylesheet does not define
    Check {
        #[arg(long)]
        page: PathBuf,
        /// Categories the page is expected to use
        #[arg(short, long = "category")]
        categories: Vec<String>,
    },
}

fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .init()
        .context("failed to build logger instance")
}

fn load_page(path: Option<&Path>) -> anyhow::Result<Page> {
    let document = match path {
        Some(p) => Document::from_file(p).with_context(|| format!("reading page {}", p.display()))?,
        None => Document::new(),
    };
    Ok(Page::with_document(document, PageConfig::default()))
}

fn print_observations(observations: &[Observation], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(observations)?);
        return Ok(());
    }
    for obs in observations {
        match &obs.surface {
            Some(s) => println!(
                "{:>6}ms  {:<7} class=\"{}\" text={:?}",
                obs.at_ms,
                if s.visible { "visible" } else { "hidden" },
                s.classes.join(" "),
                s.text
            ),
            None => println!("{:>6}ms  (no surface)", obs.at_ms),
        }
    }
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ToastConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ToastConfig::default(),
    };

    match cli.command {
        Command::Show {
            message,
            category,
            page,
            at,
            json,
        } => {
            let observe_at = if at.is_empty() {
                vec![0, config.hide_delay_ms]
            } else {
                at
            };
            let scenario = Scenario {
                steps: vec![ScenarioStep {
                    at_ms: 0,
                    message,
                    category,
                }],
                observe_at,
            };
            let mut page = load_page(page.as_deref())?;
            let mut presenter = ToastPresenter::new(config)?;
            let observations = run_scenario(&mut page, &mut presenter, &scenario)?;
            print_observations(&observations, json)
        }
        Command::Replay { scenario, page } => {
            let scenario = Scenario::from_file(&scenario)
                .with_context(|| format!("loading scenario {}", scenario.display()))?;
            let mut page = load_page(page.as_deref())?;
            let mut presenter = ToastPresenter::new(config)?;
            let observations = run_scenario(&mut page, &mut presenter, &scenario)?;
            print_observations(&observations, true)
        }
        Command::Check { page, categories } => {
            let doc = Document::from_file(&page)
                .with_context(|| format!("reading page {}", page.display()))?;
            let index = StylesheetIndex::from_document(&doc);
            let mut categories: Vec<&str> = categories.iter().map(String::as_str).collect();
            if categories.is_empty() {
                categories.push(config.default_category.as_str());
            }
            let missing = index.missing_classes(&config, &categories);
            if missing.is_empty() {
                println!("all toast classes defined");
                return Ok(());
            }
            for class in &missing {
                println!("missing .{}", class);
            }
            bail!("{} toast class(es) missing from {}", missing.len(), page.display())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("{:#}", e);
    }
    if let Err(e) = run(cli) {
        eprintln!("pagetoast: {:#}", e);
        std::process::exit(1);
    }
}
