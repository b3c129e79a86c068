//! # cardview
//!
//! A CLI for rendering dashboard card payloads.
//!
//! ## Overview
//!
//! cardview is built on top of cardviewlib. It reads result payloads (the
//! JSON a saved filter's remote computation returns) and renders them as a
//! styled terminal table or chart, HTML markup, or normalized JSON. It can
//! also render a whole dashboard definition, fetching each line's payload
//! from a directory of JSON files.
//!
//! ## Usage
//!
//! ```bash
//! # Render one payload to the terminal
//! cardview render result.json
//!
//! # Render as HTML with French number grouping
//! cardview render pivot.json --html --locale fr
//!
//! # Render a dashboard as JSON; payloads are read from <data>/<filter_id>.json
//! cardview dashboard sales.json --data payloads/ --output json
//!
//! # Show what is being fetched
//! cardview -v dashboard sales.json --data payloads/
//! ```

mod render;

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use cardviewlib::{
    CardviewError, ChartJs, DashboardController, DashboardDefinition, DirectorySource,
    FetchStrategy, HtmlSurface, JsonSurface, NumberLocale, RenderOptions, ResultRenderer,
    Surface, TextBarChart,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use outstanding::cli::{App, CommandContext, HandlerResult, Output, RunResult};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::render::{create_theme, CardsContext, ContextSurface, CARDS_TEMPLATE};

/// Where a command's cards are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// Template context, styled according to the output mode
    Terminal,
    /// Bootstrap markup
    Html,
    /// Card views as JSON (`--output json`)
    Structured,
}

impl Target {
    fn from_args(matches: &ArgMatches, ctx: &CommandContext) -> Self {
        if ctx.output_mode.is_structured() {
            Target::Structured
        } else if matches.get_flag("html") {
            Target::Html
        } else {
            Target::Terminal
        }
    }
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("cardview")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render dashboard card payloads as tables, charts and pivots")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("html")
                .long("html")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit Bootstrap HTML instead of terminal text"),
        )
        .arg(
            Arg::new("locale")
                .short('l')
                .long("locale")
                .global(true)
                .default_value("en")
                .help("Number grouping: en, fr or plain"),
        )
        .arg(
            Arg::new("row-header")
                .long("row-header")
                .global(true)
                .help("Header of the pivot row-label column when the payload has none"),
        )
        .arg(
            Arg::new("no-chart")
                .long("no-chart")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Show graphs as numeric callouts instead of drawing them"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log fetches and rendering decisions to stderr"),
        )
        .subcommand(
            Command::new("render")
                .about("Render one or more result payload files")
                .arg(
                    Arg::new("payload")
                        .required(true)
                        .action(ArgAction::Append)
                        .help("Path to a JSON result payload"),
                ),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Render every line of a dashboard definition")
                .arg(
                    Arg::new("definition")
                        .required(true)
                        .help("Path to the dashboard definition (JSON)"),
                )
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .default_value(".")
                        .help("Directory holding <filter_id>.json payloads"),
                ),
        )
}

/// Install the tracing subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(matches: &ArgMatches) {
    let verbose = matches.get_flag("verbose");
    let default = if verbose {
        "cardview=debug,cardviewlib=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .ok();
}

/// Build render options from matches
fn build_options(matches: &ArgMatches) -> Result<RenderOptions, anyhow::Error> {
    let locale = matches
        .get_one::<String>("locale")
        .map(|s| s.parse::<NumberLocale>())
        .transpose()?
        .unwrap_or_default();

    let mut options = RenderOptions::new().locale(locale);
    if let Some(header) = matches.get_one::<String>("row-header") {
        options = options.row_header(header);
    }
    Ok(options)
}

/// Build the renderer, choosing a chart capability suited to the target
fn build_renderer(matches: &ArgMatches, target: Target) -> Result<ResultRenderer, anyhow::Error> {
    let options = build_options(matches)?;
    let locale = options.locale;
    let renderer = ResultRenderer::new(options);

    if matches.get_flag("no-chart") {
        return Ok(renderer);
    }
    Ok(match target {
        Target::Html | Target::Structured => renderer.with_chart(ChartJs),
        Target::Terminal => renderer.with_chart(TextBarChart::new().locale(locale)),
    })
}

/// Read and parse a payload file
fn read_payload(path: &Path) -> cardviewlib::Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| CardviewError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CardviewError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Run `draw` against the surface for `target` and wrap the result for the
/// cards template
fn draw_output<F>(target: Target, draw: F) -> HandlerResult<Value>
where
    F: FnOnce(&mut dyn Surface),
{
    let value = match target {
        Target::Structured => {
            let mut surface = JsonSurface::new();
            draw(&mut surface);
            surface.into_value()
        }
        Target::Html => {
            let mut surface = HtmlSurface::new();
            draw(&mut surface);
            serde_json::to_value(CardsContext::html(surface.into_html()))?
        }
        Target::Terminal => {
            let mut surface = ContextSurface::new();
            draw(&mut surface);
            serde_json::to_value(surface.into_context())?
        }
    };
    Ok(Output::Render(value))
}

/// Handler for render command
fn render_handler(matches: &ArgMatches, ctx: &CommandContext) -> HandlerResult<Value> {
    init_logging(matches);
    let target = Target::from_args(matches, ctx);
    let renderer = build_renderer(matches, target)?;
    let paths: Vec<&String> = matches
        .get_many::<String>("payload")
        .map(|v| v.collect())
        .unwrap_or_default();

    let mut payloads = Vec::with_capacity(paths.len());
    for path in paths {
        payloads.push(read_payload(Path::new(path))?);
    }
    tracing::debug!(count = payloads.len(), ?target, "rendering payloads");

    draw_output(target, |surface| {
        for payload in &payloads {
            renderer.render_value(&mut *surface, payload);
        }
    })
}

/// Handler for dashboard command
fn dashboard_handler(matches: &ArgMatches, ctx: &CommandContext) -> HandlerResult<Value> {
    init_logging(matches);
    let target = Target::from_args(matches, ctx);
    let renderer = build_renderer(matches, target)?;
    let definition_path = matches
        .get_one::<String>("definition")
        .context("missing dashboard definition")?;
    let data_dir = matches
        .get_one::<String>("data")
        .map(|s| s.as_str())
        .unwrap_or(".");

    let definition = DashboardDefinition::from_file(definition_path)?;
    let source = DirectorySource::new(data_dir);
    let controller = DashboardController::new(renderer).with_strategy(FetchStrategy::new(source));

    draw_output(target, |surface| {
        controller.render(surface, &definition);
    })
}

fn main() -> ExitCode {
    let cmd = build_command();

    let result = App::builder()
        .theme(create_theme())
        .command("render", render_handler, CARDS_TEMPLATE)
        .command("dashboard", dashboard_handler, CARDS_TEMPLATE)
        .run_to_string(cmd, std::env::args());

    match result {
        RunResult::Handled(output) => {
            if output.starts_with("Error:") {
                eprintln!("{}", output.trim_end());
                return ExitCode::FAILURE;
            }
            print!("{}", output);
            if !output.is_empty() && !output.ends_with('\n') {
                println!();
            }
            ExitCode::SUCCESS
        }
        RunResult::Binary(_, _) => ExitCode::SUCCESS,
        RunResult::NoMatch(_) => {
            eprintln!("Error: no command given");
            ExitCode::FAILURE
        }
    }
}
