use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use quizcast_core::{
    ChatClient, ExtractionOutcome, ModelClient, ModelRequest, Provider, ScopedThreads,
    VideoAnalysis, cache::get_root_cache_dir, format_quiz_readable, format_report_readable,
    load_history, process_quiz, process_report, prompt::report_prompt,
};
use serde::Serialize;
use serde_json::json;
use tokio::io::AsyncReadExt;
use tracing::{Instrument, error, info_span};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::fetch::{FetchOptions, fetch_quiz_responses, process_and_cache};

mod fetch;
mod ui;

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Gemini,
    Openai,
    Grok,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Gemini => Provider::Gemini,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Grok => Provider::Grok,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum Shape {
    Quiz,
    Report,
}

#[derive(Parser)]
#[command(name = "quizcast")]
#[command(about = "Turn educational videos into timed quizzes and learning reports")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a timed quiz for every video. One failed video fails the whole run.
    Quiz(QuizArgs),
    /// Generate a parent-friendly learning report from a learning history file
    Report(ReportArgs),
    /// Run the extraction pipeline on a saved model response (no network)
    Extract(ExtractArgs),
}

#[derive(Args)]
struct QuizArgs {
    /// Video URLs
    #[arg(required = true)]
    urls: Vec<String>,

    /// Language for the translated explanations
    #[arg(short, long, default_value = "english")]
    lang: String,

    /// AI provider for quiz generation
    #[arg(short, long, default_value = "gemini")]
    provider: CliProvider,

    /// Ask the model again even if a cached response exists
    #[arg(short, long)]
    force: bool,

    /// Maximum number of videos analyzed at the same time
    #[arg(short, long, default_value_t = 3)]
    concurrency: usize,

    /// Do not read or write the response cache
    #[arg(long)]
    no_cache: bool,

    /// Print the JSON envelope instead of readable text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ReportArgs {
    /// JSON file with the learning history
    #[arg(long)]
    history: PathBuf,

    /// Learner's name used in the report
    #[arg(short, long, default_value = "your child")]
    name: String,

    /// AI provider for report generation
    #[arg(short, long, default_value = "gemini")]
    provider: CliProvider,

    /// Print the JSON envelope instead of readable text
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExtractArgs {
    /// Expected payload shape
    shape: Shape,

    /// File with the raw model response, stdin when omitted
    file: Option<PathBuf>,

    /// Print JSON instead of readable text
    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn chat_client(provider: Provider) -> ChatClient {
    // Validate API key early
    ChatClient::new(provider).unwrap_or_else(|e| ui::fail(e))
}

async fn run_quiz(args: QuizArgs) -> Result<()> {
    let provider: Provider = args.provider.into();
    let client: Arc<dyn ModelClient> = Arc::new(chat_client(provider));

    if !args.json {
        ui::banner("Video Quiz Builder");
    }

    let total_start = Instant::now();
    let options = FetchOptions {
        language: args.lang.clone(),
        provider,
        force: args.force,
        concurrency: args.concurrency,
        cache_root: (!args.no_cache).then(get_root_cache_dir),
    };

    let spinner = ui::create_spinner(&format!(
        "Analyzing {} video(s) with {}...",
        args.urls.len(),
        provider.name()
    ));
    let fetched = match fetch_quiz_responses(client, &args.urls, &options).await {
        Ok(fetched) => fetched,
        Err(e) => {
            spinner.finish_and_clear();
            ui::fail(format!("{e:#}"));
        }
    };
    spinner.finish_with_message(ui::done(
        format!(
            "Model responses received {}",
            style(format!("({} cached)", fetched.cached)).dim()
        ),
        total_start.elapsed(),
    ));

    let step_start = Instant::now();
    let dispatch = ScopedThreads {
        max_workers: args.concurrency,
    };
    let results = process_and_cache(fetched, &dispatch)
        .await
        .unwrap_or_else(|e| ui::fail(e));
    let analysis = VideoAnalysis {
        results,
        language: args.lang,
    };

    if args.json {
        return print_json(&json!({
            "status": "success",
            "results": analysis.results,
            "language": analysis.language,
        }));
    }

    let questions: usize = analysis.results.iter().map(|b| b.segments.len()).sum();
    eprintln!(
        "{}",
        ui::done(
            format!("Validated {} question(s)", questions),
            step_start.elapsed()
        )
    );
    eprintln!("{}", style("─".repeat(60)).dim());

    for (url, batch) in args.urls.iter().zip(&analysis.results) {
        println!("## {}\n", url);
        println!("{}", format_quiz_readable(batch));
    }

    Ok(())
}

async fn run_report(args: ReportArgs) -> Result<()> {
    let provider: Provider = args.provider.into();
    let history = load_history(&args.history)
        .await
        .with_context(|| format!("Failed to read learning history {}", args.history.display()))?;

    if history.is_empty() {
        ui::fail("No learning history provided");
    }

    let client = chat_client(provider);
    let prompt = report_prompt(&args.name, &history)?;

    if !args.json {
        ui::banner("Learning Report");
    }

    let step_start = Instant::now();
    let spinner = ui::create_spinner(&format!("Writing report with {}...", provider.name()));
    let text = match client.complete(&ModelRequest::report(prompt)).await {
        Ok(text) => text,
        Err(e) => {
            spinner.finish_and_clear();
            ui::fail(format!("Failed to generate report: {e}"));
        }
    };

    let report = match process_report(&text) {
        ExtractionOutcome::Success(report) => report,
        ExtractionOutcome::Failure { kind, message } => {
            spinner.finish_and_clear();
            error!(%kind, "{message}");
            ui::fail("Invalid report format");
        }
    };
    spinner.finish_with_message(ui::done(
        format!("Report generated ({})", provider.name()),
        step_start.elapsed(),
    ));

    if args.json {
        return print_json(&json!({ "status": "success", "data": report }));
    }

    eprintln!("{}", style("─".repeat(60)).dim());
    println!(
        "Score: {}/{} correct\n",
        history.correct_count(),
        history.entries().len()
    );
    println!("{}", format_report_readable(&report));
    Ok(())
}

async fn run_extract(args: ExtractArgs) -> Result<()> {
    let raw = match &args.file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };

    match args.shape {
        Shape::Quiz => match process_quiz(&raw) {
            ExtractionOutcome::Success(batch) if args.json => print_json(&batch)?,
            ExtractionOutcome::Success(batch) => println!("{}", format_quiz_readable(&batch)),
            ExtractionOutcome::Failure { kind, message } => ui::fail(format!("[{kind}] {message}")),
        },
        Shape::Report => match process_report(&raw) {
            ExtractionOutcome::Success(report) if args.json => print_json(&report)?,
            ExtractionOutcome::Success(report) => println!("{}", format_report_readable(&report)),
            ExtractionOutcome::Failure { kind, message } => ui::fail(format!("[{kind}] {message}")),
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let request_id = Uuid::new_v4();

    match cli.command {
        Command::Quiz(args) => {
            let span = info_span!("quiz", %request_id, videos = args.urls.len());
            run_quiz(args).instrument(span).await
        }
        Command::Report(args) => {
            let span = info_span!("report", %request_id);
            run_report(args).instrument(span).await
        }
        Command::Extract(args) => run_extract(args).await,
    }
}
