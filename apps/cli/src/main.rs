use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;
use tokio_util::sync::CancellationToken;

use skipdeck_core::{
    format_interval, format_intervals_copyable, format_timestamp,
    format_transcript_with_timestamps, AnalysisPipeline, AnalysisRequest, Diagnostic,
    ExtractorConfig, FlashcardBuilder, HttpTranslator, IdentityTranslator, KeywordCueMatcher,
    KeywordExtractor, SponsorDetector, TranscriptProvider, TranslationProvider,
    DEFAULT_TRANSLATION_CONCURRENCY,
};

use crate::source::FileTranscriptSource;

mod export;
mod source;

/// How many flashcards to print before eliding the rest.
const PREVIEW_CARDS: usize = 10;

#[derive(Parser)]
#[command(name = "skipdeck")]
#[command(
    about = "Flag sponsor segments in a video transcript and build translated flashcards from its keywords"
)]
struct Cli {
    /// Transcript JSON file: [{"start": 0.0, "duration": 3.0, "text": "..."}, ...]
    transcript: PathBuf,

    /// Video URL the transcript belongs to, used as the run label
    #[arg(short, long)]
    url: Option<String>,

    /// Target language for flashcard translation (e.g., "en", "fr", "es")
    #[arg(short, long, default_value = "en")]
    lang: String,

    /// Keep only the top K keywords
    #[arg(long)]
    top_k: Option<usize>,

    /// Extra sponsor cue phrase (repeatable)
    #[arg(long = "cue")]
    cues: Vec<String>,

    /// LibreTranslate-compatible endpoint; omit to leave cards untranslated
    #[arg(long)]
    endpoint: Option<String>,

    /// API key for the translation endpoint
    #[arg(long)]
    api_key: Option<String>,

    /// Source language of the transcript, passed to the translation endpoint
    #[arg(long, default_value = "auto")]
    source_lang: String,

    /// Per-request timeout for the translation endpoint, in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Concurrent translation requests
    #[arg(long, default_value_t = DEFAULT_TRANSLATION_CONCURRENCY)]
    concurrency: usize,

    /// Write all flashcards to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the transcript with timestamps before analyzing
    #[arg(long)]
    show_transcript: bool,
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", secs / 60.0, secs % 60.0)
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    println!(
        "\n{}  {}\n",
        style("skipdeck").cyan().bold(),
        style("Transcript Analyzer").dim()
    );

    // Ctrl-C stops new translation requests; whatever finished is kept.
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!(
                "\n{} finishing in-flight work",
                style("Cancelling:").yellow().bold()
            );
            signal_token.cancel();
        }
    });

    let url = cli
        .url
        .clone()
        .unwrap_or_else(|| cli.transcript.display().to_string());

    let total_start = Instant::now();

    // Step 1: Load transcript
    let step_start = Instant::now();
    let spinner = create_spinner("Loading transcript...");
    let source = FileTranscriptSource::new(cli.transcript.clone());
    let transcript = match source.fetch(&url).await {
        Ok(transcript) => transcript,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };
    spinner.finish_with_message(format!(
        "{} Loaded transcript: {} segments, {} {}",
        style("✓").green().bold(),
        transcript.len(),
        style(format_timestamp(transcript.duration())).yellow(),
        style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
    ));

    if cli.show_transcript {
        println!("\n{}\n", format_transcript_with_timestamps(&transcript));
    }

    // Assemble the pipeline from the flags
    let mut detector = SponsorDetector::with_default_cues();
    if !cli.cues.is_empty() {
        detector.push_matcher(Box::new(KeywordCueMatcher::new(
            cli.cues.clone(),
            "Custom cue words",
        )));
    }
    let extractor = KeywordExtractor::new(ExtractorConfig {
        top_k: cli.top_k,
        ..ExtractorConfig::default()
    });
    let provider: Arc<dyn TranslationProvider> = match &cli.endpoint {
        Some(endpoint) => {
            let mut translator = HttpTranslator::new(endpoint)
                .with_source_lang(&cli.source_lang)
                .with_timeout(Duration::from_secs(cli.timeout_secs));
            if let Some(api_key) = &cli.api_key {
                translator = translator.with_api_key(api_key);
            }
            Arc::new(translator)
        }
        None => {
            println!(
                "{} No translation endpoint configured, cards will repeat the term",
                style("!").yellow().bold()
            );
            Arc::new(IdentityTranslator)
        }
    };
    let builder = FlashcardBuilder::new(provider).with_concurrency(cli.concurrency);
    let pipeline = AnalysisPipeline::new(detector, extractor, builder);

    // Step 2: Analyze
    let step_start = Instant::now();
    let spinner = create_spinner(&format!("Analyzing ({} target)...", cli.lang));
    let request = AnalysisRequest::new(url, &cli.lang);
    let report = pipeline.analyze(&request, transcript, &cancel).await?;
    spinner.finish_with_message(format!(
        "{} Analyzed: {} sponsor segments, {} flashcards {}",
        style("✓").green().bold(),
        report.sponsor_intervals.len(),
        report.flashcards.len(),
        style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
    ));

    // Step 3: Export (optional)
    if let Some(csv_path) = &cli.csv {
        fs::write(csv_path, export::flashcards_to_csv(&report.flashcards)).await?;
        println!(
            "{} Saved flashcards: {}",
            style("✓").green().bold(),
            style(csv_path.display()).cyan()
        );
    }

    println!(
        "\n{} {}\n",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );
    println!("{}", style("─".repeat(60)).dim());

    if report.sponsor_intervals.is_empty() {
        println!("\n{}", style("No sponsor segments detected.").dim());
    } else {
        println!(
            "\n{}",
            style(format!(
                "Sponsor segments ({})",
                report.sponsor_intervals.len()
            ))
            .bold()
        );
        for sponsor in &report.sponsor_intervals {
            println!(
                "  {}  {}",
                style(format_interval(&sponsor.interval())).cyan(),
                style(sponsor.reason()).dim()
            );
        }
        println!("\n{}", style("Copy-friendly skip list:").dim());
        println!("{}", format_intervals_copyable(&report.sponsor_intervals));
    }

    if report.flashcards.is_empty() {
        println!("\n{}", style("No flashcards produced.").dim());
    } else {
        println!(
            "\n{}",
            style(format!("Flashcards ({})", report.flashcards.len())).bold()
        );
        for card in report.flashcards.iter().take(PREVIEW_CARDS) {
            if card.is_untranslated() {
                println!(
                    "  {} → {} {}",
                    card.front(),
                    card.back(),
                    style("(untranslated)").yellow()
                );
            } else {
                println!("  {} → {}", card.front(), card.back());
            }
        }
        if report.flashcards.len() > PREVIEW_CARDS {
            println!(
                "  {}",
                style(format!(
                    "... and {} more",
                    report.flashcards.len() - PREVIEW_CARDS
                ))
                .dim()
            );
        }
    }

    if !report.diagnostics.is_empty() {
        println!(
            "\n{}",
            style(format!("Diagnostics ({})", report.diagnostics.len()))
                .yellow()
                .bold()
        );
        for diagnostic in report.diagnostics.entries() {
            match diagnostic {
                Diagnostic::MatcherFailed {
                    matcher,
                    segment_index,
                    reason,
                } => println!(
                    "  matcher {} failed on segment {}: {}",
                    matcher, segment_index, reason
                ),
                Diagnostic::TranslationSkipped { term, reason } => {
                    println!("  skipped '{}': {}", term, reason)
                }
                Diagnostic::Cancelled { stage } => println!("  cancelled during {}", stage),
            }
        }
    }

    if report.cancelled {
        println!(
            "\n{} partial results shown above",
            style("Cancelled:").yellow().bold()
        );
    }

    Ok(())
}
