//! CLI binary for fliprisk.
//!
//! A thin shim over the library crate: maps flags to `AnalysisConfig`,
//! shows a spinner per stage, prints the extracted-text preview to stderr
//! and the analysis Markdown to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use fliprisk::{
    analyze, extract_file, pipeline::input::read_upload, AnalysisConfig, AnalysisReport,
    Credential, DocumentKind, EmptyTextPolicy, ExtractedText, PipelineProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One spinner that changes its message as the pipeline moves from stage
/// to stage, plus the extracted-text preview as soon as extraction ends.
struct CliProgressCallback {
    bar: Option<ProgressBar>,
    /// 0 = no preview.
    preview_chars: usize,
}

impl CliProgressCallback {
    fn new(spinner: bool, preview_chars: usize) -> Arc<Self> {
        let bar = spinner.then(|| {
            let bar = ProgressBar::new_spinner();
            let style =
                ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(TICKS);
            bar.set_style(style);
            bar.set_prefix("Preparing");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        });
        Arc::new(Self { bar, preview_chars })
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, filename: &str, kind: DocumentKind) {
        let Some(ref bar) = self.bar else { return };
        bar.println(format!("{} Processing: {}", cyan("◆"), bold(filename)));
        bar.set_prefix("Extracting");
        bar.set_message(match kind {
            DocumentKind::Pdf => "reading PDF text layer…".to_string(),
            DocumentKind::Png | DocumentKind::Jpeg => "running OCR…".to_string(),
        });
    }

    fn on_extraction_complete(&self, extracted: &ExtractedText) {
        if let Some(ref bar) = self.bar {
            let chars = extracted.char_count();
            let mark = if chars == 0 { red("✗") } else { green("✓") };
            bar.println(format!(
                "  {} Extracted text  {}",
                mark,
                dim(&format!("{chars} chars"))
            ));
        }
        if self.preview_chars == 0 {
            return;
        }
        match self.bar {
            Some(ref bar) => bar.suspend(|| print_preview(extracted, self.preview_chars)),
            None => print_preview(extracted, self.preview_chars),
        }
    }

    fn on_analysis_start(&self, prompt_chars: usize) {
        let Some(ref bar) = self.bar else { return };
        bar.set_prefix("Analyzing");
        bar.set_message(format!("waiting for the model ({prompt_chars} char prompt)…"));
    }

    fn on_analysis_complete(&self, analysis_chars: usize) {
        let Some(ref bar) = self.bar else { return };
        bar.println(format!(
            "  {} Risk analysis   {}",
            green("✓"),
            dim(&format!("{analysis_chars} chars"))
        ));
        bar.finish_and_clear();
    }

    fn on_failure(&self, _error: &str) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Analyse a PDF (key from the environment)
  export OPENAI_API_KEY=sk-...
  fliprisk annual_report.pdf

  # Analyse a scanned statement
  fliprisk --api-key sk-... statement.jpg

  # Look at the extracted text only (no API key needed)
  fliprisk --extract-only annual_report.pdf

  # Refuse to send documents with no extractable text
  fliprisk --empty-text reject scan.png

  # Another provider through edgequake-llm
  fliprisk --provider anthropic --model claude-sonnet-4-20250514 report.pdf

  # JSON report
  fliprisk --json report.pdf > report.json

ACCEPTED FILES:
  .pdf   embedded text layer only; scanned pages without text are skipped
  .png   OCR (tesseract)
  .jpg   OCR (tesseract)
  .jpeg  OCR (tesseract)

RUNTIME REQUIREMENTS:
  libpdfium   system library path, or --pdfium-lib / PDFIUM_LIB_PATH
  tesseract   on PATH, or --tesseract <PATH>
"#;

/// Financial document risk analysis with an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "fliprisk",
    version,
    about = "Extract text from a financial PDF or image and ask an LLM for a risk analysis",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF, PNG, JPG or JPEG file.
    input: PathBuf,

    /// API key for this session.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Declared MIME type (default: guessed from the file extension).
    #[arg(long)]
    mime: Option<String>,

    /// Chat model ID.
    #[arg(long, env = "FLIPRISK_MODEL", default_value = fliprisk::config::DEFAULT_MODEL)]
    model: String,

    /// edgequake-llm provider (openai, anthropic, gemini, ollama, …) instead
    /// of the `--base-url` endpoint. The provider reads its own API key.
    #[arg(long, env = "FLIPRISK_PROVIDER")]
    provider: Option<String>,

    /// OpenAI-compatible API root.
    #[arg(long, env = "FLIPRISK_BASE_URL", default_value = fliprisk::config::DEFAULT_BASE_URL)]
    base_url: String,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, default_value_t = fliprisk::config::DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Max completion tokens (default: endpoint default).
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Request timeout in seconds (default: none).
    #[arg(long)]
    timeout: Option<u64>,

    /// What to do when no text could be extracted.
    #[arg(long, value_enum, default_value = "warn")]
    empty_text: EmptyTextArg,

    /// Tesseract executable.
    #[arg(long, env = "TESSERACT_CMD", default_value = "tesseract")]
    tesseract: PathBuf,

    /// Path to libpdfium.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Print the extracted text and stop. No API key needed.
    #[arg(long)]
    extract_only: bool,

    /// Characters shown in the extracted-text preview (0 disables it).
    #[arg(long, default_value_t = fliprisk::DEFAULT_PREVIEW_CHARS)]
    preview_chars: usize,

    /// Do not print the extracted-text preview.
    #[arg(long)]
    no_preview: bool,

    /// Output the full report as JSON instead of Markdown.
    #[arg(long)]
    json: bool,

    /// Disable the spinner.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except the result and errors.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EmptyTextArg {
    Proceed,
    Warn,
    Reject,
}

impl From<EmptyTextArg> for EmptyTextPolicy {
    fn from(v: EmptyTextArg) -> Self {
        match v {
            EmptyTextArg::Proceed => EmptyTextPolicy::Proceed,
            EmptyTextArg::Warn => EmptyTextPolicy::Warn,
            EmptyTextArg::Reject => EmptyTextPolicy::Reject,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", red("✘"), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers INFO-level feedback; keep library logs quiet while
    // it is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = build_config(&cli)?;

    // The preview is printed from the extraction event so it shows up even
    // when the analysis request fails.
    if !cli.extract_only && !cli.json && (show_progress || config.preview_chars > 0) {
        let cb = CliProgressCallback::new(show_progress, config.preview_chars);
        config.progress_callback = Some(cb as Arc<dyn PipelineProgressCallback>);
    }

    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let extracted = extract_file(&cli.input, cli.mime.as_deref(), &config)
            .await
            .context("Text extraction failed")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&extracted).context("Failed to serialise text")?
            );
        } else {
            write_stdout(&extracted.text)?;
        }
        return Ok(());
    }

    // ── Credential ───────────────────────────────────────────────────────
    // Checked before the file is touched.
    let credential = if config.uses_provider() {
        None
    } else {
        Some(Credential::from_optional(cli.api_key.as_deref())?)
    };

    // ── Run analysis ─────────────────────────────────────────────────────
    let upload = read_upload(&cli.input, cli.mime.as_deref())
        .await
        .context("Failed to read upload")?;
    let report = analyze(upload, credential, &config)
        .await
        .context("Analysis failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
        return Ok(());
    }

    if !cli.quiet {
        eprintln!("{}", bold("Risk Analysis"));
        eprintln!();
    }

    write_stdout(&report.analysis)?;

    if !cli.quiet {
        print_summary(&report);
    }

    Ok(())
}

/// Map CLI args to `AnalysisConfig`.
fn build_config(cli: &Cli) -> Result<AnalysisConfig> {
    let preview_chars = if cli.quiet || cli.no_preview {
        0
    } else {
        cli.preview_chars
    };

    let mut builder = AnalysisConfig::builder()
        .model(&cli.model)
        .base_url(&cli.base_url)
        .temperature(cli.temperature)
        .empty_text(cli.empty_text.into())
        .preview_chars(preview_chars)
        .tesseract_cmd(&cli.tesseract);

    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(ref path) = cli.pdfium_lib {
        builder = builder.pdfium_lib_path(path);
    }

    builder.build().context("Invalid configuration")
}

/// Extracted-text preview block on stderr.
fn print_preview(extracted: &ExtractedText, max_chars: usize) {
    let preview = extracted.preview(max_chars);
    let total = extracted.char_count();
    eprintln!();
    eprintln!("{}", bold("Extracted Text Preview"));
    eprintln!("{}", dim(&"─".repeat(60)));
    if preview.trim().is_empty() {
        eprintln!("{}", dim("(no text extracted)"));
    } else {
        eprintln!("{}", preview.trim_end());
    }
    if total > max_chars {
        eprintln!(
            "{}",
            dim(&format!("… {} more characters sent to the model", total - max_chars))
        );
    }
    eprintln!("{}", dim(&"─".repeat(60)));
    eprintln!();
}

fn print_summary(report: &AnalysisReport) {
    let tokens = match (report.stats.input_tokens, report.stats.output_tokens) {
        (Some(i), Some(o)) => format!("{i} tokens in  /  {o} tokens out  —  "),
        _ => String::new(),
    };
    eprintln!(
        "\n{} {}{}ms total",
        green("✔"),
        dim(&tokens),
        report.stats.total_duration_ms
    );
}

fn write_stdout(text: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    if !text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}
