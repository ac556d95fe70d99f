//! CLI binary for edgequake-pdf-extract.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::Parser;
use edgequake_pdf_extract::{
    extract_input, extract_to_file, inspect, ContentHashFingerprint, EncodedImage,
    ExtractionConfig, ExtractionProgressCallback, FingerprintStrategy, LengthTailFingerprint,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
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

/// Terminal progress callback: a live bar plus one log line per page that
/// produced images or errors.
struct CliProgressCallback {
    bar: ProgressBar,
    page_started: Mutex<Instant>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_extraction_start` tells us the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(Instant::now()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
        self.bar.reset_eta();
    }

    fn page_elapsed_ms(&self) -> u128 {
        self.page_started
            .lock()
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0)
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_extraction_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Extracting {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut t) = self.page_started.lock() {
            *t = Instant::now();
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, text_len: usize, images_added: usize) {
        if images_added > 0 {
            self.bar.println(format!(
                "  {} Page {:>3}/{:<3}  {:<12}  {:<10}  {}",
                green("✓"),
                page_num,
                total,
                dim(&format!("{text_len:>6} chars")),
                dim(&format!("+{images_added} img")),
                dim(&format!("{:.1}s", self.page_elapsed_ms() as f64 / 1000.0)),
            ));
        }
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Keep the log line on one row.
        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
    }

    fn on_extraction_complete(&self, total_pages: usize, image_count: usize) {
        self.bar.finish_and_clear();
        let errors = self.errors.load(Ordering::SeqCst);

        if errors == 0 {
            eprintln!(
                "{} {} pages, {} images",
                green("✔"),
                bold(&total_pages.to_string()),
                bold(&image_count.to_string())
            );
        } else {
            eprintln!(
                "{} {} pages, {} images  ({} skipped items)",
                cyan("⚠"),
                bold(&total_pages.to_string()),
                bold(&image_count.to_string()),
                red(&errors.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Text to stdout
  pdfextract document.pdf

  # Full result (text + base64 images) as JSON
  pdfextract --json document.pdf > result.json

  # Write JSON to a file and dump the images next to it
  pdfextract document.pdf -o result.json --images-dir images/

  # Extract from a URL
  pdfextract https://arxiv.org/pdf/1706.03762 -o attention.json

  # Page count and PDF version only
  pdfextract --inspect-only document.pdf

  # Exact duplicate detection instead of the fast heuristic
  pdfextract --fingerprint content-hash document.pdf --json

OUTPUT:
  Text is emitted page by page, each page preceded by its page marker
  (default "\n--- Page N ---\n"). At most --max-images images are kept,
  each larger than --min-image-dimension on both sides, deduplicated, and
  stored as JPEG data URLs.

ENVIRONMENT VARIABLES:
  Every flag can also be set through PDFEXTRACT_<FLAG>, e.g.
  PDFEXTRACT_MAX_IMAGES=20. RUST_LOG overrides the log filter.
"#;

/// Extract text and images from PDF files and URLs.
#[derive(Parser, Debug)]
#[command(
    name = "pdfextract",
    version,
    about = "Extract text and images from PDF files and URLs",
    long_about = "Extract the page-delimited plain text and the embedded raster images \
(deduplicated, capped, JPEG-compressed) from a local PDF or a PDF URL.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write the JSON result to this file instead of printing to stdout.
    #[arg(short, long, env = "PDFEXTRACT_OUTPUT")]
    output: Option<PathBuf>,

    /// Write each extracted image as image-NNN.jpg into this directory.
    #[arg(long, env = "PDFEXTRACT_IMAGES_DIR")]
    images_dir: Option<PathBuf>,

    /// Print the full result as JSON instead of plain text.
    #[arg(long, env = "PDFEXTRACT_JSON")]
    json: bool,

    /// Maximum number of images kept (0 disables image extraction).
    #[arg(long, env = "PDFEXTRACT_MAX_IMAGES", default_value_t = 50)]
    max_images: usize,

    /// Images must be larger than this many pixels on both sides.
    #[arg(long, env = "PDFEXTRACT_MIN_IMAGE_DIMENSION", default_value_t = 100)]
    min_image_dimension: u32,

    /// Yield to the runtime after every N pages.
    #[arg(long, env = "PDFEXTRACT_YIELD_INTERVAL", default_value_t = 5,
          value_parser = clap::value_parser!(u64).range(1..))]
    yield_interval: u64,

    /// JPEG quality (1–100).
    #[arg(long, env = "PDFEXTRACT_JPEG_QUALITY", default_value_t = 80,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    jpeg_quality: u8,

    /// Page marker template; {page} is replaced by the page number.
    #[arg(long, env = "PDFEXTRACT_PAGE_MARKER", default_value = "\n--- Page {page} ---\n")]
    page_marker: String,

    /// Duplicate detection: length-tail (fast, approximate) or content-hash (exact).
    #[arg(long, env = "PDFEXTRACT_FINGERPRINT", value_enum, default_value = "length-tail")]
    fingerprint: FingerprintArg,

    /// Disable progress bar.
    #[arg(long, env = "PDFEXTRACT_NO_PROGRESS")]
    no_progress: bool,

    /// Print page count and PDF version only, no extraction.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFEXTRACT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFEXTRACT_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDFEXTRACT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FingerprintArg {
    LengthTail,
    ContentHash,
}

impl From<FingerprintArg> for Arc<dyn FingerprintStrategy> {
    fn from(v: FingerprintArg) -> Self {
        match v {
            FingerprintArg::LengthTail => Arc::new(LengthTailFingerprint),
            FingerprintArg::ContentHash => Arc::new(ContentHashFingerprint),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
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

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let info = inspect(&cli.input).await.context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialize document info")?
            );
        } else {
            println!("File:         {}", cli.input);
            println!("Pages:        {}", info.page_count);
            println!("PDF Version:  {}", info.pdf_version);
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;
    let start = Instant::now();

    // ── Run extraction ───────────────────────────────────────────────────
    let result = match cli.output {
        Some(ref output_path) => extract_to_file(&cli.input, output_path, &config).await,
        None => extract_input(&cli.input, &config).await,
    }
    .context("Extraction failed")?;

    if let Some(ref dir) = cli.images_dir {
        write_images(dir, &result.images).await?;
        if !cli.quiet {
            eprintln!(
                "   {} images → {}",
                result.images.len(),
                bold(&dir.display().to_string())
            );
        }
    }

    if let Some(ref output_path) = cli.output {
        if !cli.quiet {
            eprintln!(
                "{}  {} pages  {} images  {}ms  →  {}",
                green("✔"),
                result.page_count,
                result.images.len(),
                start.elapsed().as_millis(),
                bold(&output_path.display().to_string()),
            );
        }
    } else if cli.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(result.text.as_bytes())
            .context("Failed to write to stdout")?;
        if !result.text.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }

        if !cli.quiet && !show_progress {
            eprintln!(
                "Extracted {} pages and {} images in {}ms",
                result.page_count,
                result.images.len(),
                dim(&start.elapsed().as_millis().to_string())
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .max_images(cli.max_images)
        .min_image_dimension(cli.min_image_dimension)
        .yield_interval(cli.yield_interval as usize)
        .jpeg_quality(cli.jpeg_quality)
        .page_marker(cli.page_marker.clone())
        .fingerprint(cli.fingerprint.clone().into())
        .download_timeout_secs(cli.download_timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Decode each data URL and write it as `image-NNN.jpg`.
async fn write_images(dir: &Path, images: &[EncodedImage]) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    for (i, image) in images.iter().enumerate() {
        let jpeg = STANDARD
            .decode(image.base64())
            .with_context(|| format!("Image {} is not valid base64", i + 1))?;
        let path = dir.join(format!("image-{:03}.jpg", i + 1));
        tokio::fs::write(&path, &jpeg)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}
