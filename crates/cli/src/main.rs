use medgemma_core::{
    config::Config,
    init,
    AnalysisRequest,
    Credential,
    InferenceResult,
    MedGemmaClient,
};
use anyhow::{Context, Result};
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use arboard::Clipboard;
use clap::{Parser, Subcommand};
use image::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};
use termimad::crossterm::style::Color;
use termimad::MadSkin;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Medical image and clinical text analysis with MedGemma", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// API token (falls back to HF_API_KEY, then an interactive prompt)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Override the vision model
    #[arg(long, global = true)]
    vision_model: Option<String>,

    /// Override the text reasoning model
    #[arg(long, global = true)]
    text_model: Option<String>,

    /// Print the result as JSON instead of rendered markdown
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Copy the result to clipboard automatically
    #[arg(short, long, global = true, default_value_t = false)]
    copy: bool,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Describe a medical image in detail
    Describe { image: PathBuf },
    /// Answer a question about a medical image
    Answer { image: PathBuf, question: String },
    /// Generate a structured radiology report
    Report { image: PathBuf },
    /// Compare an earlier and a later image
    Compare { earlier: PathBuf, later: PathBuf },
    /// Clinical reasoning over free-text clinical information
    Reason { clinical_text: String },
    /// Check whether the vision model is loaded
    Status,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Setup
    init();
    let args = Args::parse();
    init_logging(args.verbose);

    // Load config and override models if specified via CLI
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(m) = args.vision_model.clone() {
        config.vision_model = m;
    }
    if let Some(m) = args.text_model.clone() {
        config.text_model = m;
    }

    let client = MedGemmaClient::new(config).context("Failed to initialize HTTP client")?;
    let credential = read_credential(args.api_key.clone())?;

    let request = match &args.command {
        Command::Status => {
            let status = client.check_status(&credential).await;
            println!("{}: {}", client.config().vision_model, status);
            return Ok(ExitCode::SUCCESS);
        }
        Command::Describe { image } => AnalysisRequest::describe(load_image(image)?),
        Command::Answer { image, question } => AnalysisRequest::answer(load_image(image)?, question),
        Command::Report { image } => AnalysisRequest::report(load_image(image)?),
        Command::Compare { earlier, later } => {
            AnalysisRequest::compare(load_image(earlier)?, load_image(later)?)
        }
        Command::Reason { clinical_text } => AnalysisRequest::clinical_reasoning(clinical_text),
    };

    // Send to API
    let model = request.mode.model_id(client.config()).to_string();
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.green} {msg}")?
    );
    spinner.set_message(format!("Running {} with {}...", request.mode, model));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = client.run_analysis(request, credential).await;

    spinner.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    match result {
        InferenceResult::Success { text } => {
            if !args.json {
                print_markdown(&text);
            }
            if args.copy {
                copy_to_clipboard(text);
            }
            Ok(ExitCode::SUCCESS)
        }
        InferenceResult::Failure { kind, detail } => {
            if !args.json {
                eprintln!("Analysis failed ({}): {}", kind, detail);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

/// Resolves the API token from the flag, the environment, or stdin.
fn read_credential(flag: Option<String>) -> Result<Credential> {
    if let Some(key) = flag.filter(|k| !k.trim().is_empty()) {
        return Ok(Credential::new(key));
    }
    if let Ok(key) = std::env::var("HF_API_KEY") {
        if !key.trim().is_empty() {
            debug!("Using API token from HF_API_KEY");
            return Ok(Credential::new(key));
        }
    }

    print!("Enter Hugging Face API token: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(Credential::new(input))
}

fn load_image(path: &Path) -> Result<DynamicImage> {
    image::open(path).with_context(|| format!("Failed to read image {}", path.display()))
}

fn copy_to_clipboard(text: String) {
    match Clipboard::new() {
        Ok(mut clipboard) => {
            if let Err(e) = clipboard.set_text(text) {
                eprintln!("Warning: Failed to copy to clipboard: {}", e);
            } else {
                println!("(Copied to clipboard)");
            }
        },
        Err(e) => eprintln!("Warning: Could not access clipboard: {}", e),
    }
}

/// Helper to print markdown
fn print_markdown(text: &str) {
    let mut skin = MadSkin::default();
    skin.bold.set_fg(Color::Yellow);
    skin.italic.set_fg(Color::Magenta);
    skin.code_block.set_bg(Color::Rgb { r: 40, g: 40, b: 40} );

    skin.print_text(text);
}
