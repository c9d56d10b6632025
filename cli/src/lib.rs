use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use slidegen_chatgpt::{ChatGptClient, OutlineRequest};
use slidegen_common::{pdf_path_for, DeckConfig, FontFamily, SlideBounds};
use slidegen_core::{
    DeckAssembler, ErrorReporter, GenerationRequest, PdfConvert, PdfConverter, StaticOutline,
};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slidegen")]
#[command(about = "AI-powered presentation generator", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Override model (e.g., deepseek-chat)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Configuration file (JSON or TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct BoundsArgs {
    /// Minimum number of slides (3-15)
    #[arg(long)]
    pub min_slides: Option<usize>,

    /// Maximum number of slides (3-15)
    #[arg(long)]
    pub max_slides: Option<usize>,
}

impl BoundsArgs {
    fn resolve(&self, config: &DeckConfig) -> Result<SlideBounds> {
        let min = self.min_slides.unwrap_or(config.min_slides);
        let max = self.max_slides.unwrap_or(config.max_slides);
        Ok(SlideBounds::new(min, max)?)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive presentation form
    Interactive,
    /// Generate a presentation from a topic
    Generate {
        /// Presentation topic
        prompt: String,
        #[command(flatten)]
        bounds: BoundsArgs,
        /// Font family for all slide text
        #[arg(long)]
        font: Option<FontFamily>,
        /// Output path (defaults to the slugified topic)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also convert the deck to PDF
        #[arg(long)]
        pdf: bool,
        /// Use a saved outline JSON instead of asking the model
        #[arg(long)]
        outline: Option<PathBuf>,
    },
    /// Print the outline the model proposes, without building a deck
    Outline {
        /// Presentation topic
        prompt: String,
        #[command(flatten)]
        bounds: BoundsArgs,
        /// Write the outline JSON to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Convert an existing deck to PDF
    Convert {
        /// Path to the .pptx file
        deck: PathBuf,
        /// Output path (defaults to the deck path with .pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let interactive = matches!(cli.command, None | Some(Commands::Interactive));
    init_logging(cli.debug, interactive)?;

    match cli.command {
        Some(Commands::Interactive) | None => {
            let config = load_config(&cli.config, &cli.model)?;
            slidegen_tui::run_interactive(config).await?;
        }
        Some(Commands::Generate {
            prompt,
            bounds,
            font,
            output,
            pdf,
            outline,
        }) => {
            let config = load_config(&cli.config, &cli.model)?;
            let request = GenerationRequest {
                bounds: bounds.resolve(&config)?,
                font: font.unwrap_or(config.font),
                output,
                output_dir: config.output_dir.clone(),
                convert_pdf: pdf,
                prompt,
            };
            generate(&config, request, outline.as_deref()).await?;
        }
        Some(Commands::Outline {
            prompt,
            bounds,
            output,
        }) => {
            let config = load_config(&cli.config, &cli.model)?;
            let bounds = bounds.resolve(&config)?;
            print_outline(&config, prompt, bounds, output.as_deref()).await?;
        }
        Some(Commands::Convert { deck, output }) => {
            convert(&deck, output).await?;
        }
    }

    Ok(())
}

/// stderr for one-shot commands; a file in interactive mode so log lines
/// don't land on the alternate screen.
fn init_logging(debug: bool, to_file: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = if to_file {
        let path = std::env::var_os("SLIDEGEN_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("slidegen.log"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
    } else {
        builder.with_writer(std::io::stderr).try_init()
    };
    installed.map_err(|e| anyhow!("installing logger: {e}"))
}

fn load_config(path: &Option<PathBuf>, model: &Option<String>) -> Result<DeckConfig> {
    let mut config = DeckConfig::load(path.as_deref()).context("loading configuration")?;
    if let Some(model) = model {
        config.model = model.clone();
    }
    Ok(config)
}

async fn generate(config: &DeckConfig, request: GenerationRequest, outline: Option<&Path>) -> Result<()> {
    let assembler = match outline {
        Some(path) => {
            let source = StaticOutline::from_file(path)
                .with_context(|| format!("reading outline {}", path.display()))?;
            DeckAssembler::with_outline_source(config, Arc::new(source))
        }
        None => DeckAssembler::from_config(config),
    }
    .map_err(|e| anyhow!(ErrorReporter::format_user_error(&e)))?;

    println!(
        "Generating {}-{} slides for: {}",
        request.bounds.min(),
        request.bounds.max(),
        request.prompt
    );
    let report = assembler
        .generate(&request)
        .await
        .map_err(|e| anyhow!(ErrorReporter::format_user_error(&e)))?;

    println!("Presentation saved to: {}", report.deck_path.display());
    println!("Slides: {}", report.slide_count);
    if report.placeholder_images > 0 {
        println!("Images replaced by placeholders: {}", report.placeholder_images);
    }
    if request.convert_pdf {
        match &report.pdf_path {
            Some(pdf) => println!("PDF saved to: {}", pdf.display()),
            None => eprintln!("⚠️  PDF conversion failed; the .pptx is still available"),
        }
    }
    Ok(())
}

async fn print_outline(
    config: &DeckConfig,
    prompt: String,
    bounds: SlideBounds,
    output: Option<&Path>,
) -> Result<()> {
    let client = ChatGptClient::from_config(config)?;
    let outline = client
        .generate_outline(&OutlineRequest::new(prompt, bounds))
        .await?
        .ok_or_else(|| anyhow!("the model did not return a usable outline"))?;

    let json = serde_json::to_string_pretty(&outline)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            println!("Outline saved to: {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

async fn convert(deck: &Path, output: Option<PathBuf>) -> Result<()> {
    if !deck.is_file() {
        bail!("deck not found: {}", deck.display());
    }
    let pdf = output.unwrap_or_else(|| pdf_path_for(deck));
    if !PdfConverter::new().convert(deck, &pdf).await {
        bail!("PDF conversion failed or is not supported on this system");
    }
    println!("PDF saved to: {}", pdf.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bounds_fall_back_to_config() {
        let config = DeckConfig::default();
        let args = BoundsArgs {
            min_slides: Some(4),
            max_slides: None,
        };
        let bounds = args.resolve(&config).unwrap();
        assert_eq!((bounds.min(), bounds.max()), (4, config.max_slides));
    }

    #[test]
    fn out_of_range_bounds_are_rejected() {
        let config = DeckConfig::default();
        let args = BoundsArgs {
            min_slides: Some(2),
            max_slides: Some(20),
        };
        assert!(args.resolve(&config).is_err());
    }

    #[test]
    fn font_names_parse_on_the_command_line() {
        let cli = Cli::try_parse_from(["slidegen", "generate", "tea", "--font", "times new roman"]).unwrap();
        match cli.command {
            Some(Commands::Generate { font, .. }) => assert_eq!(font, Some(FontFamily::TimesNewRoman)),
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["slidegen", "--debug"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.debug);
    }
}
