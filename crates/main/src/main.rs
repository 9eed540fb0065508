use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use study_guide::render::DEFAULT_OUTPUT_PATH;
use study_guide::{Config, Depth, StudyGuideGenerator, Tone};

mod server;

/// Generates study guides with a text generation model and exports them as PDF.
///
/// Configuration is read from the environment (and an optional `.env` file);
/// `GEMINI_API_KEY` is required. Fonts are searched for under `assets/fonts`
/// or in the directory named by `STUDY_GUIDE_FONTS_DIR`.
#[derive(Parser)]
#[command(author, version, about = "Study guide generator with PDF export")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the browser interface.
    #[command(name = "serve")]
    Serve {
        /// Address to listen on; overrides STUDY_GUIDE_ADDR.
        #[arg(long)]
        addr: Option<String>,
    },

    /// Generate one guide, print its sections and write the PDF.
    #[command(name = "generate", aliases = ["gen"])]
    Generate {
        /// Topic or comma separated keywords.
        #[arg(long)]
        topic: String,

        #[arg(long, default_value = "Beginner")]
        depth: Depth,

        #[arg(long, default_value = "Academic")]
        tone: Tone,

        /// Where to write the PDF; an existing file is overwritten.
        #[arg(long, short, default_value = DEFAULT_OUTPUT_PATH)]
        output: PathBuf,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {}", cause);
        }
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("study_guide=info".parse()?)
                .add_directive("study_guide_app=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;

    match cli.command {
        Commands::Serve { addr } => {
            if let Some(addr) = addr {
                config.bind_addr = addr;
            }
            server::serve(&config)
        }
        Commands::Generate {
            topic,
            depth,
            tone,
            output,
        } => generate(&config, &topic, depth, tone, &output),
    }
}

fn generate(
    config: &Config,
    topic: &str,
    depth: Depth,
    tone: Tone,
    output: &Path,
) -> anyhow::Result<()> {
    let generator = StudyGuideGenerator::from_config(config)?;
    let guide = generator.generate_from(topic, depth, tone)?;

    for (title, body) in &guide.sections {
        println!("## {}\n{}", title, body);
    }

    guide.pdf.write_to(output)?;
    println!(
        "Generated {} ({} bytes)",
        output.display(),
        guide.pdf.bytes.len()
    );
    Ok(())
}
