//! pdf4llm CLI - PDF to Markdown for language models

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf4llm::progress::ignore_progress;
use pdf4llm::{
    CallbackError, ConvertOptions, ConvertResult, ErrorMode, JsonFormat, ProgressInfo,
};

#[derive(Parser)]
#[command(name = "pdf4llm")]
#[command(version)]
#[command(about = "Convert PDF documents to Markdown for LLMs", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output Markdown file (stdout if not specified)
    #[arg(short, long, value_name = "OUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert PDF to Markdown
    #[command(alias = "md")]
    Convert {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output Markdown file (stdout if not specified)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Directory to save extracted images
        #[arg(long, value_name = "DIR", env = "PDF4LLM_IMAGE_DIR")]
        image_dir: Option<PathBuf>,

        /// Prefix for image paths in the Markdown
        #[arg(long, value_name = "PREFIX")]
        image_prefix: Option<String>,

        /// Number of font sizes that may become headings (1-6)
        #[arg(long, default_value = "6", value_name = "N")]
        max_heading: u8,

        /// Do not detect tables
        #[arg(long)]
        no_tables: bool,

        /// Do not extract images
        #[arg(long)]
        no_images: bool,

        /// Do not emphasize bold text
        #[arg(long)]
        no_bold: bool,

        /// Fail on the first unreadable page
        #[arg(long)]
        strict: bool,

        /// How to report progress
        #[arg(long, value_enum, default_value = "bar")]
        progress: ProgressMode,
    },

    /// Show the body font size and heading levels
    Fonts {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Dump the page and block structure as JSON
    Json {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Compact JSON output
        #[arg(long)]
        compact: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum ProgressMode {
    /// Progress bar on stderr
    Bar,
    /// One JSON object per checkpoint on stderr
    Json,
    /// No progress output
    None,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            image_dir,
            image_prefix,
            max_heading,
            no_tables,
            no_images,
            no_bold,
            strict,
            progress,
        }) => {
            let mut options = ConvertOptions::new()
                .with_max_heading_levels(max_heading)
                .with_tables(!no_tables)
                .with_images(!no_images)
                .with_bold_emphasis(!no_bold)
                .with_error_mode(if strict {
                    ErrorMode::Strict
                } else {
                    ErrorMode::Lenient
                });
            if let Some(dir) = image_dir {
                options = options.with_image_dir(dir);
            }
            if let Some(prefix) = image_prefix {
                options = options.with_image_prefix(prefix);
            }
            log::debug!("Convert options: {:?}", options);
            cmd_convert(&input, output.as_deref(), &options, progress)
        }
        Some(Commands::Fonts { input }) => cmd_fonts(&input),
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact),
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(
                    &input,
                    cli.output.as_deref(),
                    &ConvertOptions::default(),
                    ProgressMode::Bar,
                )
            } else {
                println!("{}", "Usage: pdf4llm <FILE> [-o OUT.md]".yellow());
                println!("       pdf4llm --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
    progress: ProgressMode,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = match progress {
        ProgressMode::Bar => convert_with_bar(input, options)?,
        ProgressMode::Json => pdf4llm::convert_file(input, options, |info: &ProgressInfo| {
            let line = serde_json::to_string(info).map_err(|e| -> CallbackError { Box::new(e) })?;
            eprintln!("{}", line);
            Ok(())
        })?,
        ProgressMode::None => pdf4llm::convert_file(input, options, ignore_progress)?,
    };

    if let Some(path) = output {
        log::debug!("Writing {} bytes to {}", result.content_len(), path.display());
        fs::write(path, &result.markdown)?;
        println!("{} {}", "Saved to".green(), path.display());
        print_summary(&result, options);
    } else {
        print!("{}", result.markdown);
    }

    Ok(())
}

fn convert_with_bar(
    input: &Path,
    options: &ConvertOptions,
) -> Result<ConvertResult, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")?
            .progress_chars("#>-"),
    );

    let result = pdf4llm::convert_file(input, options, |info: &ProgressInfo| {
        pb.set_position(info.percentage.round() as u64);
        pb.set_message(format!(
            "{} page {}/{}",
            info.phase, info.current_page, info.total_pages
        ));
        Ok(())
    });

    match result {
        Ok(result) => {
            pb.finish_with_message("Done!");
            Ok(result)
        }
        Err(e) => {
            pb.abandon();
            Err(e.into())
        }
    }
}

fn print_summary(result: &ConvertResult, options: &ConvertOptions) {
    let stats = &result.stats;

    println!();
    println!("{}", "Conversion Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Pages".bold(), stats.pages);
    println!("{}: {} bytes", "Markdown".bold(), result.content_len());
    println!("{}: {}", "Headings".bold(), stats.headings);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraphs);
    println!("{}: {}", "Tables".bold(), stats.tables);
    println!("{}: {}", "Images".bold(), stats.images);
    if stats.images > 0 {
        println!("{}: {}", "Image directory".bold(), options.image_dir.display());
    }
    if stats.skipped_images > 0 {
        println!("{}: {}", "Skipped images".yellow(), stats.skipped_images);
    }
    if stats.skipped_pages > 0 {
        println!("{}: {}", "Skipped pages".yellow(), stats.skipped_pages);
    }
}

fn cmd_fonts(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let map = pdf4llm::analyze_fonts(input, &ConvertOptions::default())?;

    println!("{}", "Font Analysis".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());

    match map.body_size() {
        Some(size) => println!("{}: {:.1}pt", "Body size".bold(), size),
        None => println!("{}: {}", "Body size".bold(), "no text found".dimmed()),
    }

    if map.is_empty() {
        println!("{}: {}", "Headings".bold(), "none".dimmed());
        return Ok(());
    }

    println!();
    println!("{}", "Heading Levels".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (size, level) in map.headings() {
        println!("  {} {:>6.1}pt", "#".repeat(level as usize).green(), size);
    }

    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let options = ConvertOptions::new().with_images(false);
    let json = pdf4llm::to_json(input, &options, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}
