//! pdf2md CLI - converts PDF text token dumps to Markdown

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use pdf2markdown::render::to_json;
use pdf2markdown::{
    tokens_from_json, ConvertOptions, ConvertResult, Converter, JsonFormat, LayoutOptions,
    RenderOptions, Result,
};

#[derive(Parser)]
#[command(name = "pdf2md")]
#[command(version)]
#[command(about = "Convert positioned PDF text tokens to Markdown", long_about = None)]
struct Cli {
    /// Token dump (JSON array of tokens or pages); "-" reads stdin
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[command(flatten)]
    layout: LayoutArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a token dump to Markdown
    #[command(alias = "md")]
    Markdown {
        /// Token dump; "-" reads stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Convert a token dump to the structured document as JSON
    Json {
        /// Token dump; "-" reads stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long, env = "PDF2MD_COMPACT")]
        compact: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show conversion statistics for a token dump
    Info {
        /// Token dump; "-" reads stdin
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show version information
    Version,
}

/// Layout and rendering settings shared by all conversions.
#[derive(Args, Clone)]
struct LayoutArgs {
    /// Minimum heading size relative to body text
    #[arg(long, env = "PDF2MD_HEADING_RATIO")]
    heading_ratio: Option<f32>,

    /// Vertical gap, in median line heights, that starts a new block
    #[arg(long, env = "PDF2MD_GAP_MULTIPLIER")]
    gap_multiplier: Option<f32>,

    /// Minimum rows for a table
    #[arg(long, env = "PDF2MD_MIN_TABLE_ROWS")]
    min_table_rows: Option<usize>,

    /// Indent step between list levels in points (inferred if omitted)
    #[arg(long, env = "PDF2MD_INDENT_UNIT")]
    indent_unit: Option<f32>,

    /// Height of the top and bottom margin bands in points (0 disables)
    #[arg(long, env = "PDF2MD_MARGIN_BAND")]
    margin_band: Option<f32>,

    /// Process pages on the calling thread only
    #[arg(long, env = "PDF2MD_SEQUENTIAL")]
    sequential: bool,

    /// Write guessed languages after code fences
    #[arg(long, env = "PDF2MD_CODE_HINTS")]
    code_hints: bool,

    /// Drop page margin content instead of rendering it as quotes
    #[arg(long, env = "PDF2MD_NO_NOTES")]
    no_notes: bool,

    /// Emit JSON (the structured document, or statistics for `info`)
    #[arg(long, env = "PDF2MD_JSON")]
    json: bool,
}

impl LayoutArgs {
    fn convert_options(&self) -> ConvertOptions {
        let mut layout = LayoutOptions::default();
        if let Some(ratio) = self.heading_ratio {
            layout = layout.with_heading_size_ratio(ratio);
        }
        if let Some(k) = self.gap_multiplier {
            layout = layout.with_block_gap_multiplier(k);
        }
        if let Some(rows) = self.min_table_rows {
            layout = layout.with_min_table_rows(rows);
        }
        if let Some(unit) = self.indent_unit {
            layout = layout.with_list_indent_unit(unit);
        }
        if let Some(band) = self.margin_band {
            layout = layout.with_margin_band(band);
        }

        let render = RenderOptions::new()
            .with_code_language_hints(self.code_hints)
            .with_notes(!self.no_notes);

        ConvertOptions::new()
            .with_layout_options(layout)
            .with_render_options(render)
            .with_parallel(!self.sequential)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Markdown {
            input,
            output,
            layout,
        }) => cmd_markdown(&input, output.as_deref(), &layout),
        Some(Commands::Json {
            input,
            output,
            compact,
            layout,
        }) => cmd_json(&input, output.as_deref(), compact, &layout),
        Some(Commands::Info { input, layout }) => cmd_info(&input, &layout),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if let Some(input) = cli.input {
                if cli.layout.json {
                    cmd_json(&input, cli.output.as_deref(), false, &cli.layout)
                } else {
                    cmd_markdown(&input, cli.output.as_deref(), &cli.layout)
                }
            } else {
                println!("{}", "Usage: pdf2md <FILE> [-o OUTPUT]".yellow());
                println!("       pdf2md --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn read_input(input: &Path) -> Result<String> {
    if input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn run(input: &Path, layout: &LayoutArgs) -> Result<ConvertResult> {
    let json = read_input(input)?;
    let pages = tokens_from_json(&json)?;
    log::info!("Loaded {} page(s) from {}", pages.len(), input.display());

    let converter = Converter::new(layout.convert_options())?;
    let result = converter.convert_pages(pages)?;
    report(&result);
    Ok(result)
}

/// Print warnings and a one-line summary to stderr.
fn report(result: &ConvertResult) {
    for warning in &result.warnings {
        eprintln!("{}: {}", "Warning".yellow().bold(), warning);
    }
    let stats = &result.stats;
    eprintln!(
        "{} {} page(s), {} heading(s), {} paragraph(s), {} list(s), {} table(s), {} code block(s)",
        "Converted".green(),
        stats.page_count,
        stats.heading_count,
        stats.paragraph_count,
        stats.list_count,
        stats.table_count,
        stats.code_block_count
    );
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    if let Some(path) = output {
        fs::write(path, content)?;
        eprintln!("{} {}", "Saved to".green(), path.display());
    } else {
        print!("{}", content);
    }
    Ok(())
}

fn cmd_markdown(
    input: &Path,
    output: Option<&Path>,
    layout: &LayoutArgs,
) -> Result<()> {
    let result = run(input, layout)?;
    write_output(output, &result.markdown)?;
    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    layout: &LayoutArgs,
) -> Result<()> {
    let result = run(input, layout)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let mut json = to_json(&result.document, format)?;
    json.push('\n');

    write_output(output, &json)?;
    Ok(())
}

fn cmd_info(input: &Path, layout: &LayoutArgs) -> Result<()> {
    let result = run(input, layout)?;
    let stats = &result.stats;

    if layout.json {
        println!("{}", to_json(stats, JsonFormat::Pretty)?);
        return Ok(());
    }

    println!("{}", "Conversion Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), stats.page_count);
    println!("{}: {}", "Empty pages".bold(), stats.empty_pages);
    println!("{}: {}", "Malformed tokens".bold(), stats.malformed_tokens);
    println!();
    println!("{}: {}", "Headings".bold(), stats.heading_count);
    println!("{}: {}", "Paragraphs".bold(), stats.paragraph_count);
    println!(
        "{}: {} ({} items)",
        "Lists".bold(),
        stats.list_count,
        stats.list_item_count
    );
    println!("{}: {}", "Tables".bold(), stats.table_count);
    println!("{}: {}", "Demoted table rows".bold(), stats.table_demotions);
    println!("{}: {}", "Code blocks".bold(), stats.code_block_count);
    println!("{}: {}", "Pages with notes".bold(), stats.notes_count);
    println!();
    println!("{}: {}", "Words".bold(), stats.word_count);
    println!("{}: {}", "Characters".bold(), stats.char_count);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdf2md".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF token dump to Markdown converter");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf2markdown::Error;

    #[test]
    fn test_missing_input_is_io_error() {
        let err = read_input(Path::new("/nonexistent/tokens.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().starts_with("I/O error"));
    }
}
