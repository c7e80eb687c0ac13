mod anchor;
mod animate;
mod app;
mod buffer;
mod config;
mod error;
mod export;
mod format;
mod logging;
mod occurrence;
mod preview;
mod protocol;
mod render;
mod sync;
mod text;
mod theme;

use anyhow::{Context, Result};
use buffer::{SourceBuffer, SourceDocument};
use clap::{Parser, Subcommand};
use config::Config;
use format::{apply_format, plan_edit, Format};
use occurrence::{resolve, ResolveHint};
use protocol::Message;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "marksync",
    version,
    about = "Markdown source and preview side by side, scrolled together"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Markdown file to open
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the config file in $EDITOR (default: nvim)
    Config,
    /// List available themes
    Themes,
    /// Print which source line each rendered block is anchored to
    Anchors { file: PathBuf },
    /// Apply one formatting toggle to a fragment of the file
    Format {
        file: PathBuf,
        #[arg(long, value_enum)]
        format: Format,
        /// Text as it appears in the rendered preview
        #[arg(long)]
        text: String,
        /// Source line hint (0-indexed)
        #[arg(long)]
        line: Option<usize>,
        /// Text of the rendered block containing the selection
        #[arg(long)]
        block: Option<String>,
        /// Which occurrence to take when hints do not decide
        #[arg(long)]
        ordinal: Option<usize>,
        /// Print the edited line instead of writing the file
        #[arg(long)]
        dry_run: bool,
    },
    /// Apply one JSON message record (`applyFormat` or `requestExport`) to a file
    Apply {
        file: PathBuf,
        message: String,
        #[arg(long)]
        dry_run: bool,
    },
    /// Write the rendered document as standalone HTML
    Export {
        file: PathBuf,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Config) = cli.command {
        return config::open_config_in_editor();
    }

    let cfg = config::load_config()?;
    if let Err(err) = logging::init(&cfg.log_level) {
        eprintln!("marksync: logging disabled: {err:#}");
    }

    if let Some(command) = cli.command {
        return match command {
            Commands::Config => Ok(()),
            Commands::Themes => {
                let manager = theme::ThemeManager::load();
                for name in manager.theme_names() {
                    println!("{name}");
                }
                Ok(())
            }
            Commands::Anchors { file } => print_anchors(&file, &cfg),
            Commands::Format {
                file,
                format,
                text,
                line,
                block,
                ordinal,
                dry_run,
            } => {
                let hint = ResolveHint {
                    line,
                    block_text: block,
                    ordinal,
                };
                run_format(&file, format, &text, &hint, dry_run, &cfg)
            }
            Commands::Apply {
                file,
                message,
                dry_run,
            } => apply_message(&file, &message, dry_run, &cfg),
            Commands::Export { file, out } => {
                let source = read_source(&file)?;
                let written =
                    export::write_export(&file, &source, out.as_deref(), &cfg.anchor.settings())?;
                println!("Exported {}", written.display());
                Ok(())
            }
        };
    }

    let file = cli
        .file
        .ok_or_else(|| anyhow::anyhow!("No file provided. Try `marksync <file.md>`."))?;
    app::run_app(file, cfg)
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_anchors(path: &Path, cfg: &Config) -> Result<()> {
    let source = read_source(path)?;
    let lines = buffer::split_lines(&source);
    let rendered = render::render_markdown(&source);
    let anchors = anchor::build_anchors(&lines, &rendered, &cfg.anchor.settings());
    for (idx, block) in rendered.iter().enumerate() {
        let (line, source) = match anchors.get(idx) {
            Some(a) => (
                a.line.to_string(),
                match a.source {
                    anchor::AnchorSource::Matched => "matched",
                    anchor::AnchorSource::Interpolated => "interpolated",
                },
            ),
            None => ("-".to_string(), "skipped"),
        };
        let text: String = block.text_content.replace('\n', " ").chars().take(60).collect();
        println!(
            "{idx:>4}  {:<20} {line:>5}  {source:<12} {text}",
            block.kind.label()
        );
    }
    println!("{} of {} blocks anchored", anchors.iter().count(), anchors.len());
    Ok(())
}

fn apply_message(path: &Path, raw: &str, dry_run: bool, cfg: &Config) -> Result<()> {
    let message = Message::from_json(raw)?;
    match &message {
        Message::ApplyFormat {
            format,
            selected_text,
            ..
        } => {
            let hint = message.resolve_hint().unwrap_or_default();
            run_format(path, *format, selected_text, &hint, dry_run, cfg)
        }
        Message::RequestExport => {
            let source = read_source(path)?;
            let written = export::write_export(path, &source, None, &cfg.anchor.settings())?;
            println!("Exported {}", written.display());
            Ok(())
        }
        other => anyhow::bail!("{} does not edit a file", other.to_json()?),
    }
}

fn run_format(
    path: &Path,
    format: Format,
    text: &str,
    hint: &ResolveHint,
    dry_run: bool,
    cfg: &Config,
) -> Result<()> {
    let source = read_source(path)?;
    let mut doc = SourceBuffer::new(&source);

    if dry_run {
        let lines = doc.source_lines();
        let occ = resolve(&lines, text, hint)?;
        let edit = plan_edit(occ.line, &lines[occ.line], &occ, format, &cfg.red_highlight_style);
        println!("{}: {}", occ.line, edit.preview_line(&lines[occ.line]));
        return Ok(());
    }

    let edit = apply_format(&mut doc, text, format, hint, &cfg.red_highlight_style)?;
    fs::write(path, doc.current_text())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Updated line {}", edit.range().line);
    Ok(())
}
