//! ctypegen CLI — Python ctypes binding generation from declaration trees.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ctypegen_decl::model::DeclTree;
use ctypegen_decl::NameFilter;
use ctypegen_engine::{translate, CommentStyle, PhaseOverride, TranslateOptions};

#[derive(Parser)]
#[command(name = "ctypegen", version, about = "Python ctypes binding generator")]
struct Cli {
    /// Input declaration tree (.toml or .json)
    #[arg(long)]
    input: PathBuf,
    /// Output Python module (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Source files whose identifiers select which declarations to keep
    #[arg(long)]
    sources: Vec<PathBuf>,
    /// Comment placement (none, inline, block, mixed)
    #[arg(long)]
    comment_style: Option<String>,
    /// Emission phasing (automatic, pre, post)
    #[arg(long)]
    phase: Option<String>,
    /// Keep pointer spellings structural instead of c_char_p style aliases
    #[arg(long)]
    explicit: bool,
    /// Print the emission schedule as JSON to stderr
    #[arg(long)]
    report: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let options = TranslateOptions {
        explicit: cli.explicit,
        comment_style: parse_comment_style(cli.comment_style.as_deref())?,
        phase_override: parse_phase(cli.phase.as_deref())?,
    };
    let module = generate(&cli.input, &cli.sources, &options, cli.report, |w| {
        eprintln!("warning: {w}")
    })?;

    match &cli.output {
        Some(path) => {
            fs::write(path, module)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Generated bindings → {}", path.display());
        }
        None => print!("{module}"),
    }
    Ok(())
}

/// Load, filter, and translate one declaration tree.
fn generate(
    input: &Path,
    sources: &[PathBuf],
    options: &TranslateOptions,
    report: bool,
    mut warn: impl FnMut(&str),
) -> Result<String> {
    let mut tree = DeclTree::load(input)
        .with_context(|| format!("loading {}", input.display()))?;

    if !sources.is_empty() {
        let mut filter = NameFilter::new();
        for path in sources {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            filter.add_source(&text);
        }
        tree.retain(&filter);
        if tree.is_empty() {
            bail!("no declaration matches the given sources");
        }
    }

    let result = translate(&tree, options);
    for warning in &result.warnings {
        warn(&warning.to_string());
    }
    if report {
        eprintln!("{}", serde_json::to_string_pretty(&result.units)?);
    }
    Ok(result.module)
}

fn parse_comment_style(value: Option<&str>) -> Result<CommentStyle> {
    match value {
        None => Ok(CommentStyle::Mixed),
        Some("none") => Ok(CommentStyle::None),
        Some("inline") => Ok(CommentStyle::Inline),
        Some("block") => Ok(CommentStyle::Block),
        Some("mixed") => Ok(CommentStyle::Mixed),
        Some(other) => bail!("unknown comment style '{other}' (none, inline, block, mixed)"),
    }
}

fn parse_phase(value: Option<&str>) -> Result<PhaseOverride> {
    match value {
        None | Some("automatic") => Ok(PhaseOverride::Automatic),
        Some("pre") => Ok(PhaseOverride::ForcedPre),
        Some("post") => Ok(PhaseOverride::ForcedPost),
        Some(other) => bail!("unknown phase '{other}' (automatic, pre, post)"),
    }
}
