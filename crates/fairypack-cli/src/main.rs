// src/main.rs

use anyhow::{bail, Context, Result};
use clap::Parser;
use fairypack_convert::ConvertOptions;
use fairypack_io::{emit_package, EmitOptions};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fairypack")]
#[command(author, version, about = "Convert a layered document into a UI package", long_about = None)]
struct Cli {
    /// Layer dump to convert
    input: PathBuf,

    /// Output path (default: next to the input) and/or `#<id>` to reuse a build id, in any order
    #[arg(num_args = 0..=2, value_name = "OUTPUT|#ID")]
    rest: Vec<String>,

    /// Write a directory instead of a zip archive
    #[arg(long)]
    nopack: bool,

    /// Leave fonts off text elements
    #[arg(long)]
    ignore_font: bool,

    /// Reuse a build id from an earlier run to keep resource ids stable
    #[arg(long, value_name = "ID")]
    build_id: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Split the trailing positionals into an output path and a `#`-prefixed build id.
    fn resolve(self) -> Result<(PathBuf, EmitOptions, ConvertOptions)> {
        let mut positional_id = None;
        let mut output = None;
        for arg in self.rest {
            if let Some(id) = arg.strip_prefix('#') {
                positional_id = Some(id.to_string());
            } else if output.is_none() {
                output = Some(PathBuf::from(arg));
            } else {
                bail!("unknown argument: {arg}");
            }
        }

        let mut emit = EmitOptions::default().with_pack(!self.nopack);
        if let Some(output) = output {
            emit = emit.with_output(output);
        }
        let mut convert = ConvertOptions::default().with_ignore_font(self.ignore_font);
        if let Some(id) = self.build_id.or(positional_id) {
            convert = convert.with_build_id(id);
        }
        Ok((self.input, emit, convert))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let (input, emit, convert) = cli.resolve()?;
    info!(input = %input.display(), pack = emit.pack, "converting");

    let report = emit_package(&input, &emit, &convert)
        .with_context(|| format!("failed to convert {}", input.display()))?;

    println!("{} -> {}", input.display(), report.output.display());
    println!("buildId: {}", report.build_id);
    Ok(())
}
