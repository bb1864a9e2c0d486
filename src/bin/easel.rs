use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "easel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of a saved project document.
    Inspect(InspectArgs),
    /// Extract the embedded snapshot of a saved project as a PNG.
    Extract(ExtractArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input project document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Input project document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Extract(args) => cmd_extract(args),
    }
}

fn read_document(path: &Path) -> anyhow::Result<easel::Document> {
    let f = File::open(path).with_context(|| format!("open document '{}'", path.display()))?;
    let r = BufReader::new(f);
    let doc: easel::Document =
        serde_json::from_reader(r).with_context(|| "parse document JSON")?;
    doc.validate()?;
    Ok(doc)
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;

    eprintln!("project:    {}", doc.name);
    eprintln!(
        "canonical:  {}x{}",
        doc.canonical_size.width, doc.canonical_size.height
    );
    eprintln!(
        "original:   {}x{}",
        doc.original_size.width, doc.original_size.height
    );
    eprintln!("background: {}", doc.background_color);
    eprintln!("nodes:      {}", doc.nodes.len());
    match doc.clip_frame {
        Some(id) => eprintln!("clip frame: node {}", id.0),
        None => eprintln!("clip frame: none"),
    }

    if doc.effects.is_empty() {
        eprintln!("effects:    none");
    } else {
        eprintln!("effects:");
        for (name, params) in doc.effects.iter().zip(&doc.effect_params) {
            match easel::parse_effect(name, params) {
                Ok(_) => eprintln!("  {name} {params}"),
                Err(err) => eprintln!("  {name} (unloadable: {err})"),
            }
        }
    }

    eprintln!("snapshot:   {} bytes", doc.snapshot_png.len());
    eprintln!("log:        {} entries", doc.logs.entries.len());
    Ok(())
}

fn cmd_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;

    let image = easel::render::decode_png(&doc.snapshot_png)
        .with_context(|| "decode embedded snapshot")?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
