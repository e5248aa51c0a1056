use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use emblem::{
    Asset, AssetCatalog, Font, Layer, Logo, RasterFormat, RenderOptions, Snapshot, encode,
    rasterize, render_svg, validate_stack,
};

#[derive(Parser, Debug)]
#[command(name = "emblem", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a design document against the model rules.
    Validate(ValidateArgs),
    /// Compose a design document into an SVG file.
    ExportSvg(ExportSvgArgs),
    /// Compose and rasterize a design document into a PNG file.
    ExportPng(ExportPngArgs),
    /// Capture a design document as a version snapshot (JSON).
    Snapshot(SnapshotArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input design document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportSvgArgs {
    /// Input design document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output SVG path.
    #[arg(long)]
    out: PathBuf,

    /// Output width (defaults to the document canvas).
    #[arg(long)]
    width: Option<u32>,

    /// Output height (defaults to the document canvas).
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Parser, Debug)]
struct ExportPngArgs {
    /// Input design document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Output width (defaults to the document canvas).
    #[arg(long)]
    width: Option<u32>,

    /// Output height (defaults to the document canvas).
    #[arg(long)]
    height: Option<u32>,

    /// Encoder quality hint, 1-100.
    #[arg(long, default_value_t = 90)]
    quality: u8,
}

#[derive(Parser, Debug)]
struct SnapshotArgs {
    /// Input design document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output JSON path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

/// Self-contained design document: one logo, its layer stack, and every
/// asset/font the stack references.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Document {
    logo: Logo,
    #[serde(default)]
    layers: Vec<Layer>,
    #[serde(default)]
    assets: Vec<Asset>,
    #[serde(default)]
    fonts: Vec<Font>,
}

impl Document {
    fn catalog(&self) -> AssetCatalog {
        let mut catalog = AssetCatalog::new();
        for asset in &self.assets {
            catalog.insert_asset(asset.clone());
        }
        for font in &self.fonts {
            catalog.insert_font(font.clone());
        }
        catalog
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::ExportSvg(args) => cmd_export_svg(args),
        Command::ExportPng(args) => cmd_export_png(args),
        Command::Snapshot(args) => cmd_snapshot(args),
    }
}

fn read_document(path: &Path) -> anyhow::Result<Document> {
    let f = File::open(path).with_context(|| format!("open document '{}'", path.display()))?;
    let r = BufReader::new(f);
    let doc: Document = serde_json::from_reader(r).with_context(|| "parse document JSON")?;
    Ok(doc)
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;
    validate_stack(&doc.logo, &doc.layers)?;
    eprintln!(
        "ok: '{}' ({} layers, {} assets, {} fonts)",
        doc.logo.title,
        doc.layers.len(),
        doc.assets.len(),
        doc.fonts.len()
    );
    Ok(())
}

fn cmd_export_svg(args: ExportSvgArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;
    validate_stack(&doc.logo, &doc.layers)?;

    let options = RenderOptions {
        width: args.width,
        height: args.height,
        ..RenderOptions::default()
    };
    let svg = render_svg(&doc.logo, &doc.layers, &doc.catalog(), &options)?;
    write_output(&args.out, svg.as_bytes())
}

fn cmd_export_png(args: ExportPngArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;
    validate_stack(&doc.logo, &doc.layers)?;

    let options = RenderOptions {
        width: args.width,
        height: args.height,
        ..RenderOptions::default()
    };
    let svg = render_svg(&doc.logo, &doc.layers, &doc.catalog(), &options)?;
    let (width, height) = options.resolve_size(doc.logo.canvas);
    let img = rasterize(&svg, width, height)?;
    let bytes = encode(&img, RasterFormat::Png, args.quality)?;
    write_output(&args.out, &bytes)
}

fn cmd_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let doc = read_document(&args.in_path)?;
    let snapshot = Snapshot::capture(&doc.logo, &doc.layers)?;
    let json = serde_json::to_string_pretty(&snapshot.to_json()?)?;

    match &args.out {
        Some(path) => write_output(path, json.as_bytes()),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
