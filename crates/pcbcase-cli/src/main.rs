//! pcbcase CLI - snap-fit PCB enclosure generator
//!
//! Loads an enclosure configuration (TOML), builds the two halves and writes
//! the resulting CSG document as JSON or OpenSCAD source.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pcbcase::{Enclosure, EnclosureConfig, ExportSelection, LayoutFrame};
use pcbcase_ir::Document;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pcbcase")]
#[command(about = "Parametric snap-fit PCB enclosure generator", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ExportArg {
    /// Top, bottom and text inserts
    All,
    /// Top half only
    Top,
    /// Bottom half only
    Bottom,
    /// Text inserts only
    Texts,
}

impl From<ExportArg> for ExportSelection {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::All => Self::All,
            ExportArg::Top => Self::Top,
            ExportArg::Bottom => Self::Bottom,
            ExportArg::Texts => Self::Texts,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build an enclosure and write its CSG document
    Generate {
        /// Enclosure configuration (.toml)
        config: PathBuf,
        /// Output JSON document (stdout if neither this nor --scad is given)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Output OpenSCAD source
        #[arg(long)]
        scad: Option<PathBuf>,
        /// Which solids to emit
        #[arg(long, value_enum)]
        export: Option<ExportArg>,
        /// Emit the halves in assembled position
        #[arg(long, conflicts_with = "separated")]
        assembled: bool,
        /// Emit the halves laid out for printing
        #[arg(long)]
        separated: bool,
    },
    /// Print the resolved layout frame of a configuration
    Layout {
        /// Enclosure configuration (.toml)
        config: PathBuf,
    },
    /// Display information about a generated document
    Info {
        /// Path to the .json document
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            config,
            output,
            scad,
            export,
            assembled,
            separated,
        } => {
            let mut cfg = load_config(&config)?;
            if let Some(export) = export {
                cfg.export = export.into();
            }
            if assembled {
                cfg.assembled = true;
            } else if separated {
                cfg.assembled = false;
            }
            generate(&cfg, output.as_deref(), scad.as_deref())?;
        }
        Commands::Layout { config } => {
            show_layout(&load_config(&config)?)?;
        }
        Commands::Info { file } => {
            show_info(&file)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<EnclosureConfig> {
    EnclosureConfig::from_toml_file(path)
        .with_context(|| format!("failed to load configuration {}", path.display()))
}

fn generate(cfg: &EnclosureConfig, output: Option<&Path>, scad: Option<&Path>) -> Result<()> {
    let enclosure = Enclosure::build(cfg)?;
    let doc = enclosure.to_document()?;
    if doc.roots.is_empty() {
        bail!("Nothing to export for selection '{}'", cfg.export);
    }
    info!(
        roots = doc.roots.len(),
        nodes = doc.nodes.len(),
        export = %cfg.export,
        assembled = cfg.assembled,
        "generated document"
    );

    if output.is_none() && scad.is_none() {
        println!("{}", doc.to_json()?);
        return Ok(());
    }
    if let Some(path) = output {
        fs::write(path, doc.to_json()?)?;
        println!("Wrote JSON document to {}", path.display());
    }
    if let Some(path) = scad {
        fs::write(path, pcbcase_ir::scad::to_scad(&doc)?)?;
        println!("Wrote OpenSCAD source to {}", path.display());
    }
    Ok(())
}

fn show_layout(cfg: &EnclosureConfig) -> Result<()> {
    cfg.validate()?;
    let frame = LayoutFrame::resolve(cfg);
    cfg.validate_against(&frame.outer_dim)?;

    let v = |v: &nalgebra::Vector3<f64>| format!("[{:.3}, {:.3}, {:.3}]", v.x, v.y, v.z);
    println!("Layout frame:");
    println!("  Board origin: {}", v(&frame.board_bb.origin));
    println!("  Board dims:   {}", v(&frame.board_dim));
    println!("  Inner dims:   {}", v(&frame.inner_dim));
    println!("  Outer dims:   {}", v(&frame.outer_dim));
    println!("  PCB location: {}", v(&frame.pcb_loc));
    println!("  Split height: {:.3}", frame.split_z());
    println!("  Low planes:   {}", v(&frame.slot_offsets[0]));
    println!("  High planes:  {}", v(&frame.slot_offsets[1]));
    Ok(())
}

fn show_info(file: &Path) -> Result<()> {
    let json = fs::read_to_string(file)?;
    let doc = Document::from_json(&json)?;

    println!("pcbcase document: {}", file.display());
    println!("  Version: {}", doc.version);
    println!("  Nodes: {}", doc.nodes.len());
    println!("  Materials: {}", doc.materials.len());
    println!("  Scene entries: {}", doc.roots.len());

    if !doc.roots.is_empty() {
        println!("\nScene:");
        for (i, entry) in doc.roots.iter().enumerate() {
            let name = doc
                .nodes
                .get(&entry.root)
                .and_then(|n| n.name.as_deref())
                .unwrap_or("unnamed");
            println!("  {}: {} (material: {})", i + 1, name, entry.material);
        }
    }

    Ok(())
}
