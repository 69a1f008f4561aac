use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use structure_analyzer::codec::SceneReport;
use structure_analyzer::extraction::Axis;
use structure_analyzer::structure::{
    export::structure_file_name, find_object_by_path, ProjectedNode,
};
use structure_analyzer::{AnalyzerConfig, StructureStore};

#[derive(Parser)]
#[command(name = "structure-analyzer")]
#[command(about = "Inspect, rename and extract nodes of GLB scenes", long_about = None)]
struct Cli {
    /// TOML file overriding the default settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the node hierarchy
    Tree {
        /// Input .glb file
        model: PathBuf,
    },
    /// Print mesh, draw call, texture and material counts as JSON
    Info {
        /// Input .glb file
        model: PathBuf,
    },
    /// Write the node hierarchy as a structure JSON file
    ExportStructure {
        /// Input .glb file
        model: PathBuf,
        /// Output file (default: model-structure-<timestamp>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Apply the names from a structure JSON file and write a new .glb
    ImportStructure {
        /// Input .glb file
        model: PathBuf,
        /// Structure file produced by export-structure
        structure: PathBuf,
        /// Output .glb file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Extract a node with its placement baked in, as a zip of model.glb and metadata.json
    Extract {
        /// Input .glb file
        model: PathBuf,
        /// Slash-separated node path, e.g. Scene/Body/Door
        path: String,
        /// Quarter turns to apply before packaging, in order
        #[arg(short, long, value_delimiter = ',')]
        rotate: Vec<Axis>,
        /// Output .zip file (default: <node name>.zip)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => AnalyzerConfig::default(),
    };

    match cli.command {
        Commands::Tree { model } => {
            let store = open_store(&model, config)?;
            print_tree(store.tree_data(), 0);
        }
        Commands::Info { model } => {
            let bytes = read(&model)?;
            let report = SceneReport::from_glb(&bytes)
                .with_context(|| format!("Failed to parse {}", model.display()))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::ExportStructure { model, output } => {
            let mut store = open_store(&model, config)?;
            let json = store.export_tree_json()?;
            let output =
                output.unwrap_or_else(|| PathBuf::from(structure_file_name(SystemTime::now())));
            std::fs::write(&output, json)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote {}", output.display());
        }
        Commands::ImportStructure {
            model,
            structure,
            output,
        } => {
            let mut store = open_store(&model, config)?;
            let json = std::fs::read_to_string(&structure)
                .with_context(|| format!("Failed to read {}", structure.display()))?;
            let report = store.import_structure(&json)?;
            log::info!(
                "Renamed {} nodes, {} paths not found",
                report.renamed,
                report.unresolved.len()
            );

            let bytes = store.export_model()?;
            std::fs::write(&output, bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote {}", output.display());
        }
        Commands::Extract {
            model,
            path,
            rotate,
            output,
        } => {
            let mut store = open_store(&model, config)?;
            extract(&mut store, &path, &rotate, output)?;
        }
    }

    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn open_store(path: &Path, config: AnalyzerConfig) -> Result<StructureStore> {
    let bytes = read(path)?;
    let mut store = StructureStore::new(config);
    store
        .load_model(&bytes)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    Ok(store)
}

fn print_tree(nodes: &[ProjectedNode], depth: usize) {
    for node in nodes {
        let hidden = if node.visible { "" } else { " (hidden)" };
        println!("{}{} [{}]{}", "  ".repeat(depth), node.name, node.kind, hidden);
        print_tree(&node.children, depth + 1);
    }
}

fn extract(
    store: &mut StructureStore,
    path: &str,
    rotations: &[Axis],
    output: Option<PathBuf>,
) -> Result<()> {
    let (scene, root) = store
        .model()
        .zip(store.model_root())
        .context("Model has no root")?;
    let target = find_object_by_path(scene, root, path)
        .with_context(|| format!("No node at path {}", path))?;

    store.select_node(Some(target));
    store.start_extraction()?;

    let session = store.extraction_mut();
    if !rotations.is_empty() {
        session
            .apply_orientation(rotations)
            .context("Failed to orient the extracted model")?;
    }

    let bundle = session
        .finalize()?
        .context("Extraction did not produce a bundle")?;
    let output = output.unwrap_or_else(|| PathBuf::from(&bundle.file_name));
    std::fs::write(&output, &bundle.bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {}", output.display());

    Ok(())
}
