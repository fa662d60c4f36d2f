//! halfmesh CLI - inspect, simplify, weld and split triangle meshes.
//!
//! Usage: halfmesh <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Set `RUST_LOG=halfmesh=debug` for detailed logs.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use halfmesh::algo::components::{connected_component_count, split_components};
use halfmesh::algo::manifold::manifold_report;
use halfmesh::algo::simplify::{simplify_with_progress, SimplifyOptions};
use halfmesh::algo::weld::weld_vertices;
use halfmesh::algo::Progress;
use halfmesh::io::{self, ply};

#[derive(Parser)]
#[command(name = "halfmesh")]
#[command(author, version, about = "Half-edge triangle mesh tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Simplify a mesh by quadric edge collapse
    Simplify {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Target number of triangles
        #[arg(short, long, conflicts_with = "ratio")]
        target: Option<usize>,

        /// Target ratio of triangles to keep (0.0 to 1.0)
        #[arg(short, long, default_value = "0.5")]
        ratio: f64,

        /// Collapse threshold exponent; higher is faster and coarser
        #[arg(short, long, default_value = "7")]
        aggressiveness: f64,

        /// Maximum number of collapse passes
        #[arg(long, default_value = "1000")]
        max_iterations: usize,
    },

    /// Merge vertices that coincide after rounding
    Weld {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Number of decimals kept when comparing positions
        #[arg(short, long, default_value = "6")]
        precision: i32,
    },

    /// Write each connected component to its own file
    Split {
        /// Input mesh file
        input: PathBuf,

        /// Output prefix; files are named `<prefix>_<n>.ply`
        prefix: PathBuf,
    },

    /// Re-encode a PLY file
    Convert {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Write ASCII instead of binary
        #[arg(long)]
        ascii: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => cmd_info(&input)?,

        Commands::Simplify {
            input,
            output,
            target,
            ratio,
            aggressiveness,
            max_iterations,
        } => {
            let options = match target {
                Some(target) => SimplifyOptions::with_target_triangles(target),
                None => SimplifyOptions::with_target_ratio(ratio),
            }
            .with_aggressiveness(aggressiveness)
            .with_max_iterations(max_iterations);
            cmd_simplify(&input, &output, &options)?;
        }

        Commands::Weld {
            input,
            output,
            precision,
        } => cmd_weld(&input, &output, precision)?,

        Commands::Split { input, prefix } => cmd_split(&input, &prefix)?,

        Commands::Convert {
            input,
            output,
            ascii,
        } => {
            let mesh = io::load(&input)?;
            let encoding = if ascii {
                ply::PlyEncoding::Ascii
            } else {
                ply::PlyEncoding::BinaryLittleEndian
            };
            ply::save_with_encoding(&mesh, &output, encoding)?;
            println!("Saved: {}", output.display());
        }
    }

    Ok(())
}

/// Progress bar on stderr that only ever moves forward.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let percent = if current >= total {
            100
        } else {
            (current * 100) / total
        };
        if max_percent.fetch_max(percent, Ordering::Relaxed) >= percent && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        eprint!(
            "\r[{}{}] {:3}% {}",
            "=".repeat(filled),
            " ".repeat(bar_width - filled),
            percent,
            message
        );
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (num_vertices, num_faces) = ply::read_counts(input)?;
    let mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Triangles: {}", mesh.num_triangles());
    if mesh.num_triangles() != num_faces {
        println!("  ({} faces in file, rejected faces skipped)", num_faces);
    }
    if mesh.num_vertices() != num_vertices {
        println!("  ({} vertices in file)", num_vertices);
    }
    println!("Half-edges: {}", mesh.num_halfedges());

    if let Some((min, max)) = mesh.bounding_box() {
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }
    if let Some(c) = mesh.centroid() {
        println!("Centroid: ({:.3}, {:.3}, {:.3})", c.x, c.y, c.z);
    }

    println!("Components: {}", connected_component_count(&mesh));

    let report = manifold_report(&mesh);
    if report.is_two_manifold() {
        println!("Topology: Closed two-manifold");
    } else {
        println!(
            "Topology: Not a closed two-manifold ({} boundary, {} inconsistent half-edges)",
            report.boundary, report.broken
        );
    }

    Ok(())
}

fn cmd_simplify(
    input: &Path,
    output: &Path,
    options: &SimplifyOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    println!(
        "Loaded: {} vertices, {} triangles",
        mesh.num_vertices(),
        mesh.num_triangles()
    );

    let target = options.compute_target(mesh.num_triangles());
    println!(
        "Simplifying to {} triangles (aggressiveness {})...",
        target, options.aggressiveness
    );

    let progress = create_progress();
    let start = Instant::now();
    let simplified = simplify_with_progress(&mesh, options, &progress)?;
    let elapsed = start.elapsed();

    println!(
        "Result: {} vertices, {} triangles",
        simplified.num_vertices(),
        simplified.num_triangles()
    );
    io::save(&simplified, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_weld(input: &Path, output: &Path, precision: i32) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    let welded = weld_vertices(&mesh, precision);
    println!(
        "Welded: {} -> {} vertices, {} -> {} triangles",
        mesh.num_vertices(),
        welded.num_vertices(),
        mesh.num_triangles(),
        welded.num_triangles()
    );
    io::save(&welded, output)?;
    println!("Saved: {}", output.display());
    Ok(())
}

fn cmd_split(input: &Path, prefix: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    let start = Instant::now();
    let parts = split_components(&mesh);
    println!("Found {} components ({:.2?})", parts.len(), start.elapsed());

    for (i, part) in parts.iter().enumerate() {
        let mut name = prefix.as_os_str().to_owned();
        name.push(format!("_{i}.ply"));
        let path = PathBuf::from(name);
        io::save(part, &path)?;
        println!(
            "  {}: {} vertices, {} triangles",
            path.display(),
            part.num_vertices(),
            part.num_triangles()
        );
    }

    Ok(())
}
