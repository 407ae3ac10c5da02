mod pack;

use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use thinfilm::MemorySource;
use thinfilm_data::MaterialArchive;

/// Pack a directory of nk text files into a compressed material archive.
#[derive(Parser)]
#[command(name = "thinfilm-generate")]
#[command(version)]
struct Cli {
    /// Directory holding one `energy_eV n k` file per material.
    database: PathBuf,
    /// Output archive.
    #[arg(short, long, default_value = "materials.bin.zst")]
    output: PathBuf,
    /// zstd compression level.
    #[arg(long, default_value_t = 19)]
    level: i32,
    /// Version tag stored in the archive.
    #[arg(long, default_value = env!("CARGO_PKG_VERSION"))]
    tag: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    println!("Reading nk files from {}...", cli.database.display());
    let tables = pack::collect_tables(&cli.database)?;
    ensure!(
        !tables.is_empty(),
        "no usable nk files in {}",
        cli.database.display()
    );
    let points: usize = tables.iter().map(|t| t.len()).sum();
    println!("  Materials: {} ({points} points)", tables.len());

    let archive = MaterialArchive {
        version: cli.tag,
        tables,
    };

    println!("\nSerializing with postcard...");
    let serialized = postcard::to_allocvec(&archive).context("postcard serialization failed")?;
    println!("  Serialized size: {} bytes", serialized.len());

    println!("Compressing with zstd (level {})...", cli.level);
    let compressed =
        zstd::encode_all(&serialized[..], cli.level).context("zstd compression failed")?;
    println!(
        "  Compressed size: {} bytes ({:.1}x)",
        compressed.len(),
        serialized.len() as f64 / compressed.len() as f64
    );

    if let Some(parent) = cli.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(&cli.output, &compressed)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    println!("\nWrote {}", cli.output.display());

    println!("Verifying round-trip...");
    let source = MemorySource::from_archive(&compressed)?;
    ensure!(
        source.len() == archive.tables.len(),
        "archive holds {} materials, expected {}",
        source.len(),
        archive.tables.len()
    );
    println!("  Round-trip OK!");
    Ok(())
}
