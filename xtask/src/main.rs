use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for crossplanes")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Build the entire workspace
    Build,
    /// Run the desktop viewer
    Run {
        /// Draw each plane as one mesh instead of two halves
        #[arg(long)]
        no_split: bool,
    },
    /// Regenerate the face textures under assets/
    Assets {
        #[arg(long, default_value = "assets")]
        dir: PathBuf,
        /// Edge length of the square textures
        #[arg(long, default_value = "256")]
        size: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            run_fmt()?;
            run_clippy()?;
            run_tests()?;
            run_doc()?;
        }
        Commands::Fmt => run_fmt()?,
        Commands::Clippy => run_clippy()?,
        Commands::Test => run_tests()?,
        Commands::Doc => run_doc()?,
        Commands::Build => run_build()?,
        Commands::Run { no_split } => run_desktop(no_split)?,
        Commands::Assets { dir, size } => write_assets(&dir, size)?,
    }

    Ok(())
}

fn cargo(args: &[&str], what: &str) -> Result<()> {
    println!("==> Running {what}");
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("{what} failed");
    }
    Ok(())
}

fn run_fmt() -> Result<()> {
    cargo(&["fmt", "--all", "--", "--check"], "cargo fmt --check")
}

fn run_clippy() -> Result<()> {
    cargo(
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
        "cargo clippy",
    )
}

fn run_tests() -> Result<()> {
    cargo(&["test", "--workspace"], "cargo test")
}

fn run_doc() -> Result<()> {
    cargo(&["doc", "--workspace", "--no-deps"], "cargo doc")
}

fn run_build() -> Result<()> {
    cargo(&["build", "--workspace"], "cargo build")
}

fn run_desktop(no_split: bool) -> Result<()> {
    let mut args = vec!["run", "-p", "crossplanes-desktop", "--"];
    if no_split {
        args.push("--no-split");
    }
    cargo(&args, "crossplanes-desktop")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Happy,
    Hmmm,
}

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);
const INK: Rgba<u8> = Rgba([40, 40, 40, 255]);
const SKIN: Rgba<u8> = Rgba([255, 220, 60, 255]);

/// Draw a cartoon face. Left and right differ on purpose so that a
/// mismatched texture half is easy to spot.
fn draw_face(face: Face, size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        // [-1, 1] with y pointing down
        let u = (x as f32 + 0.5) / size as f32 * 2.0 - 1.0;
        let v = (y as f32 + 0.5) / size as f32 * 2.0 - 1.0;
        let r = (u * u + v * v).sqrt();

        if r > 0.95 {
            return CLEAR;
        }
        if r > 0.88 {
            return INK;
        }

        let eye = |cx: f32| ((u - cx).powi(2) + (v + 0.3).powi(2)).sqrt() < 0.12;
        if eye(-0.35) || eye(0.35) {
            return INK;
        }

        let mouth = match face {
            Face::Happy => {
                let d = (u * u + (v - 0.05).powi(2)).sqrt();
                (0.45..0.55).contains(&d) && v > 0.25
            }
            Face::Hmmm => {
                let brow = (v + 0.55).abs() < 0.04 && (0.2..0.5).contains(&u);
                let line = (v - 0.45).abs() < 0.05 && (-0.1..0.45).contains(&u);
                brow || line
            }
        };
        if mouth { INK } else { SKIN }
    })
}

fn write_assets(dir: &Path, size: u32) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    for (face, name) in [(Face::Happy, "happyface.png"), (Face::Hmmm, "hmmmface.png")] {
        let path = dir.join(name);
        draw_face(face, size)
            .save(&path)
            .with_context(|| format!("write {}", path.display()))?;
        println!("wrote {}", path.display());
    }
    Ok(())
}
