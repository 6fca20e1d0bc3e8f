use anyhow::Context;
use clap::{Parser, Subcommand};
use crossplanes_common::SurfaceSize;
use crossplanes_scene::{SceneConfig, build_scene};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod describe;
mod script;
mod simulate;

use describe::SceneSummary;
use script::parse_script;
use simulate::simulate;

#[derive(Parser)]
#[command(name = "crossplanes-cli", about = "Headless tooling for the crossplanes viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Describe the scene a configuration builds
    Describe {
        /// Scene configuration (YAML); built-in defaults when omitted
        #[arg(long)]
        scene: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write the default scene configuration as YAML
    DefaultConfig {
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replay an event script through the on-demand scheduler
    Simulate {
        /// Scene configuration (YAML); built-in defaults when omitted
        #[arg(long)]
        scene: Option<PathBuf>,
        /// Layout width of the simulated window
        #[arg(long, default_value = "800")]
        width: u32,
        /// Layout height of the simulated window
        #[arg(long, default_value = "600")]
        height: u32,
        /// Print the debug rendering of every frame
        #[arg(long)]
        frames: bool,
        /// Script file, one step per line
        script: PathBuf,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("load scene config {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match cli.command {
        Commands::Info => {
            println!("crossplanes-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", crossplanes_common::crate_info());
            println!("scene: {}", crossplanes_scene::crate_info());
            println!("input: {}", crossplanes_input::crate_info());
            println!("assets: {}", crossplanes_assets::crate_info());
            println!("render: {}", crossplanes_render::crate_info());
            println!("viewer: {}", crossplanes_viewer::crate_info());
        }
        Commands::Describe { scene, json } => {
            let config = load_config(scene.as_deref())?;
            let built = build_scene(&config);
            let summary = SceneSummary::new(&built, &config.camera.build());
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{summary}");
            }
        }
        Commands::DefaultConfig { out } => {
            let config = SceneConfig::default();
            match out {
                Some(path) => {
                    config
                        .save(&path)
                        .with_context(|| format!("write {}", path.display()))?;
                    println!("wrote {}", path.display());
                }
                None => print!("{}", config.to_yaml_string()?),
            }
        }
        Commands::Simulate {
            scene,
            width,
            height,
            frames,
            script,
        } => {
            let config = load_config(scene.as_deref())?;
            let text = std::fs::read_to_string(&script)
                .with_context(|| format!("read script {}", script.display()))?;
            let steps = parse_script(&text)?;

            let report = simulate(&config, SurfaceSize::new(width, height), &steps);

            for frame in &report.frames {
                println!(
                    "frame {}: backing {}x{} aspect {:.3} textures {}",
                    frame.number,
                    frame.backing.width,
                    frame.backing.height,
                    frame.aspect,
                    frame.textures_ready
                );
                if frames {
                    print!("{}", frame.text);
                }
            }
            println!("frames per tick: {:?}", report.frames_per_tick);
            let stats = report.stats;
            println!(
                "requests={} scheduled={} coalesced={} frames={}",
                stats.requests, stats.scheduled, stats.coalesced, stats.frames
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.yaml");
        SceneConfig::default().save(&path).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.instances.len(), 2);
        assert!(loaded.split_planes);
    }

    #[test]
    fn missing_config_names_the_file() {
        let err = load_config(Some(Path::new("/nonexistent/scene.yaml"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/scene.yaml"));
    }

    #[test]
    fn simulate_flags_parse() {
        let cli = Cli::parse_from(["crossplanes-cli", "simulate", "--width", "1200", "steps.txt"]);
        match cli.command {
            Commands::Simulate { width, height, script, .. } => {
                assert_eq!((width, height), (1200, 600));
                assert_eq!(script, PathBuf::from("steps.txt"));
            }
            _ => panic!("expected simulate"),
        }
    }
}
