use std::path::PathBuf;

use clap::{Parser, Subcommand};
use deskscene_assets::{
    AssetConfig, CpuTextureBackend, MaterialRegistry, TextureRegistry, locate_base,
};
use deskscene_common::ProjectionMode;
use deskscene_input::Action;
use deskscene_render::{DeskScene, DrawRecord, RecordingTarget, ShaderBridge};
use deskscene_view::{ViewConfig, ViewController};
use glam::Vec3;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deskscene-cli", about = "Headless tools for the desk scene")]
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
    /// Show which texture directory would be used
    Locate {
        /// Extra directory to try before the defaults
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Compose the scene once and print its draw list
    Dump {
        /// Texture directory; searched for when omitted
        #[arg(long)]
        assets: Option<PathBuf>,
        /// Use the orthographic inspection view
        #[arg(long)]
        orthographic: bool,
        /// Emit JSON instead of a text listing
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct DumpReport<'a> {
    asset_base: String,
    textures: Vec<&'a str>,
    projection: ProjectionMode,
    eye: Vec3,
    draws: &'a [DrawRecord],
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("deskscene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", deskscene_assets::crate_info());
            println!("render: {}", deskscene_render::crate_info());
            println!("input: {}", deskscene_input::crate_info());
            println!("view: {}", deskscene_view::crate_info());
        }
        Commands::Locate { dir } => {
            let mut config = AssetConfig::default();
            if let Some(dir) = dir {
                config.candidates.insert(0, dir);
            }
            for candidate in &config.candidates {
                let found = candidate.join(&config.sentinel).is_file();
                println!(
                    "  [{}] {}",
                    if found { "x" } else { " " },
                    candidate.display()
                );
            }
            match locate_base(&config.candidates, &config.sentinel) {
                Some(base) => println!("Texture base: {}", base.display()),
                None => println!("No directory contains {}", config.sentinel),
            }
        }
        Commands::Dump {
            assets,
            orthographic,
            json,
        } => {
            let base = match assets {
                Some(dir) => dir,
                None => deskscene_assets::resolve_base(&AssetConfig::default()),
            };

            let mut backend = CpuTextureBackend::new();
            let mut textures = TextureRegistry::new();
            DeskScene::load_textures(&mut textures, &mut backend, &base);
            let materials = MaterialRegistry::desk_presets();

            let mut view = ViewController::new(&ViewConfig::default());
            if orthographic {
                view.apply(
                    Action::SelectProjection(ProjectionMode::Orthographic),
                    0.0,
                );
            }
            let frame = view.frame_view();

            let mut target = RecordingTarget::new();
            DeskScene::load_meshes(&mut target);
            {
                let mut bridge = ShaderBridge::new(&mut target, &textures, &materials);
                bridge.apply_view(&frame);
                DeskScene::render(&mut bridge);
            }
            tracing::debug!(
                "composed {} draws ({} skipped)",
                target.records().len(),
                target.skipped()
            );

            if json {
                let report = DumpReport {
                    asset_base: base.display().to_string(),
                    textures: textures.slots().iter().map(|s| s.tag.as_str()).collect(),
                    projection: view.mode(),
                    eye: frame.eye,
                    draws: target.records(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Texture base: {}", base.display());
                println!(
                    "Textures loaded: {} | projection: {:?} | eye: ({:.2}, {:.2}, {:.2})",
                    textures.len(),
                    view.mode(),
                    frame.eye.x,
                    frame.eye.y,
                    frame.eye.z
                );
                print!("{}", target.describe());
            }

            textures.clear(&mut backend);
        }
    }

    Ok(())
}
