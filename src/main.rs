// src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glfw_recipe::{Kitchen, KitchenConfig, Layout, PackageManifest, Profile, Recipe};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "glfw-recipe")]
#[command(author, version, about = "Build and package GLFW 3.3.2 from source", long_about = None)]
struct Cli {
    /// Profile file with settings, options and kitchen configuration
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// Setting override, e.g. `-s os=Linux` (repeatable)
    #[arg(short = 's', long = "setting", global = true, value_name = "KEY=VALUE")]
    settings: Vec<String>,

    /// Option override, e.g. `-o shared=True` (repeatable)
    #[arg(short = 'o', long = "option", global = true, value_name = "NAME=VALUE")]
    options: Vec<String>,

    /// Package cache directory
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, build and package GLFW
    Cook {
        /// Download and prepare the sources even if they are cached
        #[arg(long)]
        force_source: bool,
    },
    /// Print the packages GLFW requires for this configuration
    Requirements,
    /// Print the active options after configuration
    Options,
    /// Print the binary compatibility key of this configuration
    PackageId,
    /// Print the metadata of a cooked package
    Info {
        /// Render a pkg-config file instead of JSON
        #[arg(long)]
        pkg_config: bool,
    },
}

/// Profile from `--profile`, or an empty one
fn load_profile(cli: &Cli) -> Result<Profile> {
    match &cli.profile {
        Some(path) => Profile::load(path)
            .with_context(|| format!("Failed to load profile {}", path.display())),
        None => Ok(Profile::default()),
    }
}

/// Configured recipe for the profile and command-line overrides
fn configured_recipe(cli: &Cli, profile: &Profile) -> Result<Recipe> {
    let settings = profile.settings(&cli.settings)?;
    let options = profile.options(&cli.options)?;
    Ok(Recipe::configured(settings, options))
}

fn kitchen_config(cli: &Cli, profile: &Profile) -> KitchenConfig {
    let mut config = profile.kitchen_config();
    if let Some(dir) = &cli.cache_dir {
        config.cache_dir = dir.clone();
    }
    config
}

/// Manifest of the cooked package for `recipe`, read straight from the cache
fn cooked_manifest(config: &KitchenConfig, recipe: &Recipe) -> Result<(Layout, PackageManifest)> {
    let layout = Layout::new(&config.cache_dir, &recipe.identity, &recipe.package_id());
    let manifest = PackageManifest::load(&layout.package_dir).with_context(|| {
        format!(
            "No cooked package for this configuration in {} (run 'glfw-recipe cook' first)",
            layout.package_dir.display()
        )
    })?;
    Ok((layout, manifest))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let Some(command) = &cli.command else {
        println!("glfw-recipe v{}", env!("CARGO_PKG_VERSION"));
        println!("Run 'glfw-recipe --help' for usage information");
        return Ok(());
    };

    let profile = load_profile(&cli)?;
    let recipe = configured_recipe(&cli, &profile)?;

    match command {
        Commands::Cook { force_source } => {
            let mut config = kitchen_config(&cli, &profile);
            config.force_source = *force_source;
            config.show_progress = true;

            let kitchen = Kitchen::new(config)?;
            info!("Using package cache at {}", kitchen.config().cache_dir.display());
            let result = kitchen.cook(recipe)?;

            println!("Package id: {}", result.package_id);
            println!("Package folder: {}", result.layout.package_dir.display());
            println!("Libraries: {}", result.cpp_info.libs.join(", "));
            if !result.requirements.is_empty() {
                let requires: Vec<String> =
                    result.requirements.iter().map(ToString::to_string).collect();
                println!("Requires: {}", requires.join(", "));
            }
            Ok(())
        }
        Commands::Requirements => {
            for requirement in recipe.requirements() {
                println!("{}", requirement);
            }
            Ok(())
        }
        Commands::Options => {
            print!("{}", recipe.options);
            Ok(())
        }
        Commands::PackageId => {
            println!("{}", recipe.package_id());
            Ok(())
        }
        Commands::Info { pkg_config } => {
            let (layout, manifest) = cooked_manifest(&kitchen_config(&cli, &profile), &recipe)?;

            if *pkg_config {
                let identity = &recipe.identity;
                print!(
                    "{}",
                    manifest.cpp_info.pkg_config(
                        &layout.package_dir,
                        identity.name,
                        identity.version,
                        identity.description,
                    )
                );
            } else {
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            }
            Ok(())
        }
    }
}
