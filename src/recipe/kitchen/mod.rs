// src/recipe/kitchen/mod.rs

//! Kitchen: drives a recipe through its phases
//!
//! The Kitchen owns the collaborators that touch the outside world (source
//! fetcher, process runner, file copier) and invokes the recipe hooks in
//! their fixed order:
//!
//! 1. **config_options** and **configure**: option normalization
//! 2. **requirements**: dependency declaration
//! 3. **source**: fetch and prepare upstream sources
//! 4. **build**: configure CMake once, compile
//! 5. **package**: install into the package folder
//! 6. **package_info**: export consumer metadata
//!
//! Phases run strictly in sequence. The first failure aborts the cook and is
//! returned unchanged; nothing is retried.

pub mod archive;
pub mod cmake;
mod config;
mod cook;
pub mod files;
pub mod process;

pub use config::{
    BUILD_SUBFOLDER, CACHE_DIR_ENV, CookResult, KitchenConfig, Layout, SOURCE_SUBFOLDER,
    default_cache_dir,
};
pub use cook::Cook;

use crate::error::Result;
use crate::recipe::info::{MANIFEST_FILE, PackageManifest};
use crate::recipe::Recipe;
use archive::{HttpFetcher, SourceFetcher};
use files::{FileCopier, LocalFiles};
use process::{ProcessRunner, SystemRunner};
use std::sync::Arc;
use tracing::info;

/// The Kitchen: where recipes are cooked
pub struct Kitchen {
    pub(crate) config: KitchenConfig,
    fetcher: Arc<dyn SourceFetcher>,
    runner: Arc<dyn ProcessRunner>,
    files: Arc<dyn FileCopier>,
}

impl Kitchen {
    /// Kitchen backed by HTTP downloads, child processes and the local disk
    pub fn new(config: KitchenConfig) -> Result<Self> {
        let runner: Arc<dyn ProcessRunner> = Arc::new(SystemRunner);
        let fetcher = HttpFetcher::new(config.download_dir(), Arc::clone(&runner))?
            .with_progress(config.show_progress);

        Ok(Self {
            config,
            fetcher: Arc::new(fetcher),
            runner,
            files: Arc::new(LocalFiles),
        })
    }

    /// Kitchen with explicit collaborators
    pub fn with_collaborators(
        config: KitchenConfig,
        fetcher: Arc<dyn SourceFetcher>,
        runner: Arc<dyn ProcessRunner>,
        files: Arc<dyn FileCopier>,
    ) -> Self {
        Self {
            config,
            fetcher,
            runner,
            files,
        }
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    /// Cache folders for a configured recipe
    pub fn layout_for(&self, recipe: &Recipe) -> Layout {
        Layout::new(&self.config.cache_dir, &recipe.identity, &recipe.package_id())
    }

    /// Start a cook for an already configured recipe
    ///
    /// Use [`Kitchen::cook`] to run every phase; this is for callers that
    /// drive the phases one at a time.
    pub fn prepare<'a>(&'a self, recipe: &'a Recipe) -> Cook<'a> {
        Cook::new(self, recipe)
    }

    /// Run every phase of `recipe` and write the package manifest
    pub fn cook(&self, mut recipe: Recipe) -> Result<CookResult> {
        recipe.config_options();
        recipe.configure();

        let requirements = recipe.requirements();
        let package_id = recipe.package_id();
        info!(
            "Cooking {} (package id {})",
            recipe.identity.reference(),
            package_id
        );
        for requirement in &requirements {
            info!("Requires {}", requirement);
        }

        let mut cook = self.prepare(&recipe);
        cook.source()?;
        cook.build()?;
        cook.package()?;
        let layout = cook.layout().clone();

        let cpp_info = recipe.package_info(&layout.package_dir)?;
        let manifest = recipe.manifest(cpp_info.clone());
        manifest.save(&layout.package_dir)?;
        info!(
            "Cooked: {} ({} librar{})",
            layout.package_dir.display(),
            cpp_info.libs.len(),
            if cpp_info.libs.len() == 1 { "y" } else { "ies" }
        );

        Ok(CookResult {
            package_id,
            manifest_path: layout.package_dir.join(MANIFEST_FILE),
            layout,
            requirements,
            cpp_info,
        })
    }

    /// Manifest of a previously cooked configuration
    pub fn load_manifest(&self, recipe: &Recipe) -> Result<PackageManifest> {
        PackageManifest::load(&self.layout_for(recipe).package_dir)
    }
}
