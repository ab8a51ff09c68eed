// tests/common/mod.rs

//! Shared test utilities: recording collaborators for the Kitchen.

#![allow(dead_code)]

use glfw_recipe::recipe::kitchen::archive::{SourceFetcher, SourceSpec};
use glfw_recipe::recipe::kitchen::files::LocalFiles;
use glfw_recipe::recipe::kitchen::process::{CommandSpec, ProcessRunner};
use glfw_recipe::{Kitchen, KitchenConfig, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Fetcher that lays out a minimal GLFW source tree instead of downloading
#[derive(Default)]
pub struct FakeFetcher {
    pub fetches: Mutex<Vec<SourceSpec>>,
}

impl FakeFetcher {
    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

impl SourceFetcher for FakeFetcher {
    fn fetch(&self, source: &SourceSpec, dest: &Path) -> Result<()> {
        self.fetches.lock().unwrap().push(source.clone());

        let root = dest.join("glfw-3.3.2");
        fs::create_dir_all(root.join("src"))?;
        fs::write(
            root.join("CMakeLists.txt"),
            "cmake_minimum_required(VERSION 3.0)\nproject(GLFW C)\n",
        )?;
        fs::write(root.join("LICENSE.md"), "Copyright (c) 2002-2006 Marcus Geelnard\n")?;
        Ok(())
    }
}

/// Runner that records every command and simulates CMake's file output
///
/// `--build` writes `build_outputs` into `<build>/src`; `--install` writes a
/// header, the `installed_libs` and upstream's CMake and pkg-config files
/// into the install prefix given at configure time.
pub struct RecordingRunner {
    pub commands: Mutex<Vec<CommandSpec>>,
    install_prefix: Mutex<Option<PathBuf>>,
    build_outputs: Vec<String>,
    installed_libs: Vec<String>,
}

impl RecordingRunner {
    pub fn new(installed_libs: &[&str]) -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            install_prefix: Mutex::new(None),
            build_outputs: Vec::new(),
            installed_libs: installed_libs.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_build_outputs(mut self, outputs: &[&str]) -> Self {
        self.build_outputs = outputs.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Recorded commands whose program file name is `program`
    pub fn calls_to(&self, program: &str) -> Vec<CommandSpec> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.program_name() == program)
            .cloned()
            .collect()
    }

    /// Recorded cmake commands whose first argument is `first_arg`
    pub fn cmake_calls(&self, first_arg: &str) -> Vec<CommandSpec> {
        self.calls_to("cmake")
            .into_iter()
            .filter(|c| c.args.first().map(String::as_str) == Some(first_arg))
            .collect()
    }

    fn simulate(&self, command: &CommandSpec) -> Result<()> {
        if command.program_name() != "cmake" {
            return Ok(());
        }
        let arg_after = |flag: &str| {
            command
                .args
                .iter()
                .position(|a| a == flag)
                .and_then(|i| command.args.get(i + 1))
                .map(PathBuf::from)
        };

        match command.args.first().map(String::as_str) {
            Some("-S") => {
                if let Some(build_dir) = arg_after("-B") {
                    fs::create_dir_all(build_dir)?;
                }
                let prefix = command
                    .args
                    .iter()
                    .find_map(|a| a.strip_prefix("-DCMAKE_INSTALL_PREFIX="))
                    .map(PathBuf::from);
                *self.install_prefix.lock().unwrap() = prefix;
            }
            Some("--build") => {
                if let Some(build_dir) = arg_after("--build") {
                    let out = build_dir.join("src");
                    fs::create_dir_all(&out)?;
                    for name in &self.build_outputs {
                        fs::write(out.join(name), b"binary")?;
                    }
                }
            }
            Some("--install") => {
                let Some(prefix) = self.install_prefix.lock().unwrap().clone() else {
                    return Ok(());
                };
                fs::create_dir_all(prefix.join("include/GLFW"))?;
                fs::write(prefix.join("include/GLFW/glfw3.h"), "/* glfw */\n")?;
                fs::create_dir_all(prefix.join("lib/cmake/glfw3"))?;
                fs::write(prefix.join("lib/cmake/glfw3/glfw3Config.cmake"), "")?;
                fs::create_dir_all(prefix.join("lib/pkgconfig"))?;
                fs::write(prefix.join("lib/pkgconfig/glfw3.pc"), "")?;
                for name in &self.installed_libs {
                    fs::write(prefix.join("lib").join(name), b"binary")?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, command: &CommandSpec) -> Result<String> {
        self.commands.lock().unwrap().push(command.clone());
        self.simulate(command)?;
        Ok(String::new())
    }
}

/// Kitchen over a scratch cache, wired to the given collaborators
///
/// Returns (TempDir, Kitchen); keep the TempDir alive for the test.
pub fn test_kitchen(fetcher: Arc<FakeFetcher>, runner: Arc<RecordingRunner>) -> (TempDir, Kitchen) {
    let temp = tempfile::tempdir().unwrap();
    let mut config = KitchenConfig::with_cache_dir(temp.path());
    config.cmake = Some(PathBuf::from("cmake"));
    config.jobs = 2;

    let kitchen = Kitchen::with_collaborators(config, fetcher, runner, Arc::new(LocalFiles));
    (temp, kitchen)
}
