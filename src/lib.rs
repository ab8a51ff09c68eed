// src/lib.rs

//! GLFW 3.3.2 package recipe
//!
//! Builds the GLFW windowing library from its upstream release archive and
//! packages it for consumption by other builds.
//!
//! # Architecture
//!
//! - Settings and options: platform description and boolean build switches
//! - Recipe: the hooks that normalize options, declare requirements and
//!   export consumer metadata
//! - Kitchen: runs the source, build and package phases against injected
//!   fetcher, process and filesystem collaborators
//! - Profiles: TOML files and command-line overrides feeding all of the above

mod error;
pub mod options;
pub mod profile;
pub mod recipe;
pub mod settings;

pub use error::{Error, Result};
pub use options::OptionSet;
pub use profile::Profile;
pub use recipe::{
    CookResult, CppInfo, GLFW, Kitchen, KitchenConfig, Layout, PackageIdentity, PackageManifest,
    Recipe, Requirement,
};
pub use settings::{Arch, BuildType, Compiler, MsvcRuntime, Os, Settings, Toolchain};
