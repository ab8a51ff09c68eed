// src/recipe/package_id.rs

//! Binary compatibility key
//!
//! Two configurations with the same package id produce interchangeable
//! binaries and share one package folder in the cache. The id covers the
//! settings and options as they stand after the option hooks ran, so fields
//! the configure hook strips (compiler.libcxx, compiler.cppstd) never
//! influence it.

use crate::options::OptionSet;
use crate::settings::Settings;
use sha2::{Digest, Sha256};

/// Canonical text the id is computed from
pub fn canonical_info(settings: &Settings, options: &OptionSet) -> String {
    let mut text = String::from("[settings]\n");
    for (key, value) in settings.to_pairs() {
        text.push_str(&format!("{}={}\n", key, value));
    }
    text.push_str("[options]\n");
    text.push_str(&options.to_string());
    text
}

/// SHA-256 of [`canonical_info`], hex encoded
pub fn package_id(settings: &Settings, options: &OptionSet) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_info(settings, options).as_bytes());
    hex::encode(hasher.finalize())
}
