// src/options.rs

//! Recipe options
//!
//! Every option is boolean. `fPIC` can be removed from the set entirely by
//! the option hooks; a removed option is absent rather than false, and any
//! later attempt to set or read it is an error.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

pub const SHARED: &str = "shared";
pub const FPIC: &str = "fPIC";
pub const NO_OPENGL: &str = "no_opengl";
pub const NO_XORG: &str = "no_xorg";

/// Active option values
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionSet {
    pub shared: bool,
    /// `None` once the option has been removed
    pub fpic: Option<bool>,
    pub no_opengl: bool,
    pub no_xorg: bool,
}

impl Default for OptionSet {
    fn default() -> Self {
        Self {
            shared: false,
            fpic: Some(true),
            no_opengl: false,
            no_xorg: false,
        }
    }
}

impl OptionSet {
    /// Remove `fPIC` from the set
    pub fn remove_fpic(&mut self) {
        self.fpic = None;
    }

    /// Whether an option is part of the active set
    pub fn contains(&self, name: &str) -> bool {
        match name {
            SHARED | NO_OPENGL | NO_XORG => true,
            FPIC => self.fpic.is_some(),
            _ => false,
        }
    }

    /// Read an option by name
    pub fn get(&self, name: &str) -> Result<bool> {
        match name {
            SHARED => Ok(self.shared),
            NO_OPENGL => Ok(self.no_opengl),
            NO_XORG => Ok(self.no_xorg),
            FPIC => self.fpic.ok_or_else(|| removed(name)),
            _ => Err(unknown(name)),
        }
    }

    /// Set an option by name
    pub fn set(&mut self, name: &str, value: bool) -> Result<()> {
        match name {
            SHARED => self.shared = value,
            NO_OPENGL => self.no_opengl = value,
            NO_XORG => self.no_xorg = value,
            FPIC => match &mut self.fpic {
                Some(fpic) => *fpic = value,
                None => return Err(removed(name)),
            },
            _ => return Err(unknown(name)),
        }
        Ok(())
    }

    /// Apply a `name=value` override, as given on the command line
    pub fn apply_override(&mut self, assignment: &str) -> Result<()> {
        let (name, value) = assignment.split_once('=').ok_or_else(|| {
            Error::ParseError(format!(
                "option override '{}' must have the form name=value",
                assignment
            ))
        })?;
        self.set(name.trim(), parse_bool(value.trim())?)
    }

    /// Active options in name order
    pub fn to_pairs(&self) -> BTreeMap<&'static str, bool> {
        let mut pairs = BTreeMap::new();
        pairs.insert(SHARED, self.shared);
        if let Some(fpic) = self.fpic {
            pairs.insert(FPIC, fpic);
        }
        pairs.insert(NO_OPENGL, self.no_opengl);
        pairs.insert(NO_XORG, self.no_xorg);
        pairs
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.to_pairs() {
            writeln!(f, "{}={}", name, if value { "True" } else { "False" })?;
        }
        Ok(())
    }
}

/// Parse a boolean option value
pub fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidOption(format!(
            "'{}' is not a boolean value",
            value
        ))),
    }
}

fn removed(name: &str) -> Error {
    Error::InvalidOption(format!("option '{}' was removed for this configuration", name))
}

fn unknown(name: &str) -> Error {
    Error::InvalidOption(format!(
        "unknown option '{}' (possible options: {}, {}, {}, {})",
        name, SHARED, FPIC, NO_OPENGL, NO_XORG
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = OptionSet::default();
        assert!(!options.shared);
        assert_eq!(options.fpic, Some(true));
        assert!(!options.no_opengl);
        assert!(!options.no_xorg);
        assert!(options.contains(FPIC));
    }

    #[test]
    fn test_override_parsing() {
        let mut options = OptionSet::default();
        options.apply_override("shared=True").unwrap();
        options.apply_override("fPIC = false").unwrap();
        assert!(options.shared);
        assert_eq!(options.fpic, Some(false));

        assert!(options.apply_override("shared").is_err());
        assert!(options.apply_override("shared=maybe").is_err());
        assert!(options.apply_override("vulkan=True").is_err());
    }

    #[test]
    fn test_removed_option_is_absent() {
        let mut options = OptionSet::default();
        options.remove_fpic();

        assert!(!options.contains(FPIC));
        assert!(!options.to_pairs().contains_key(FPIC));
        assert!(matches!(options.get(FPIC), Err(Error::InvalidOption(_))));
        assert!(matches!(options.set(FPIC, true), Err(Error::InvalidOption(_))));
    }

    #[test]
    fn test_display_lists_active_options() {
        let mut options = OptionSet::default();
        options.remove_fpic();
        let rendered = options.to_string();
        assert_eq!(rendered, "no_opengl=False\nno_xorg=False\nshared=False\n");
    }
}
