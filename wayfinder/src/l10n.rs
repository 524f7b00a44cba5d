//! Localization collaborator: a process-wide, read-only key to
//! formatted-string lookup.
//!
//! The catalog is parsed once from packaged JSON resource data and installed
//! at startup; it is never mutated afterwards. The navigation core itself
//! has no dependency on its contents; screens consume it to display
//! localized text. Patterns use positional printf-style placeholders
//! (`%d`, `%s`, `%@`), filled left to right.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::OnceCell;
use snafu::ResultExt;

use crate::error::{CatalogParseSnafu, Error, Result};

static CATALOG: OnceCell<Catalog> = OnceCell::new();

/// Table name → key → pattern.
#[derive(Debug, Default, serde::Deserialize)]
pub struct Catalog {
    #[serde(flatten)]
    tables: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    /// Parse a catalog from its packaged JSON form: an object of tables,
    /// each an object of key/pattern pairs.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context(CatalogParseSnafu)
    }

    pub fn lookup(&self, table: &str, key: &str) -> Option<&str> {
        self.tables.get(table)?.get(key).map(String::as_str)
    }

    /// Resolve `key` in `table` and fill positional arguments. A missing
    /// entry falls back to the key itself and logs a warning.
    pub fn tr(&self, table: &str, key: &str, args: &[&dyn fmt::Display]) -> String {
        match self.lookup(table, key) {
            Some(pattern) => format_positional(pattern, args),
            None => {
                tracing::warn!(table, key, "missing localized string");
                key.to_string()
            }
        }
    }
}

/// Install the catalog for the rest of the process. A second install is a
/// violation of the read-only contract and is rejected.
pub fn install(catalog: Catalog) -> Result<()> {
    CATALOG.set(catalog).map_err(|_| Error::CatalogInstalled)
}

/// Resolve a string from the installed catalog.
pub fn tr(table: &str, key: &str) -> String {
    tr_args(table, key, &[])
}

/// Resolve a string with positional format arguments.
pub fn tr_args(table: &str, key: &str, args: &[&dyn fmt::Display]) -> String {
    match CATALOG.get() {
        Some(catalog) => catalog.tr(table, key, args),
        None => {
            tracing::warn!(table, key, "no string catalog installed");
            key.to_string()
        }
    }
}

/// Substitute `%d`/`%s`/`%@` placeholders left to right; `%%` is a literal
/// percent sign. Placeholders beyond the supplied arguments are kept
/// verbatim so the mismatch is visible on screen.
fn format_positional(pattern: &str, args: &[&dyn fmt::Display]) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut next = 0;
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some(spec @ ('d' | 's' | '@')) => {
                let spec = *spec;
                chars.next();
                match args.get(next) {
                    Some(arg) => {
                        out.push_str(&arg.to_string());
                        next += 1;
                    }
                    None => {
                        out.push('%');
                        out.push(spec);
                    }
                }
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
    out
}
