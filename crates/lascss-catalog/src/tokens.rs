// ABOUTME: Lexical extraction of the two generated stylesheets into flat lookup tables
// ABOUTME: Custom properties become the token table, class blocks become the utility table

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{CatalogError, Result};

/// Custom property name (without the `--` marker) to raw value.
pub type TokenTable = BTreeMap<String, String>;

/// Class name to the first declaration of its rule, semicolon included.
pub type UtilityTable = BTreeMap<String, String>;

static CUSTOM_PROPERTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--([A-Za-z0-9_-]+)\s*:\s*([^;{}]*);").expect("valid regex"));

// Escaped characters belong to the class name; an unescaped `:` starts a
// pseudo-class or pseudo-element, which is matched and dropped.
static CLASS_RULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\.((?:\\.|[A-Za-z0-9_/\-\[\]])+)(?:::?[A-Za-z-]+(?:\([^(){}]*\))?)*\s*\{([^{}]*)\}",
    )
    .expect("valid regex")
});

/// Extract every `--name: value;` declaration, regardless of nesting.
///
/// A key declared twice keeps the later value.
pub fn parse_token_table(text: &str) -> TokenTable {
    CUSTOM_PROPERTY
        .captures_iter(text)
        .map(|caps| (caps[1].to_string(), caps[2].trim().to_string()))
        .collect()
}

/// Extract `.class { ... }` rules, keeping only the first declaration of each.
///
/// The first rule seen for a class wins; rules without any declaration are
/// skipped.
pub fn parse_utility_declarations(text: &str) -> UtilityTable {
    let mut table = UtilityTable::new();
    for caps in CLASS_RULE.captures_iter(text) {
        let Some(declaration) = first_declaration(&caps[2]) else {
            continue;
        };
        table
            .entry(unescape_class_name(&caps[1]))
            .or_insert(declaration);
    }
    table
}

fn first_declaration(body: &str) -> Option<String> {
    let end = body.find(';')?;
    let declaration = body[..=end].trim();
    if declaration == ";" {
        return None;
    }
    Some(declaration.to_string())
}

fn unescape_class_name(raw: &str) -> String {
    raw.replace("\\/", "/").replace("\\:", ":")
}

/// Read and parse the metadata stylesheet.
pub fn load_token_table(path: &Path) -> Result<TokenTable> {
    read_artifact(path).map(|text| parse_token_table(&text))
}

/// Read and parse the compiled utility stylesheet.
pub fn load_utility_table(path: &Path) -> Result<UtilityTable> {
    read_artifact(path).map(|text| parse_utility_declarations(&text))
}

fn read_artifact(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => CatalogError::artifact_missing(path),
        _ => CatalogError::io(path, err),
    })
}
