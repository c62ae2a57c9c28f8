// ABOUTME: Expands classified metadata tokens into the full utility class surface
// ABOUTME: Produces class names, per-class color details and the variant list in a fixed order

use std::collections::{BTreeMap, BTreeSet, HashSet};

use lascss_logging::debug;

use crate::classify::{ShadeRung, TokenKind, classify};
use crate::resolver::resolve;
use crate::shade::synthesize_shade;
use crate::tokens::{TokenTable, UtilityTable};

/// Breakpoints every installation provides, whether or not the metadata lists them.
pub const DEFAULT_BREAKPOINTS: [&str; 5] = ["sm", "md", "lg", "xl", "2xl"];

/// Resolved colors of one family.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorFamily {
    /// Explicit per-rung values.
    pub shades: BTreeMap<ShadeRung, String>,
    /// Explicit unshaded value, else the rung-500 value.
    pub base: Option<String>,
}

impl ColorFamily {
    /// Detail for one rung: explicit value first, then a shade synthesized from the base.
    pub fn shade(&self, rung: ShadeRung) -> Option<String> {
        if let Some(explicit) = self.shades.get(&rung) {
            return Some(explicit.clone());
        }
        self.base
            .as_deref()
            .and_then(|base| synthesize_shade(base, rung))
    }
}

/// The metadata after classification and resolution, ready for expansion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeIndex {
    pub utility_prefixes: BTreeSet<String>,
    pub colors: BTreeMap<String, ColorFamily>,
    pub single_colors: BTreeMap<String, String>,
    pub variants: Vec<String>,
}

impl ThemeIndex {
    /// Classify every token once and resolve the values generation needs.
    pub fn build(tokens: &TokenTable) -> Self {
        let mut index = Self::default();
        let mut declared_variants = Vec::new();
        let mut declared_breakpoints = Vec::new();

        for (key, raw) in tokens {
            match classify(key) {
                TokenKind::UtilityFlag { prefix } => {
                    if raw.trim() == "true" {
                        index.utility_prefixes.insert(prefix.to_string());
                    }
                }
                TokenKind::ColorShade { name, rung } => {
                    if let Some(value) = resolve_non_empty(raw, tokens) {
                        index
                            .colors
                            .entry(name.to_string())
                            .or_default()
                            .shades
                            .insert(rung, value);
                    }
                }
                TokenKind::ColorDefault { name } => {
                    if let Some(value) = resolve_non_empty(raw, tokens) {
                        index.colors.entry(name.to_string()).or_default().base = Some(value);
                    }
                }
                TokenKind::SingleColor { name } => {
                    if let Some(value) = resolve_non_empty(raw, tokens) {
                        index.single_colors.insert(name.to_string(), value);
                    }
                }
                TokenKind::Variant { name } => declared_variants.push(name),
                TokenKind::Breakpoint { name } => declared_breakpoints.push(name),
                TokenKind::Unrecognized => {}
            }
        }

        for family in index.colors.values_mut() {
            if family.base.is_none() {
                family.base = family.shades.get(&ShadeRung::BASE).cloned();
            }
        }

        let mut variants = VariantSet::default();
        variants.extend(declared_variants);
        variants.extend(declared_breakpoints);
        variants.extend(DEFAULT_BREAKPOINTS);
        index.variants = variants.into_vec();

        index
    }
}

fn resolve_non_empty(raw: &str, tokens: &TokenTable) -> Option<String> {
    let value = resolve(raw, tokens);
    (!value.is_empty()).then_some(value)
}

/// Insertion-ordered set of variant names.
#[derive(Debug, Default)]
struct VariantSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl VariantSet {
    fn insert(&mut self, name: &str) {
        if !name.is_empty() && self.seen.insert(name.to_string()) {
            self.ordered.push(name.to_string());
        }
    }

    fn extend<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            self.insert(name);
        }
    }

    /// Record every segment that precedes a colon in a class name.
    ///
    /// Utility keys only keep colons that were escaped in the stylesheet.
    fn discover(&mut self, class_name: &str) {
        if let Some((prefixes, _)) = class_name.rsplit_once(':') {
            self.extend(prefixes.split(':'));
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

/// Output of generation: class names, details and variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedCatalog {
    /// Plain classes in generation order, then every variant-prefixed copy
    /// (outer loop over variants, inner loop over plain classes).
    pub classes: Vec<String>,
    /// Resolved color per class; classes without a resolvable color are absent.
    pub details: BTreeMap<String, String>,
    pub variants: Vec<String>,
}

impl GeneratedCatalog {
    pub fn detail(&self, class_name: &str) -> Option<&str> {
        self.details.get(class_name).map(String::as_str)
    }
}

/// Generate the catalog from metadata tokens alone.
pub fn generate(tokens: &TokenTable) -> GeneratedCatalog {
    generate_with_utilities(tokens, &UtilityTable::new())
}

/// Generate the catalog, also harvesting variant prefixes from compiled utility class names.
pub fn generate_with_utilities(tokens: &TokenTable, utilities: &UtilityTable) -> GeneratedCatalog {
    let index = ThemeIndex::build(tokens);
    expand(&index, utilities.keys().map(String::as_str))
}

/// Expand an index into classes. `extra_class_names` only contribute variant names.
pub fn expand<'a>(
    index: &ThemeIndex,
    extra_class_names: impl IntoIterator<Item = &'a str>,
) -> GeneratedCatalog {
    let mut plain = Vec::new();
    let mut details = BTreeMap::new();

    for prefix in &index.utility_prefixes {
        for (color_name, family) in &index.colors {
            for rung in ShadeRung::ALL {
                let class_name = format!("{prefix}-{color_name}-{rung}");
                if let Some(detail) = family.shade(rung) {
                    details.insert(class_name.clone(), detail);
                }
                plain.push(class_name);
            }
        }
    }

    for prefix in &index.utility_prefixes {
        for (color_name, value) in &index.single_colors {
            let class_name = format!("{prefix}-{color_name}");
            details.insert(class_name.clone(), value.clone());
            plain.push(class_name);
        }
    }

    let mut variant_set = VariantSet::default();
    variant_set.extend(index.variants.iter().map(String::as_str));
    for class_name in &plain {
        variant_set.discover(class_name);
    }
    for class_name in extra_class_names {
        variant_set.discover(class_name);
    }
    let variants = variant_set.into_vec();

    let mut classes = Vec::with_capacity(plain.len() * (variants.len() + 1));
    classes.extend(plain.iter().cloned());
    for variant in &variants {
        for class_name in &plain {
            let prefixed = format!("{variant}:{class_name}");
            if let Some(detail) = details.get(class_name).cloned() {
                details.insert(prefixed.clone(), detail);
            }
            classes.push(prefixed);
        }
    }

    debug!(
        utility_prefixes = index.utility_prefixes.len(),
        colors = index.colors.len(),
        single_colors = index.single_colors.len(),
        variants = variants.len(),
        classes = classes.len(),
        "Expanded LASCSS metadata"
    );

    GeneratedCatalog {
        classes,
        details,
        variants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &str)]) -> TokenTable {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_only_true_flags_activate_prefixes() {
        let index = ThemeIndex::build(&table(&[
            ("config-color-bg", "true"),
            ("config-color-text", " true "),
            ("config-color-border", "false"),
            ("config-color-fill", "1"),
        ]));
        let prefixes: Vec<&str> = index.utility_prefixes.iter().map(String::as_str).collect();
        assert_eq!(prefixes, ["bg", "text"]);
    }

    #[test]
    fn test_base_prefers_explicit_default() {
        let index = ThemeIndex::build(&table(&[
            ("color-red", "#ee0000"),
            ("color-red-500", "#ff0000"),
            ("color-blue-500", "#0000ff"),
            ("color-green-700", "#006600"),
        ]));
        assert_eq!(index.colors["red"].base.as_deref(), Some("#ee0000"));
        assert_eq!(index.colors["blue"].base.as_deref(), Some("#0000ff"));
        assert_eq!(index.colors["green"].base, None);
    }

    #[test]
    fn test_values_resolved_against_full_table() {
        let index = ThemeIndex::build(&table(&[
            ("color-brand", "var(--color-blue-600)"),
            ("color-blue-600", "#2563eb"),
            ("single-color-white", "var(--white, #fff)"),
        ]));
        assert_eq!(index.colors["brand"].base.as_deref(), Some("#2563eb"));
        assert_eq!(index.single_colors["white"], "#fff");
    }

    #[test]
    fn test_empty_values_are_ignored() {
        let index = ThemeIndex::build(&table(&[
            ("color-ghost", ""),
            ("single-color-none", "  "),
        ]));
        assert!(index.colors.is_empty());
        assert!(index.single_colors.is_empty());
    }

    #[test]
    fn test_variant_order_and_dedup() {
        let index = ThemeIndex::build(&table(&[
            ("variant-hover", "1"),
            ("variant-focus", "1"),
            ("breakpoint-md", "48rem"),
            ("breakpoint-3xl", "120rem"),
        ]));
        assert_eq!(
            index.variants,
            ["focus", "hover", "3xl", "md", "sm", "lg", "xl", "2xl"]
        );
    }

    #[test]
    fn test_explicit_shade_wins_over_synthesis() {
        let catalog = generate(&table(&[
            ("config-color-bg", "true"),
            ("color-slate", "#64748b"),
            ("color-slate-700", "#334155"),
        ]));
        assert_eq!(catalog.detail("bg-slate-700"), Some("#334155"));
        assert_eq!(
            catalog.detail("bg-slate-600").map(str::to_string),
            synthesize_shade("#64748b", ShadeRung::parse("600").unwrap())
        );
    }

    #[test]
    fn test_unparseable_base_leaves_classes_without_detail() {
        let catalog = generate(&table(&[
            ("config-color-bg", "true"),
            ("color-mystery", "var(--nowhere)"),
        ]));
        assert!(catalog.classes.contains(&"bg-mystery-300".to_string()));
        assert_eq!(catalog.detail("bg-mystery-300"), None);
        assert_eq!(catalog.detail("bg-mystery-500"), Some("var(--nowhere)"));
    }

    #[test]
    fn test_single_colors_follow_shaded_classes() {
        let catalog = generate(&table(&[
            ("config-color-text", "true"),
            ("color-red-500", "#ff0000"),
            ("single-color-current", "currentColor"),
            ("single-color-white", "#ffffff"),
        ]));
        let plain: Vec<&str> = catalog
            .classes
            .iter()
            .map(String::as_str)
            .filter(|name| !name.contains(':'))
            .collect();
        assert_eq!(plain.len(), 13);
        assert_eq!(plain[0], "text-red-50");
        assert_eq!(plain[10], "text-red-950");
        assert_eq!(plain[11..], ["text-current", "text-white"]);
        assert_eq!(catalog.detail("text-current"), Some("currentColor"));
    }

    #[test]
    fn test_variant_expansion_order() {
        let catalog = generate(&table(&[
            ("config-color-bg", "true"),
            ("single-color-black", "#000"),
            ("single-color-white", "#fff"),
            ("variant-hover", "1"),
        ]));
        assert_eq!(
            &catalog.classes[..6],
            ["bg-black", "bg-white", "hover:bg-black", "hover:bg-white", "sm:bg-black", "sm:bg-white"]
        );
        assert_eq!(catalog.classes.len(), 2 * (1 + 6));
        assert_eq!(catalog.detail("hover:bg-white"), Some("#fff"));
    }

    #[test]
    fn test_utility_class_prefixes_become_variants() {
        let tokens = table(&[("config-color-bg", "true"), ("single-color-white", "#fff")]);
        let utilities: UtilityTable = [
            ("dark:md:flex".to_string(), "display: flex;".to_string()),
            ("print:hidden".to_string(), "display: none;".to_string()),
            ("w-1/2".to_string(), "width: 50%;".to_string()),
        ]
        .into_iter()
        .collect();

        let catalog = generate_with_utilities(&tokens, &utilities);
        assert_eq!(
            catalog.variants,
            ["sm", "md", "lg", "xl", "2xl", "dark", "print"]
        );
        assert!(catalog.classes.contains(&"print:bg-white".to_string()));
    }

    #[test]
    fn test_no_prefixes_means_no_classes() {
        let catalog = generate(&table(&[("color-red-500", "#f00"), ("variant-hover", "1")]));
        assert!(catalog.classes.is_empty());
        assert!(catalog.details.is_empty());
        assert_eq!(catalog.variants[0], "hover");
    }
}
