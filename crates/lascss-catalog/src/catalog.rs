// ABOUTME: Merges generated metadata details with compiled utility declarations
// ABOUTME: Utility declarations win; metadata colors fill the classes the compiled CSS lacks

use std::collections::HashMap;
use std::time::Duration;

use lascss_logging::{PerfTimer, info};

use crate::error::Result;
use crate::generator::{GeneratedCatalog, generate_with_utilities};
use crate::installation::Installation;
use crate::tokens::{TokenTable, UtilityTable, load_token_table, load_utility_table};

/// Where a class's detail came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSource {
    /// First declaration from the compiled utility stylesheet.
    Utility,
    /// Color resolved or synthesized from the metadata stylesheet.
    Metadata,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry<'a> {
    pub name: &'a str,
    pub detail: Option<&'a str>,
    pub source: DetailSource,
}

/// Everything known about one installation's classes.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    generated: GeneratedCatalog,
    utilities: UtilityTable,
    /// Generated class name to its position in generation order.
    positions: HashMap<String, usize>,
    /// Utility classes generation does not produce, in name order.
    utility_only: Vec<String>,
}

impl Catalog {
    pub fn build(tokens: &TokenTable, utilities: UtilityTable) -> Self {
        let generated = generate_with_utilities(tokens, &utilities);
        let positions: HashMap<String, usize> = generated
            .classes
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), index))
            .collect();
        let utility_only = utilities
            .keys()
            .filter(|name| !positions.contains_key(name.as_str()))
            .cloned()
            .collect();
        Self {
            generated,
            utilities,
            positions,
            utility_only,
        }
    }

    /// Read both stylesheets of an installation and build the catalog.
    pub fn load(installation: &Installation) -> Result<Self> {
        let _timer = PerfTimer::new("load_catalog").with_warn_threshold(Duration::from_millis(500));

        let tokens = load_token_table(&installation.meta_stylesheet)?;
        let utilities = load_utility_table(&installation.utility_stylesheet)?;
        let catalog = Self::build(&tokens, utilities);

        info!(
            root = %installation.root.display(),
            tokens = tokens.len(),
            utilities = catalog.utilities.len(),
            generated = catalog.generated.classes.len(),
            variants = catalog.generated.variants.len(),
            "Catalog generated"
        );
        Ok(catalog)
    }

    pub fn generated(&self) -> &GeneratedCatalog {
        &self.generated
    }

    pub fn variants(&self) -> &[String] {
        &self.generated.variants
    }

    /// Merged detail for a single class.
    pub fn lookup(&self, name: &str) -> Option<ClassEntry<'_>> {
        if let Some((key, declaration)) = self.utilities.get_key_value(name) {
            return Some(ClassEntry {
                name: key,
                detail: Some(declaration),
                source: DetailSource::Utility,
            });
        }
        let position = *self.positions.get(name)?;
        Some(self.generated_entry(&self.generated.classes[position]))
    }

    /// Generated classes in generation order, then utility-only classes.
    pub fn entries(&self) -> impl Iterator<Item = ClassEntry<'_>> + '_ {
        let from_generated = self.generated.classes.iter().map(|name| {
            match self.utilities.get(name) {
                Some(declaration) => ClassEntry {
                    name,
                    detail: Some(declaration),
                    source: DetailSource::Utility,
                },
                None => self.generated_entry(name),
            }
        });

        let utility_only = self.utility_only.iter().map(|name| ClassEntry {
            name,
            detail: self.utilities.get(name).map(String::as_str),
            source: DetailSource::Utility,
        });

        from_generated.chain(utility_only)
    }

    pub fn len(&self) -> usize {
        self.generated.classes.len() + self.utility_only.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generated.classes.is_empty() && self.utilities.is_empty()
    }

    fn generated_entry<'a>(&'a self, name: &'a str) -> ClassEntry<'a> {
        match self.generated.detail(name) {
            Some(detail) => ClassEntry {
                name,
                detail: Some(detail),
                source: DetailSource::Metadata,
            },
            None => ClassEntry {
                name,
                detail: None,
                source: DetailSource::None,
            },
        }
    }
}
