// ABOUTME: Utility class catalog engine for the LASCSS framework
// ABOUTME: Turns the metadata and utility stylesheets of an installation into completion data

pub mod cache;
pub mod catalog;
pub mod classify;
pub mod color;
pub mod error;
pub mod generator;
pub mod installation;
pub mod resolver;
pub mod shade;
pub mod tokens;

#[cfg(test)]
mod logging_tests;

pub use cache::CatalogCache;
pub use catalog::{Catalog, ClassEntry, DetailSource};
pub use classify::{ShadeRung, TokenKind, classify};
pub use color::{Rgb, mix_colors};
pub use error::{CatalogError, Result};
pub use generator::{GeneratedCatalog, ThemeIndex, generate, generate_with_utilities};
pub use installation::{Installation, InstallationLayout};
pub use resolver::{MAX_RESOLVE_DEPTH, resolve};
pub use shade::synthesize_shade;
pub use tokens::{TokenTable, UtilityTable, parse_token_table, parse_utility_declarations};
