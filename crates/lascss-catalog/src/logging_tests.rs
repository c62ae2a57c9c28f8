// ABOUTME: Checks the structured events the catalog emits using tracing-mock
// ABOUTME: Covers the resolver depth cap, cache hits and clears, and the expansion summary

use std::fs;

use tempfile::TempDir;
use tracing::Level;
use tracing_mock::{expect, subscriber};

use crate::cache::CatalogCache;
use crate::generator::generate;
use crate::installation::{Installation, InstallationLayout};
use crate::resolver::resolve;
use crate::tokens::TokenTable;

fn table(entries: &[(&str, &str)]) -> TokenTable {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_depth_cap_is_traced() {
    let tokens = table(&[("a", "var(--b)"), ("b", "var(--a)")]);

    let (subscriber, handle) = subscriber::mock()
        .with_filter(|meta| meta.is_event() && meta.target() == "lascss_catalog::resolver")
        .event(
            expect::event().at_level(Level::TRACE).with_fields(
                expect::msg("Indirection exceeded depth limit")
                    .and(expect::field("value").with_value(&"var(--a)")),
            ),
        )
        .only()
        .run_with_handle();

    tracing::subscriber::with_default(subscriber, || {
        assert_eq!(resolve("var(--a)", &tokens), "var(--a)");
        // Literal values never reach the cap
        assert_eq!(resolve("#fff", &tokens), "#fff");
    });

    handle.assert_finished();
}

#[test]
fn test_cache_hit_and_clear_events() {
    let temp = TempDir::new().unwrap();
    let layout = InstallationLayout::default();
    let root = temp.path().join(&layout.package_dir);
    fs::create_dir_all(root.join("dist")).unwrap();
    fs::write(
        root.join(&layout.meta_stylesheet),
        ":root { --config-color-bg: true; --color-red-500: #ff0000; }",
    )
    .unwrap();
    fs::write(root.join(&layout.utility_stylesheet), ".block { display: block; }").unwrap();
    let installation = Installation::locate(temp.path(), &layout).unwrap();
    let cache = CatalogCache::new();

    let (subscriber, handle) = subscriber::mock()
        .with_filter(|meta| meta.is_event() && meta.target() == "lascss_catalog::cache")
        .event(
            expect::event()
                .at_level(Level::DEBUG)
                .with_fields(expect::msg("Catalog cache hit")),
        )
        .event(
            expect::event().at_level(Level::INFO).with_fields(
                expect::msg("Catalog cache cleared").and(expect::field("dropped").with_value(&1_u64)),
            ),
        )
        .only()
        .run_with_handle();

    tracing::subscriber::with_default(subscriber, || {
        // The first lookup loads and emits nothing from the cache itself
        cache.get_or_load(&installation).unwrap();
        cache.get_or_load(&installation).unwrap();
        cache.clear();
    });

    handle.assert_finished();
}

#[test]
fn test_expansion_summary_event() {
    let tokens = table(&[
        ("config-color-bg", "true"),
        ("color-red-500", "#ff0000"),
        ("variant-hover", "1"),
        ("breakpoint-md", "1"),
    ]);

    let (subscriber, handle) = subscriber::mock()
        .with_filter(|meta| meta.is_event() && meta.target() == "lascss_catalog::generator")
        .event(
            expect::event().at_level(Level::DEBUG).with_fields(
                expect::msg("Expanded LASCSS metadata")
                    .and(expect::field("utility_prefixes").with_value(&1_u64))
                    .and(expect::field("colors").with_value(&1_u64))
                    .and(expect::field("variants").with_value(&6_u64))
                    .and(expect::field("classes").with_value(&77_u64)),
            ),
        )
        .only()
        .run_with_handle();

    let catalog = tracing::subscriber::with_default(subscriber, || generate(&tokens));

    handle.assert_finished();
    assert_eq!(catalog.classes.len(), 77);
}
