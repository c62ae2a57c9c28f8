// ABOUTME: Dereferences var(--name, fallback) indirection inside token values
// ABOUTME: Bounded to a fixed depth so cyclic or runaway chains terminate quietly

use once_cell::sync::Lazy;
use regex::Regex;

use crate::tokens::TokenTable;

/// Maximum number of substitutions performed for one value.
///
/// A value still holding a reference after this many substitutions resolves
/// to its original text rather than the partially substituted one, so that
/// resolving an already resolved value never changes it.
pub const MAX_RESOLVE_DEPTH: usize = 5;

static VAR_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"var\(\s*--([A-Za-z0-9_-]+)\s*").expect("valid regex"));

/// A single `var(...)` occurrence within a value.
#[derive(Debug, PartialEq, Eq)]
struct Reference<'a> {
    start: usize,
    end: usize,
    name: &'a str,
    fallback: Option<&'a str>,
}

enum Step {
    Literal,
    Stuck,
    Next(String),
}

/// Resolve a raw token value to its literal value.
///
/// Values that cannot be resolved within [`MAX_RESOLVE_DEPTH`] substitutions
/// are returned unresolved as given (trimmed), which keeps the operation
/// idempotent even for cycles.
pub fn resolve(value: &str, tokens: &TokenTable) -> String {
    let original = value.trim();
    let mut current = original.to_string();

    for _ in 0..MAX_RESOLVE_DEPTH {
        match step(&current, tokens) {
            Step::Literal | Step::Stuck => return current,
            Step::Next(next) => current = next,
        }
    }

    match step(&current, tokens) {
        Step::Literal | Step::Stuck => current,
        Step::Next(_) => {
            lascss_logging::trace!(value = original, "Indirection exceeded depth limit");
            original.to_string()
        }
    }
}

fn step(current: &str, tokens: &TokenTable) -> Step {
    let Some(reference) = find_reference(current) else {
        return Step::Literal;
    };

    let replacement = match (tokens.get(reference.name), reference.fallback) {
        (Some(value), _) => value.as_str(),
        (None, Some(fallback)) => fallback,
        (None, None) => return Step::Stuck,
    };

    let mut next = String::with_capacity(current.len() + replacement.len());
    next.push_str(&current[..reference.start]);
    next.push_str(replacement.trim());
    next.push_str(&current[reference.end..]);
    let next = next.trim().to_string();

    if next == current {
        Step::Stuck
    } else {
        Step::Next(next)
    }
}

/// Locate the first well-formed `var(--name[, fallback])`, honouring nested
/// parentheses inside the fallback.
fn find_reference(value: &str) -> Option<Reference<'_>> {
    let caps = VAR_REFERENCE.captures(value)?;
    let head = caps.get(0)?;
    let name = caps.get(1)?.as_str();

    let rest = &value[head.end()..];
    let mut depth = 0usize;
    let mut comma = None;
    for (offset, ch) in rest.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' if depth == 0 => {
                let fallback = comma.map(|at: usize| rest[at + 1..offset].trim());
                return Some(Reference {
                    start: head.start(),
                    end: head.end() + offset + 1,
                    name,
                    fallback,
                });
            }
            ')' => depth -= 1,
            ',' if depth == 0 && comma.is_none() => comma = Some(offset),
            _ => {}
        }
    }
    None
}
