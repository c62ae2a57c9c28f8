// ABOUTME: Builds class-name completion items from a LASCSS catalog for the cursor context
// ABOUTME: Detects open class attribute values and filters catalog entries by the partial word

use anyhow::{Context, Result};
use lascss_catalog::{Catalog, ClassEntry, DetailSource, Rgb};
use lascss_logging::{PerfTimer, debug};
use lsp_types::{
    CompletionItem, CompletionItemKind, CompletionList, CompletionTextEdit, Documentation,
    MarkupContent, MarkupKind, Position, Range, TextEdit,
};
use regex::Regex;

use crate::config::LspConfig;

const COLOR_KEYWORDS: [&str; 2] = ["transparent", "currentColor"];

/// Cursor sits inside a class attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassContext<'a> {
    /// Class name typed so far, possibly empty.
    pub partial: &'a str,
}

pub struct CompletionEngine {
    attribute_value: Regex,
    max_completions: usize,
}

impl CompletionEngine {
    pub fn new(config: &LspConfig) -> Result<Self> {
        let attributes = config
            .completion
            .attributes
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r#"(?:^|[^\w-])(?:{attributes})\s*=\s*\{{?\s*(["'`])"#);
        let attribute_value = Regex::new(&pattern)
            .with_context(|| format!("Invalid class attribute pattern: {pattern}"))?;

        Ok(Self {
            attribute_value,
            max_completions: config.max_completions(),
        })
    }

    /// Class context for the text before the cursor on its line.
    ///
    /// Only the last attribute opening counts, and only while its quote is
    /// still unclosed.
    pub fn context<'a>(&self, line_prefix: &'a str) -> Option<ClassContext<'a>> {
        let caps = self.attribute_value.captures_iter(line_prefix).last()?;
        let quote = caps.get(1)?;
        let value = &line_prefix[quote.end()..];
        if value.contains(quote.as_str()) {
            return None;
        }
        let partial = value.rsplit(char::is_whitespace).next().unwrap_or_default();
        Some(ClassContext { partial })
    }

    /// Catalog entries starting with the partial word, in generation order.
    pub fn complete(
        &self,
        catalog: &Catalog,
        context: &ClassContext<'_>,
        position: Position,
    ) -> CompletionList {
        let _timer = PerfTimer::new("complete_classes");

        let replace = Range::new(
            Position::new(
                position.line,
                position
                    .character
                    .saturating_sub(utf16_len(context.partial)),
            ),
            position,
        );

        let mut items = Vec::new();
        let mut is_incomplete = false;
        for (index, entry) in catalog.entries().enumerate() {
            if !entry.name.starts_with(context.partial) {
                continue;
            }
            if items.len() == self.max_completions {
                is_incomplete = true;
                break;
            }
            items.push(completion_item(&entry, index, replace));
        }

        debug!(
            partial = context.partial,
            items = items.len(),
            is_incomplete,
            "Built class completions"
        );
        CompletionList {
            is_incomplete,
            items,
        }
    }
}

fn completion_item(entry: &ClassEntry<'_>, index: usize, replace: Range) -> CompletionItem {
    let label = entry.name.to_string();
    let mut item = CompletionItem {
        label: label.clone(),
        filter_text: Some(label.clone()),
        sort_text: Some(format!("{index:06}")),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit::new(replace, label))),
        ..Default::default()
    };

    item.kind = Some(CompletionItemKind::CONSTANT);
    match (color_value(entry), entry.detail) {
        (Some(color), _) => {
            item.kind = Some(CompletionItemKind::COLOR);
            item.detail = Some(color.to_string());
            item.documentation = Some(Documentation::String(color.to_string()));
        }
        (None, Some(declaration)) if entry.source == DetailSource::Utility => {
            item.detail = Some(declaration.to_string());
            item.documentation = Some(Documentation::MarkupContent(MarkupContent {
                kind: MarkupKind::Markdown,
                value: format!("```css\n.{} {{ {} }}\n```", entry.name, declaration),
            }));
        }
        (None, Some(value)) => {
            item.detail = Some(value.to_string());
            item.documentation = Some(Documentation::String(value.to_string()));
        }
        (None, None) => {}
    }
    item
}

/// Metadata details are colors; utility details are declarations.
fn color_value<'a>(entry: &ClassEntry<'a>) -> Option<&'a str> {
    let detail = entry.detail?;
    if entry.source != DetailSource::Metadata {
        return None;
    }
    (COLOR_KEYWORDS.contains(&detail) || Rgb::parse(detail).is_some()).then_some(detail)
}

fn utf16_len(text: &str) -> u32 {
    text.chars().map(|ch| ch.len_utf16() as u32).sum()
}
