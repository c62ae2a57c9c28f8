// ABOUTME: Open document store tracking full and incremental text synchronization
// ABOUTME: Converts LSP UTF-16 positions to byte offsets for edits and cursor context

use lascss_logging::{debug, info};
use lsp_types::{
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams,
    DidSaveTextDocumentParams, Position, Range, Uri,
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Document {
    pub language_id: String,
    pub version: i32,
    pub text: String,
}

impl Document {
    /// Text on the cursor's line up to the cursor.
    pub fn line_prefix(&self, position: Position) -> Option<&str> {
        let line_start = line_start_offset(&self.text, position.line)?;
        let line_end = self.text[line_start..]
            .find('\n')
            .map_or(self.text.len(), |end| line_start + end);
        let line = &self.text[line_start..line_end];
        let column = utf16_to_byte(line, position.character);
        Some(&line[..column])
    }

    /// Apply an edit; ranges past the end of the text are clamped.
    fn apply_change(&mut self, range: Option<Range>, new_text: &str) {
        match range {
            Some(range) => {
                let start = self.offset_at(range.start);
                let end = self.offset_at(range.end).max(start);
                self.text.replace_range(start..end, new_text);
            }
            None => self.text = new_text.to_string(),
        }
    }

    fn offset_at(&self, position: Position) -> usize {
        let Some(line_start) = line_start_offset(&self.text, position.line) else {
            return self.text.len();
        };
        let rest = &self.text[line_start..];
        let line = rest.find('\n').map_or(rest, |end| &rest[..end]);
        line_start + utf16_to_byte(line, position.character)
    }
}

fn line_start_offset(text: &str, line: u32) -> Option<usize> {
    if line == 0 {
        return Some(0);
    }
    text.match_indices('\n')
        .nth(line as usize - 1)
        .map(|(index, _)| index + 1)
}

/// Byte index of a UTF-16 column within `line`, clamped to the line end.
fn utf16_to_byte(line: &str, character: u32) -> usize {
    let mut units = 0u32;
    for (index, ch) in line.char_indices() {
        if units >= character {
            return index;
        }
        units += ch.len_utf16() as u32;
    }
    line.len()
}

#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<Uri, Document>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn did_open(&mut self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        info!(
            uri = document.uri.as_str(),
            language = %document.language_id,
            "Document opened"
        );
        self.documents.insert(
            document.uri,
            Document {
                language_id: document.language_id,
                version: document.version,
                text: document.text,
            },
        );
    }

    pub fn did_change(&mut self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let Some(document) = self.documents.get_mut(&uri) else {
            debug!(uri = uri.as_str(), "Change for unknown document");
            return;
        };

        document.version = params.text_document.version;
        for change in &params.content_changes {
            document.apply_change(change.range, &change.text);
        }
        debug!(
            uri = uri.as_str(),
            version = document.version,
            changes = params.content_changes.len(),
            "Document changed"
        );
    }

    pub fn did_save(&mut self, params: DidSaveTextDocumentParams) {
        if let (Some(text), Some(document)) =
            (params.text, self.documents.get_mut(&params.text_document.uri))
        {
            document.text = text;
        }
        debug!(uri = params.text_document.uri.as_str(), "Document saved");
    }

    pub fn did_close(&mut self, params: DidCloseTextDocumentParams) {
        info!(uri = params.text_document.uri.as_str(), "Document closed");
        self.documents.remove(&params.text_document.uri);
    }

    pub fn get(&self, uri: &Uri) -> Option<&Document> {
        self.documents.get(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
