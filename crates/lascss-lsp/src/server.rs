// ABOUTME: Synchronous LSP message loop serving LASCSS class completions over a connection
// ABOUTME: Owns the session state: documents, catalog cache, notices and live configuration

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use lascss_catalog::{Catalog, CatalogCache, CatalogError, Installation};
use lascss_logging::{PerfStats, debug, error, info, perf_span, warn};
use lsp_server::{Connection, ErrorCode, Message, Notification, Request, Response};
use lsp_types::notification::{
    DidChangeConfiguration, DidChangeTextDocument, DidCloseTextDocument, DidOpenTextDocument,
    DidSaveTextDocument, Notification as _, ShowMessage,
};
use lsp_types::request::{Completion, Request as _};
use lsp_types::{
    CompletionOptions, CompletionParams, CompletionResponse, DidChangeConfigurationParams,
    InitializeParams, MessageType, ServerCapabilities, ShowMessageParams,
    TextDocumentSyncCapability, TextDocumentSyncKind, Uri, WorkDoneProgressOptions,
};
use serde_json::json;
use url::Url;

use crate::completion_engine::CompletionEngine;
use crate::config::LspConfig;
use crate::documents::DocumentStore;
use crate::notices::NoticeBoard;

/// `lascss/clearCache`: forget every catalog and every reported problem.
#[derive(Debug)]
pub enum ClearCache {}

impl lsp_types::request::Request for ClearCache {
    type Params = ();
    type Result = ();
    const METHOD: &'static str = "lascss/clearCache";
}

pub fn server_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Kind(
            TextDocumentSyncKind::INCREMENTAL,
        )),
        completion_provider: Some(CompletionOptions {
            resolve_provider: Some(false),
            trigger_characters: Some(
                ["\"", "'", " ", ":"].into_iter().map(String::from).collect(),
            ),
            all_commit_characters: None,
            work_done_progress_options: WorkDoneProgressOptions::default(),
            completion_item: None,
        }),
        ..Default::default()
    }
}

/// Perform the initialize handshake on `connection` and serve until shutdown.
pub fn run_server(connection: &Connection, config: LspConfig) -> Result<()> {
    let (initialize_id, initialize_params) = connection.initialize_start()?;
    let params: InitializeParams = serde_json::from_value(initialize_params)?;
    let mut server = Server::new(config, &params)?;

    connection.initialize_finish(
        initialize_id,
        json!({
            "capabilities": server_capabilities(),
            "serverInfo": {
                "name": server.config.server.name,
                "version": env!("CARGO_PKG_VERSION"),
            },
        }),
    )?;
    info!(
        workspace_root = ?server.workspace_root,
        "LSP initialization completed"
    );

    server.run(connection)
}

pub struct Server {
    config: LspConfig,
    engine: CompletionEngine,
    documents: DocumentStore,
    cache: CatalogCache,
    notices: NoticeBoard,
    outbox: Vec<Notification>,
    stats: PerfStats,
    workspace_root: Option<PathBuf>,
}

impl Server {
    pub fn new(mut config: LspConfig, params: &InitializeParams) -> Result<Self> {
        if let Some(options) = &params.initialization_options {
            config.merge_json(options)?;
        }
        apply_log_level(&config);

        Ok(Self {
            engine: CompletionEngine::new(&config)?,
            config,
            documents: DocumentStore::new(),
            cache: CatalogCache::new(),
            notices: NoticeBoard::new(),
            outbox: Vec::new(),
            stats: PerfStats::new(),
            workspace_root: workspace_root(params),
        })
    }

    fn run(&mut self, connection: &Connection) -> Result<()> {
        for msg in &connection.receiver {
            match msg {
                Message::Request(req) => {
                    if connection.handle_shutdown(&req)? {
                        info!("Received shutdown request");
                        self.log_stats();
                        return Ok(());
                    }
                    let response = self.handle_request(req);
                    self.flush(connection)?;
                    connection.sender.send(Message::Response(response))?;
                }
                Message::Response(resp) => {
                    debug!(id = ?resp.id, "Received response");
                }
                Message::Notification(not) => {
                    let method = not.method.clone();
                    if let Err(err) = self.handle_notification(not) {
                        warn!(method = %method, error = %err, "Error handling notification");
                    }
                    self.flush(connection)?;
                }
            }
        }
        Ok(())
    }

    fn flush(&mut self, connection: &Connection) -> Result<()> {
        for notification in self.outbox.drain(..) {
            connection
                .sender
                .send(Message::Notification(notification))?;
        }
        Ok(())
    }

    fn handle_request(&mut self, req: Request) -> Response {
        let Request { id, method, params } = req;
        debug!(method = %method, id = ?id, "Handling request");

        match method.as_str() {
            Completion::METHOD => match serde_json::from_value::<CompletionParams>(params) {
                Ok(params) => {
                    let span = perf_span!(
                        "completion",
                        uri = params.text_document_position.text_document.uri.as_str()
                    );
                    let _entered = span.enter();
                    let started = Instant::now();
                    let response = self.completion(params);
                    let elapsed = started.elapsed();
                    span.record("elapsed_ms", elapsed.as_millis() as u64);
                    self.stats.record_operation("completion", elapsed);
                    Response::new_ok(id, response)
                }
                Err(err) => {
                    error!(error = %err, "Invalid completion params");
                    Response::new_err(id, ErrorCode::InvalidParams as i32, err.to_string())
                }
            },
            ClearCache::METHOD => {
                self.cache.clear();
                self.notices.clear();
                Response::new_ok(id, ())
            }
            _ => Response::new_err(
                id,
                ErrorCode::MethodNotFound as i32,
                format!("Method not found: {method}"),
            ),
        }
    }

    fn handle_notification(&mut self, not: Notification) -> Result<()> {
        match not.method.as_str() {
            DidOpenTextDocument::METHOD => {
                self.documents.did_open(serde_json::from_value(not.params)?);
            }
            DidChangeTextDocument::METHOD => {
                self.documents.did_change(serde_json::from_value(not.params)?);
            }
            DidSaveTextDocument::METHOD => {
                self.documents.did_save(serde_json::from_value(not.params)?);
            }
            DidCloseTextDocument::METHOD => {
                self.documents.did_close(serde_json::from_value(not.params)?);
            }
            DidChangeConfiguration::METHOD => {
                self.did_change_configuration(serde_json::from_value(not.params)?)?;
            }
            method => {
                debug!(method, "Unhandled notification");
            }
        }
        Ok(())
    }

    fn completion(&mut self, params: CompletionParams) -> CompletionResponse {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let empty = CompletionResponse::Array(Vec::new());

        let Some(document) = self.documents.get(uri) else {
            debug!(uri = uri.as_str(), "Completion for unknown document");
            return empty;
        };
        let Some(context) = document
            .line_prefix(position)
            .and_then(|prefix| self.engine.context(prefix))
        else {
            return empty;
        };

        match self.catalog_for(uri) {
            Ok(catalog) => CompletionResponse::List(self.engine.complete(&catalog, &context, position)),
            Err(err) => {
                report_failure(&mut self.notices, &mut self.outbox, &err);
                empty
            }
        }
    }

    /// Locate from the document's directory first, then the workspace root.
    fn catalog_for(&self, uri: &Uri) -> Result<Arc<Catalog>, CatalogError> {
        let document_dir = file_path(uri).and_then(|path| path.parent().map(Path::to_path_buf));
        let starts = document_dir.into_iter().chain(self.workspace_root.clone());

        let mut last_err = None;
        for start in starts {
            match Installation::locate(&start, &self.config.installation) {
                Ok(installation) => return self.cache.get_or_load(&installation),
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| CatalogError::installation_not_found(uri.as_str())))
    }

    fn did_change_configuration(&mut self, params: DidChangeConfigurationParams) -> Result<()> {
        let Some(settings) = params.settings.get("lascss") else {
            debug!("Configuration change without lascss settings");
            return Ok(());
        };

        let mut config = self.config.clone();
        config.merge_json(settings)?;
        self.apply_config(config)
    }

    fn apply_config(&mut self, config: LspConfig) -> Result<()> {
        let engine = CompletionEngine::new(&config)?;

        if config.installation != self.config.installation {
            info!("Installation layout changed, dropping cached catalogs");
            self.cache.clear();
            self.notices.clear();
        }
        if config.logging.level != self.config.logging.level {
            apply_log_level(&config);
        }

        self.engine = engine;
        self.config = config;
        Ok(())
    }

    fn log_stats(&self) {
        if let Some((count, total, average)) = self.stats.get_stats("completion") {
            info!(
                count,
                total_ms = total.as_millis() as u64,
                average_ms = average.as_millis() as u64,
                documents = self.documents.len(),
                catalogs = self.cache.len(),
                "Completion statistics"
            );
        }
    }

    pub fn config(&self) -> &LspConfig {
        &self.config
    }
}

fn report_failure(notices: &mut NoticeBoard, outbox: &mut Vec<Notification>, err: &CatalogError) {
    if !err.is_user_facing() {
        warn!(error = %err, "Catalog unavailable");
        return;
    }
    if !notices.first_report(err.cause_key()) {
        debug!(cause = %err.cause_key(), "Problem already reported");
        return;
    }

    warn!(error = %err, "Reporting catalog problem to the client");
    outbox.push(Notification::new(
        ShowMessage::METHOD.to_string(),
        ShowMessageParams {
            typ: MessageType::WARNING,
            message: format!("LASCSS: {err}"),
        },
    ));
}

fn apply_log_level(config: &LspConfig) {
    let Some(level) = config.logging.level else {
        return;
    };
    if let Err(err) = lascss_logging::update_log_level(level.0) {
        debug!(error = %err, "Log level not applied");
    }
}

#[allow(deprecated)]
fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| &folder.uri)
        .or(params.root_uri.as_ref())
        .and_then(file_path)
}

/// Filesystem path of a `file:` URI.
pub(crate) fn file_path(uri: &Uri) -> Option<PathBuf> {
    Url::parse(uri.as_str()).ok()?.to_file_path().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_capabilities() {
        let capabilities = server_capabilities();
        let triggers = capabilities
            .completion_provider
            .and_then(|options| options.trigger_characters)
            .unwrap();
        assert_eq!(triggers, vec!["\"", "'", " ", ":"]);
        assert_eq!(
            capabilities.text_document_sync,
            Some(TextDocumentSyncCapability::Kind(
                TextDocumentSyncKind::INCREMENTAL
            ))
        );
    }

    #[test]
    fn test_file_path() {
        let uri = Uri::from_str("file:///tmp/project/index.html").unwrap();
        assert_eq!(
            file_path(&uri),
            Some(PathBuf::from("/tmp/project/index.html"))
        );
        let uri = Uri::from_str("untitled:Untitled-1").unwrap();
        assert_eq!(file_path(&uri), None);
    }

    #[test]
    fn test_initialization_options_are_merged() {
        let params = InitializeParams {
            initialization_options: Some(json!({ "server": { "max_completions": 7 } })),
            ..Default::default()
        };
        let server = Server::new(LspConfig::default(), &params).unwrap();
        assert_eq!(server.config().server.max_completions, 7);
        assert!(server.workspace_root.is_none());
    }

    #[test]
    fn test_failures_reported_once() {
        let mut notices = NoticeBoard::new();
        let mut outbox = Vec::new();
        let err = CatalogError::installation_not_found("/a");

        report_failure(&mut notices, &mut outbox, &err);
        report_failure(&mut notices, &mut outbox, &CatalogError::installation_not_found("/b"));
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].method, "window/showMessage");

        let io = CatalogError::io("/x", std::io::Error::other("boom"));
        report_failure(&mut notices, &mut outbox, &io);
        assert_eq!(outbox.len(), 1);
    }
}
