//! MCP server implementation

use crate::protocol::*;
use crate::tools;
use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tutorloop_core::llm::embedder_from_config;
use tutorloop_core::{Config, KnowledgeStore, QueryOrchestrator};

pub struct McpServer {
    orchestrator: QueryOrchestrator,
    store: Arc<KnowledgeStore>,
    kb_threshold: f64,
}

impl McpServer {
    pub fn new(orchestrator: QueryOrchestrator, store: Arc<KnowledgeStore>) -> Self {
        Self {
            orchestrator,
            store,
            kb_threshold: tutorloop_core::pipeline::RoutingSettings::default().kb_threshold,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.kb_threshold = threshold;
        self
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = embedder_from_config(config)?;
        let store = Arc::new(KnowledgeStore::open(&config.knowledge, embedder)?);
        let orchestrator = QueryOrchestrator::with_store(config, store.clone())?;
        Ok(Self::new(orchestrator, store).with_threshold(config.knowledge.threshold))
    }

    /// Serve newline-delimited JSON-RPC on stdin/stdout until EOF
    pub async fn run(&self) -> Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = BufWriter::new(tokio::io::stdout());
        self.serve(reader, writer).await
    }

    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
                Ok(r) => r,
                Err(e) => {
                    let response =
                        JsonRpcResponse::error(None, PARSE_ERROR, &format!("Parse error: {}", e));
                    write_response(&mut writer, &response).await?;
                    continue;
                }
            };

            // Notifications carry no id and get no reply
            if request.id.is_none() && request.method.starts_with("notifications/") {
                tracing::debug!("Notification: {}", request.method);
                continue;
            }

            let response = self.handle_request(&request).await;
            write_response(&mut writer, &response).await?;
        }

        Ok(())
    }

    pub async fn handle_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,
            _ => JsonRpcResponse::error(
                request.id.clone(),
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let result = serde_json::json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": "tutorloop",
                "version": env!("CARGO_PKG_VERSION")
            }
        });
        JsonRpcResponse::success(request.id.clone(), result)
    }

    fn handle_tools_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let tools = vec![
            tools::ask_question_tool_definition(),
            tools::kb_search_tool_definition(),
            tools::kb_status_tool_definition(),
        ];

        JsonRpcResponse::success(request.id.clone(), serde_json::json!({ "tools": tools }))
    }

    async fn handle_tools_call(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let name = request
            .params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("");

        let arguments = request
            .params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        let result = match name {
            "ask_question" => tools::handle_ask_question(&self.orchestrator, arguments).await,
            "kb_search" => {
                tools::handle_kb_search(&self.store, arguments, self.kb_threshold).await
            }
            "kb_status" => tools::handle_kb_status(&self.store).await,
            _ => Err(anyhow::anyhow!("Unknown tool: {}", name)),
        };

        let tool_result = result.unwrap_or_else(|e| {
            tracing::warn!("Tool {} failed: {}", name, e);
            ToolResult::failure(e)
        });

        match serde_json::to_value(tool_result) {
            Ok(value) => JsonRpcResponse::success(request.id.clone(), value),
            Err(e) => JsonRpcResponse::error(
                request.id.clone(),
                INTERNAL_ERROR,
                &format!("Failed to encode result: {}", e),
            ),
        }
    }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> Result<()> {
    let json = serde_json::to_string(response)?;
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

pub async fn start_server(config: &Config) -> Result<()> {
    let server = McpServer::from_config(config)?;
    server.run().await
}
