//! MCP Server implementation for kwsearch
//!
//! Runs as a stdio JSON-RPC server. stdout carries only protocol messages;
//! logging goes to stderr.

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::core::error::SearchError;
use crate::core::search::{KeywordSearcher, SearchRequest};

use super::protocol::*;

pub const SERVER_NAME: &str = "keyword_search_mcp";
pub const PROTOCOL_VERSION: &str = "2024-11-05";
const FILE_URI_PREFIX: &str = "file://";

/// Arguments of the `search_file` tool.
#[derive(Debug, Deserialize)]
struct SearchFileArgs {
    keyword: String,
    path: String,
    #[serde(default)]
    case_sensitive: bool,
}

/// Stateless between requests: every message is answered from its own
/// params plus the file system.
pub struct McpServer {
    searcher: KeywordSearcher,
}

impl McpServer {
    pub fn new(searcher: KeywordSearcher) -> Self {
        Self { searcher }
    }

    /// Run the MCP server (blocking, reads from stdin, writes to stdout)
    pub fn run(&self) -> Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Serve newline-delimited JSON-RPC from `input` until EOF.
    pub fn serve<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> Result<()> {
        log::info!("{} listening on stdio", SERVER_NAME);

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            // Non-UTF-8 bytes are a parse error for that line only
            let request = std::str::from_utf8(&buf)
                .map_err(|e| e.to_string())
                .and_then(|line| {
                    if line.trim().is_empty() {
                        Ok(None)
                    } else {
                        serde_json::from_str::<JsonRpcRequest>(line)
                            .map(Some)
                            .map_err(|e| e.to_string())
                    }
                });

            let request = match request {
                Ok(Some(req)) => req,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Discarding malformed request: {}", e);
                    let response =
                        JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e));
                    write_response(&mut output, &response)?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request) {
                write_response(&mut output, &response)?;
            }
        }

        log::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Dispatch one request. Notifications produce no response.
    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        log::debug!("-> {}", request.method);

        if request.jsonrpc != "2.0" {
            log::warn!("Unexpected jsonrpc version '{}'", request.jsonrpc);
        }

        if request.is_notification() {
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params),
            "resources/list" => JsonRpcResponse::from_serializable(
                request.id,
                &ResourcesListResult {
                    resources: Vec::new(),
                },
            ),
            "resources/templates/list" => self.handle_resource_templates_list(request.id),
            "resources/read" => self.handle_resources_read(request.id, request.params),
            _ => JsonRpcResponse::error(
                request.id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ),
        };

        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
                resources: ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: "MCP server that searches for keywords in files via resources."
                .to_string(),
        };

        JsonRpcResponse::from_serializable(id, &result)
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools = vec![ToolDefinition {
            name: "search_file".to_string(),
            description: "Search for a specific keyword inside a file fetched via the file:// resource. Returns the total number of matches and, for each one, its line number, character offsets and a context snippet.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "keyword": {
                        "type": "string",
                        "description": "The text to search for. Matched literally; surrounding whitespace is trimmed."
                    },
                    "path": {
                        "type": "string",
                        "description": "File path (the same path accepted by the file:// resource)"
                    },
                    "case_sensitive": {
                        "type": "boolean",
                        "description": "Whether to treat keyword matching as case-sensitive",
                        "default": false
                    }
                },
                "required": ["keyword", "path"]
            }),
        }];

        JsonRpcResponse::from_serializable(id, &ToolsListResult { tools })
    }

    fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params = match params {
            Some(p) => p,
            None => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params".to_string());
            }
        };

        let call: ToolCallParams = match serde_json::from_value(params) {
            Ok(c) => c,
            Err(e) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e));
            }
        };

        let result = match call.name.as_str() {
            "search_file" => self.execute_search_file(call.arguments),
            _ => ToolCallResult::error(format!("Unknown tool: {}", call.name)),
        };

        JsonRpcResponse::from_serializable(id, &result)
    }

    fn execute_search_file(&self, args: Option<Value>) -> ToolCallResult {
        let args = match args {
            Some(a) => a,
            None => return ToolCallResult::error("Missing arguments".to_string()),
        };

        let args: SearchFileArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return ToolCallResult::error(format!("Invalid arguments: {}", e)),
        };

        let request = match SearchRequest::new(&args.keyword, args.path, args.case_sensitive) {
            Ok(r) => r,
            Err(e) => return tool_failure(e),
        };

        let result = match self.searcher.search(&request) {
            Ok(r) => r,
            Err(e) => return tool_failure(e),
        };

        match serde_json::to_value(&result) {
            Ok(value) => {
                let text = serde_json::to_string_pretty(&value).unwrap_or_default();
                ToolCallResult::structured(text, value)
            }
            Err(e) => ToolCallResult::error(format!("Failed to encode result: {}", e)),
        }
    }

    fn handle_resource_templates_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = ResourceTemplatesListResult {
            resource_templates: vec![ResourceTemplate {
                uri_template: "file://{path}".to_string(),
                name: "read_file".to_string(),
                description: "Reads a file from the given path and returns its text content."
                    .to_string(),
                mime_type: "text/plain".to_string(),
            }],
        };

        JsonRpcResponse::from_serializable(id, &result)
    }

    fn handle_resources_read(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params = match params.map(serde_json::from_value::<ReadResourceParams>) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {}", e));
            }
            None => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params".to_string());
            }
        };

        let path = match params.uri.strip_prefix(FILE_URI_PREFIX) {
            Some(p) => p,
            None => {
                return JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Unsupported resource URI: {}", params.uri),
                );
            }
        };

        match self.searcher.reader().read(path) {
            Ok(text) => JsonRpcResponse::from_serializable(
                id,
                &ReadResourceResult {
                    contents: vec![ResourceContents {
                        uri: params.uri.clone(),
                        mime_type: "text/plain".to_string(),
                        text,
                    }],
                },
            ),
            Err(e) => {
                log::warn!("resources/read {} failed ({}): {}", params.uri, e.kind(), e);
                let code = match e {
                    SearchError::NotFound(_) => RESOURCE_NOT_FOUND,
                    SearchError::InvalidArgument(_) => INVALID_PARAMS,
                    SearchError::TooLarge { .. } | SearchError::Io { .. } => INTERNAL_ERROR,
                };
                JsonRpcResponse::error(id, code, e.to_string())
            }
        }
    }
}

fn tool_failure(e: SearchError) -> ToolCallResult {
    log::warn!("search_file failed ({}): {}", e.kind(), e);
    ToolCallResult::error(e.to_string())
}

fn write_response<W: Write>(output: &mut W, response: &JsonRpcResponse) -> Result<()> {
    let json = serde_json::to_string(response)?;
    writeln!(output, "{}", json)?;
    output.flush()?;
    Ok(())
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new(KeywordSearcher::default())
    }
}
