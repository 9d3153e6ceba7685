use crate::{
    request::DetectionRequest,
    tracer::{BoundaryCommand, BoundaryTracer},
};
use rmcp::{
    handler::server::tool::IntoCallToolResult, model::{CallToolResult, Content, ServerCapabilities, ServerInfo}, schemars, tool, Error as McpError, ServerHandler
};
use serde::Serialize;
use std::sync::Arc;

/// Response containing boundary tracing results
#[derive(Debug, Serialize, schemars::JsonSchema)]
pub struct TraceResponse {
    #[schemars(description = "Command that produced this response")]
    pub command: String,
    #[schemars(description = "Number of boundaries traced, 0 on error")]
    pub feature_count: usize,
    #[schemars(description = "Traced output in the command's dialect, or an error object")]
    pub result: serde_json::Value,
}

impl IntoCallToolResult for TraceResponse {
    fn into_call_tool_result(self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&self).unwrap_or_else(|_| format!("{:?}", self)),
        )]))
    }
}

impl TraceResponse {
    fn error(command: BoundaryCommand, message: String) -> Self {
        Self {
            command: command.to_string(),
            feature_count: 0,
            result: serde_json::json!({ "error": message }),
        }
    }
}

/// MCP Server for field boundary tracing
#[derive(Clone)]
pub struct BoundaryMcpServer {
    tracer: Arc<BoundaryTracer>,
}

impl BoundaryMcpServer {
    pub fn new() -> Self {
        Self::with_tracer(BoundaryTracer::new())
    }

    pub fn with_tracer(tracer: BoundaryTracer) -> Self {
        Self { tracer: Arc::new(tracer) }
    }

    fn run(&self, command: BoundaryCommand, request: &DetectionRequest) -> TraceResponse {
        let result = match self.tracer.execute(command, request) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(%command, error = %e, "boundary tracing failed");
                return TraceResponse::error(command, format!("Boundary tracing failed: {}", e));
            }
        };

        let feature_count = match command {
            BoundaryCommand::TraceBoundaries => result["features"].as_array().map_or(0, Vec::len),
            BoundaryCommand::TraceFeatureList => result.as_array().map_or(0, Vec::len),
            BoundaryCommand::TracePaths => result["polygons"].as_array().map_or(0, Vec::len),
        };

        TraceResponse {
            command: command.to_string(),
            feature_count,
            result,
        }
    }
}

impl Default for BoundaryMcpServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool(tool_box)]
impl BoundaryMcpServer {
    #[tool(description = "Trace field boundaries from segmentation polygons into a GeoJSON FeatureCollection with hectare area and size class")]
    fn trace_boundaries(&self, #[tool(aggr)] request: DetectionRequest) -> TraceResponse {
        self.run(BoundaryCommand::TraceBoundaries, &request)
    }

    #[tool(description = "Trace field boundaries into a plain array of GeoJSON features")]
    fn trace_feature_list(&self, #[tool(aggr)] request: DetectionRequest) -> TraceResponse {
        self.run(BoundaryCommand::TraceFeatureList, &request)
    }

    #[tool(description = "Trace open {lat, lng} outlines without area estimation (legacy map clients)")]
    fn trace_paths(&self, #[tool(aggr)] request: DetectionRequest) -> TraceResponse {
        self.run(BoundaryCommand::TracePaths, &request)
    }

    #[tool(description = "Get information about available commands and the active pipeline")]
    fn get_command_info(&self) -> String {
        let mut info = String::new();
        info.push_str("Available BoundaryCommands:\n\n");

        for (i, name) in BoundaryCommand::command_names().iter().enumerate() {
            info.push_str(&format!("{}. {}\n", i + 1, name));
        }

        info.push_str("\nCommand Details:\n");
        for cmd in [
            BoundaryCommand::TraceBoundaries,
            BoundaryCommand::TraceFeatureList,
            BoundaryCommand::TracePaths,
        ] {
            info.push_str(&format!("\n- {}\n", cmd));
            info.push_str(&format!("  Description: {}\n", cmd.description()));
        }

        info.push_str(&format!("\n{}\n", self.tracer.pipeline().info()));
        info
    }

    #[tool(description = "Get the JSON schema of the boundary commands")]
    fn get_command_schema(&self) -> String {
        let schema = BoundaryCommand::schema();
        serde_json::to_string_pretty(&schema)
            .unwrap_or_else(|e| format!("Failed to serialize schema: {}", e))
    }

    #[tool(description = "Get the JSON schema of a boundary tracing request")]
    fn get_request_schema(&self) -> String {
        let schema = DetectionRequest::schema();
        serde_json::to_string_pretty(&schema)
            .unwrap_or_else(|e| format!("Failed to serialize schema: {}", e))
    }
}

#[tool(tool_box)]
impl ServerHandler for BoundaryMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Field Boundary Tracing Server - Convert per-instance segmentation polygons into closed geographic rings with hectare areas and size categories.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(width: i64) -> DetectionRequest {
        DetectionRequest::from_json(&format!(r#"{{
            "image_width": {},
            "image_height": 100,
            "bounds": {{"north": 10, "south": 0, "east": 10, "west": 0}},
            "instances": [{{"polygon": [[0, 0], [50, 0], [50, 50], [0, 50]]}}]
        }}"#, width)).unwrap()
    }

    #[test]
    fn test_run_counts_features() {
        let server = BoundaryMcpServer::new();
        for command in [
            BoundaryCommand::TraceBoundaries,
            BoundaryCommand::TraceFeatureList,
            BoundaryCommand::TracePaths,
        ] {
            let response = server.run(command, &request(100));
            assert_eq!(response.feature_count, 1, "{}", command);
            assert_eq!(response.command, command.to_string());
        }
    }

    #[test]
    fn test_schemas_are_json() {
        let server = BoundaryMcpServer::new();

        let command: serde_json::Value = serde_json::from_str(&server.get_command_schema()).unwrap();
        let text = command.to_string();
        for name in BoundaryCommand::command_names() {
            assert!(text.contains(name), "{} missing from command schema", name);
        }

        let request: serde_json::Value = serde_json::from_str(&server.get_request_schema()).unwrap();
        assert!(request["properties"]["image_width"].is_object());
        assert!(request["properties"]["bounds"].is_object());
    }

    #[test]
    fn test_run_reports_errors_in_band() {
        let response = BoundaryMcpServer::new().run(BoundaryCommand::TraceBoundaries, &request(0));
        assert_eq!(response.feature_count, 0);
        assert!(response.result["error"].as_str().unwrap().contains("Invalid image dimensions"));
    }
}
