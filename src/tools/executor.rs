//! 工具执行器
//!
//! 持有 ToolRegistry 与单次调用超时，invoke(category, query) 在超时内调用工具，
//! 结果统一映射为 ToolOutcome（Success / Timeout / Error）；每次调用输出结构化审计日志（JSON）。

use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::core::{AgentError, ToolRecord};
use crate::tools::ToolRegistry;

/// 单次工具调用的结果：成功记录、超时或其它失败
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    Success(ToolRecord),
    Timeout,
    Error(String),
}

impl ToolOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ToolOutcome::Success(_) => "ok",
            ToolOutcome::Timeout => "timeout",
            ToolOutcome::Error(_) => "error",
        }
    }
}

/// 工具执行器：对每次调用施加同一个超时
#[derive(Clone)]
pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    pub fn has_tool(&self, category: &str) -> bool {
        self.registry.contains(category)
    }

    /// 调用指定类别的工具；超时只取消这一次调用
    pub async fn invoke(&self, category: &str, query: &str) -> ToolOutcome {
        let Some(tool) = self.registry.get(category) else {
            return ToolOutcome::Error(AgentError::UnknownTool(category.to_string()).to_string());
        };

        let start = Instant::now();
        let outcome = match timeout(self.timeout, tool.query(query)).await {
            Ok(Ok(record)) => ToolOutcome::Success(record),
            Ok(Err(e)) => ToolOutcome::Error(e),
            Err(_) => ToolOutcome::Timeout,
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": category,
            "ok": matches!(outcome, ToolOutcome::Success(_)),
            "outcome": outcome.label(),
            "duration_ms": duration_ms,
            "query_preview": query_preview(query),
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        outcome
    }
}

fn query_preview(query: &str) -> String {
    if query.chars().count() > 200 {
        format!("{}...", query.chars().take(200).collect::<String>())
    } else {
        query.to_string()
    }
}
