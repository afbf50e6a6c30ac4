//! Result Record：工具调用或缓存命中返回的统一结构
//!
//! JSON 形状固定为 `{"status", "type", "confidence", "content"}`，两层状态存储与决策日志都按此序列化。

use serde::{Deserialize, Serialize};

/// 工具结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Ok,
    Error,
    Timeout,
}

/// 单条结果记录；缓存中的副本只会被整体替换，不会原地修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRecord {
    pub status: ToolStatus,
    /// 结果声明的工具类别（写回状态时用它拼 Cache Key）
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub content: String,
}

fn default_kind() -> String {
    "unknown".to_string()
}

/// 工具未给出置信度时的取值
fn default_confidence() -> f64 {
    0.5
}

impl ToolRecord {
    pub fn ok(kind: impl Into<String>, confidence: f64, content: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Ok,
            kind: kind.into(),
            confidence,
            content: content.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ToolStatus::Ok
    }
}

/// Cache Key = step + ":" + 工具类别
pub fn cache_key(step: &str, category: &str) -> String {
    format!("{step}:{category}")
}
