//! 决策事件：控制循环每一步产出的结构化记录
//!
//! 序列化为 JSON 时以 `action` 字段区分事件种类，写入 decision_<trace>.json。

use serde::Serialize;

use crate::core::ToolStatus;

/// 缓存命中的层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheTier {
    Persistent,
    Run,
}

/// 单条决策事件的负载
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DecisionKind {
    /// 决策层给出的候选工具
    Decide { candidate_tools: Vec<String> },
    CacheHit { tool: String, tier: CacheTier },
    /// 既无缓存也无可调用工具，跳过该步
    NoTools { message: String },
    /// 纯缓存路径选出的最优记录
    UseCacheBest { best_confidence: f64 },
    /// 单个候选（调用结果或缓存记录）的评估结果
    Dispatch {
        tool: String,
        status: ToolStatus,
        confidence: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    ChooseBest { best_confidence: f64 },
    NoValidResult,
    /// 置信度不足，发起补救调用
    Supplement { tool: String },
    SupplementDone { tool: String, confidence: f64 },
    SupplementError { tool: String, message: String },
    StepComplete { duration_ms: u64 },
}

impl DecisionKind {
    /// 与序列化后 `action` 字段一致的名称
    pub fn action(&self) -> &'static str {
        match self {
            DecisionKind::Decide { .. } => "decide",
            DecisionKind::CacheHit { .. } => "cache_hit",
            DecisionKind::NoTools { .. } => "no_tools",
            DecisionKind::UseCacheBest { .. } => "use_cache_best",
            DecisionKind::Dispatch { .. } => "dispatch",
            DecisionKind::ChooseBest { .. } => "choose_best",
            DecisionKind::NoValidResult => "no_valid_result",
            DecisionKind::Supplement { .. } => "supplement",
            DecisionKind::SupplementDone { .. } => "supplement_done",
            DecisionKind::SupplementError { .. } => "supplement_error",
            DecisionKind::StepComplete { .. } => "step_complete",
        }
    }
}

/// 决策日志中的一条记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionEntry {
    pub timestamp_ms: i64,
    pub trace_id: String,
    pub step_index: usize,
    pub step: String,
    #[serde(flatten)]
    pub kind: DecisionKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_flat_with_action() {
        let entry = DecisionEntry {
            timestamp_ms: 1,
            trace_id: "t".to_string(),
            step_index: 0,
            step: "理解问题的通用背景".to_string(),
            kind: DecisionKind::CacheHit {
                tool: "general".to_string(),
                tier: CacheTier::Persistent,
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["action"], "cache_hit");
        assert_eq!(json["tier"], "persistent");
        assert_eq!(json["trace_id"], "t");
        assert_eq!(entry.kind.action(), "cache_hit");
    }

    #[test]
    fn test_dispatch_omits_empty_message() {
        let kind = DecisionKind::Dispatch {
            tool: "tech".to_string(),
            status: ToolStatus::Timeout,
            confidence: 0.0,
            message: None,
        };
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["status"], "timeout");
        assert!(json.get("message").is_none());
    }
}
