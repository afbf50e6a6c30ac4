//! 反思层：判断结果是否「足够好」，不够时发起一次固定类别的补救调用
//!
//! 补救只发生一次，不会对补救结果再次反思。

use crate::core::ToolRecord;
use crate::tools::{ToolExecutor, ToolOutcome};

/// 默认充分性阈值
pub const DEFAULT_SUFFICIENCY_THRESHOLD: f64 = 0.6;

pub fn need_more_info(record: &ToolRecord, threshold: f64) -> bool {
    record.confidence < threshold
}

/// 补救调用的结果
#[derive(Debug, Clone)]
pub enum SupplementResult {
    Done(ToolRecord),
    Failed(String),
}

/// 调用补救工具一次；超时 / 异常 / 非 ok 状态都视为失败
pub async fn supplement(executor: &ToolExecutor, tool: &str, query: &str) -> SupplementResult {
    if !executor.has_tool(tool) {
        return SupplementResult::Failed(format!("Unknown tool: {tool}"));
    }
    match executor.invoke(tool, query).await {
        ToolOutcome::Success(rec) if rec.is_ok() => SupplementResult::Done(rec),
        ToolOutcome::Success(rec) => {
            SupplementResult::Failed(format!("supplement returned status {:?}", rec.status))
        }
        ToolOutcome::Timeout => SupplementResult::Failed(format!("Tool timeout: {tool}")),
        ToolOutcome::Error(e) => SupplementResult::Failed(e),
    }
}
