//! 调用方可见的 run 结果

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::observability::RunMetrics;
use crate::react::DecisionEntry;

/// 日志位置不可用时的占位文本
pub const UNAVAILABLE: &str = "unavailable";

#[derive(Debug, Clone)]
pub struct AgentReport {
    pub task: String,
    pub trace_id: String,
    pub elapsed: Duration,
    pub decision_log_path: Option<PathBuf>,
    pub metrics_path: Option<PathBuf>,
    /// 各步最优内容（及补救内容）按顺序拼接，每段一行
    pub final_result: String,
    pub decisions: Vec<DecisionEntry>,
    pub metrics: RunMetrics,
}

impl AgentReport {
    /// 决策日志中是否有指定步骤的某种 action
    pub fn has_action(&self, step: &str, action: &str) -> bool {
        self.decisions
            .iter()
            .any(|e| e.step == step && e.kind.action() == action)
    }
}

fn location(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| UNAVAILABLE.to_string())
}

impl fmt::Display for AgentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "任务完成：{}", self.task)?;
        writeln!(f)?;
        writeln!(f, "【trace_id】 {}", self.trace_id)?;
        writeln!(f, "【总耗时】 {:.2}s", self.elapsed.as_secs_f64())?;
        writeln!(f, "【决策日志】 {}", location(&self.decision_log_path))?;
        writeln!(f, "【指标文件】 {}", location(&self.metrics_path))?;
        writeln!(f)?;
        writeln!(f, "【最终结果】")?;
        write!(f, "{}", self.final_result)
    }
}
