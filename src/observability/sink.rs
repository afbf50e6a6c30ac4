//! 日志落盘：决策日志与指标写入存储
//!
//! FileLogSink 在目录下写 decision_<trace>.json 与 metrics_<trace>.json；写入失败由控制循环吞掉，不影响 run 结果。

use std::path::{Path, PathBuf};

use crate::core::AgentError;
use crate::observability::RunMetrics;
use crate::react::DecisionEntry;

/// 日志写入后的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLocations {
    pub decision_log: PathBuf,
    pub metrics: PathBuf,
}

pub trait LogSink: Send + Sync {
    fn write(
        &self,
        trace_id: &str,
        entries: &[DecisionEntry],
        metrics: &RunMetrics,
    ) -> Result<LogLocations, AgentError>;
}

/// 按 trace_id 命名的 JSON 文件对
#[derive(Debug, Clone)]
pub struct FileLogSink {
    dir: PathBuf,
}

impl FileLogSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl LogSink for FileLogSink {
    fn write(
        &self,
        trace_id: &str,
        entries: &[DecisionEntry],
        metrics: &RunMetrics,
    ) -> Result<LogLocations, AgentError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| AgentError::LogSink(e.to_string()))?;

        let decision_log = self.dir.join(format!("decision_{trace_id}.json"));
        let metrics_path = self.dir.join(format!("metrics_{trace_id}.json"));

        write_json(&decision_log, entries)?;
        write_json(&metrics_path, metrics)?;

        Ok(LogLocations {
            decision_log,
            metrics: metrics_path,
        })
    }
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AgentError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| AgentError::LogSink(e.to_string()))?;
    std::fs::write(path, text).map_err(|e| AgentError::LogSink(format!("{}: {}", path.display(), e)))
}
