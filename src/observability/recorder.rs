//! 决策记录器：一次 run 的有序、只追加事件日志

use crate::react::{DecisionEntry, DecisionKind};

#[derive(Debug, Clone)]
pub struct DecisionRecorder {
    trace_id: String,
    entries: Vec<DecisionEntry>,
}

impl DecisionRecorder {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            entries: Vec::new(),
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn record(&mut self, step_index: usize, step: &str, kind: DecisionKind) {
        tracing::debug!(
            trace_id = %self.trace_id,
            step_index,
            action = kind.action(),
            "decision"
        );
        self.entries.push(DecisionEntry {
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            trace_id: self.trace_id.clone(),
            step_index,
            step: step.to_string(),
            kind,
        });
    }

    pub fn entries(&self) -> &[DecisionEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<DecisionEntry> {
        self.entries
    }
}
