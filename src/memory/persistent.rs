//! 长期状态：跨 run 的 Cache Key → Result Record
//!
//! 接口只有 get / set，set 返回即已落盘；存储引擎（内存 / JSON 文件 / SQLite）可替换而不影响控制循环。

use std::collections::HashMap;
use std::sync::RwLock;

use crate::core::{AgentError, ToolRecord};

/// 持久化状态 trait；多个 run 可共享同一实例，写入按键后写者胜
pub trait PersistentState: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<ToolRecord>, AgentError>;

    fn set(&self, key: &str, record: &ToolRecord) -> Result<(), AgentError>;

    /// 当前全部条目的快照
    fn all(&self) -> Result<HashMap<String, ToolRecord>, AgentError>;
}

/// 进程内实现：无磁盘，适合测试与嵌入场景
#[derive(Debug, Default)]
pub struct InMemoryState {
    data: RwLock<HashMap<String, ToolRecord>>,
}

impl InMemoryState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentState for InMemoryState {
    fn get(&self, key: &str) -> Result<Option<ToolRecord>, AgentError> {
        let data = self
            .data
            .read()
            .map_err(|e| AgentError::StateBackend(e.to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, record: &ToolRecord) -> Result<(), AgentError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| AgentError::StateBackend(e.to_string()))?;
        data.insert(key.to_string(), record.clone());
        Ok(())
    }

    fn all(&self) -> Result<HashMap<String, ToolRecord>, AgentError> {
        let data = self
            .data
            .read()
            .map_err(|e| AgentError::StateBackend(e.to_string()))?;
        Ok(data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_last_write_wins() {
        let state = InMemoryState::new();
        assert!(state.get("k").unwrap().is_none());
        state.set("k", &ToolRecord::ok("general", 0.4, "old")).unwrap();
        state.set("k", &ToolRecord::ok("general", 0.9, "new")).unwrap();
        assert_eq!(state.get("k").unwrap().unwrap().content, "new");
        assert_eq!(state.all().unwrap().len(), 1);
    }
}
