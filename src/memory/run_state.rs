//! 短期状态：本次 run 内的 Cache Key → Result Record
//!
//! 由单个 run 独占（&mut 借用），run 结束即丢弃，不需要锁。

use std::collections::HashMap;

use crate::core::ToolRecord;

#[derive(Debug, Clone, Default)]
pub struct RunState {
    entries: HashMap<String, ToolRecord>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用调用方给出的初始状态做种子（复制，不影响调用方的 map）
    pub fn seeded(initial: &HashMap<String, ToolRecord>) -> Self {
        Self {
            entries: initial.clone(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ToolRecord> {
        self.entries.get(key)
    }

    /// 整体替换该键的记录
    pub fn insert(&mut self, key: impl Into<String>, record: ToolRecord) {
        self.entries.insert(key.into(), record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
