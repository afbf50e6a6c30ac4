//! 文件持久化状态
//!
//! 单个 JSON 文件保存全部条目；每次 set 立即整文件重写（无批量、无事务），便于跨进程可见。
//! 打开时文件不存在则为空；内容损坏也从空状态开始，并记录 warn 日志。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::core::{AgentError, ToolRecord};
use crate::memory::PersistentState;

#[derive(Debug)]
pub struct FileState {
    path: PathBuf,
    data: RwLock<HashMap<String, ToolRecord>>,
}

impl FileState {
    /// 打开（或创建）状态文件；父目录不存在时自动创建
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AgentError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let data = if path.exists() {
            match load(&path) {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "状态文件无法解析，从空状态开始");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };
        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

}

fn load(path: &Path) -> Result<HashMap<String, ToolRecord>, AgentError> {
    let text = std::fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(HashMap::new());
    }
    Ok(serde_json::from_str(&text)?)
}

fn write(path: &Path, data: &HashMap<String, ToolRecord>) -> Result<(), AgentError> {
    std::fs::write(path, serde_json::to_string_pretty(data)?)?;
    Ok(())
}

impl PersistentState for FileState {
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
        // 先写入副本，文件落盘成功后才替换内存数据
        let mut next = data.clone();
        next.insert(key.to_string(), record.clone());
        write(&self.path, &next)?;
        *data = next;
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
