//! Agent 错误类型
//!
//! 控制循环内部的失败（工具超时 / 工具异常 / 状态读写 / 日志落盘）都会被降级为日志事件，
//! 只有构造阶段的失败（打开持久化存储、加载配置）才会以 Err 返回给调用方。

use thiserror::Error;

/// Agent 运行过程中可能出现的错误
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("State I/O error: {0}")]
    StateIo(#[from] std::io::Error),

    /// 持久化文件内容无法解析为 Result Record 映射
    #[error("State corrupted: {0}")]
    StateCorrupted(String),

    #[error("State backend error: {0}")]
    StateBackend(String),

    #[error("Log sink error: {0}")]
    LogSink(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for AgentError {
    fn from(e: serde_json::Error) -> Self {
        AgentError::StateCorrupted(e.to_string())
    }
}

impl From<rusqlite::Error> for AgentError {
    fn from(e: rusqlite::Error) -> Self {
        AgentError::StateBackend(e.to_string())
    }
}

impl From<config::ConfigError> for AgentError {
    fn from(e: config::ConfigError) -> Self {
        AgentError::ConfigError(e.to_string())
    }
}
