//! Headless Agent 运行时
//!
//! create_dispatcher 按配置构建 Planner / ToolExecutor / LogSink，
//! open_persistent_state 按 [state] 段打开长期状态，
//! run_agent 对单个任务跑一次控制循环并返回 AgentReport。

use std::sync::Arc;
use std::time::Duration;

use crate::config::{load_config, AppConfig, StateBackend};
use crate::core::AgentError;
use crate::memory::{FileState, PersistentState, SqliteState};
use crate::observability::FileLogSink;
use crate::react::{AgentReport, DispatchSettings, Dispatcher, RuleBasedPlanner, RunOptions};
use crate::tools::{default_registry, ToolExecutor, ToolRegistry};

/// 未配置 path 时各后端的默认位置
const DEFAULT_FILE_STATE: &str = "state/persist_state.json";
const DEFAULT_SQLITE_STATE: &str = "state/persist_state.db";

/// 用默认工具集创建调度器
pub fn create_dispatcher(cfg: &AppConfig) -> Dispatcher {
    create_dispatcher_with_tools(cfg, default_registry())
}

/// 用指定工具集创建调度器（测试或扩展工具时使用）
pub fn create_dispatcher_with_tools(cfg: &AppConfig, tools: ToolRegistry) -> Dispatcher {
    let executor = ToolExecutor::new(tools, Duration::from_millis(cfg.agent.tool_timeout_ms));
    let mut dispatcher = Dispatcher::new(Arc::new(RuleBasedPlanner::new()), executor)
        .with_settings(DispatchSettings {
            sufficiency_threshold: cfg.agent.sufficiency_threshold,
            supplement_tool: cfg.agent.supplement_tool.clone(),
        });
    if cfg.logs.enabled {
        dispatcher = dispatcher.with_sink(Arc::new(FileLogSink::new(&cfg.logs.dir)));
    }
    dispatcher
}

/// 按 [state] 段打开长期状态；backend = none 时返回 None
pub fn open_persistent_state(
    cfg: &AppConfig,
) -> Result<Option<Arc<dyn PersistentState>>, AgentError> {
    let state: Arc<dyn PersistentState> = match cfg.state.backend {
        StateBackend::None => return Ok(None),
        StateBackend::File => {
            let path = cfg
                .state
                .path
                .clone()
                .unwrap_or_else(|| DEFAULT_FILE_STATE.into());
            Arc::new(FileState::open(path)?)
        }
        StateBackend::Sqlite => {
            let path = cfg
                .state
                .path
                .clone()
                .unwrap_or_else(|| DEFAULT_SQLITE_STATE.into());
            Arc::new(SqliteState::open(path)?)
        }
    };
    Ok(Some(state))
}

/// 处理单个任务：加载配置（失败时用默认值）、构建调度器并执行
pub async fn run_agent(task: &str, options: RunOptions) -> AgentReport {
    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "配置加载失败，使用默认配置");
        AppConfig::default()
    });
    create_dispatcher(&cfg).run(task, options).await
}
