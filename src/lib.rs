//! agent-learning - 智能体控制循环
//!
//! 模块划分：
//! - **agent**: 无头运行时（按配置构建调度器、打开长期状态、执行任务）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型与 Result Record 数据模型
//! - **memory**: 两级状态（本次 run 内存态 / 跨 run 持久化：JSON 文件、SQLite、内存）
//! - **observability**: tracing 初始化、决策记录、运行指标、日志落盘
//! - **react**: Planner、候选选择、控制循环、反思补救
//! - **tools**: 知识工具、注册表与带超时的执行器

pub mod agent;
pub mod config;
pub mod core;
pub mod memory;
pub mod observability;
pub mod react;
pub mod tools;

pub use agent::{create_dispatcher, open_persistent_state, run_agent};
pub use react::{AgentReport, Dispatcher, RunOptions};
