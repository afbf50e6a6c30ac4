//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `AGENT__*` 覆盖（双下划线表示嵌套，如 `AGENT__AGENT__TOOL_TIMEOUT_MS=500`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub agent: AgentSection,
    pub state: StateSection,
    pub logs: LogsSection,
}

/// [agent] 段：单次工具调用超时、充分性阈值、补救工具
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSection {
    pub tool_timeout_ms: u64,
    pub sufficiency_threshold: f64,
    pub supplement_tool: String,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            tool_timeout_ms: 3000,
            sufficiency_threshold: crate::react::reflection::DEFAULT_SUFFICIENCY_THRESHOLD,
            supplement_tool: crate::tools::TECH.to_string(),
        }
    }
}

/// 长期状态后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StateBackend {
    /// 不启用长期状态
    #[default]
    None,
    /// 单个 JSON 文件
    File,
    Sqlite,
}

/// [state] 段：长期状态后端与路径
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StateSection {
    pub backend: StateBackend,
    pub path: Option<PathBuf>,
}

/// [logs] 段：决策日志与指标目录
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogsSection {
    pub enabled: bool,
    pub dir: PathBuf,
}

impl Default for LogsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from("logs"),
        }
    }
}

/// 从 config 目录加载配置，环境变量 AGENT__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 AGENT__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("AGENT")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
