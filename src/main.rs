//! agent-learning 命令行入口
//!
//! 初始化日志、加载配置，对每个任务并发跑一次控制循环（各自独立的 trace 与短期状态，共享长期状态），
//! 全部完成后依次打印结果。

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use futures_util::future::join_all;

use agent_learning::config::{load_config, StateBackend};
use agent_learning::{create_dispatcher, observability, open_persistent_state, RunOptions};

const DEFAULT_TASKS: [&str; 3] = ["解释什么是 Agent", "解释什么是 async", "解释什么是 asyncio"];

#[derive(Debug, Parser)]
#[command(name = "agent-learning", about = "Planner 拆解 + 工具并发调用 + 缓存复用 + 反思补救")]
struct Cli {
    /// 要执行的任务；为空时运行三个示例任务
    tasks: Vec<String>,

    /// 额外的配置文件（覆盖 config/default.toml）
    #[arg(long, env = "AGENT_CONFIG")]
    config: Option<PathBuf>,

    /// 长期状态后端
    #[arg(long, value_enum)]
    state_backend: Option<StateBackend>,

    /// 长期状态路径
    #[arg(long)]
    state_path: Option<PathBuf>,

    /// 决策日志与指标目录
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// 单次工具调用超时（毫秒）
    #[arg(long)]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cli = Cli::parse();
    let mut cfg = load_config(cli.config.clone()).context("Failed to load config")?;
    if let Some(backend) = cli.state_backend {
        cfg.state.backend = backend;
    }
    if let Some(path) = cli.state_path {
        if cfg.state.backend == StateBackend::None {
            cfg.state.backend = StateBackend::File;
        }
        cfg.state.path = Some(path);
    }
    if let Some(dir) = cli.log_dir {
        cfg.logs.dir = dir;
    }
    if let Some(ms) = cli.timeout_ms {
        cfg.agent.tool_timeout_ms = ms;
    }

    let persistent = open_persistent_state(&cfg).context("Failed to open persistent state")?;
    let dispatcher = create_dispatcher(&cfg);

    let tasks: Vec<String> = if cli.tasks.is_empty() {
        DEFAULT_TASKS.iter().map(|t| t.to_string()).collect()
    } else {
        cli.tasks
    };

    let runs = tasks.iter().map(|task| {
        let mut options = RunOptions::new();
        if let Some(state) = &persistent {
            options = options.with_persistent_state(state.clone());
        }
        dispatcher.run(task, options)
    });
    let reports = join_all(runs).await;

    println!("\n=== 所有任务完成 ===");
    for report in reports {
        println!("{report}");
    }

    Ok(())
}
