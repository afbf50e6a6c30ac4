//! 控制循环集成测试：缓存短路、并发与超时、补救、持久化与日志

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agent_learning::core::{ToolRecord, ToolStatus};
use agent_learning::memory::{FileState, InMemoryState, PersistentState};
use agent_learning::observability::FileLogSink;
use agent_learning::react::{CacheTier, DecisionKind, Dispatcher, Planner, RuleBasedPlanner, RunOptions};
use agent_learning::tools::{default_registry, KnowledgeTool, ToolExecutor, ToolRegistry};
use async_trait::async_trait;
use tempfile::TempDir;

/// 测试用工具：固定回复、可选延迟、统计调用次数
struct FakeTool {
    category: &'static str,
    reply: Result<ToolRecord, String>,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeTool {
    fn new(category: &'static str, reply: Result<ToolRecord, String>) -> Arc<Self> {
        Arc::new(Self {
            category,
            reply,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn slow(category: &'static str, reply: Result<ToolRecord, String>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            category,
            reply,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KnowledgeTool for FakeTool {
    fn category(&self) -> &str {
        self.category
    }

    fn description(&self) -> &str {
        "fake"
    }

    async fn query(&self, _query: &str) -> Result<ToolRecord, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.reply.clone()
    }
}

fn planner(steps: &[&str]) -> Arc<dyn Planner> {
    Arc::new(RuleBasedPlanner::with_steps(
        steps.iter().map(|s| s.to_string()).collect(),
    ))
}

fn dispatcher(planner: Arc<dyn Planner>, registry: ToolRegistry, timeout: Duration) -> Dispatcher {
    Dispatcher::new(planner, ToolExecutor::new(registry, timeout))
}

fn registry_with(tools: &[Arc<FakeTool>]) -> ToolRegistry {
    let mut registry = default_registry();
    for tool in tools {
        registry.register_arc(tool.clone());
    }
    registry
}

#[tokio::test]
async fn test_successful_run_with_default_tools() {
    let d = dispatcher(
        Arc::new(RuleBasedPlanner::new()),
        default_registry(),
        Duration::from_secs(3),
    );
    let report = d.run("测试正常运行", RunOptions::new()).await;

    assert!(report.to_string().contains("任务完成"));
    assert_eq!(report.metrics.completed_steps, 4);
    assert_eq!(report.metrics.supplement_attempts, 0);
    // 第二步 [tech, general]：tech 置信度更高
    assert!(report
        .final_result
        .contains("【技术知识】关于 测试正常运行 的技术原理说明"));
    assert_eq!(report.final_result.lines().count(), 4);
}

#[tokio::test]
async fn test_all_cached_step_picks_highest_confidence() {
    let tech = FakeTool::new("tech", Ok(ToolRecord::ok("tech", 0.9, "不应调用")));
    let general = FakeTool::new("general", Ok(ToolRecord::ok("general", 0.9, "不应调用")));

    let step = "分析相关技术原理";
    let mut initial = HashMap::new();
    initial.insert(format!("{step}:tech"), ToolRecord::ok("tech", 0.75, "技术缓存"));
    initial.insert(format!("{step}:general"), ToolRecord::ok("general", 0.8, "通用缓存"));

    let d = dispatcher(
        planner(&[step]),
        registry_with(&[tech.clone(), general.clone()]),
        Duration::from_secs(1),
    );
    let report = d
        .run("q", RunOptions::new().with_initial_state(initial))
        .await;

    assert_eq!(report.final_result, "通用缓存\n");
    assert_eq!(tech.calls(), 0);
    assert_eq!(general.calls(), 0);
    assert!(report.has_action(step, "use_cache_best"));
}

#[tokio::test]
async fn test_all_cached_tie_keeps_first_candidate() {
    let step = "分析相关技术原理";
    let mut initial = HashMap::new();
    initial.insert(format!("{step}:tech"), ToolRecord::ok("tech", 0.8, "先出现"));
    initial.insert(format!("{step}:general"), ToolRecord::ok("general", 0.8, "后出现"));

    let d = dispatcher(planner(&[step]), default_registry(), Duration::from_secs(1));
    let report = d
        .run("q", RunOptions::new().with_initial_state(initial))
        .await;
    assert_eq!(report.final_result, "先出现\n");
}

#[tokio::test]
async fn test_cache_scenario_never_invokes_general_for_that_step() {
    let mut initial = HashMap::new();
    initial.insert(
        "理解问题的通用背景:general".to_string(),
        ToolRecord::ok("general", 0.9, "缓存内容"),
    );

    let d = dispatcher(
        Arc::new(RuleBasedPlanner::new()),
        default_registry(),
        Duration::from_secs(3),
    );
    let report = d
        .run("测试缓存", RunOptions::new().with_initial_state(initial))
        .await;

    assert!(report.to_string().contains("缓存内容"));
    let step = "理解问题的通用背景";
    assert!(report.has_action(step, "cache_hit"));
    assert!(!report.has_action(step, "dispatch"));
}

#[tokio::test]
async fn test_seeded_cache_blocks_invocation() {
    let general = FakeTool::new("general", Ok(ToolRecord::ok("general", 0.9, "不应该被调用")));
    let mut initial = HashMap::new();
    initial.insert(
        "理解问题的通用背景:general".to_string(),
        ToolRecord::ok("general", 0.9, "缓存内容"),
    );

    let d = dispatcher(
        planner(&["理解问题的通用背景"]),
        registry_with(&[general.clone()]),
        Duration::from_secs(1),
    );
    let report = d
        .run("测试缓存", RunOptions::new().with_initial_state(initial))
        .await;

    assert_eq!(general.calls(), 0);
    assert_eq!(report.final_result, "缓存内容\n");
}

#[tokio::test]
async fn test_persistent_tier_is_read_before_run_tier() {
    let step = "理解问题的通用背景";
    let key = format!("{step}:general");
    let general = FakeTool::new("general", Ok(ToolRecord::ok("general", 0.9, "不应调用")));

    let store = Arc::new(InMemoryState::new());
    store.set(&key, &ToolRecord::ok("general", 0.9, "持久")).unwrap();
    let mut initial = HashMap::new();
    initial.insert(key, ToolRecord::ok("general", 0.95, "短期"));

    let d = dispatcher(planner(&[step]), registry_with(&[general.clone()]), Duration::from_secs(1));
    let report = d
        .run(
            "q",
            RunOptions::new()
                .with_initial_state(initial)
                .with_persistent_state(store),
        )
        .await;

    assert_eq!(report.final_result, "持久\n");
    assert_eq!(general.calls(), 0);
    let tiers: Vec<&CacheTier> = report
        .decisions
        .iter()
        .filter_map(|e| match &e.kind {
            DecisionKind::CacheHit { tier, .. } => Some(tier),
            _ => None,
        })
        .collect();
    assert_eq!(tiers.len(), 1);
    assert!(matches!(tiers[0], CacheTier::Persistent));
}

#[tokio::test]
async fn test_low_confidence_triggers_one_supplement() {
    let general = FakeTool::new("general", Ok(ToolRecord::ok("general", 0.1, "低置信通用内容")));
    let tech = FakeTool::new("tech", Ok(ToolRecord::ok("tech", 0.9, "技术相关内容")));

    let d = dispatcher(
        planner(&["理解问题的通用背景"]),
        registry_with(&[general.clone(), tech.clone()]),
        Duration::from_secs(1),
    );
    let report = d.run("测试低置信触发补救", RunOptions::new()).await;

    assert_eq!(report.final_result, "低置信通用内容\n技术相关内容\n");
    assert_eq!(tech.calls(), 1);
    assert!(report.has_action("理解问题的通用背景", "supplement"));
    assert!(report.has_action("理解问题的通用背景", "supplement_done"));
    assert_eq!(report.metrics.supplement_rate, 1.0);
}

#[tokio::test]
async fn test_low_confidence_general_full_plan() {
    let general = FakeTool::new("general", Ok(ToolRecord::ok("general", 0.1, "低置信通用内容")));
    let d = dispatcher(
        Arc::new(RuleBasedPlanner::new()),
        registry_with(&[general]),
        Duration::from_secs(3),
    );
    let report = d.run("测试低置信触发补救", RunOptions::new()).await;

    assert!(report.final_result.contains("【技术知识】"));
    assert!(report.has_action("理解问题的通用背景", "supplement"));
    // 技术步骤中 tech 胜出，不需要补救
    assert!(!report.has_action("分析相关技术原理", "supplement"));
}

#[tokio::test]
async fn test_timeout_does_not_block_run_or_siblings() {
    let tech = FakeTool::slow(
        "tech",
        Ok(ToolRecord::ok("tech", 0.95, "晚到的内容")),
        Duration::from_millis(500),
    );
    let general = FakeTool::new("general", Ok(ToolRecord::ok("general", 0.7, "按时的内容")));

    let step = "分析相关技术原理";
    let d = dispatcher(
        planner(&[step]),
        registry_with(&[tech.clone(), general.clone()]),
        Duration::from_millis(100),
    );
    let report = d.run("测试超时", RunOptions::new()).await;

    assert_eq!(report.final_result, "按时的内容\n");
    assert!(!report.final_result.contains("晚到的内容"));
    assert_eq!(report.metrics.timeouts, 1);
    assert!(report.decisions.iter().any(|e| matches!(
        &e.kind,
        DecisionKind::Dispatch { tool, status: ToolStatus::Timeout, confidence, .. }
            if tool == "tech" && *confidence == 0.0
    )));
    assert_eq!(report.metrics.completed_steps, 1);
}

#[tokio::test(start_paused = true)]
async fn test_cache_misses_run_concurrently() {
    let project = FakeTool::slow(
        "project",
        Ok(ToolRecord::ok("project", 0.8, "工程")),
        Duration::from_millis(300),
    );
    let tech = FakeTool::slow(
        "tech",
        Ok(ToolRecord::ok("tech", 0.7, "技术")),
        Duration::from_millis(300),
    );

    let d = dispatcher(
        planner(&["结合工程项目实践"]),
        registry_with(&[project.clone(), tech.clone()]),
        Duration::from_secs(2),
    );
    let start = tokio::time::Instant::now();
    let report = d.run("q", RunOptions::new()).await;

    // 两次 300ms 调用并发执行，串行则至少 600ms
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(300));
    assert!(elapsed < Duration::from_millis(600));
    assert_eq!(project.calls(), 1);
    assert_eq!(tech.calls(), 1);
    assert_eq!(report.final_result, "工程\n");
}

#[tokio::test]
async fn test_persistent_state_prevents_second_call() {
    let dir = TempDir::new().unwrap();
    let state_file = dir.path().join("persist_state.json");
    let steps = ["理解问题的通用背景", "整理并输出最终答案"];

    let store: Arc<dyn PersistentState> = Arc::new(FileState::open(&state_file).unwrap());
    let first = dispatcher(planner(&steps), default_registry(), Duration::from_secs(1));
    let result1 = first
        .run("持久化测试", RunOptions::new().with_persistent_state(store))
        .await;
    assert!(state_file.exists());

    let bad = FakeTool::new("general", Err("should not be called".to_string()));
    let reopened: Arc<dyn PersistentState> = Arc::new(FileState::open(&state_file).unwrap());
    let second = dispatcher(planner(&steps), registry_with(&[bad.clone()]), Duration::from_secs(1));
    let result2 = second
        .run("持久化测试", RunOptions::new().with_persistent_state(reopened))
        .await;

    assert_eq!(bad.calls(), 0);
    assert_eq!(result1.final_result, result2.final_result);
    assert!(result2.has_action("理解问题的通用背景", "cache_hit"));
    assert!(result2.to_string().contains("任务完成"));
}

#[tokio::test]
async fn test_only_new_max_records_are_persisted() {
    // [tech, general] 中 tech 先到且更高，general 不写入长期状态，下次 run 仍会调用 general
    let dir = TempDir::new().unwrap();
    let state_file = dir.path().join("state.json");
    let step = "分析相关技术原理";

    let store: Arc<dyn PersistentState> = Arc::new(FileState::open(&state_file).unwrap());
    dispatcher(planner(&[step]), default_registry(), Duration::from_secs(1))
        .run("q", RunOptions::new().with_persistent_state(store.clone()))
        .await;

    let saved = store.all().unwrap();
    assert!(saved.contains_key(&format!("{step}:tech")));
    assert!(!saved.contains_key(&format!("{step}:general")));

    let general = FakeTool::new("general", Ok(ToolRecord::ok("general", 0.7, "通用")));
    let report = dispatcher(planner(&[step]), registry_with(&[general.clone()]), Duration::from_secs(1))
        .run("q", RunOptions::new().with_persistent_state(store))
        .await;
    assert_eq!(general.calls(), 1);
    assert!(report.final_result.contains("【技术知识】"));
}

#[tokio::test]
async fn test_decision_log_and_metrics_written() {
    let dir = TempDir::new().unwrap();
    let logs = dir.path().join("logs");
    let d = dispatcher(
        Arc::new(RuleBasedPlanner::new()),
        default_registry(),
        Duration::from_secs(3),
    )
    .with_sink(Arc::new(FileLogSink::new(&logs)));

    let report = d.run("测试日志与指标", RunOptions::new()).await;
    let text = report.to_string();
    assert!(text.contains(&format!("【trace_id】 {}", report.trace_id)));

    let decision_path = logs.join(format!("decision_{}.json", report.trace_id));
    let metrics_path = logs.join(format!("metrics_{}.json", report.trace_id));
    assert!(decision_path.exists());
    assert!(metrics_path.exists());

    let dec: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&decision_path).unwrap()).unwrap();
    let met: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&metrics_path).unwrap()).unwrap();
    let entries = dec.as_array().unwrap();
    assert_eq!(entries.len(), report.decisions.len());
    assert!(entries.iter().all(|e| e["trace_id"] == report.trace_id.as_str()));
    assert_eq!(entries[0]["action"], "decide");
    assert_eq!(met["trace_id"], report.trace_id.as_str());
    assert!(met.get("supplement_rate").is_some());
    assert!(met.get("timeout_rate").is_some());
}

#[tokio::test]
async fn test_log_sink_failure_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "x").unwrap();

    let d = dispatcher(planner(&["理解问题的通用背景"]), default_registry(), Duration::from_secs(1))
        .with_sink(Arc::new(FileLogSink::new(blocker.join("logs"))));
    let report = d.run("q", RunOptions::new()).await;

    assert!(report.decision_log_path.is_none());
    assert!(report.metrics_path.is_none());
    assert!(report.final_result.contains("【通用知识】"));
    assert!(report.to_string().contains("【决策日志】 unavailable"));
}
