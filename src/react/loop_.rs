//! Agent 控制循环
//!
//! 每个 step 依次经历：Decision（选候选工具）→ State Read（长期 → 短期缓存）→ Execution（未命中的工具并发调用，
//! 各自超时）→ Evaluation（择优并写回状态）→ Reflection（置信度不足时补救一次）。
//! step 之间严格串行；任何单个工具或单个 step 的失败都只降级为「该步无内容」，不会中止 run。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use uuid::Uuid;

use crate::core::record::cache_key;
use crate::core::{ToolRecord, ToolStatus};
use crate::memory::{PersistentState, RunState};
use crate::observability::{DecisionRecorder, LogSink, RunMetrics};
use crate::react::reflection::{need_more_info, supplement, SupplementResult};
use crate::react::selector::{best_ok, choose_candidate_tools};
use crate::react::{AgentReport, CacheTier, DecisionKind, Planner};
use crate::tools::{ToolExecutor, ToolOutcome, TECH};

/// 控制循环的策略参数
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// 置信度低于该值时触发补救
    pub sufficiency_threshold: f64,
    /// 补救固定调用的工具类别
    pub supplement_tool: String,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            sufficiency_threshold: crate::react::reflection::DEFAULT_SUFFICIENCY_THRESHOLD,
            supplement_tool: TECH.to_string(),
        }
    }
}

/// 单次 run 的输入状态
#[derive(Clone, Default)]
pub struct RunOptions {
    /// 短期状态的初始内容（复制后使用）
    pub initial_state: HashMap<String, ToolRecord>,
    /// 跨 run 的长期状态
    pub persistent_state: Option<Arc<dyn PersistentState>>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_state(mut self, initial: HashMap<String, ToolRecord>) -> Self {
        self.initial_state = initial;
        self
    }

    pub fn with_persistent_state(mut self, state: Arc<dyn PersistentState>) -> Self {
        self.persistent_state = Some(state);
        self
    }
}

/// 一次 run 内可变的上下文
struct RunContext<'a> {
    task: &'a str,
    run_state: RunState,
    persistent: Option<Arc<dyn PersistentState>>,
    recorder: DecisionRecorder,
    final_result: String,
}

impl RunContext<'_> {
    fn append(&mut self, content: &str) {
        self.final_result.push_str(content);
        self.final_result.push('\n');
    }
}

/// 步骤调度器：持有 Planner、工具执行器与日志落盘，构造时显式注入
pub struct Dispatcher {
    planner: Arc<dyn Planner>,
    executor: ToolExecutor,
    sink: Option<Arc<dyn LogSink>>,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(planner: Arc<dyn Planner>, executor: ToolExecutor) -> Self {
        Self {
            planner,
            executor,
            sink: None,
            settings: DispatchSettings::default(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_settings(mut self, settings: DispatchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// 执行一个任务：规划 → 逐步调度 → 汇总指标 → 落盘日志
    pub async fn run(&self, task: &str, options: RunOptions) -> AgentReport {
        let trace_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        tracing::info!(trace_id = %trace_id, task, "Agent 接收到任务");

        let steps = self.planner.plan(task);

        let mut ctx = RunContext {
            task,
            run_state: RunState::seeded(&options.initial_state),
            persistent: options.persistent_state,
            recorder: DecisionRecorder::new(trace_id.clone()),
            final_result: String::new(),
        };

        for (step_index, step) in steps.iter().enumerate() {
            self.run_step(&mut ctx, step_index, step).await;
        }

        let RunContext {
            recorder,
            final_result,
            ..
        } = ctx;
        let decisions = recorder.into_entries();
        let metrics = RunMetrics::from_log(&trace_id, &decisions);

        let locations = match &self.sink {
            Some(sink) => match sink.write(&trace_id, &decisions, &metrics) {
                Ok(loc) => Some(loc),
                Err(e) => {
                    tracing::warn!(trace_id = %trace_id, error = %e, "决策日志写入失败");
                    None
                }
            },
            None => None,
        };

        let elapsed = start.elapsed();
        tracing::info!(
            trace_id = %trace_id,
            elapsed_ms = elapsed.as_millis() as u64,
            completed_steps = metrics.completed_steps,
            "Agent 任务完成"
        );

        AgentReport {
            task: task.to_string(),
            trace_id,
            elapsed,
            decision_log_path: locations.as_ref().map(|l| l.decision_log.clone()),
            metrics_path: locations.map(|l| l.metrics),
            final_result,
            decisions,
            metrics,
        }
    }

    async fn run_step(&self, ctx: &mut RunContext<'_>, step_index: usize, step: &str) {
        let step_start = Instant::now();
        tracing::info!(step_index, step, "执行步骤");
        tokio::task::yield_now().await;

        // Decision：只读 step，产出候选类别
        let candidates = choose_candidate_tools(step);
        ctx.recorder.record(
            step_index,
            step,
            DecisionKind::Decide {
                candidate_tools: candidates.iter().map(|c| c.to_string()).collect(),
            },
        );

        // State Read：长期状态优先于短期状态，命中即不调用
        let mut cached: Vec<(&str, ToolRecord)> = Vec::new();
        let mut scheduled: Vec<&str> = Vec::new();
        for category in candidates {
            let key = cache_key(step, category);

            if let Some(rec) = lookup_persistent(ctx.persistent.as_deref(), &key) {
                cached.push((category, rec));
                ctx.recorder.record(
                    step_index,
                    step,
                    DecisionKind::CacheHit {
                        tool: category.to_string(),
                        tier: CacheTier::Persistent,
                    },
                );
                continue;
            }

            if let Some(rec) = ctx.run_state.get(&key).cloned() {
                cached.push((category, rec));
                ctx.recorder.record(
                    step_index,
                    step,
                    DecisionKind::CacheHit {
                        tool: category.to_string(),
                        tier: CacheTier::Run,
                    },
                );
                continue;
            }

            if self.executor.has_tool(category) {
                scheduled.push(category);
            }
        }

        if scheduled.is_empty() && cached.is_empty() {
            ctx.recorder.record(
                step_index,
                step,
                DecisionKind::NoTools {
                    message: "未找到可用工具，跳过".to_string(),
                },
            );
            return;
        }

        // Fast Path：全部命中缓存，无需并发调用
        if scheduled.is_empty() {
            let Some(best) = best_ok(cached.iter().map(|(_, rec)| rec)).cloned() else {
                ctx.recorder
                    .record(step_index, step, DecisionKind::NoValidResult);
                return;
            };
            ctx.recorder.record(
                step_index,
                step,
                DecisionKind::UseCacheBest {
                    best_confidence: best.confidence,
                },
            );
            self.finish_step(ctx, step_index, step, &best, step_start)
                .await;
            return;
        }

        // Execution：未命中的候选并发调用，各自超时，互不取消
        let task = ctx.task;
        let outcomes = join_all(
            scheduled
                .iter()
                .map(|category| self.executor.invoke(category, task)),
        )
        .await;

        let evaluated: Vec<(&str, ToolOutcome)> = scheduled
            .iter()
            .copied()
            .zip(outcomes)
            .chain(
                cached
                    .into_iter()
                    .map(|(category, rec)| (category, ToolOutcome::Success(rec))),
            )
            .collect();

        match self.resolve(ctx, step_index, step, evaluated) {
            Some(best) => {
                self.finish_step(ctx, step_index, step, &best, step_start)
                    .await;
            }
            None => {
                ctx.recorder
                    .record(step_index, step, DecisionKind::NoValidResult);
            }
        }
    }

    /// Evaluation：逐条记录结果，按置信度严格递增择优；每出现一个新的最大值就立即写回两级状态
    fn resolve(
        &self,
        ctx: &mut RunContext<'_>,
        step_index: usize,
        step: &str,
        evaluated: Vec<(&str, ToolOutcome)>,
    ) -> Option<ToolRecord> {
        let mut best: Option<ToolRecord> = None;
        let mut best_confidence = -1.0_f64;

        for (category, outcome) in evaluated {
            let rec = match outcome {
                ToolOutcome::Timeout => {
                    ctx.recorder.record(
                        step_index,
                        step,
                        DecisionKind::Dispatch {
                            tool: category.to_string(),
                            status: ToolStatus::Timeout,
                            confidence: 0.0,
                            message: None,
                        },
                    );
                    continue;
                }
                ToolOutcome::Error(e) => {
                    ctx.recorder.record(
                        step_index,
                        step,
                        DecisionKind::Dispatch {
                            tool: category.to_string(),
                            status: ToolStatus::Error,
                            confidence: 0.0,
                            message: Some(e),
                        },
                    );
                    continue;
                }
                ToolOutcome::Success(rec) => rec,
            };

            ctx.recorder.record(
                step_index,
                step,
                DecisionKind::Dispatch {
                    tool: category.to_string(),
                    status: rec.status,
                    confidence: rec.confidence,
                    message: None,
                },
            );

            if rec.is_ok() && rec.confidence > best_confidence {
                best_confidence = rec.confidence;
                // State Update：键取结果声明的类别，而非候选槽位
                let key = cache_key(step, &rec.kind);
                ctx.run_state.insert(key.clone(), rec.clone());
                if let Some(persistent) = ctx.persistent.as_deref() {
                    if let Err(e) = persistent.set(&key, &rec) {
                        tracing::warn!(key = %key, error = %e, "持久化状态写入失败");
                    }
                }
                best = Some(rec);
            }
        }

        ctx.recorder.record(
            step_index,
            step,
            DecisionKind::ChooseBest { best_confidence },
        );
        best
    }

    /// 写入最优内容，必要时补救一次，然后记录 step 完成
    async fn finish_step(
        &self,
        ctx: &mut RunContext<'_>,
        step_index: usize,
        step: &str,
        best: &ToolRecord,
        step_start: Instant,
    ) {
        ctx.append(&best.content);

        if need_more_info(best, self.settings.sufficiency_threshold) {
            let tool = self.settings.supplement_tool.clone();
            ctx.recorder.record(
                step_index,
                step,
                DecisionKind::Supplement { tool: tool.clone() },
            );
            match supplement(&self.executor, &tool, ctx.task).await {
                SupplementResult::Done(rec) => {
                    ctx.append(&rec.content);
                    ctx.recorder.record(
                        step_index,
                        step,
                        DecisionKind::SupplementDone {
                            tool,
                            confidence: rec.confidence,
                        },
                    );
                }
                SupplementResult::Failed(message) => {
                    ctx.recorder.record(
                        step_index,
                        step,
                        DecisionKind::SupplementError { tool, message },
                    );
                }
            }
        }

        ctx.recorder.record(
            step_index,
            step,
            DecisionKind::StepComplete {
                duration_ms: duration_ms(step_start.elapsed()),
            },
        );
    }
}

/// 读长期状态；读失败按未命中处理
fn lookup_persistent(state: Option<&dyn PersistentState>, key: &str) -> Option<ToolRecord> {
    let state = state?;
    match state.get(key) {
        Ok(rec) => rec,
        Err(e) => {
            tracing::warn!(key, error = %e, "持久化状态读取失败，按未命中处理");
            None
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    d.as_millis() as u64
}
