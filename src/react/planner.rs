//! Planner：把任务拆成有序步骤
//!
//! 只负责「把任务拆清楚」：不调用工具，不关心执行方式。

/// 规划能力：同步、无副作用
pub trait Planner: Send + Sync {
    fn plan(&self, task: &str) -> Vec<String>;
}

/// 固定规则的 Planner：不论任务内容都返回同一组步骤
#[derive(Debug, Clone)]
pub struct RuleBasedPlanner {
    steps: Vec<String>,
}

/// 默认步骤；第二、三步分别命中「技术」与「工程/项目」关键词
pub const DEFAULT_STEPS: [&str; 4] = [
    "理解问题的通用背景",
    "分析相关技术原理",
    "结合工程项目实践",
    "整理并输出最终答案",
];

impl RuleBasedPlanner {
    pub fn new() -> Self {
        Self::with_steps(DEFAULT_STEPS.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_steps(steps: Vec<String>) -> Self {
        Self { steps }
    }
}

impl Default for RuleBasedPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner for RuleBasedPlanner {
    fn plan(&self, task: &str) -> Vec<String> {
        tracing::info!(task, steps = self.steps.len(), "Planner 正在拆解任务");
        self.steps.clone()
    }
}
