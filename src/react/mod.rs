//! 认知层：Planner、候选选择、控制循环、反思补救与决策事件

pub mod events;
pub mod loop_;
pub mod planner;
pub mod reflection;
pub mod report;
pub mod selector;

pub use events::{CacheTier, DecisionEntry, DecisionKind};
pub use loop_::{DispatchSettings, Dispatcher, RunOptions};
pub use planner::{Planner, RuleBasedPlanner};
pub use reflection::need_more_info;
pub use report::AgentReport;
pub use selector::choose_candidate_tools;
