pub mod executor;
pub mod knowledge;
pub mod registry;

pub use executor::{ToolExecutor, ToolOutcome};
pub use knowledge::{GeneralKnowledgeTool, ProjectKnowledgeTool, TechKnowledgeTool, GENERAL, PROJECT, TECH};
pub use registry::{KnowledgeTool, ToolRegistry};

/// 默认注册表：general / tech / project 三个演示工具
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(GeneralKnowledgeTool);
    registry.register(TechKnowledgeTool);
    registry.register(ProjectKnowledgeTool);
    registry
}
