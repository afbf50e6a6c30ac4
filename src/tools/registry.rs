//! 工具注册表
//!
//! 所有知识工具实现 KnowledgeTool trait（category / description / query），由 ToolRegistry 按类别注册与查找，
//! ToolExecutor 在调用时加超时并统一转为 ToolOutcome。注册表在构造 Dispatcher 时显式传入，没有全局单例。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::ToolRecord;

/// 知识工具 trait：类别名、描述、异步查询（query 为任务文本）
#[async_trait]
pub trait KnowledgeTool: Send + Sync {
    /// 工具类别（如 "general" / "tech" / "project"），也是注册表中的键
    fn category(&self) -> &str;

    fn description(&self) -> &str;

    /// 执行查询；Err 表示工具内部失败
    async fn query(&self, query: &str) -> Result<ToolRecord, String>;
}

/// 工具注册表：按类别存储 Arc<dyn KnowledgeTool>
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn KnowledgeTool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl KnowledgeTool + 'static) {
        self.register_arc(Arc::new(tool));
    }

    /// 注册已共享的工具实例（测试中可保留句柄以检查调用次数）；同类别后注册者覆盖先注册者
    pub fn register_arc(&mut self, tool: Arc<dyn KnowledgeTool>) {
        let category = tool.category().to_string();
        self.tools.insert(category, tool);
    }

    pub fn get(&self, category: &str) -> Option<Arc<dyn KnowledgeTool>> {
        self.tools.get(category).cloned()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.tools.contains_key(category)
    }
}
