//! 知识查询工具（演示用）
//!
//! 三个类别各返回一段固定格式的内容：通用知识、技术原理、工程实践。

use async_trait::async_trait;

use crate::core::ToolRecord;
use crate::tools::KnowledgeTool;

pub const GENERAL: &str = "general";
pub const TECH: &str = "tech";
pub const PROJECT: &str = "project";

/// 通用知识：背景性解释
pub struct GeneralKnowledgeTool;

#[async_trait]
impl KnowledgeTool for GeneralKnowledgeTool {
    fn category(&self) -> &str {
        GENERAL
    }

    fn description(&self) -> &str {
        "查询通用知识（基础解释）"
    }

    async fn query(&self, query: &str) -> Result<ToolRecord, String> {
        tracing::debug!(query, "查询通用知识");
        Ok(ToolRecord::ok(
            GENERAL,
            0.7,
            format!("【通用知识】关于 {query} 的基础解释"),
        ))
    }
}

/// 技术知识：原理说明，也是反思补救时固定调用的类别
pub struct TechKnowledgeTool;

#[async_trait]
impl KnowledgeTool for TechKnowledgeTool {
    fn category(&self) -> &str {
        TECH
    }

    fn description(&self) -> &str {
        "查询技术知识（原理说明）"
    }

    async fn query(&self, query: &str) -> Result<ToolRecord, String> {
        tracing::debug!(query, "查询技术知识");
        Ok(ToolRecord::ok(
            TECH,
            0.85,
            format!("【技术知识】关于 {query} 的技术原理说明"),
        ))
    }
}

/// 工程知识：项目实践经验
pub struct ProjectKnowledgeTool;

#[async_trait]
impl KnowledgeTool for ProjectKnowledgeTool {
    fn category(&self) -> &str {
        PROJECT
    }

    fn description(&self) -> &str {
        "查询工程知识（项目实践经验）"
    }

    async fn query(&self, query: &str) -> Result<ToolRecord, String> {
        tracing::debug!(query, "查询工程知识");
        Ok(ToolRecord::ok(
            PROJECT,
            0.8,
            format!("【工程知识】关于 {query} 的项目实践经验"),
        ))
    }
}
