//! 候选工具选择与置信度择优
//!
//! choose_candidate_tools：按步骤文本的关键词（区分大小写的子串匹配）给出候选类别，顺序不代表优先级。
//! best_ok：在一组记录中选出 status=ok 且置信度严格最大的一条（并列时取先出现者）。

use crate::core::ToolRecord;
use crate::tools::{GENERAL, PROJECT, TECH};

const TECH_KEYWORDS: [&str; 1] = ["技术"];
const PROJECT_KEYWORDS: [&str; 2] = ["工程", "项目"];

pub fn choose_candidate_tools(step: &str) -> Vec<&'static str> {
    if TECH_KEYWORDS.iter().any(|k| step.contains(k)) {
        vec![TECH, GENERAL]
    } else if PROJECT_KEYWORDS.iter().any(|k| step.contains(k)) {
        vec![PROJECT, TECH]
    } else {
        vec![GENERAL]
    }
}

pub fn best_ok<'a>(records: impl IntoIterator<Item = &'a ToolRecord>) -> Option<&'a ToolRecord> {
    let mut best: Option<&ToolRecord> = None;
    let mut best_confidence = f64::NEG_INFINITY;
    for rec in records {
        if rec.is_ok() && rec.confidence > best_confidence {
            best_confidence = rec.confidence;
            best = Some(rec);
        }
    }
    best
}
