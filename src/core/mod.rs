//! 核心层：错误类型与 Result Record 数据模型

pub mod error;
pub mod record;

pub use error::AgentError;
pub use record::{ToolRecord, ToolStatus};
