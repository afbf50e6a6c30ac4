//! 状态层：短期（本次 run 内存态）与长期（跨 run 持久化）两级缓存

pub mod file_state;
pub mod persistent;
pub mod run_state;
pub mod sqlite_state;

pub use file_state::FileState;
pub use persistent::{InMemoryState, PersistentState};
pub use run_state::RunState;
pub use sqlite_state::SqliteState;
