//! SQLite 持久化状态
//!
//! 单表 `tool_state(key PRIMARY KEY, record JSON)`；每次 set 一条 upsert，返回即已提交。

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::{AgentError, ToolRecord};
use crate::memory::PersistentState;

pub struct SqliteState {
    conn: Mutex<Connection>,
}

impl SqliteState {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AgentError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, AgentError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, AgentError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tool_state (
                key TEXT PRIMARY KEY,
                record TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, AgentError> {
        self.conn
            .lock()
            .map_err(|e| AgentError::StateBackend(e.to_string()))
    }
}

impl PersistentState for SqliteState {
    fn get(&self, key: &str) -> Result<Option<ToolRecord>, AgentError> {
        let conn = self.lock()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT record FROM tool_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, record: &ToolRecord) -> Result<(), AgentError> {
        let json = serde_json::to_string(record)?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO tool_state (key, record, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET record = excluded.record, updated_at = excluded.updated_at",
            params![key, json, chrono::Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    fn all(&self) -> Result<HashMap<String, ToolRecord>, AgentError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key, record FROM tool_state")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        let mut out = HashMap::new();
        for row in rows {
            let (key, json) = row?;
            out.insert(key, serde_json::from_str(&json)?);
        }
        Ok(out)
    }
}
