use crate::domain::action_log::ActionLog;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 时间戳存储格式
const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// ActionLogRepository - 操作日志仓储
// ==========================================
// 红线: 所有写入必须记录; 日志只追加, 不更新
pub struct ActionLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActionLogRepository {
    /// 创建新的ActionLogRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入操作日志
    pub fn insert(&self, log: &ActionLog) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO action_log (
                action_id, piece_id, action_type, action_ts,
                actor, payload_json, detail
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &log.action_id,
                &log.piece_id,
                &log.action_type,
                &log.action_ts.format(TS_FORMAT).to_string(),
                &log.actor,
                &log.payload_json.as_ref().map(|v| v.to_string()),
                &log.detail,
            ],
        )?;

        Ok(log.action_id.clone())
    }

    /// 查询最近的操作日志
    pub fn list_recent(&self, limit: i64) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT action_id, piece_id, action_type, action_ts,
                      actor, payload_json, detail
               FROM action_log
               ORDER BY action_ts DESC, action_id DESC
               LIMIT ?"#,
        )?;

        let logs = stmt
            .query_map(params![limit.max(0)], |row| self.map_row(row))?
            .collect::<Result<Vec<ActionLog>, _>>()?;

        Ok(logs)
    }

    /// 按模型查询操作日志
    pub fn list_by_piece(&self, piece_id: &str) -> RepositoryResult<Vec<ActionLog>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT action_id, piece_id, action_type, action_ts,
                      actor, payload_json, detail
               FROM action_log
               WHERE piece_id = ?
               ORDER BY action_ts DESC, action_id DESC"#,
        )?;

        let logs = stmt
            .query_map(params![piece_id], |row| self.map_row(row))?
            .collect::<Result<Vec<ActionLog>, _>>()?;

        Ok(logs)
    }

    /// 日志总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM action_log", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 映射数据库行到ActionLog对象
    fn map_row(&self, row: &rusqlite::Row) -> rusqlite::Result<ActionLog> {
        let payload_raw: Option<String> = row.get(5)?;
        Ok(ActionLog {
            action_id: row.get(0)?,
            piece_id: row.get(1)?,
            action_type: row.get(2)?,
            action_ts: NaiveDateTime::parse_from_str(&row.get::<_, String>(3)?, TS_FORMAT)
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
            actor: row.get(4)?,
            payload_json: payload_raw.and_then(|s| serde_json::from_str(&s).ok()),
            detail: row.get(6)?,
        })
    }
}
