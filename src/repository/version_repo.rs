use crate::domain::piece::QuoteVersion;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 时间戳存储格式
const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// QuoteVersionRepository - 报价版本仓储
// ==========================================
// 红线: 版本是不可变快照, 仓储只提供创建/查询/删除, 没有更新
pub struct QuoteVersionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl QuoteVersionRepository {
    /// 创建新的QuoteVersionRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建版本（自动分配 version_no，避免并发下 version_no 冲突）
    ///
    /// 说明：
    /// - 在同一事务内查询 MAX(version_no) 并写入，保证对同一 piece_id 的 version_no 分配原子性。
    /// - 该方法会覆盖传入的 `version.version_no`。
    pub fn create_with_next_version_no(
        &self,
        version: &mut QuoteVersion,
    ) -> RepositoryResult<String> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let max_version_no: Option<i32> = tx.query_row(
            "SELECT MAX(version_no) FROM quote_version WHERE piece_id = ?",
            params![&version.piece_id],
            |row| row.get(0),
        )?;

        version.version_no = max_version_no.unwrap_or(0) + 1;

        tx.execute(
            r#"INSERT INTO quote_version (
                version_id, piece_id, version_no,
                inputs_json, result_json, total_price,
                note, created_by, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &version.version_id,
                &version.piece_id,
                &version.version_no,
                &version.inputs_json,
                &version.result_json,
                &version.total_price,
                &version.note,
                &version.created_by,
                &version.created_at.format(TS_FORMAT).to_string(),
            ],
        )?;

        tx.commit()?;
        Ok(version.version_id.clone())
    }

    /// 按version_id查询版本
    pub fn find_by_id(&self, version_id: &str) -> RepositoryResult<Option<QuoteVersion>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT version_id, piece_id, version_no,
                      inputs_json, result_json, total_price,
                      note, created_by, created_at
               FROM quote_version
               WHERE version_id = ?"#,
            params![version_id],
            |row| self.map_row(row),
        ) {
            Ok(version) => Ok(Some(version)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询模型的所有版本 (版本号倒序)
    pub fn find_by_piece_id(&self, piece_id: &str) -> RepositoryResult<Vec<QuoteVersion>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT version_id, piece_id, version_no,
                      inputs_json, result_json, total_price,
                      note, created_by, created_at
               FROM quote_version
               WHERE piece_id = ?
               ORDER BY version_no DESC"#,
        )?;

        let versions = stmt
            .query_map(params![piece_id], |row| self.map_row(row))?
            .collect::<Result<Vec<QuoteVersion>, _>>()?;

        Ok(versions)
    }

    /// 查询模型的最新版本
    pub fn find_latest_by_piece_id(&self, piece_id: &str) -> RepositoryResult<Option<QuoteVersion>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT version_id, piece_id, version_no,
                      inputs_json, result_json, total_price,
                      note, created_by, created_at
               FROM quote_version
               WHERE piece_id = ?
               ORDER BY version_no DESC
               LIMIT 1"#,
            params![piece_id],
            |row| self.map_row(row),
        ) {
            Ok(version) => Ok(Some(version)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 删除版本
    pub fn delete(&self, version_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute(
            "DELETE FROM quote_version WHERE version_id = ?",
            params![version_id],
        )?;

        Ok(())
    }

    /// 版本总数 (跨模型)
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM quote_version", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 映射数据库行到QuoteVersion对象
    fn map_row(&self, row: &rusqlite::Row) -> rusqlite::Result<QuoteVersion> {
        Ok(QuoteVersion {
            version_id: row.get(0)?,
            piece_id: row.get(1)?,
            version_no: row.get(2)?,
            inputs_json: row.get(3)?,
            result_json: row.get(4)?,
            total_price: row.get(5)?,
            note: row.get(6)?,
            created_by: row.get(7)?,
            created_at: NaiveDateTime::parse_from_str(&row.get::<_, String>(8)?, TS_FORMAT)
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        8,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })?,
        })
    }
}
