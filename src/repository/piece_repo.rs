use crate::domain::piece::Piece;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 时间戳存储格式
const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// PieceRepository - 模型仓储
// ==========================================
pub struct PieceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PieceRepository {
    /// 创建新的PieceRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建模型
    pub fn create(&self, piece: &Piece) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"INSERT INTO piece (
                piece_id, piece_name, description,
                created_by, created_at, updated_at, revision
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                &piece.piece_id,
                &piece.piece_name,
                &piece.description,
                &piece.created_by,
                &piece.created_at.format(TS_FORMAT).to_string(),
                &piece.updated_at.format(TS_FORMAT).to_string(),
                &piece.revision,
            ],
        )?;

        Ok(piece.piece_id.clone())
    }

    /// 按piece_id查询模型
    pub fn find_by_id(&self, piece_id: &str) -> RepositoryResult<Option<Piece>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT piece_id, piece_name, description,
                      created_by, created_at, updated_at, revision
               FROM piece
               WHERE piece_id = ?"#,
            params![piece_id],
            |row| self.map_row(row),
        ) {
            Ok(piece) => Ok(Some(piece)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按名称查询模型
    pub fn find_by_name(&self, piece_name: &str) -> RepositoryResult<Option<Piece>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT piece_id, piece_name, description,
                      created_by, created_at, updated_at, revision
               FROM piece
               WHERE piece_name = ?"#,
            params![piece_name],
            |row| self.map_row(row),
        ) {
            Ok(piece) => Ok(Some(piece)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询全部模型 (按更新时间倒序)
    pub fn list_all(&self) -> RepositoryResult<Vec<Piece>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT piece_id, piece_name, description,
                      created_by, created_at, updated_at, revision
               FROM piece
               ORDER BY updated_at DESC, piece_name ASC"#,
        )?;

        let pieces = stmt
            .query_map([], |row| self.map_row(row))?
            .collect::<Result<Vec<Piece>, _>>()?;

        Ok(pieces)
    }

    /// 更新模型 (带乐观锁检查)
    ///
    /// # 并发控制
    /// 使用乐观锁 (revision字段) 防止并发更新冲突
    ///
    /// # 错误
    /// - `RepositoryError::OptimisticLockFailure`: revision不匹配 (其他用户已更新)
    /// - `RepositoryError::NotFound`: piece_id不存在
    pub fn update(&self, piece: &Piece) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        // 执行更新，带revision检查
        let rows_affected = conn.execute(
            r#"UPDATE piece
               SET piece_name = ?, description = ?,
                   updated_at = ?, revision = revision + 1
               WHERE piece_id = ? AND revision = ?"#,
            params![
                &piece.piece_name,
                &piece.description,
                &chrono::Utc::now().naive_utc().format(TS_FORMAT).to_string(),
                &piece.piece_id,
                &piece.revision,
            ],
        )?;

        // 检查是否更新成功
        if rows_affected == 0 {
            // 判断是记录不存在还是revision冲突
            let exists: Result<i32, _> = conn.query_row(
                "SELECT revision FROM piece WHERE piece_id = ?",
                params![&piece.piece_id],
                |row| row.get(0),
            );

            match exists {
                Ok(actual_revision) => {
                    // 记录存在，但revision不匹配 -> 乐观锁冲突
                    return Err(RepositoryError::OptimisticLockFailure {
                        piece_id: piece.piece_id.clone(),
                        expected: piece.revision,
                        actual: actual_revision,
                    });
                }
                Err(_) => {
                    // 记录不存在
                    return Err(RepositoryError::NotFound {
                        entity: "Piece".to_string(),
                        id: piece.piece_id.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// 删除模型 (外键级联删除其报价版本)
    pub fn delete(&self, piece_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        conn.execute("DELETE FROM piece WHERE piece_id = ?", params![piece_id])?;

        Ok(())
    }

    /// 模型总数
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM piece", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 映射数据库行到Piece对象
    fn map_row(&self, row: &rusqlite::Row) -> rusqlite::Result<Piece> {
        Ok(Piece {
            piece_id: row.get(0)?,
            piece_name: row.get(1)?,
            description: row.get(2)?,
            created_by: row.get(3)?,
            created_at: parse_ts(row, 4)?,
            updated_at: parse_ts(row, 5)?,
            revision: row.get(6)?,
        })
    }
}

/// 解析时间戳列
fn parse_ts(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&row.get::<_, String>(idx)?, TS_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
