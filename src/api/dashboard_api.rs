// ==========================================
// 3D打印成本报价系统 - 后台统计API
// ==========================================
// 职责: 报价活动的聚合统计 (只读)
// ==========================================

use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::action_log::ActionLog;
use crate::perf::PerfGuard;
use crate::repository::ActionLogRepository;

// ==========================================
// QuoteStatistics - 报价统计
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteStatistics {
    pub piece_count: i64,             // 模型数
    pub version_count: i64,           // 报价版本数
    pub quoted_total: f64,            // 报价总额 (销售价格求和)
    pub avg_quote: f64,               // 平均报价
    pub max_quote: f64,               // 最高报价
    pub last_quote_at: Option<NaiveDateTime>, // 最近一次报价时间
}

// ==========================================
// DashboardApi
// ==========================================
pub struct DashboardApi {
    conn: Arc<Mutex<Connection>>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl DashboardApi {
    /// 构造函数
    pub fn new(conn: Arc<Mutex<Connection>>, action_log_repo: Arc<ActionLogRepository>) -> Self {
        Self {
            conn,
            action_log_repo,
        }
    }

    /// 查询报价统计
    ///
    /// # 说明
    /// 聚合在 SQL 中完成 (COUNT/SUM/AVG/MAX), 不把全表拉进内存
    pub fn get_statistics(&self) -> ApiResult<QuoteStatistics> {
        let _perf = PerfGuard::new("get_statistics");

        let conn = self
            .conn
            .lock()
            .map_err(|e| ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", e)))?;

        let piece_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM piece", [], |row| row.get(0))
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let (version_count, quoted_total, avg_quote, max_quote, last_quote_at_raw): (
            i64,
            Option<f64>,
            Option<f64>,
            Option<f64>,
            Option<String>,
        ) = conn
            .query_row(
                r#"SELECT COUNT(*),
                          SUM(total_price),
                          AVG(total_price),
                          MAX(total_price),
                          MAX(created_at)
                   FROM quote_version"#,
                [],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                    ))
                },
            )
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        let last_quote_at = last_quote_at_raw
            .and_then(|s| NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S").ok());

        Ok(QuoteStatistics {
            piece_count,
            version_count,
            quoted_total: quoted_total.unwrap_or(0.0),
            avg_quote: avg_quote.unwrap_or(0.0),
            max_quote: max_quote.unwrap_or(0.0),
            last_quote_at,
        })
    }

    /// 查询最近操作日志
    pub fn recent_actions(&self, limit: i64) -> ApiResult<Vec<ActionLog>> {
        Ok(self.action_log_repo.list_recent(limit)?)
    }
}
