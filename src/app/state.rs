// ==========================================
// 3D打印成本报价系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ConfigApi, DashboardApi, ExportApi, PieceApi, PricingApi};
use crate::config::ConfigManager;
use crate::engine::PricingEngine;
use crate::repository::{ActionLogRepository, PieceRepository, QuoteVersionRepository};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 定价API
    pub pricing_api: Arc<PricingApi>,

    /// 模型API
    pub piece_api: Arc<PieceApi>,

    /// 后台统计API
    pub dashboard_api: Arc<DashboardApi>,

    /// 配置管理API
    pub config_api: Arc<ConfigApi>,

    /// 导出API
    pub export_api: Arc<ExportApi>,

    /// 操作日志仓储（用于审计追踪）
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库连接并初始化 schema
    /// 2. 初始化所有Repository
    /// 3. 初始化引擎与所有API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 创建数据库连接（共享连接）
        let mut conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;

        // 空库直接建表; 旧库版本不符时告警但继续启动
        crate::db::init_schema(&conn)
            .map_err(|e| format!("无法初始化数据库schema: {}", e))?;
        match crate::db::read_schema_version(&conn) {
            Ok(Some(v)) if v != crate::db::CURRENT_SCHEMA_VERSION => {
                tracing::warn!(
                    "schema_version不匹配: 期望{}, 实际{}",
                    crate::db::CURRENT_SCHEMA_VERSION,
                    v
                );
            }
            Err(e) => {
                tracing::warn!("schema_version读取失败(将继续启动): {}", e);
            }
            _ => {}
        }

        // SQL 观测 (慢查询日志)
        crate::perf::install_sqlite_tracing(&mut conn);

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================

        let piece_repo = Arc::new(PieceRepository::new(conn.clone()));
        let version_repo = Arc::new(QuoteVersionRepository::new(conn.clone()));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn.clone()));

        // ==========================================
        // 初始化引擎层
        // ==========================================

        // 配置管理器
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // 定价引擎 (显式实例, 缓存随实例走)
        let pricing_engine = Arc::new(PricingEngine::new());

        // ==========================================
        // 初始化API层
        // ==========================================

        // 定价API
        let pricing_api = Arc::new(PricingApi::new(
            pricing_engine,
            piece_repo.clone(),
            version_repo.clone(),
            action_log_repo.clone(),
            config_manager.clone(),
        ));

        // 模型API
        let piece_api = Arc::new(PieceApi::new(
            piece_repo.clone(),
            version_repo.clone(),
            action_log_repo.clone(),
        ));

        // 后台统计API
        let dashboard_api = Arc::new(DashboardApi::new(conn.clone(), action_log_repo.clone()));

        // 配置管理API
        let config_api = Arc::new(ConfigApi::new(
            config_manager.clone(),
            action_log_repo.clone(),
        ));

        // 导出API
        let export_api = Arc::new(ExportApi::new(
            piece_repo,
            version_repo,
            action_log_repo.clone(),
            config_manager,
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            pricing_api,
            piece_api,
            dashboard_api,
            config_api,
            export_api,
            action_log_repo,
        })
    }

    /// 获取数据库路径
    pub fn get_db_path(&self) -> &str {
        &self.db_path
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - 开发环境: 用户数据目录/print-quote-dev/print_quote.db
/// - 生产环境: 用户数据目录/print-quote/print_quote.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("PRINT_QUOTE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    // 先给一个默认回退值，后续如果能拿到 data_dir 再覆盖。
    let mut path = PathBuf::from("./print_quote.db");

    // 尝试获取用户数据目录
    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        {
            path = data_dir.join("print-quote-dev");
        }

        #[cfg(not(debug_assertions))]
        {
            path = data_dir.join("print-quote");
        }

        // 确保目录存在
        std::fs::create_dir_all(&path).ok();
        path = path.join("print_quote.db");
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    // 注意：AppState::new() 的测试需要真实的数据库文件
    // 这些测试应该在集成测试中进行
}
