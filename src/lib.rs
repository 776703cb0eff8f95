// ==========================================
// 3D打印成本报价系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 报价计算与历史管理（人工最终控制权）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 定价规则
pub mod engine;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 系统配置与预设
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 性能观测
pub mod perf;

// 报价单渲染与导出
pub mod quote;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::ClampField;

// 领域实体
pub use domain::{ActionLog, ActionType, Piece, PricingInputs, PricingResult, QuoteVersion};

// 引擎
pub use engine::{ClampAdvisory, PricingEngine, compute_price, normalize_inputs};

// API
pub use api::{ConfigApi, DashboardApi, ExportApi, PieceApi, PricingApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "3D打印成本报价系统";

// 数据库版本
pub const DB_VERSION: &str = "v0.1";

// ==========================================
// 预编译检查
// ==========================================

// 确保编译时所有模块可见
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
