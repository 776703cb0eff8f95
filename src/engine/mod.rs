// ==========================================
// 3D打印成本报价系统 - 引擎层
// ==========================================
// 职责: 实现定价规则, 不拼 SQL
// 红线: 引擎纯函数化, 越界输入一律钳制并输出 advisory, 绝不报错
// ==========================================

pub mod cache;
pub mod normalize;
pub mod pricing;

// 重导出核心引擎
pub use cache::{QuoteMemoCache, DEFAULT_CACHE_CAPACITY};
pub use normalize::{
    normalize_inputs, AdvisoryReason, ClampAdvisory, ERROR_MARGIN_MAX_PERCENT,
    MARKETPLACE_FEE_MAX_PERCENT, PROFIT_MULTIPLIER_MAX, PROFIT_MULTIPLIER_MIN,
    WEAR_LIFETIME_MIN_HOURS,
};
pub use pricing::{compute_price, PricingEngine};
