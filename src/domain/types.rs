// ==========================================
// 3D打印成本报价系统 - 领域类型定义
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与持久化数据一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 受约束字段 (Clamp Field)
// ==========================================
// 定价输入中存在域边界、越界时会被钳制的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClampField {
    WearLifetimeHours,    // 损耗寿命 (小时, 下限1)
    ErrorMarginPercent,   // 误差余量 (0~200%)
    ProfitMultiplier,     // 利润乘数 (1~20)
    MarketplaceFeePercent, // 平台费率 (0~50%)
}

impl fmt::Display for ClampField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClampField::WearLifetimeHours => write!(f, "WEAR_LIFETIME_HOURS"),
            ClampField::ErrorMarginPercent => write!(f, "ERROR_MARGIN_PERCENT"),
            ClampField::ProfitMultiplier => write!(f, "PROFIT_MULTIPLIER"),
            ClampField::MarketplaceFeePercent => write!(f, "MARKETPLACE_FEE_PERCENT"),
        }
    }
}

impl ClampField {
    /// 对应的输入字段名（与持久化的 camelCase 字段名一致）
    pub fn input_field_name(&self) -> &'static str {
        match self {
            ClampField::WearLifetimeHours => "wearLifetimeHours",
            ClampField::ErrorMarginPercent => "errorMarginPercent",
            ClampField::ProfitMultiplier => "profitMultiplier",
            ClampField::MarketplaceFeePercent => "marketplaceFeePercent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_field_display() {
        assert_eq!(ClampField::WearLifetimeHours.to_string(), "WEAR_LIFETIME_HOURS");
        assert_eq!(ClampField::ProfitMultiplier.to_string(), "PROFIT_MULTIPLIER");
    }

    #[test]
    fn test_clamp_field_serde() {
        let json = serde_json::to_string(&ClampField::ErrorMarginPercent).unwrap();
        assert_eq!(json, "\"ERROR_MARGIN_PERCENT\"");
    }
}
