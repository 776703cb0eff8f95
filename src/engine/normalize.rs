// ==========================================
// 3D打印成本报价系统 - 输入归一化
// ==========================================
// 职责: 把任意数值输入收敛到有限、非负、界内的安全值
// 红线: 归一化只替换不拒绝; 每次替换/钳制输出一条 advisory
// ==========================================

use serde::Serialize;

use crate::domain::pricing::PricingInputs;
use crate::domain::types::ClampField;

// ==========================================
// 域边界
// ==========================================

/// 损耗寿命下限 (小时); 非正除数绝不允许进入除法
pub const WEAR_LIFETIME_MIN_HOURS: f64 = 1.0;

/// 误差余量上限 (百分比)
pub const ERROR_MARGIN_MAX_PERCENT: f64 = 200.0;

/// 利润乘数下限
pub const PROFIT_MULTIPLIER_MIN: f64 = 1.0;

/// 利润乘数上限
pub const PROFIT_MULTIPLIER_MAX: f64 = 20.0;

/// 平台费率上限 (百分比)
pub const MARKETPLACE_FEE_MAX_PERCENT: f64 = 50.0;

// ==========================================
// Advisory - 钳制/替换事件
// ==========================================

/// 替换/钳制原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdvisoryReason {
    NonFinite,    // NaN / 无穷
    Negative,     // 负值
    BelowMinimum, // 低于域下限
    AboveMaximum, // 高于域上限
}

impl AdvisoryReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvisoryReason::NonFinite => "NON_FINITE",
            AdvisoryReason::Negative => "NEGATIVE",
            AdvisoryReason::BelowMinimum => "BELOW_MINIMUM",
            AdvisoryReason::AboveMaximum => "ABOVE_MAXIMUM",
        }
    }
}

/// 钳制事件 (诊断用, 不构成错误)
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClampAdvisory {
    /// 输入字段名 (camelCase, 与持久化格式一致)
    pub field: &'static str,
    /// 原始值
    pub raw_value: f64,
    /// 实际采用值
    pub applied_value: f64,
    /// 原因
    pub reason: AdvisoryReason,
}

// ==========================================
// 归一化
// ==========================================

/// 归一化全部定价输入
///
/// 规则:
/// 1. 非有限 (NaN/无穷) 或负值 → 字段默认值 (损耗寿命/利润乘数为1, 其余为0)
/// 2. 损耗寿命钳制下限1 (原始值≤0时输出 advisory)
/// 3. 误差余量钳制到 [0, 200]
/// 4. 利润乘数钳制到 [1, 20]
/// 5. 平台费率钳制到 [0, 50]
///
/// # 返回
/// - 归一化后的输入 (全部有限且界内)
/// - 触发的 advisory 列表 (空表示输入本来就干净)
pub fn normalize_inputs(raw: &PricingInputs) -> (PricingInputs, Vec<ClampAdvisory>) {
    let mut advisories = Vec::new();

    let material_price_per_kg =
        sanitize("materialPricePerKg", raw.material_price_per_kg, 0.0, &mut advisories);
    let energy_price_per_kwh =
        sanitize("energyPricePerKwh", raw.energy_price_per_kwh, 0.0, &mut advisories);
    let device_power_watts =
        sanitize("devicePowerWatts", raw.device_power_watts, 0.0, &mut advisories);
    let replacement_parts_cost =
        sanitize("replacementPartsCost", raw.replacement_parts_cost, 0.0, &mut advisories);
    let print_hours = sanitize("printHours", raw.print_hours, 0.0, &mut advisories);
    let print_minutes = sanitize("printMinutes", raw.print_minutes, 0.0, &mut advisories);
    let filament_grams = sanitize("filamentGrams", raw.filament_grams, 0.0, &mut advisories);
    let supplies_cost = sanitize("suppliesCost", raw.supplies_cost, 0.0, &mut advisories);

    // 损耗寿命: 非正除数绝不允许进入除法
    let wear_lifetime_hours = clamp_wear_lifetime(raw.wear_lifetime_hours, &mut advisories);

    // 误差余量: [0, 200]
    let error_margin_percent = clamp_upper_bounded(
        ClampField::ErrorMarginPercent,
        raw.error_margin_percent,
        0.0,
        ERROR_MARGIN_MAX_PERCENT,
        &mut advisories,
    );

    // 利润乘数: [1, 20]
    let profit_multiplier = clamp_multiplier(raw.profit_multiplier, &mut advisories);

    // 平台费率: [0, 50]
    let marketplace_fee_percent = clamp_upper_bounded(
        ClampField::MarketplaceFeePercent,
        raw.marketplace_fee_percent,
        0.0,
        MARKETPLACE_FEE_MAX_PERCENT,
        &mut advisories,
    );

    let normalized = PricingInputs {
        material_price_per_kg,
        energy_price_per_kwh,
        device_power_watts,
        wear_lifetime_hours,
        replacement_parts_cost,
        error_margin_percent,
        print_hours,
        print_minutes,
        filament_grams,
        supplies_cost,
        profit_multiplier,
        marketplace_fee_percent,
    };

    (normalized, advisories)
}

/// 单字段收敛: 非有限或负值 → 默认值
fn sanitize(
    field: &'static str,
    value: f64,
    default: f64,
    advisories: &mut Vec<ClampAdvisory>,
) -> f64 {
    if !value.is_finite() {
        advisories.push(ClampAdvisory {
            field,
            raw_value: value,
            applied_value: default,
            reason: AdvisoryReason::NonFinite,
        });
        return default;
    }
    if value < 0.0 {
        advisories.push(ClampAdvisory {
            field,
            raw_value: value,
            applied_value: default,
            reason: AdvisoryReason::Negative,
        });
        return default;
    }
    value
}

/// 损耗寿命钳制
///
/// 说明:
/// - 原始值 ≤0 或非有限时输出 advisory (非正除数红线)
/// - (0,1) 区间静默钳到下限, 不产生 advisory
fn clamp_wear_lifetime(value: f64, advisories: &mut Vec<ClampAdvisory>) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        advisories.push(ClampAdvisory {
            field: ClampField::WearLifetimeHours.input_field_name(),
            raw_value: value,
            applied_value: WEAR_LIFETIME_MIN_HOURS,
            reason: if value.is_finite() {
                AdvisoryReason::BelowMinimum
            } else {
                AdvisoryReason::NonFinite
            },
        });
        return WEAR_LIFETIME_MIN_HOURS;
    }
    value.max(WEAR_LIFETIME_MIN_HOURS)
}

/// 利润乘数钳制到 [1, 20]
fn clamp_multiplier(value: f64, advisories: &mut Vec<ClampAdvisory>) -> f64 {
    let field = ClampField::ProfitMultiplier.input_field_name();
    if !value.is_finite() {
        advisories.push(ClampAdvisory {
            field,
            raw_value: value,
            applied_value: PROFIT_MULTIPLIER_MIN,
            reason: AdvisoryReason::NonFinite,
        });
        return PROFIT_MULTIPLIER_MIN;
    }
    if value < PROFIT_MULTIPLIER_MIN {
        advisories.push(ClampAdvisory {
            field,
            raw_value: value,
            applied_value: PROFIT_MULTIPLIER_MIN,
            reason: AdvisoryReason::BelowMinimum,
        });
        return PROFIT_MULTIPLIER_MIN;
    }
    if value > PROFIT_MULTIPLIER_MAX {
        advisories.push(ClampAdvisory {
            field,
            raw_value: value,
            applied_value: PROFIT_MULTIPLIER_MAX,
            reason: AdvisoryReason::AboveMaximum,
        });
        return PROFIT_MULTIPLIER_MAX;
    }
    value
}

/// 百分比类字段钳制到 [min, max]
fn clamp_upper_bounded(
    field: ClampField,
    value: f64,
    min: f64,
    max: f64,
    advisories: &mut Vec<ClampAdvisory>,
) -> f64 {
    let name = field.input_field_name();
    if !value.is_finite() {
        advisories.push(ClampAdvisory {
            field: name,
            raw_value: value,
            applied_value: min,
            reason: AdvisoryReason::NonFinite,
        });
        return min;
    }
    if value < min {
        advisories.push(ClampAdvisory {
            field: name,
            raw_value: value,
            applied_value: min,
            reason: AdvisoryReason::Negative,
        });
        return min;
    }
    if value > max {
        advisories.push(ClampAdvisory {
            field: name,
            raw_value: value,
            applied_value: max,
            reason: AdvisoryReason::AboveMaximum,
        });
        return max;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_inputs_produce_no_advisory() {
        let inputs = PricingInputs {
            material_price_per_kg: 20000.0,
            wear_lifetime_hours: 500.0,
            profit_multiplier: 3.0,
            error_margin_percent: 10.0,
            marketplace_fee_percent: 15.0,
            ..Default::default()
        };
        let (normalized, advisories) = normalize_inputs(&inputs);
        assert!(advisories.is_empty());
        assert_eq!(normalized, inputs);
    }

    #[test]
    fn test_non_finite_falls_to_default() {
        let inputs = PricingInputs {
            filament_grams: f64::NAN,
            device_power_watts: f64::INFINITY,
            ..Default::default()
        };
        let (normalized, advisories) = normalize_inputs(&inputs);
        assert_eq!(normalized.filament_grams, 0.0);
        assert_eq!(normalized.device_power_watts, 0.0);
        assert_eq!(advisories.len(), 2);
        assert!(advisories
            .iter()
            .all(|a| a.reason == AdvisoryReason::NonFinite));
    }

    #[test]
    fn test_negative_cost_falls_to_default() {
        let inputs = PricingInputs {
            supplies_cost: -100.0,
            ..Default::default()
        };
        let (normalized, advisories) = normalize_inputs(&inputs);
        assert_eq!(normalized.supplies_cost, 0.0);
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].field, "suppliesCost");
        assert_eq!(advisories[0].reason, AdvisoryReason::Negative);
    }

    #[test]
    fn test_wear_lifetime_floor() {
        // 负值: 钳到下限并输出 advisory
        let inputs = PricingInputs {
            wear_lifetime_hours: -5.0,
            ..Default::default()
        };
        let (normalized, advisories) = normalize_inputs(&inputs);
        assert_eq!(normalized.wear_lifetime_hours, 1.0);
        assert_eq!(advisories.len(), 1);

        // 零值同样触发
        let inputs = PricingInputs {
            wear_lifetime_hours: 0.0,
            ..Default::default()
        };
        let (normalized, advisories) = normalize_inputs(&inputs);
        assert_eq!(normalized.wear_lifetime_hours, 1.0);
        assert_eq!(advisories.len(), 1);

        // (0,1) 区间静默钳制
        let inputs = PricingInputs {
            wear_lifetime_hours: 0.5,
            ..Default::default()
        };
        let (normalized, advisories) = normalize_inputs(&inputs);
        assert_eq!(normalized.wear_lifetime_hours, 1.0);
        assert!(advisories.is_empty());
    }

    #[test]
    fn test_error_margin_clamp() {
        let inputs = PricingInputs {
            error_margin_percent: 350.0,
            ..Default::default()
        };
        let (normalized, advisories) = normalize_inputs(&inputs);
        assert_eq!(normalized.error_margin_percent, ERROR_MARGIN_MAX_PERCENT);
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].reason, AdvisoryReason::AboveMaximum);
    }

    #[test]
    fn test_multiplier_clamp_both_ends() {
        let inputs = PricingInputs {
            profit_multiplier: 1000.0,
            ..Default::default()
        };
        let (normalized, _) = normalize_inputs(&inputs);
        assert_eq!(normalized.profit_multiplier, PROFIT_MULTIPLIER_MAX);

        let inputs = PricingInputs {
            profit_multiplier: 0.5,
            ..Default::default()
        };
        let (normalized, advisories) = normalize_inputs(&inputs);
        assert_eq!(normalized.profit_multiplier, PROFIT_MULTIPLIER_MIN);
        assert_eq!(advisories[0].reason, AdvisoryReason::BelowMinimum);
    }

    #[test]
    fn test_marketplace_fee_clamp() {
        let inputs = PricingInputs {
            marketplace_fee_percent: 80.0,
            ..Default::default()
        };
        let (normalized, advisories) = normalize_inputs(&inputs);
        assert_eq!(normalized.marketplace_fee_percent, MARKETPLACE_FEE_MAX_PERCENT);
        assert_eq!(advisories.len(), 1);
    }

    #[test]
    fn test_normalized_always_finite() {
        let inputs = PricingInputs {
            material_price_per_kg: f64::NEG_INFINITY,
            energy_price_per_kwh: f64::NAN,
            device_power_watts: -1.0,
            wear_lifetime_hours: f64::NAN,
            replacement_parts_cost: -0.01,
            error_margin_percent: f64::INFINITY,
            print_hours: -3.0,
            print_minutes: f64::NAN,
            filament_grams: -50.0,
            supplies_cost: f64::INFINITY,
            profit_multiplier: f64::NEG_INFINITY,
            marketplace_fee_percent: -20.0,
        };
        let (normalized, advisories) = normalize_inputs(&inputs);
        assert!(normalized.material_price_per_kg.is_finite());
        assert!(normalized.wear_lifetime_hours >= 1.0);
        assert!(normalized.profit_multiplier >= 1.0);
        assert_eq!(advisories.len(), 12);
    }
}
