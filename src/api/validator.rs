// ==========================================
// 3D打印成本报价系统 - 输入校验器
// ==========================================
// 职责: 把未分型的表单记录转换为强类型的 PricingInputs
// 说明: 默认值替换集中在这里 (解析失败) 与引擎归一化 (数值越界) 两处,
//       两处共用同一套字段默认值口径
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::pricing::PricingInputs;
use crate::i18n::t_with_args;

// ==========================================
// RawQuoteForm - 未分型表单记录
// ==========================================
// 字段均为原始文本 (camelCase, 与前端表单/持久化格式一致)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuoteForm {
    #[serde(default)]
    pub material_price_per_kg: Option<String>,
    #[serde(default)]
    pub energy_price_per_kwh: Option<String>,
    #[serde(default)]
    pub device_power_watts: Option<String>,
    #[serde(default)]
    pub wear_lifetime_hours: Option<String>,
    #[serde(default)]
    pub replacement_parts_cost: Option<String>,
    #[serde(default)]
    pub error_margin_percent: Option<String>,
    #[serde(default)]
    pub print_hours: Option<String>,
    #[serde(default)]
    pub print_minutes: Option<String>,
    #[serde(default)]
    pub filament_grams: Option<String>,
    #[serde(default)]
    pub supplies_cost: Option<String>,
    #[serde(default)]
    pub profit_multiplier: Option<String>,
    #[serde(default)]
    pub marketplace_fee_percent: Option<String>,
}

/// 字段解析问题 (用于前端提示, 不阻断计算)
#[derive(Debug, Clone, Serialize)]
pub struct FieldIssue {
    /// 输入字段名 (camelCase)
    pub field: &'static str,
    /// 原始文本
    pub raw: String,
    /// 用户可读消息
    pub message: String,
}

/// 解析表单记录为强类型定价输入
///
/// 规则:
/// - 缺失/空白字段静默落到字段默认值 (表单留空是正常情况)
/// - 文本无法解析为数字时落到默认值并记录一条 FieldIssue
/// - 小数逗号视为小数点 ("1,5" → 1.5)
/// - 数值域校验 (负值/越界) 不在这里做, 交给引擎归一化统一处理
pub fn parse_form(form: &RawQuoteForm) -> (PricingInputs, Vec<FieldIssue>) {
    let defaults = PricingInputs::default();
    let mut issues = Vec::new();

    let inputs = PricingInputs {
        material_price_per_kg: parse_field(
            "materialPricePerKg",
            form.material_price_per_kg.as_deref(),
            defaults.material_price_per_kg,
            &mut issues,
        ),
        energy_price_per_kwh: parse_field(
            "energyPricePerKwh",
            form.energy_price_per_kwh.as_deref(),
            defaults.energy_price_per_kwh,
            &mut issues,
        ),
        device_power_watts: parse_field(
            "devicePowerWatts",
            form.device_power_watts.as_deref(),
            defaults.device_power_watts,
            &mut issues,
        ),
        wear_lifetime_hours: parse_field(
            "wearLifetimeHours",
            form.wear_lifetime_hours.as_deref(),
            defaults.wear_lifetime_hours,
            &mut issues,
        ),
        replacement_parts_cost: parse_field(
            "replacementPartsCost",
            form.replacement_parts_cost.as_deref(),
            defaults.replacement_parts_cost,
            &mut issues,
        ),
        error_margin_percent: parse_field(
            "errorMarginPercent",
            form.error_margin_percent.as_deref(),
            defaults.error_margin_percent,
            &mut issues,
        ),
        print_hours: parse_field(
            "printHours",
            form.print_hours.as_deref(),
            defaults.print_hours,
            &mut issues,
        ),
        print_minutes: parse_field(
            "printMinutes",
            form.print_minutes.as_deref(),
            defaults.print_minutes,
            &mut issues,
        ),
        filament_grams: parse_field(
            "filamentGrams",
            form.filament_grams.as_deref(),
            defaults.filament_grams,
            &mut issues,
        ),
        supplies_cost: parse_field(
            "suppliesCost",
            form.supplies_cost.as_deref(),
            defaults.supplies_cost,
            &mut issues,
        ),
        profit_multiplier: parse_field(
            "profitMultiplier",
            form.profit_multiplier.as_deref(),
            defaults.profit_multiplier,
            &mut issues,
        ),
        marketplace_fee_percent: parse_field(
            "marketplaceFeePercent",
            form.marketplace_fee_percent.as_deref(),
            defaults.marketplace_fee_percent,
            &mut issues,
        ),
    };

    (inputs, issues)
}

/// 解析单个文本字段
fn parse_field(
    field: &'static str,
    raw: Option<&str>,
    default: f64,
    issues: &mut Vec<FieldIssue>,
) -> f64 {
    let text = match raw {
        Some(t) => t.trim(),
        None => return default,
    };

    // 表单留空是正常情况, 静默落默认值
    if text.is_empty() {
        return default;
    }

    // 小数逗号兼容
    let canonical = text.replace(',', ".");

    match canonical.parse::<f64>() {
        Ok(value) => value,
        Err(_) => {
            issues.push(FieldIssue {
                field,
                raw: text.to_string(),
                message: t_with_args(
                    "validator.invalid_number",
                    &[("field", field), ("raw", text)],
                ),
            });
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_form_falls_to_defaults() {
        let (inputs, issues) = parse_form(&RawQuoteForm::default());
        assert!(issues.is_empty());
        assert_eq!(inputs, PricingInputs::default());
        assert_eq!(inputs.wear_lifetime_hours, 1.0);
        assert_eq!(inputs.profit_multiplier, 1.0);
    }

    #[test]
    fn test_parse_plain_numbers() {
        let form = RawQuoteForm {
            material_price_per_kg: Some("20000".to_string()),
            print_hours: Some(" 2 ".to_string()),
            print_minutes: Some("30".to_string()),
            ..Default::default()
        };
        let (inputs, issues) = parse_form(&form);
        assert!(issues.is_empty());
        assert_eq!(inputs.material_price_per_kg, 20000.0);
        assert_eq!(inputs.print_hours, 2.0);
        assert_eq!(inputs.print_minutes, 30.0);
    }

    #[test]
    fn test_decimal_comma_accepted() {
        let form = RawQuoteForm {
            profit_multiplier: Some("2,5".to_string()),
            ..Default::default()
        };
        let (inputs, issues) = parse_form(&form);
        assert!(issues.is_empty());
        assert_eq!(inputs.profit_multiplier, 2.5);
    }

    #[test]
    fn test_garbage_text_reports_issue_and_defaults() {
        let form = RawQuoteForm {
            filament_grams: Some("abc".to_string()),
            supplies_cost: Some("12x".to_string()),
            ..Default::default()
        };
        let (inputs, issues) = parse_form(&form);
        assert_eq!(inputs.filament_grams, 0.0);
        assert_eq!(inputs.supplies_cost, 0.0);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].field, "filamentGrams");
        assert!(issues[0].message.contains("abc"));
    }

    #[test]
    fn test_blank_text_is_silent() {
        let form = RawQuoteForm {
            energy_price_per_kwh: Some("   ".to_string()),
            ..Default::default()
        };
        let (inputs, issues) = parse_form(&form);
        assert!(issues.is_empty());
        assert_eq!(inputs.energy_price_per_kwh, 0.0);
    }
}
