// ==========================================
// 3D打印成本报价系统 - 定价领域模型
// ==========================================
// 序列化格式: camelCase (与历史报价数据的持久化格式一致,
// 旧数据可直接反序列化为本结构)
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// PricingInputs - 定价输入
// ==========================================
// 红线: 所有字段缺省时必须落到安全默认值, 引擎对任意输入都不报错
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInputs {
    /// 耗材单价 (每千克)
    #[serde(default)]
    pub material_price_per_kg: f64,

    /// 电价 (每千瓦时)
    #[serde(default)]
    pub energy_price_per_kwh: f64,

    /// 设备功率 (瓦)
    #[serde(default)]
    pub device_power_watts: f64,

    /// 损耗寿命 (小时, >0, 钳制下限1)
    #[serde(default = "default_wear_lifetime_hours")]
    pub wear_lifetime_hours: f64,

    /// 易损件更换成本
    #[serde(default)]
    pub replacement_parts_cost: f64,

    /// 误差余量 (百分比, 0~200)
    #[serde(default)]
    pub error_margin_percent: f64,

    /// 打印时长 - 小时部分
    #[serde(default)]
    pub print_hours: f64,

    /// 打印时长 - 分钟部分
    #[serde(default)]
    pub print_minutes: f64,

    /// 耗材用量 (克)
    #[serde(default)]
    pub filament_grams: f64,

    /// 辅料成本 (加成后追加, 不参与乘数)
    #[serde(default)]
    pub supplies_cost: f64,

    /// 利润乘数 (1~20)
    #[serde(default = "default_profit_multiplier")]
    pub profit_multiplier: f64,

    /// 平台费率 (百分比, 0~50)
    #[serde(default)]
    pub marketplace_fee_percent: f64,
}

fn default_wear_lifetime_hours() -> f64 {
    1.0
}

fn default_profit_multiplier() -> f64 {
    1.0
}

impl Default for PricingInputs {
    fn default() -> Self {
        Self {
            material_price_per_kg: 0.0,
            energy_price_per_kwh: 0.0,
            device_power_watts: 0.0,
            wear_lifetime_hours: default_wear_lifetime_hours(),
            replacement_parts_cost: 0.0,
            error_margin_percent: 0.0,
            print_hours: 0.0,
            print_minutes: 0.0,
            filament_grams: 0.0,
            supplies_cost: 0.0,
            profit_multiplier: default_profit_multiplier(),
            marketplace_fee_percent: 0.0,
        }
    }
}

impl PricingInputs {
    /// 打印总时长 (小时)
    pub fn total_hours(&self) -> f64 {
        self.print_hours + self.print_minutes / 60.0
    }
}

// ==========================================
// PricingResult - 定价结果
// ==========================================
// 红线: 计算后不可变; 重新请求产生新结果, 绝不原地修改
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    // ===== 中间量 =====
    pub material_kg: f64,           // 耗材重量 (千克)
    pub material_cost: f64,         // 耗材成本
    pub energy_kwh: f64,            // 耗电量 (千瓦时)
    pub energy_cost: f64,           // 电力成本
    pub wear_cost_per_hour: f64,    // 每小时损耗成本
    pub wear_cost: f64,             // 损耗成本
    pub supplies_cost: f64,         // 辅料成本 (透传)

    // ===== 聚合基数 =====
    pub base_before_margin: f64,        // 基础成本 (耗材+电力+损耗)
    pub error_margin_amount: f64,       // 误差余量金额
    pub subtotal_before_multiplier: f64, // 加成前小计

    // ===== 最终价格 =====
    pub price_before_supplies: f64, // 辅料前售价
    pub total_price: f64,           // 销售价格 (卖家收取)
    pub marketplace_price: f64,     // 平台售价 (含平台费)

    // ===== 展示用聚合 (不回流到价格计算) =====
    pub labor_and_materials_cost: f64, // 工料小计 (耗材+电力)
    pub subtotal_with_margin: f64,     // 含辅料的余量小计
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inputs_default() {
        let inputs = PricingInputs::default();
        assert_eq!(inputs.material_price_per_kg, 0.0);
        assert_eq!(inputs.wear_lifetime_hours, 1.0);
        assert_eq!(inputs.profit_multiplier, 1.0);
    }

    #[test]
    fn test_inputs_total_hours() {
        let inputs = PricingInputs {
            print_hours: 2.0,
            print_minutes: 30.0,
            ..Default::default()
        };
        assert_eq!(inputs.total_hours(), 2.5);
    }

    #[test]
    fn test_inputs_camel_case_serde() {
        // 与历史持久化数据的字段名保持一致
        let inputs = PricingInputs {
            material_price_per_kg: 20000.0,
            ..Default::default()
        };
        let json = serde_json::to_string(&inputs).unwrap();
        assert!(json.contains("\"materialPricePerKg\":20000.0"));
        assert!(json.contains("\"wearLifetimeHours\":1.0"));
    }

    #[test]
    fn test_inputs_missing_fields_fall_to_defaults() {
        // 旧数据缺字段时必须落到字段默认值
        let inputs: PricingInputs = serde_json::from_str("{\"filamentGrams\": 50.0}").unwrap();
        assert_eq!(inputs.filament_grams, 50.0);
        assert_eq!(inputs.wear_lifetime_hours, 1.0);
        assert_eq!(inputs.profit_multiplier, 1.0);
        assert_eq!(inputs.supplies_cost, 0.0);
    }
}
