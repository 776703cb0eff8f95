use serde::{Deserialize, Serialize};

use crate::domain::pricing::PricingInputs;

/// 定价预设（持久化对象）
///
/// 存储位置：config_kv（scope_id='global'，key='pricing_preset/{preset_id}'）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingPreset {
    /// 预设 ID（用于选择/引用）
    pub preset_id: String,

    /// 显示名称
    pub title: String,

    /// 说明（可选）
    #[serde(default)]
    pub description: Option<String>,

    /// 参数（打印机/耗材经济学字段的部分覆盖）
    #[serde(default)]
    pub parameters: PresetParameters,
}

/// 预设参数（仅设置的字段参与覆盖，未设置的字段保留原输入值）
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PresetParameters {
    /// 耗材单价（每千克）
    #[serde(default)]
    pub material_price_per_kg: Option<f64>,

    /// 电价（每千瓦时）
    #[serde(default)]
    pub energy_price_per_kwh: Option<f64>,

    /// 设备功率（瓦）
    #[serde(default)]
    pub device_power_watts: Option<f64>,

    /// 损耗寿命（小时）
    #[serde(default)]
    pub wear_lifetime_hours: Option<f64>,

    /// 易损件更换成本
    #[serde(default)]
    pub replacement_parts_cost: Option<f64>,

    /// 误差余量（百分比）
    #[serde(default)]
    pub error_margin_percent: Option<f64>,

    /// 利润乘数
    #[serde(default)]
    pub profit_multiplier: Option<f64>,

    /// 平台费率（百分比）
    #[serde(default)]
    pub marketplace_fee_percent: Option<f64>,
}

impl PricingPreset {
    /// 将预设参数合并到定价输入
    ///
    /// 说明：
    /// - 只覆盖预设中设置了的字段；作业相关字段（时长/用量/辅料）永不覆盖。
    /// - 不在这里做钳制，越界值交给引擎归一化统一处理。
    pub fn apply_to(&self, inputs: &mut PricingInputs) {
        let p = &self.parameters;

        if let Some(v) = p.material_price_per_kg {
            inputs.material_price_per_kg = v;
        }
        if let Some(v) = p.energy_price_per_kwh {
            inputs.energy_price_per_kwh = v;
        }
        if let Some(v) = p.device_power_watts {
            inputs.device_power_watts = v;
        }
        if let Some(v) = p.wear_lifetime_hours {
            inputs.wear_lifetime_hours = v;
        }
        if let Some(v) = p.replacement_parts_cost {
            inputs.replacement_parts_cost = v;
        }
        if let Some(v) = p.error_margin_percent {
            inputs.error_margin_percent = v;
        }
        if let Some(v) = p.profit_multiplier {
            inputs.profit_multiplier = v;
        }
        if let Some(v) = p.marketplace_fee_percent {
            inputs.marketplace_fee_percent = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides_only_set_fields() {
        let preset = PricingPreset {
            preset_id: "pla-standard".to_string(),
            title: "标准PLA".to_string(),
            description: None,
            parameters: PresetParameters {
                material_price_per_kg: Some(18000.0),
                device_power_watts: Some(250.0),
                ..Default::default()
            },
        };

        let mut inputs = PricingInputs {
            material_price_per_kg: 20000.0,
            energy_price_per_kwh: 150.0,
            filament_grams: 50.0,
            ..Default::default()
        };
        preset.apply_to(&mut inputs);

        // 设置的字段被覆盖
        assert_eq!(inputs.material_price_per_kg, 18000.0);
        assert_eq!(inputs.device_power_watts, 250.0);
        // 未设置的字段保留
        assert_eq!(inputs.energy_price_per_kwh, 150.0);
        assert_eq!(inputs.filament_grams, 50.0);
    }

    #[test]
    fn test_preset_serde_defaults() {
        // 旧数据缺 parameters 字段时必须可解析
        let preset: PricingPreset =
            serde_json::from_str(r#"{"preset_id":"p1","title":"旧预设"}"#).unwrap();
        assert!(preset.parameters.material_price_per_kg.is_none());
        assert!(preset.description.is_none());
    }
}
