// ==========================================
// 3D打印成本报价系统 - 定价引擎
// ==========================================
// 职责: 从物理/经济输入推导销售价格
// 红线:
// - 纯函数: 同一输入必然得到逐位相同的结果
// - 全函数: 任意输入都产出可用结果, 无错误返回路径
// - 辅料在乘数之后追加, 绝不参与加成
// ==========================================

use std::sync::Mutex;

use crate::domain::pricing::{PricingInputs, PricingResult};
use crate::engine::cache::{QuoteMemoCache, DEFAULT_CACHE_CAPACITY};
use crate::engine::normalize::{normalize_inputs, ClampAdvisory};

/// 计算销售价格 (无缓存入口)
///
/// 步骤:
/// 1. 归一化输入 (缺省/越界值钳制, advisory 记入日志)
/// 2. 按成本分解推导: 耗材 → 电力 → 损耗 → 余量 → 乘数 → 辅料 → 平台费
///
/// 浮点全程不舍入; 货币舍入只发生在展示层。
pub fn compute_price(inputs: &PricingInputs) -> PricingResult {
    let (normalized, advisories) = normalize_inputs(inputs);
    log_advisories(&advisories);
    compute_normalized(&normalized)
}

/// 在已归一化的输入上执行纯计算
///
/// 前置条件: 所有字段有限且界内 (normalize_inputs 的输出)
pub(crate) fn compute_normalized(n: &PricingInputs) -> PricingResult {
    // 打印总时长 (小时)
    let total_hours = n.total_hours();

    // 耗材成本
    let material_kg = n.filament_grams / 1000.0;
    let material_cost = material_kg * n.material_price_per_kg;

    // 电力成本
    let energy_kwh = n.device_power_watts * total_hours / 1000.0;
    let energy_cost = energy_kwh * n.energy_price_per_kwh;

    // 损耗成本 (wear_lifetime_hours 已钳制 ≥1, 除法安全)
    let wear_cost_per_hour = n.replacement_parts_cost / n.wear_lifetime_hours;
    let wear_cost = wear_cost_per_hour * total_hours;

    // 不含辅料的基础成本
    let base_before_margin = material_cost + energy_cost + wear_cost;

    // 误差余量
    let error_margin_amount = base_before_margin * (n.error_margin_percent / 100.0);
    let subtotal_before_multiplier = base_before_margin + error_margin_amount;

    // 利润乘数
    let price_before_supplies = subtotal_before_multiplier * n.profit_multiplier;

    // 辅料在乘数之后追加, 不参与加成
    let total_price = price_before_supplies + n.supplies_cost;

    // 平台费最后施加
    let marketplace_price = total_price * (1.0 + n.marketplace_fee_percent / 100.0);

    // 展示用聚合, 不回流到价格
    let labor_and_materials_cost = material_cost + energy_cost;
    let subtotal_with_margin = base_before_margin + error_margin_amount + n.supplies_cost;

    PricingResult {
        material_kg,
        material_cost,
        energy_kwh,
        energy_cost,
        wear_cost_per_hour,
        wear_cost,
        supplies_cost: n.supplies_cost,
        base_before_margin,
        error_margin_amount,
        subtotal_before_multiplier,
        price_before_supplies,
        total_price,
        marketplace_price,
        labor_and_materials_cost,
        subtotal_with_margin,
    }
}

/// advisory 只记日志, 不构成错误
fn log_advisories(advisories: &[ClampAdvisory]) {
    for advisory in advisories {
        tracing::warn!(
            field = advisory.field,
            raw_value = advisory.raw_value,
            applied_value = advisory.applied_value,
            reason = advisory.reason.as_str(),
            "定价输入越界, 已替换为安全值"
        );
    }
}

// ==========================================
// PricingEngine - 带备忘缓存的引擎实例
// ==========================================
// 由调用方显式构造并持有, 避免跨模块隐藏状态
pub struct PricingEngine {
    cache: Mutex<QuoteMemoCache>,
}

impl PricingEngine {
    /// 构造函数 (默认缓存容量)
    pub fn new() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// 指定缓存容量构造
    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self {
            cache: Mutex::new(QuoteMemoCache::new(capacity)),
        }
    }

    /// 计算销售价格 (带备忘缓存)
    ///
    /// # 说明
    /// - 缓存键为归一化输入的结构化序列化, 因此等价输入共享缓存条目
    /// - 缓存锁异常时退化为直接计算, 结果不受影响
    pub fn compute(&self, inputs: &PricingInputs) -> PricingResult {
        let (normalized, advisories) = normalize_inputs(inputs);
        log_advisories(&advisories);

        // 归一化输入全部有限, 序列化不会失败; 若失败则跳过缓存直接计算
        let key = match serde_json::to_string(&normalized) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!("缓存键序列化失败, 跳过缓存: {}", e);
                return compute_normalized(&normalized);
            }
        };

        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                tracing::debug!(cache_len = cache.len(), "定价缓存命中");
                return hit;
            }
        }

        let result = compute_normalized(&normalized);

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, result);
        }

        result
    }

    /// 当前缓存条目数 (诊断用)
    pub fn cache_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 基准输入场景
    fn scenario_inputs() -> PricingInputs {
        PricingInputs {
            material_price_per_kg: 20000.0,
            energy_price_per_kwh: 150.0,
            device_power_watts: 200.0,
            wear_lifetime_hours: 500.0,
            replacement_parts_cost: 10000.0,
            error_margin_percent: 10.0,
            print_hours: 2.0,
            print_minutes: 30.0,
            filament_grams: 50.0,
            supplies_cost: 500.0,
            profit_multiplier: 3.0,
            marketplace_fee_percent: 15.0,
        }
    }

    #[test]
    fn test_scenario_breakdown() {
        let result = compute_price(&scenario_inputs());

        assert_eq!(result.material_kg, 0.05);
        assert_eq!(result.material_cost, 1000.0);
        assert_eq!(result.energy_kwh, 0.5);
        assert_eq!(result.energy_cost, 75.0);
        assert_eq!(result.wear_cost_per_hour, 20.0);
        assert_eq!(result.wear_cost, 50.0);
        assert_eq!(result.base_before_margin, 1125.0);
        assert_eq!(result.error_margin_amount, 112.5);
        assert_eq!(result.subtotal_before_multiplier, 1237.5);
        assert_eq!(result.price_before_supplies, 3712.5);
        assert_eq!(result.total_price, 4212.5);
        assert_eq!(result.marketplace_price, 4844.375);
        assert_eq!(result.labor_and_materials_cost, 1075.0);
        assert_eq!(result.subtotal_with_margin, 1737.5);
    }

    #[test]
    fn test_determinism_bit_identical() {
        let inputs = scenario_inputs();
        let a = compute_price(&inputs);
        let b = compute_price(&inputs);

        assert_eq!(a.total_price.to_bits(), b.total_price.to_bits());
        assert_eq!(a.marketplace_price.to_bits(), b.marketplace_price.to_bits());
        assert_eq!(a.error_margin_amount.to_bits(), b.error_margin_amount.to_bits());
    }

    #[test]
    fn test_all_zero_inputs() {
        let result = compute_price(&PricingInputs::default());
        assert_eq!(result.total_price, 0.0);
        assert_eq!(result.marketplace_price, 0.0);
        assert_eq!(result.base_before_margin, 0.0);
    }

    #[test]
    fn test_non_negativity() {
        let result = compute_price(&scenario_inputs());
        assert!(result.material_cost >= 0.0);
        assert!(result.energy_cost >= 0.0);
        assert!(result.wear_cost >= 0.0);
        assert!(result.total_price >= 0.0);
        assert!(result.marketplace_price >= 0.0);
    }

    #[test]
    fn test_supplies_added_after_multiplier() {
        // 辅料变化必须1:1反映到销售价格 (绝不加成)
        let base = scenario_inputs();
        let with_more_supplies = PricingInputs {
            supplies_cost: 800.0,
            ..base
        };

        let a = compute_price(&base);
        let b = compute_price(&with_more_supplies);
        assert!((b.total_price - a.total_price - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_idempotence() {
        // 超限乘数与钳制上限等价
        let excessive = PricingInputs {
            profit_multiplier: 1000.0,
            ..scenario_inputs()
        };
        let at_ceiling = PricingInputs {
            profit_multiplier: 20.0,
            ..scenario_inputs()
        };
        assert_eq!(
            compute_price(&excessive).total_price,
            compute_price(&at_ceiling).total_price
        );

        // 负损耗寿命与下限1等价
        let negative_wear = PricingInputs {
            wear_lifetime_hours: -5.0,
            ..scenario_inputs()
        };
        let min_wear = PricingInputs {
            wear_lifetime_hours: 1.0,
            ..scenario_inputs()
        };
        assert_eq!(
            compute_price(&negative_wear).total_price,
            compute_price(&min_wear).total_price
        );
    }

    #[test]
    fn test_monotonicity_on_cost_drivers() {
        let base = scenario_inputs();
        let base_price = compute_price(&base).total_price;

        let more_filament = PricingInputs {
            filament_grams: base.filament_grams + 100.0,
            ..base
        };
        assert!(compute_price(&more_filament).total_price >= base_price);

        let more_power = PricingInputs {
            device_power_watts: base.device_power_watts + 300.0,
            ..base
        };
        assert!(compute_price(&more_power).total_price >= base_price);

        let more_parts = PricingInputs {
            replacement_parts_cost: base.replacement_parts_cost + 5000.0,
            ..base
        };
        assert!(compute_price(&more_parts).total_price >= base_price);

        let more_supplies = PricingInputs {
            supplies_cost: base.supplies_cost + 100.0,
            ..base
        };
        assert!(compute_price(&more_supplies).total_price >= base_price);
    }

    #[test]
    fn test_engine_cache_hit_matches_direct_compute() {
        let engine = PricingEngine::new();
        let inputs = scenario_inputs();

        let first = engine.compute(&inputs);
        let second = engine.compute(&inputs);

        assert_eq!(first, second);
        assert_eq!(first, compute_price(&inputs));
        assert_eq!(engine.cache_len(), 1);
    }

    #[test]
    fn test_engine_cache_shared_by_equivalent_inputs() {
        // 钳制后等价的输入共享缓存条目
        let engine = PricingEngine::new();
        let excessive = PricingInputs {
            profit_multiplier: 1000.0,
            ..scenario_inputs()
        };
        let at_ceiling = PricingInputs {
            profit_multiplier: 20.0,
            ..scenario_inputs()
        };

        engine.compute(&excessive);
        engine.compute(&at_ceiling);
        assert_eq!(engine.cache_len(), 1);
    }

    #[test]
    fn test_engine_cache_bound() {
        let engine = PricingEngine::new();

        // 超过容量的不同输入, 缓存条目数保持在上限, 结果不受影响
        for i in 0..(DEFAULT_CACHE_CAPACITY + 10) {
            let inputs = PricingInputs {
                filament_grams: i as f64,
                ..scenario_inputs()
            };
            let cached = engine.compute(&inputs);
            assert_eq!(cached, compute_price(&inputs));
        }
        assert_eq!(engine.cache_len(), DEFAULT_CACHE_CAPACITY);

        // 最老条目已被淘汰, 重算结果仍然一致
        let oldest = PricingInputs {
            filament_grams: 0.0,
            ..scenario_inputs()
        };
        assert_eq!(engine.compute(&oldest), compute_price(&oldest));
    }
}
