// ==========================================
// 定价引擎集成测试
// ==========================================
// 测试目标: 验证定价推导、钳制口径、缓存与序列化回放
// ==========================================

mod test_helpers;

use print_quote::domain::pricing::{PricingInputs, PricingResult};
use print_quote::engine::{compute_price, PricingEngine, DEFAULT_CACHE_CAPACITY};
use test_helpers::sample_inputs;

#[test]
fn test_scenario_final_prices() {
    let result = compute_price(&sample_inputs());

    assert_eq!(result.total_price, 4212.5);
    assert_eq!(result.marketplace_price, 4844.375);
}

#[test]
fn test_determinism_across_repeated_calls() {
    let inputs = sample_inputs();

    let first = compute_price(&inputs);
    for _ in 0..10 {
        let next = compute_price(&inputs);
        // 逐位一致
        assert_eq!(first.total_price.to_bits(), next.total_price.to_bits());
        assert_eq!(
            first.marketplace_price.to_bits(),
            next.marketplace_price.to_bits()
        );
        assert_eq!(first, next);
    }
}

#[test]
fn test_serde_round_trip_reproduces_result() {
    // 历史版本回放路径: 序列化输入 → 反序列化 → 重算 → 结果一致
    let inputs = sample_inputs();
    let result = compute_price(&inputs);

    let inputs_json = serde_json::to_string(&inputs).unwrap();
    let result_json = serde_json::to_string(&result).unwrap();

    let recovered_inputs: PricingInputs = serde_json::from_str(&inputs_json).unwrap();
    let recovered_result: PricingResult = serde_json::from_str(&result_json).unwrap();

    let recomputed = compute_price(&recovered_inputs);
    assert_eq!(recomputed, recovered_result);
    assert_eq!(recomputed.total_price.to_bits(), result.total_price.to_bits());
}

#[test]
fn test_camel_case_compatibility_with_persisted_records() {
    // 与既有持久化记录的字段名兼容 (camelCase)
    let raw = r#"{
        "materialPricePerKg": 20000,
        "energyPricePerKwh": 150,
        "devicePowerWatts": 200,
        "wearLifetimeHours": 500,
        "replacementPartsCost": 10000,
        "errorMarginPercent": 10,
        "printHours": 2,
        "printMinutes": 30,
        "filamentGrams": 50,
        "suppliesCost": 500,
        "profitMultiplier": 3,
        "marketplaceFeePercent": 15
    }"#;

    let inputs: PricingInputs = serde_json::from_str(raw).unwrap();
    assert_eq!(inputs, sample_inputs());
    assert_eq!(compute_price(&inputs).total_price, 4212.5);
}

#[test]
fn test_clamp_equivalence_classes() {
    // 超限输入与钳制边界产生完全相同的报价
    let cases = [
        (
            PricingInputs {
                profit_multiplier: 1000.0,
                ..sample_inputs()
            },
            PricingInputs {
                profit_multiplier: 20.0,
                ..sample_inputs()
            },
        ),
        (
            PricingInputs {
                wear_lifetime_hours: -5.0,
                ..sample_inputs()
            },
            PricingInputs {
                wear_lifetime_hours: 1.0,
                ..sample_inputs()
            },
        ),
        (
            PricingInputs {
                error_margin_percent: 999.0,
                ..sample_inputs()
            },
            PricingInputs {
                error_margin_percent: 200.0,
                ..sample_inputs()
            },
        ),
        (
            PricingInputs {
                marketplace_fee_percent: 80.0,
                ..sample_inputs()
            },
            PricingInputs {
                marketplace_fee_percent: 50.0,
                ..sample_inputs()
            },
        ),
    ];

    for (raw, clamped) in cases {
        assert_eq!(compute_price(&raw), compute_price(&clamped));
    }
}

#[test]
fn test_supplies_delta_is_exact() {
    let base = sample_inputs();
    let base_result = compute_price(&base);

    for delta in [1.0, 250.0, 10_000.0] {
        let changed = PricingInputs {
            supplies_cost: base.supplies_cost + delta,
            ..base
        };
        let changed_result = compute_price(&changed);
        // 辅料只加不乘: 销售价格变化正好等于辅料差
        assert_eq!(changed_result.total_price, base_result.total_price + delta);
    }
}

#[test]
fn test_engine_cache_eviction_preserves_results() {
    let engine = PricingEngine::new();

    // 产生超过缓存容量的不同输入
    let mut expected = Vec::new();
    for i in 0..(DEFAULT_CACHE_CAPACITY + 20) {
        let inputs = PricingInputs {
            filament_grams: (i as f64) * 10.0,
            ..sample_inputs()
        };
        expected.push((inputs, compute_price(&inputs)));
        engine.compute(&inputs);
    }

    assert_eq!(engine.cache_len(), DEFAULT_CACHE_CAPACITY);

    // 无论命中还是被淘汰后重算, 结果都与纯函数一致
    for (inputs, want) in &expected {
        assert_eq!(engine.compute(inputs), *want);
    }
}

#[test]
fn test_total_on_pathological_inputs() {
    // 引擎是全函数: 任意数值输入都产出有限结果
    let pathological = PricingInputs {
        material_price_per_kg: f64::NAN,
        energy_price_per_kwh: f64::INFINITY,
        device_power_watts: -500.0,
        wear_lifetime_hours: 0.0,
        replacement_parts_cost: f64::NEG_INFINITY,
        error_margin_percent: 1e9,
        print_hours: f64::NAN,
        print_minutes: -30.0,
        filament_grams: f64::INFINITY,
        supplies_cost: -1.0,
        profit_multiplier: f64::NAN,
        marketplace_fee_percent: 1e6,
    };

    let result = compute_price(&pathological);
    assert!(result.total_price.is_finite());
    assert!(result.marketplace_price.is_finite());
    assert!(result.total_price >= 0.0);
}
