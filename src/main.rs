// ==========================================
// 3D打印成本报价系统 - 命令行入口
// ==========================================
// 用途: 诊断/演示; 初始化应用状态, 计算一次报价并打印报价单与统计
//
// 使用:
//   cargo run -- [db_path]
// ==========================================

use print_quote::app::{get_default_db_path, AppState};
use print_quote::domain::pricing::PricingInputs;
use print_quote::quote::QuoteRenderer;

fn main() {
    // 初始化日志系统
    print_quote::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", print_quote::APP_NAME);
    tracing::info!("系统版本: {}", print_quote::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = std::env::args()
        .nth(1)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    // 创建AppState
    let app_state = AppState::new(db_path).expect("无法初始化AppState");

    // 上次输入优先, 否则用演示输入
    let inputs = match app_state.pricing_api.last_inputs() {
        Ok(Some(saved)) => {
            tracing::info!("使用上次保存的输入");
            saved
        }
        Ok(None) => demo_inputs(),
        Err(e) => {
            tracing::warn!("上次输入读取失败, 使用演示输入: {}", e);
            demo_inputs()
        }
    };

    let result = app_state.pricing_api.compute_quote(&inputs);

    // 渲染并打印报价单
    let currency_symbol = app_state
        .config_api
        .get_config("currency_symbol")
        .ok()
        .flatten()
        .unwrap_or_else(|| "¥".to_string());
    let renderer = QuoteRenderer::new(currency_symbol);
    let doc = renderer.render(
        "演示模型",
        None,
        chrono::Utc::now().naive_utc(),
        &inputs,
        &result,
    );
    println!("{}", doc);
    println!();

    // 打印后台统计
    match app_state.dashboard_api.get_statistics() {
        Ok(stats) => {
            println!("模型数: {}", stats.piece_count);
            println!("报价版本数: {}", stats.version_count);
            println!("报价总额: {:.2}", stats.quoted_total);
        }
        Err(e) => {
            tracing::warn!("统计查询失败: {}", e);
        }
    }
}

/// 演示输入 (常见 FDM 作业)
fn demo_inputs() -> PricingInputs {
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
