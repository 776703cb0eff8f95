// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use print_quote::db;
use print_quote::domain::pricing::PricingInputs;
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = db::open_sqlite_connection(&db_path)?;
    db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接 (统一 PRAGMA)
pub fn open_test_connection(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    let conn = db::open_sqlite_connection(db_path)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 基准定价输入场景
pub fn sample_inputs() -> PricingInputs {
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
