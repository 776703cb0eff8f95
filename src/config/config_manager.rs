// ==========================================
// 3D打印成本报价系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::pricing_preset::PricingPreset;
use crate::db::open_sqlite_connection;
use crate::domain::pricing::PricingInputs;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 货币符号配置键
const KEY_CURRENCY_SYMBOL: &str = "currency_symbol";

/// 上次使用的定价输入配置键
const KEY_LAST_INPUTS: &str = "last_inputs";

/// 定价预设键前缀
const PRESET_KEY_PREFIX: &str = "pricing_preset/";

/// 默认货币符号
pub const DEFAULT_CURRENCY_SYMBOL: &str = "¥";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 的配置值（upsert）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value, updated_at)
               VALUES ('global', ?1, ?2, datetime('now'))
               ON CONFLICT(scope_id, key)
               DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
            params![key, value],
        )?;

        Ok(())
    }

    /// 删除 global scope 的配置值
    pub fn delete_config_value(&self, key: &str) -> Result<bool, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let affected = conn.execute(
            "DELETE FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
        )?;

        Ok(affected > 0)
    }

    // ==========================================
    // 展示配置
    // ==========================================

    /// 货币符号（展示层使用）
    pub fn currency_symbol(&self) -> Result<String, Box<dyn Error>> {
        self.get_config_or_default(KEY_CURRENCY_SYMBOL, DEFAULT_CURRENCY_SYMBOL)
    }

    // ==========================================
    // 上次使用的输入 (表单回填)
    // ==========================================

    /// 持久化上次使用的定价输入
    pub fn save_last_inputs(&self, inputs: &PricingInputs) -> Result<(), Box<dyn Error>> {
        let value = serde_json::to_string(inputs)?;
        self.set_config_value(KEY_LAST_INPUTS, &value)
    }

    /// 读取上次使用的定价输入
    ///
    /// 说明：历史数据缺字段时由 serde 默认值兜底，解析失败返回 None（不报错）。
    pub fn load_last_inputs(&self) -> Result<Option<PricingInputs>, Box<dyn Error>> {
        let raw = match self.get_config_value(KEY_LAST_INPUTS)? {
            Some(v) => v,
            None => return Ok(None),
        };

        match serde_json::from_str::<PricingInputs>(&raw) {
            Ok(inputs) => Ok(Some(inputs)),
            Err(e) => {
                tracing::warn!("上次输入解析失败, 忽略: {}", e);
                Ok(None)
            }
        }
    }

    // ==========================================
    // 定价预设 (存储于 config_kv: pricing_preset/{preset_id})
    // ==========================================

    /// 保存定价预设
    pub fn save_preset(&self, preset: &PricingPreset) -> Result<(), Box<dyn Error>> {
        let id = preset.preset_id.trim();
        if id.is_empty() {
            return Err("预设ID不能为空".into());
        }

        let key = format!("{}{}", PRESET_KEY_PREFIX, id);
        let value = serde_json::to_string(preset)?;
        self.set_config_value(&key, &value)
    }

    /// 读取定价预设
    pub fn get_preset(&self, preset_id: &str) -> Result<Option<PricingPreset>, Box<dyn Error>> {
        let id = preset_id.trim();
        if id.is_empty() {
            return Ok(None);
        }

        let key = format!("{}{}", PRESET_KEY_PREFIX, id);
        let raw = match self.get_config_value(&key)? {
            Some(v) => v,
            None => return Ok(None),
        };

        let preset: PricingPreset = serde_json::from_str(&raw)?;
        Ok(Some(preset))
    }

    /// 列出全部定价预设
    pub fn list_presets(&self) -> Result<Vec<PricingPreset>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT value FROM config_kv
             WHERE scope_id = 'global' AND key LIKE ?1
             ORDER BY key",
        )?;

        let pattern = format!("{}%", PRESET_KEY_PREFIX);
        let rows = stmt.query_map(params![pattern], |row| row.get::<_, String>(0))?;

        let mut presets = Vec::new();
        for row in rows {
            let raw = row?;
            match serde_json::from_str::<PricingPreset>(&raw) {
                Ok(preset) => presets.push(preset),
                Err(e) => {
                    // 坏数据跳过, 不让单条脏记录拖垮整个列表
                    tracing::warn!("预设解析失败, 跳过: {}", e);
                }
            }
        }

        Ok(presets)
    }

    /// 删除定价预设
    pub fn delete_preset(&self, preset_id: &str) -> Result<bool, Box<dyn Error>> {
        let key = format!("{}{}", PRESET_KEY_PREFIX, preset_id.trim());
        self.delete_config_value(&key)
    }

    // ==========================================
    // 配置快照
    // ==========================================

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 诊断导出 / 配置备份
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn
            .prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 从配置快照恢复配置
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<(), Box<dyn Error>> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        for (key, value) in &config_map {
            self.set_config_value(key, value)?;
        }

        Ok(())
    }
}
