// ==========================================
// 3D打印成本报价系统 - 模型与报价版本领域模型
// ==========================================
// 用途: 报价历史回溯 (每次保存产生一个不可变版本快照)
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::pricing::{PricingInputs, PricingResult};

// ==========================================
// Piece - 模型 (报价历史的归属实体)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Piece {
    pub piece_id: String,            // 模型ID
    pub piece_name: String,          // 模型名称 (唯一)
    pub description: Option<String>, // 说明 (可选)
    pub created_by: String,          // 创建人
    pub created_at: NaiveDateTime,   // 创建时间
    pub updated_at: NaiveDateTime,   // 更新时间
    pub revision: i32,               // 乐观锁：修订号
}

// ==========================================
// QuoteVersion - 报价版本快照
// ==========================================
// 红线: 创建后不可变; 回放时将 inputs 重新送入引擎必须复现相同结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteVersion {
    pub version_id: String,        // 版本ID
    pub piece_id: String,          // 关联模型
    pub version_no: i32,           // 版本号 (按模型递增)
    pub inputs_json: String,       // 输入快照 (JSON, camelCase)
    pub result_json: String,       // 结果快照 (JSON, camelCase)
    pub total_price: f64,          // 销售价格 (冗余列, 用于统计聚合)
    pub note: Option<String>,      // 备注
    pub created_by: Option<String>, // 创建人
    pub created_at: NaiveDateTime, // 创建时间
}

impl QuoteVersion {
    /// 解析输入快照
    pub fn inputs(&self) -> Result<PricingInputs, serde_json::Error> {
        serde_json::from_str(&self.inputs_json)
    }

    /// 解析结果快照
    pub fn result(&self) -> Result<PricingResult, serde_json::Error> {
        serde_json::from_str(&self.result_json)
    }
}
