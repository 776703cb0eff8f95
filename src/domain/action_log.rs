// ==========================================
// 3D打印成本报价系统 - 操作日志领域模型
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
// 红线: 所有写入必须记录
// 用途: 审计追踪, 后台统计
// 对齐: action_log 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,          // 日志ID
    pub piece_id: Option<String>,   // 关联模型 (配置更新等系统操作可为None)
    pub action_type: String,        // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime,   // 操作时间戳
    pub actor: String,              // 操作人
    pub payload_json: Option<JsonValue>, // 操作参数 (JSON)
    pub detail: Option<String>,     // 详细描述
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    CreatePiece,    // 创建模型
    UpdatePiece,    // 更新模型
    DeletePiece,    // 删除模型
    SaveVersion,    // 保存报价版本
    DeleteVersion,  // 删除报价版本
    RestoreVersion, // 回放历史版本
    UpdateConfig,   // 更新配置
    SavePreset,     // 保存定价预设
    DeletePreset,   // 删除定价预设
    ExportHistory,  // 导出历史
}

// ==========================================
// ActionType 辅助方法
// ==========================================
impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CreatePiece => "CreatePiece",
            ActionType::UpdatePiece => "UpdatePiece",
            ActionType::DeletePiece => "DeletePiece",
            ActionType::SaveVersion => "SaveVersion",
            ActionType::DeleteVersion => "DeleteVersion",
            ActionType::RestoreVersion => "RestoreVersion",
            ActionType::UpdateConfig => "UpdateConfig",
            ActionType::SavePreset => "SavePreset",
            ActionType::DeletePreset => "DeletePreset",
            ActionType::ExportHistory => "ExportHistory",
        }
    }

    /// 从字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CreatePiece" => Some(ActionType::CreatePiece),
            "UpdatePiece" => Some(ActionType::UpdatePiece),
            "DeletePiece" => Some(ActionType::DeletePiece),
            "SaveVersion" => Some(ActionType::SaveVersion),
            "DeleteVersion" => Some(ActionType::DeleteVersion),
            "RestoreVersion" => Some(ActionType::RestoreVersion),
            "UpdateConfig" => Some(ActionType::UpdateConfig),
            "SavePreset" => Some(ActionType::SavePreset),
            "DeletePreset" => Some(ActionType::DeletePreset),
            "ExportHistory" => Some(ActionType::ExportHistory),
            _ => None,
        }
    }
}

// ==========================================
// ActionLog 辅助方法
// ==========================================
impl ActionLog {
    /// 创建新的操作日志
    ///
    /// # 参数
    /// - `action_type`: 操作类型
    /// - `actor`: 操作人
    pub fn new(action_type: ActionType, actor: String) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            piece_id: None,
            action_type: action_type.as_str().to_string(),
            action_ts: chrono::Utc::now().naive_utc(),
            actor,
            payload_json: None,
            detail: None,
        }
    }

    /// 设置关联模型
    pub fn with_piece_id(mut self, piece_id: String) -> Self {
        self.piece_id = Some(piece_id);
        self
    }

    /// 设置操作负载 (转换为JSON)
    pub fn with_payload<T: Serialize>(mut self, payload: &T) -> Self {
        self.payload_json = serde_json::to_value(payload).ok();
        self
    }

    /// 设置详细描述
    pub fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }
}
