// ==========================================
// 3D打印成本报价系统 - 配置管理API
// ==========================================
// 职责: 配置读写、定价预设管理 (写操作记录ActionLog)
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, PricingPreset};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::repository::ActionLogRepository;

// ==========================================
// ConfigApi
// ==========================================
pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl ConfigApi {
    /// 构造函数
    pub fn new(config_manager: Arc<ConfigManager>, action_log_repo: Arc<ActionLogRepository>) -> Self {
        Self {
            config_manager,
            action_log_repo,
        }
    }

    /// 读取配置值
    pub fn get_config(&self, key: &str) -> ApiResult<Option<String>> {
        self.config_manager
            .get_global_config_value(key)
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }

    /// 更新配置值
    pub fn update_config(&self, key: &str, value: &str, actor: &str) -> ApiResult<()> {
        if key.trim().is_empty() {
            return Err(ApiError::InvalidInput("配置键不能为空".to_string()));
        }

        self.config_manager
            .set_config_value(key, value)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let action_log = ActionLog::new(ActionType::UpdateConfig, actor.to_string())
            .with_payload(&serde_json::json!({ "key": key, "value": value }))
            .with_detail(format!("更新配置: {}", key));
        self.action_log_repo.insert(&action_log)?;

        Ok(())
    }

    /// 获取配置快照 (JSON)
    pub fn get_config_snapshot(&self) -> ApiResult<String> {
        self.config_manager
            .get_config_snapshot()
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }

    /// 从快照恢复配置
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str, actor: &str) -> ApiResult<()> {
        self.config_manager
            .restore_config_from_snapshot(snapshot_json)
            .map_err(|e| ApiError::ValidationError(format!("配置快照解析失败: {}", e)))?;

        let action_log = ActionLog::new(ActionType::UpdateConfig, actor.to_string())
            .with_detail("从快照恢复配置".to_string());
        self.action_log_repo.insert(&action_log)?;

        Ok(())
    }

    // ==========================================
    // 定价预设
    // ==========================================

    /// 保存定价预设
    pub fn save_preset(&self, preset: &PricingPreset, actor: &str) -> ApiResult<()> {
        if preset.preset_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("预设ID不能为空".to_string()));
        }
        if preset.title.trim().is_empty() {
            return Err(ApiError::InvalidInput("预设名称不能为空".to_string()));
        }

        self.config_manager
            .save_preset(preset)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let action_log = ActionLog::new(ActionType::SavePreset, actor.to_string())
            .with_payload(preset)
            .with_detail(format!("保存定价预设: {}", preset.title));
        self.action_log_repo.insert(&action_log)?;

        Ok(())
    }

    /// 读取定价预设
    pub fn get_preset(&self, preset_id: &str) -> ApiResult<PricingPreset> {
        self.config_manager
            .get_preset(preset_id)
            .map_err(|e| ApiError::InternalError(e.to_string()))?
            .ok_or_else(|| ApiError::NotFound(format!("预设{}不存在", preset_id)))
    }

    /// 列出全部定价预设
    pub fn list_presets(&self) -> ApiResult<Vec<PricingPreset>> {
        self.config_manager
            .list_presets()
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }

    /// 删除定价预设
    pub fn delete_preset(&self, preset_id: &str, actor: &str) -> ApiResult<()> {
        let removed = self
            .config_manager
            .delete_preset(preset_id)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        if !removed {
            return Err(ApiError::NotFound(format!("预设{}不存在", preset_id)));
        }

        let action_log = ActionLog::new(ActionType::DeletePreset, actor.to_string())
            .with_detail(format!("删除定价预设: {}", preset_id));
        self.action_log_repo.insert(&action_log)?;

        Ok(())
    }
}
