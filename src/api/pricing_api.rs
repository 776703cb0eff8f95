// ==========================================
// 3D打印成本报价系统 - 定价API
// ==========================================
// 职责: 报价计算、历史版本保存与回放
// 红线: 回放历史版本 = 用存储的输入重新计算, 必须复现存储的结果
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{parse_form, FieldIssue, RawQuoteForm};
use crate::config::ConfigManager;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::piece::QuoteVersion;
use crate::domain::pricing::{PricingInputs, PricingResult};
use crate::engine::PricingEngine;
use crate::perf::PerfGuard;
use crate::repository::{ActionLogRepository, PieceRepository, QuoteVersionRepository};

// ==========================================
// PricingApi
// ==========================================
pub struct PricingApi {
    engine: Arc<PricingEngine>,
    piece_repo: Arc<PieceRepository>,
    version_repo: Arc<QuoteVersionRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config_manager: Arc<ConfigManager>,
}

impl PricingApi {
    /// 构造函数
    pub fn new(
        engine: Arc<PricingEngine>,
        piece_repo: Arc<PieceRepository>,
        version_repo: Arc<QuoteVersionRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            engine,
            piece_repo,
            version_repo,
            action_log_repo,
            config_manager,
        }
    }

    // ==========================================
    // 计算接口
    // ==========================================

    /// 计算报价
    ///
    /// # 说明
    /// - 计算本身永不失败 (越界输入由引擎钳制)
    /// - 计算成功后把输入持久化为 last_inputs 供表单回填 (best-effort)
    pub fn compute_quote(&self, inputs: &PricingInputs) -> PricingResult {
        let _perf = PerfGuard::new("compute_quote");

        let result = self.engine.compute(inputs);

        // best-effort: 回填数据丢失不影响本次计算
        if let Err(e) = self.config_manager.save_last_inputs(inputs) {
            tracing::warn!("上次输入持久化失败: {}", e);
        }

        result
    }

    /// 从未分型表单计算报价
    ///
    /// # 返回
    /// - 计算结果 + 字段解析问题列表 (供前端提示)
    pub fn compute_from_form(&self, form: &RawQuoteForm) -> (PricingResult, Vec<FieldIssue>) {
        let (inputs, issues) = parse_form(form);
        let result = self.compute_quote(&inputs);
        (result, issues)
    }

    /// 套用预设后计算报价
    ///
    /// # 错误
    /// - `ApiError::NotFound`: 预设不存在
    pub fn compute_with_preset(
        &self,
        inputs: &PricingInputs,
        preset_id: &str,
    ) -> ApiResult<PricingResult> {
        let preset = self
            .config_manager
            .get_preset(preset_id)
            .map_err(|e| ApiError::InternalError(e.to_string()))?
            .ok_or_else(|| ApiError::NotFound(format!("预设{}不存在", preset_id)))?;

        let mut merged = *inputs;
        preset.apply_to(&mut merged);

        Ok(self.compute_quote(&merged))
    }

    /// 读取上次使用的输入 (表单回填)
    pub fn last_inputs(&self) -> ApiResult<Option<PricingInputs>> {
        self.config_manager
            .load_last_inputs()
            .map_err(|e| ApiError::InternalError(e.to_string()))
    }

    // ==========================================
    // 版本接口
    // ==========================================

    /// 保存报价版本快照
    ///
    /// # 参数
    /// - piece_id: 归属模型ID
    /// - inputs: 定价输入 (结果由引擎现算, 不接受外部传入的结果)
    /// - note: 备注 (可选)
    /// - created_by: 操作人
    ///
    /// # 返回
    /// - Ok(QuoteVersion): 已持久化的版本 (version_no 由仓储层在事务内分配)
    pub fn save_version(
        &self,
        piece_id: &str,
        inputs: &PricingInputs,
        note: Option<String>,
        created_by: &str,
    ) -> ApiResult<QuoteVersion> {
        let _perf = PerfGuard::new("save_version");

        // 参数验证
        if piece_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("模型ID不能为空".to_string()));
        }
        if created_by.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作人不能为空".to_string()));
        }

        // 检查模型是否存在
        let piece = self
            .piece_repo
            .find_by_id(piece_id)?
            .ok_or_else(|| ApiError::NotFound(format!("模型{}不存在", piece_id)))?;

        // 结果由引擎现算, 保证快照对 = (输入, 引擎(输入))
        let result = self.engine.compute(inputs);

        let inputs_json = serde_json::to_string(inputs)
            .map_err(|e| ApiError::InternalError(format!("输入序列化失败: {}", e)))?;
        let result_json = serde_json::to_string(&result)
            .map_err(|e| ApiError::InternalError(format!("结果序列化失败: {}", e)))?;

        // 创建版本实例 (version_no 由仓储层在事务内分配, 避免并发冲突)
        let mut version = QuoteVersion {
            version_id: uuid::Uuid::new_v4().to_string(),
            piece_id: piece_id.to_string(),
            version_no: 0,
            inputs_json,
            result_json,
            total_price: result.total_price,
            note: note.clone(),
            created_by: Some(created_by.to_string()),
            created_at: chrono::Utc::now().naive_utc(),
        };

        self.version_repo.create_with_next_version_no(&mut version)?;

        // 记录ActionLog
        let action_log = ActionLog::new(ActionType::SaveVersion, created_by.to_string())
            .with_piece_id(piece_id.to_string())
            .with_payload(&serde_json::json!({
                "version_id": version.version_id,
                "version_no": version.version_no,
                "total_price": result.total_price,
            }))
            .with_detail(format!("保存报价版本: {} V{}", piece.piece_name, version.version_no));

        self.action_log_repo.insert(&action_log)?;

        Ok(version)
    }

    /// 回放历史版本
    ///
    /// # 说明
    /// 把存储的输入重新送入引擎; 引擎是纯函数, 结果必须与存储的快照一致。
    /// 若不一致 (数据被外部篡改) 只记警告, 以重算结果为准。
    ///
    /// # 返回
    /// - Ok((输入, 重算结果))
    pub fn restore_version(
        &self,
        version_id: &str,
        actor: &str,
    ) -> ApiResult<(PricingInputs, PricingResult)> {
        let _perf = PerfGuard::new("restore_version");

        let version = self
            .version_repo
            .find_by_id(version_id)?
            .ok_or_else(|| ApiError::NotFound(format!("版本{}不存在", version_id)))?;

        let inputs = version
            .inputs()
            .map_err(|e| ApiError::ValidationError(format!("输入快照损坏: {}", e)))?;

        let recomputed = self.engine.compute(&inputs);

        // 一致性校验: 引擎确定性保证重算结果与存储快照一致
        match version.result() {
            Ok(stored) if stored != recomputed => {
                tracing::warn!(
                    version_id = %version.version_id,
                    stored_total = stored.total_price,
                    recomputed_total = recomputed.total_price,
                    "历史版本结果与重算不一致, 以重算为准"
                );
            }
            Err(e) => {
                tracing::warn!(
                    version_id = %version.version_id,
                    "结果快照损坏, 以重算为准: {}",
                    e
                );
            }
            _ => {}
        }

        let action_log = ActionLog::new(ActionType::RestoreVersion, actor.to_string())
            .with_piece_id(version.piece_id.clone())
            .with_detail(format!("回放报价版本: V{}", version.version_no));

        self.action_log_repo.insert(&action_log)?;

        Ok((inputs, recomputed))
    }
}
