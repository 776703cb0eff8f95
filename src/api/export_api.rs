// ==========================================
// 3D打印成本报价系统 - 导出API
// ==========================================
// 职责: 报价单渲染与历史导出
// 红线: 导出/渲染只读取存储的快照, 绝不重算数字
// ==========================================

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::action_log::{ActionLog, ActionType};
use crate::perf::PerfGuard;
use crate::quote::{write_history_csv, QuoteRenderer};
use crate::repository::{ActionLogRepository, PieceRepository, QuoteVersionRepository};

// ==========================================
// ExportApi
// ==========================================
pub struct ExportApi {
    piece_repo: Arc<PieceRepository>,
    version_repo: Arc<QuoteVersionRepository>,
    action_log_repo: Arc<ActionLogRepository>,
    config_manager: Arc<ConfigManager>,
}

impl ExportApi {
    /// 构造函数
    pub fn new(
        piece_repo: Arc<PieceRepository>,
        version_repo: Arc<QuoteVersionRepository>,
        action_log_repo: Arc<ActionLogRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            piece_repo,
            version_repo,
            action_log_repo,
            config_manager,
        }
    }

    /// 渲染历史版本的报价单 (纯文本)
    ///
    /// # 说明
    /// 输入与结果均取自存储的快照, 渲染层不做任何重算。
    pub fn render_quote(&self, version_id: &str) -> ApiResult<String> {
        let version = self
            .version_repo
            .find_by_id(version_id)?
            .ok_or_else(|| ApiError::NotFound(format!("版本{}不存在", version_id)))?;

        let piece = self
            .piece_repo
            .find_by_id(&version.piece_id)?
            .ok_or_else(|| ApiError::NotFound(format!("模型{}不存在", version.piece_id)))?;

        let inputs = version
            .inputs()
            .map_err(|e| ApiError::ValidationError(format!("输入快照损坏: {}", e)))?;
        let result = version
            .result()
            .map_err(|e| ApiError::ValidationError(format!("结果快照损坏: {}", e)))?;

        let currency_symbol = self
            .config_manager
            .currency_symbol()
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let renderer = QuoteRenderer::new(currency_symbol);
        Ok(renderer.render(
            &piece.piece_name,
            Some(version.version_no),
            version.created_at,
            &inputs,
            &result,
        ))
    }

    /// 导出模型的报价历史为 CSV 文件
    ///
    /// # 返回
    /// - Ok(usize): 导出的数据行数
    pub fn export_history_csv<P: AsRef<Path>>(
        &self,
        piece_id: &str,
        path: P,
        actor: &str,
    ) -> ApiResult<usize> {
        let _perf = PerfGuard::new("export_history_csv");

        let piece = self
            .piece_repo
            .find_by_id(piece_id)?
            .ok_or_else(|| ApiError::NotFound(format!("模型{}不存在", piece_id)))?;

        let versions = self.version_repo.find_by_piece_id(piece_id)?;

        let file = File::create(path.as_ref())
            .map_err(|e| ApiError::ExportError(format!("创建导出文件失败: {}", e)))?;

        let rows = write_history_csv(file, &piece, &versions)
            .map_err(|e| ApiError::ExportError(e.to_string()))?;

        let action_log = ActionLog::new(ActionType::ExportHistory, actor.to_string())
            .with_piece_id(piece_id.to_string())
            .with_payload(&serde_json::json!({
                "rows": rows,
                "path": path.as_ref().display().to_string(),
            }))
            .with_detail(format!("导出报价历史: {} ({}行)", piece.piece_name, rows));
        self.action_log_repo.insert(&action_log)?;

        Ok(rows)
    }
}
