// ==========================================
// 3D打印成本报价系统 - 模型API
// ==========================================
// 职责: 模型 CRUD 与报价历史查询
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::piece::{Piece, QuoteVersion};
use crate::i18n::t;
use crate::perf::PerfGuard;
use crate::repository::{ActionLogRepository, PieceRepository, QuoteVersionRepository};

// ==========================================
// PieceApi
// ==========================================
pub struct PieceApi {
    piece_repo: Arc<PieceRepository>,
    version_repo: Arc<QuoteVersionRepository>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl PieceApi {
    /// 构造函数
    pub fn new(
        piece_repo: Arc<PieceRepository>,
        version_repo: Arc<QuoteVersionRepository>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            piece_repo,
            version_repo,
            action_log_repo,
        }
    }

    /// 创建模型
    ///
    /// # 参数
    /// - piece_name: 模型名称 (非空, 全局唯一)
    /// - description: 说明 (可选)
    /// - created_by: 创建人
    pub fn create_piece(
        &self,
        piece_name: &str,
        description: Option<String>,
        created_by: &str,
    ) -> ApiResult<Piece> {
        let name = piece_name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput(t("validator.empty_piece_name")));
        }
        if created_by.trim().is_empty() {
            return Err(ApiError::InvalidInput("操作人不能为空".to_string()));
        }

        // 先查重, 给出可读错误 (数据库唯一约束仍是兜底)
        if self.piece_repo.find_by_name(name)?.is_some() {
            return Err(ApiError::BusinessRuleViolation(format!(
                "模型名称{}已存在",
                name
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        let piece = Piece {
            piece_id: uuid::Uuid::new_v4().to_string(),
            piece_name: name.to_string(),
            description,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
            revision: 1,
        };

        self.piece_repo.create(&piece)?;

        let action_log = ActionLog::new(ActionType::CreatePiece, created_by.to_string())
            .with_piece_id(piece.piece_id.clone())
            .with_detail(format!("创建模型: {}", piece.piece_name));
        self.action_log_repo.insert(&action_log)?;

        Ok(piece)
    }

    /// 更新模型 (名称/说明, 带乐观锁)
    ///
    /// # 错误
    /// - `ApiError::OptimisticLockFailure`: 其他用户已更新
    pub fn update_piece(&self, piece: &Piece, actor: &str) -> ApiResult<()> {
        if piece.piece_name.trim().is_empty() {
            return Err(ApiError::InvalidInput(t("validator.empty_piece_name")));
        }

        self.piece_repo.update(piece)?;

        let action_log = ActionLog::new(ActionType::UpdatePiece, actor.to_string())
            .with_piece_id(piece.piece_id.clone())
            .with_detail(format!("更新模型: {}", piece.piece_name));
        self.action_log_repo.insert(&action_log)?;

        Ok(())
    }

    /// 删除模型 (级联删除其全部报价版本)
    pub fn delete_piece(&self, piece_id: &str, actor: &str) -> ApiResult<()> {
        let piece = self
            .piece_repo
            .find_by_id(piece_id)?
            .ok_or_else(|| ApiError::NotFound(format!("模型{}不存在", piece_id)))?;

        self.piece_repo.delete(piece_id)?;

        let action_log = ActionLog::new(ActionType::DeletePiece, actor.to_string())
            .with_piece_id(piece_id.to_string())
            .with_detail(format!("删除模型: {}", piece.piece_name));
        self.action_log_repo.insert(&action_log)?;

        Ok(())
    }

    /// 查询模型列表
    pub fn list_pieces(&self) -> ApiResult<Vec<Piece>> {
        let _perf = PerfGuard::new("list_pieces");
        Ok(self.piece_repo.list_all()?)
    }

    /// 查询单个模型
    pub fn get_piece(&self, piece_id: &str) -> ApiResult<Piece> {
        self.piece_repo
            .find_by_id(piece_id)?
            .ok_or_else(|| ApiError::NotFound(format!("模型{}不存在", piece_id)))
    }

    /// 查询模型的报价历史 (版本号倒序)
    pub fn list_versions(&self, piece_id: &str) -> ApiResult<Vec<QuoteVersion>> {
        if piece_id.trim().is_empty() {
            return Err(ApiError::InvalidInput("模型ID不能为空".to_string()));
        }
        Ok(self.version_repo.find_by_piece_id(piece_id)?)
    }

    /// 删除报价版本
    pub fn delete_version(&self, version_id: &str, actor: &str) -> ApiResult<()> {
        let version = self
            .version_repo
            .find_by_id(version_id)?
            .ok_or_else(|| ApiError::NotFound(format!("版本{}不存在", version_id)))?;

        self.version_repo.delete(version_id)?;

        let action_log = ActionLog::new(ActionType::DeleteVersion, actor.to_string())
            .with_piece_id(version.piece_id.clone())
            .with_detail(format!("删除报价版本: V{}", version.version_no));
        self.action_log_repo.insert(&action_log)?;

        Ok(())
    }
}
