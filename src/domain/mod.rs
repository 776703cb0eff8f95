// ==========================================
// 3D打印成本报价系统 - 领域层
// ==========================================
// 职责: 实体与值对象定义，不含业务规则
// ==========================================

pub mod action_log;
pub mod piece;
pub mod pricing;
pub mod types;

// 重导出核心实体
pub use action_log::{ActionLog, ActionType};
pub use piece::{Piece, QuoteVersion};
pub use pricing::{PricingInputs, PricingResult};
pub use types::ClampField;
