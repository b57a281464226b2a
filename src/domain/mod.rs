// ==========================================
// CSV 导入工作进程 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、行结构描述
// 红线: 不含数据访问逻辑,不含导入流程逻辑
// ==========================================

pub mod import_status;
pub mod notification;
pub mod row_schema;
pub mod types;
pub mod user;

// 重导出核心类型
pub use import_status::{ImportDetail, ImportStatus, StatusRuleViolation};
pub use notification::{BatchEvent, Notification, QueueMessage};
pub use row_schema::{FieldRule, FieldSpec, FieldValue, ImportRow, RowSchema};
pub use types::{ImportState, ImportTarget, UnrecoveredFailurePolicy};
pub use user::{UserRow, USER_EMAIL_SET, USER_SCHEMA};
