// ==========================================
// CSV 导入工作进程 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化
// ==========================================

pub mod error;
pub mod import_status_repo;
pub mod import_status_repo_impl;
pub mod user_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use import_status_repo::ImportStatusRepository;
pub use import_status_repo_impl::ImportStatusRepositoryImpl;
pub use user_repo::UserRepository;
