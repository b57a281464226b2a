// ==========================================
// CSV 导入工作进程 - 导入状态 Repository Trait
// ==========================================
// 职责: 定义 ImportStatus / ImportDetail 数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::ImportStatus;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ImportStatusRepository Trait
// ==========================================
// 用途: 导入状态机的持久化协作方
// 实现者: ImportStatusRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ImportStatusRepository: Send + Sync {
    /// 按文件路径加载导入状态（含全部明细，按插入顺序）
    ///
    /// # 返回
    /// - Ok(ImportStatus)
    /// - Err(NotFound): 无对应记录
    async fn get_by_file_path(&self, file_path: &str) -> RepositoryResult<ImportStatus>;

    /// 保存导入状态（按主键 upsert 全部列）
    ///
    /// 明细同样按主键 upsert；新明细写入后回填 id
    async fn save(&self, status: &mut ImportStatus) -> RepositoryResult<()>;

    /// PENDING → PROCESSING 原子切换
    ///
    /// # 返回
    /// - Ok(true): 本次调用完成切换
    /// - Ok(false): 记录已不是 PENDING（被其他调用抢先或已终结）
    async fn try_begin_processing(&self, id: i64) -> RepositoryResult<bool>;

    /// 登记一个待导入文件（PENDING），返回新记录 id
    async fn insert_pending(&self, file_path: &str) -> RepositoryResult<i64>;
}
