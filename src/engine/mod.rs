// ==========================================
// CSV 导入工作进程 - 引擎层
// ==========================================
// 职责:
// - ImportOrchestrator: 单文件导入状态机
// - BatchDispatcher: 批量通知并发分发
// 红线: 引擎不拼 SQL，持久化经 Repository
// ==========================================

pub mod batch_dispatcher;
pub mod import_orchestrator;

// 重导出核心引擎
pub use batch_dispatcher::{
    BatchDispatcher, BatchResponse, ImportPipelines, NotificationOutcome, BATCH_SUCCESS_STATUS,
};
pub use import_orchestrator::{ImportOrchestrator, ImportSummary, OrchestratorOptions};
