// ==========================================
// CSV 导入工作进程 - 核心库
// ==========================================
// 技术栈: Tokio + Rust + SQLite（本地）/ S3 + SQS（云端）
// 系统定位: 接收文件到达通知，校验 CSV 并将有效行投递到下游队列
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "ja");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 编码 / 表头 / 解析 / 行校验 / 投递
pub mod importer;

// 引擎层 - 状态机与批量分发
pub mod engine;

// 网关层 - 对象存储与消息队列
pub mod gateway;

// 配置层 - 启动配置与运行期配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::{
    BatchEvent, ImportDetail, ImportState, ImportStatus, ImportTarget, Notification, UserRow,
};
pub use engine::{BatchDispatcher, BatchResponse, ImportOrchestrator, ImportSummary};
pub use importer::{ImportError, ImportResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "csv-import-worker";
