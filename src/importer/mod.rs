// ==========================================
// CSV 导入工作进程 - 导入层
// ==========================================
// 职责: 单个文件的编码规范化 / 表头校验 / 解析 / 行校验 / 行投递
// 状态机推进在 engine::import_orchestrator
// ==========================================

pub mod encoding;
pub mod error;
pub mod file_parser;
pub mod header_validator;
pub mod row_sink;
pub mod row_validator;

// 重导出核心类型
pub use encoding::{EncodingAction, EncodingNormalizer};
pub use error::{ImportError, ImportResult};
pub use file_parser::CsvParser;
pub use header_validator::HeaderValidator;
pub use row_sink::{QueueRowSink, RowSink};
pub use row_validator::{ReferenceData, RowValidator};
