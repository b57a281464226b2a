// ==========================================
// CSV 导入工作进程 - 导入状态实体
// ==========================================
// 职责: ImportStatus / ImportDetail 实体与状态转换规则
// 红线:
// - 状态单向流转，终态不可再修改
// - record_count 仅设置一次
// - processed_count 只增不减，且不超过 record_count
// - ImportDetail 只追加，不修改、不删除
// ==========================================

use crate::domain::types::ImportState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// 实体不变量被破坏时返回的错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusRuleViolation {
    #[error("无效的状态转换: {from} → {to}")]
    InvalidTransition { from: ImportState, to: ImportState },

    #[error("记录数已设置 (record_count={0})，不可重复设置")]
    RecordCountAlreadySet(usize),

    #[error("已处理行数超出记录数 (record_count={0})")]
    ProcessedCountOverflow(usize),
}

// ==========================================
// ImportStatus - 文件导入状态
// ==========================================
// 对齐: import_status 表（file_path 唯一）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportStatus {
    pub id: i64,                       // 主键
    pub file_name: String,             // 文件名
    pub file_path: String,             // 对象键（业务唯一键）
    pub record_count: usize,           // 解析出的总行数
    pub processed_count: usize,        // 已处理行数
    pub status: ImportState,           // 导入状态
    pub created_at: DateTime<Utc>,     // 创建时间
    pub updated_at: DateTime<Utc>,     // 更新时间
    pub details: Vec<ImportDetail>,    // 明细（插入顺序 = 时间顺序）
}

impl ImportStatus {
    /// 创建 PENDING 状态的导入记录（由文件投递方调用）
    pub fn new_pending(file_path: &str) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            file_name: file_name_of(file_path),
            file_path: file_path.to_string(),
            record_count: 0,
            processed_count: 0,
            status: ImportState::Pending,
            created_at: now,
            updated_at: now,
            details: Vec::new(),
        }
    }

    /// 是否处于 PENDING 状态
    pub fn is_pending(&self) -> bool {
        self.status == ImportState::Pending
    }

    /// PENDING → PROCESSING
    pub fn start_processing(&mut self) -> Result<(), StatusRuleViolation> {
        self.transition(ImportState::Processing)
    }

    /// PROCESSING → FINISHED
    pub fn finish(&mut self) -> Result<(), StatusRuleViolation> {
        self.transition(ImportState::Finished)
    }

    /// PROCESSING → FAILED，并追加一条文件级明细
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), StatusRuleViolation> {
        self.transition(ImportState::Failed)?;
        self.details.push(ImportDetail::new(self.id, None, message));
        Ok(())
    }

    /// 追加行级明细
    pub fn append_row_detail(&mut self, row_number: usize, message: impl Into<String>) {
        self.details
            .push(ImportDetail::new(self.id, Some(row_number), message));
        self.touch();
    }

    /// 设置记录数（解析成功后仅一次）
    pub fn set_record_count(&mut self, count: usize) -> Result<(), StatusRuleViolation> {
        if self.record_count != 0 {
            return Err(StatusRuleViolation::RecordCountAlreadySet(self.record_count));
        }
        self.record_count = count;
        self.touch();
        Ok(())
    }

    /// 已处理行数 +1
    pub fn increment_processed_count(&mut self) -> Result<(), StatusRuleViolation> {
        if self.processed_count >= self.record_count {
            return Err(StatusRuleViolation::ProcessedCountOverflow(self.record_count));
        }
        self.processed_count += 1;
        self.touch();
        Ok(())
    }

    /// 行级错误明细数
    pub fn rejected_rows(&self) -> usize {
        self.details.iter().filter(|d| d.row_number.is_some()).count()
    }

    fn transition(&mut self, next: ImportState) -> Result<(), StatusRuleViolation> {
        if !self.status.can_transition_to(next) {
            return Err(StatusRuleViolation::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ==========================================
// ImportDetail - 导入明细
// ==========================================
// 对齐: import_detail 表（随 import_status 级联删除）
// row_number 为空 → 文件级错误（编码/表头）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDetail {
    pub id: Option<i64>,               // 主键（未落库时为 None）
    pub import_status_id: i64,         // 所属 ImportStatus
    pub row_number: Option<usize>,     // 行号（从 1 开始）
    pub message: String,               // 明细内容
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ImportDetail {
    pub fn new(import_status_id: i64, row_number: Option<usize>, message: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            import_status_id,
            row_number,
            message: message.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 是否为文件级明细
    pub fn is_file_level(&self) -> bool {
        self.row_number.is_none()
    }
}

fn file_name_of(file_path: &str) -> String {
    Path::new(file_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_path)
        .to_string()
}
