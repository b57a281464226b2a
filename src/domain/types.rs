// ==========================================
// CSV 导入工作进程 - 领域类型定义
// ==========================================
// 职责: 导入状态枚举、导入目标枚举、未恢复失败处理策略
// 红线: 状态单向流转 PENDING → PROCESSING → {FINISHED, FAILED}
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 导入状态 (Import State)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportState {
    Pending,    // 等待导入（外部创建时的初始状态）
    Processing, // 导入中
    Finished,   // 导入完成（终态）
    Failed,     // 导入失败（终态）
}

impl ImportState {
    /// 数据库中的存储值
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportState::Pending => "PENDING",
            ImportState::Processing => "PROCESSING",
            ImportState::Finished => "FINISHED",
            ImportState::Failed => "FAILED",
        }
    }

    /// 判断状态转换是否合法
    ///
    /// # 规则
    /// - PENDING → PROCESSING
    /// - PROCESSING → FINISHED / FAILED
    /// - 终态不可再转换
    pub fn can_transition_to(&self, next: ImportState) -> bool {
        matches!(
            (self, next),
            (ImportState::Pending, ImportState::Processing)
                | (ImportState::Processing, ImportState::Finished)
                | (ImportState::Processing, ImportState::Failed)
        )
    }
}

impl fmt::Display for ImportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ImportState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // 兼容历史数据中的小写写法
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(ImportState::Pending),
            "PROCESSING" => Ok(ImportState::Processing),
            "FINISHED" => Ok(ImportState::Finished),
            "FAILED" => Ok(ImportState::Failed),
            other => Err(format!("未知的导入状态: {}", other)),
        }
    }
}

// ==========================================
// 导入目标 (Import Target)
// ==========================================
// 由对象键的首段目录决定: user/xxx.csv → User
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportTarget {
    User, // 用户数据
}

impl ImportTarget {
    /// 对象键首段目录名
    pub fn directory(&self) -> &'static str {
        match self {
            ImportTarget::User => "user",
        }
    }

    /// 根据对象键解析导入目标
    ///
    /// # 返回
    /// - Some(ImportTarget): 首段目录可识别
    /// - None: 无目录或目录未注册
    pub fn from_key(key: &str) -> Option<Self> {
        let (dir, rest) = key.trim_start_matches('/').split_once('/')?;
        if rest.is_empty() {
            return None;
        }
        match dir {
            "user" => Some(ImportTarget::User),
            _ => None,
        }
    }
}

impl fmt::Display for ImportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.directory())
    }
}

// ==========================================
// 未恢复失败处理策略 (Unrecovered Failure Policy)
// ==========================================
// 传输 / 持久化 / 解析失败时对 ImportStatus 的处理
// 配置键: unrecovered_failure_policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnrecoveredFailurePolicy {
    /// 保持 PROCESSING，由运维决定是否重新投递
    #[default]
    LeaveProcessing,
    /// 追加文件级明细并置为 FAILED（尽力而为）
    MarkFailed,
}

impl UnrecoveredFailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnrecoveredFailurePolicy::LeaveProcessing => "LEAVE_PROCESSING",
            UnrecoveredFailurePolicy::MarkFailed => "MARK_FAILED",
        }
    }
}

impl FromStr for UnrecoveredFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LEAVE_PROCESSING" => Ok(UnrecoveredFailurePolicy::LeaveProcessing),
            "MARK_FAILED" => Ok(UnrecoveredFailurePolicy::MarkFailed),
            other => Err(format!("未知的失败处理策略: {}", other)),
        }
    }
}
