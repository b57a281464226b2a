// ==========================================
// CSV 导入工作进程 - 批量事件分发器
// ==========================================
// 职责: 每条通知启动一个独立任务，等待全部完成后统一应答
// 红线:
// - 单个任务失败只记录日志，不影响其他任务与批次应答
// - 每个任务持有自己的消息副本（所有权移入任务）
// - 不设并发上限，不做跨任务取消
// ==========================================

use crate::domain::{BatchEvent, ImportTarget, Notification, QueueMessage, UserRow};
use crate::engine::import_orchestrator::{ImportOrchestrator, ImportSummary};
use crate::gateway::ObjectStorage;
use crate::importer::{ImportError, ImportResult, RowSink};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, info_span, instrument, Instrument};
use uuid::Uuid;

/// 批次应答状态码（固定成功）
pub const BATCH_SUCCESS_STATUS: u16 = 200;

// ==========================================
// NotificationOutcome - 单条通知的处理结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOutcome {
    pub index: usize,
    pub message_id: String,
    pub result: Result<ImportSummary, String>,
}

impl NotificationOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

// ==========================================
// BatchResponse - 批次应答
// ==========================================
// 序列化只输出 {"statusCode":200}；outcomes 供调用方与测试使用
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(skip)]
    pub outcomes: Vec<NotificationOutcome>,
}

impl BatchResponse {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

// ==========================================
// ImportPipelines - 各导入目标的行投递目标
// ==========================================
#[derive(Clone)]
pub struct ImportPipelines {
    pub user: Arc<dyn RowSink<UserRow>>,
}

// ==========================================
// BatchDispatcher
// ==========================================
// 所有协作方在进程启动时构建一次，任务间共享
#[derive(Clone)]
pub struct BatchDispatcher {
    storage: Arc<dyn ObjectStorage>,
    orchestrator: Arc<ImportOrchestrator>,
    pipelines: ImportPipelines,
}

impl BatchDispatcher {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        orchestrator: Arc<ImportOrchestrator>,
        pipelines: ImportPipelines,
    ) -> Self {
        Self {
            storage,
            orchestrator,
            pipelines,
        }
    }

    /// 分发一批通知
    ///
    /// 任何单条失败都不会改变批次应答（始终 statusCode=200）
    #[instrument(skip(self, event), fields(batch_id = %Uuid::new_v4(), records = event.records.len()))]
    pub async fn dispatch(&self, event: BatchEvent) -> BatchResponse {
        let handles: Vec<_> = event
            .records
            .into_iter()
            .enumerate()
            .map(|(index, message)| {
                let dispatcher = self.clone();
                let span = info_span!("notification", index, message_id = %message.message_id);
                let message_id = message.message_id.clone();
                let handle = tokio::spawn(
                    async move { dispatcher.process_message(message).await }.instrument(span),
                );
                (index, message_id, handle)
            })
            .collect();

        let (meta, futures): (Vec<_>, Vec<_>) = handles
            .into_iter()
            .map(|(index, message_id, handle)| ((index, message_id), handle))
            .unzip();
        let results = join_all(futures).await;

        let mut outcomes = Vec::with_capacity(results.len());
        for ((index, message_id), joined) in meta.into_iter().zip(results) {
            let result = match joined {
                Ok(Ok(summary)) => Ok(summary),
                Ok(Err(e)) => {
                    error!(index, message_id = %message_id, error = %e, "通知处理失败");
                    Err(e.to_string())
                }
                Err(join_err) => {
                    error!(index, message_id = %message_id, error = %join_err, "任务异常终止");
                    Err(format!("任务异常终止: {}", join_err))
                }
            };
            outcomes.push(NotificationOutcome {
                index,
                message_id,
                result,
            });
        }

        let response = BatchResponse {
            status_code: BATCH_SUCCESS_STATUS,
            outcomes,
        };
        info!(
            succeeded = response.succeeded(),
            failed = response.failed(),
            "批次处理完成"
        );
        response
    }

    /// 单条通知: 解码 → 路由 → 读取文件 → 导入
    async fn process_message(&self, message: QueueMessage) -> ImportResult<ImportSummary> {
        let notification = Notification::from_message(&message)?;
        let target = notification
            .target()
            .ok_or_else(|| ImportError::UnknownTarget(notification.key.clone()))?;

        info!(bucket = %notification.bucket, key = %notification.key, import_target = %target, "开始处理通知");
        let content = self
            .storage
            .get(&notification.bucket, &notification.key)
            .await?;

        match target {
            ImportTarget::User => {
                self.orchestrator
                    .run::<UserRow>(&notification.key, &content, self.pipelines.user.as_ref())
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_serializes_status_code_only() {
        let response = BatchResponse {
            status_code: BATCH_SUCCESS_STATUS,
            outcomes: vec![NotificationOutcome {
                index: 0,
                message_id: "m-1".to_string(),
                result: Err("boom".to_string()),
            }],
        };
        assert_eq!(serde_json::to_string(&response).unwrap(), r#"{"statusCode":200}"#);
        assert_eq!(response.failed(), 1);
        assert_eq!(response.succeeded(), 0);
    }
}
