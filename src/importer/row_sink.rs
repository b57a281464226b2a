// ==========================================
// CSV 导入工作进程 - 行导入目标
// ==========================================
// 校验通过的行交给 RowSink
// QueueRowSink: 序列化为 JSON 后发送到工作队列
// ==========================================

use crate::domain::ImportRow;
use crate::gateway::WorkQueue;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::sync::Arc;

// ==========================================
// RowSink Trait
// ==========================================
// 实现者: QueueRowSink（测试中另有内存实现）
#[async_trait]
pub trait RowSink<R: ImportRow>: Send + Sync {
    /// 导入一行；失败即中止当前文件
    async fn import(&self, row: &R) -> ImportResult<()>;
}

// ==========================================
// QueueRowSink
// ==========================================
#[derive(Clone)]
pub struct QueueRowSink {
    queue: Arc<dyn WorkQueue>,
}

impl QueueRowSink {
    pub fn new(queue: Arc<dyn WorkQueue>) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl<R: ImportRow> RowSink<R> for QueueRowSink {
    async fn import(&self, row: &R) -> ImportResult<()> {
        let body = serde_json::to_string(row)?;
        self.queue.send(body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRow;
    use crate::gateway::{GatewayError, GatewayResult};
    use crate::importer::error::ImportError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingQueue {
        sent: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl WorkQueue for RecordingQueue {
        async fn send(&self, body: String) -> GatewayResult<()> {
            if self.fail {
                return Err(GatewayError::Remote("queue unavailable".to_string()));
            }
            self.sent.lock().unwrap().push(body);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_queue_sink_sends_json() {
        let queue = Arc::new(RecordingQueue::default());
        let sink = QueueRowSink::new(queue.clone());
        let row = UserRow {
            id: Some(1),
            name: "Taro".to_string(),
            email: "taro@example.com".to_string(),
        };

        sink.import(&row).await.unwrap();

        let sent = queue.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let decoded: UserRow = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(decoded, row);
    }

    #[tokio::test]
    async fn test_queue_failure_is_transport_error() {
        let queue = Arc::new(RecordingQueue {
            fail: true,
            ..Default::default()
        });
        let sink = QueueRowSink::new(queue);
        let row = UserRow {
            id: Some(1),
            name: "Taro".to_string(),
            email: "taro@example.com".to_string(),
        };

        let result = RowSink::<UserRow>::import(&sink, &row).await;
        assert!(matches!(result, Err(ImportError::Transport(_))));
    }
}
