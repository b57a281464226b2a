// ==========================================
// CSV 导入工作进程 - 对象存储实现
// ==========================================
// S3ObjectStorage:    生产环境（aws-sdk-s3）
// LocalObjectStorage: 本地环境（<root>/<bucket>/<key>）
// ==========================================

use super::{GatewayError, GatewayResult, ObjectStorage};
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, instrument};

// ==========================================
// S3ObjectStorage
// ==========================================
#[derive(Clone)]
pub struct S3ObjectStorage {
    client: Client,
}

impl S3ObjectStorage {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    #[instrument(skip(self))]
    async fn get(&self, bucket: &str, key: &str) -> GatewayResult<Vec<u8>> {
        debug!("下载对象 s3://{}/{}", bucket, key);

        let response = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(response) => response,
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    return Err(GatewayError::ObjectNotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    });
                }
                return Err(GatewayError::Remote(
                    DisplayErrorContext(&service_err).to_string(),
                ));
            }
        };

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| GatewayError::Remote(format!("读取对象内容失败: {}", e)))?
            .into_bytes()
            .to_vec();

        debug!(bytes = data.len(), "对象下载完成 s3://{}/{}", bucket, key);
        Ok(data)
    }
}

// ==========================================
// LocalObjectStorage
// ==========================================
#[derive(Debug, Clone)]
pub struct LocalObjectStorage {
    root: PathBuf,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 解析对象在本地的路径（拒绝 .. / 绝对路径）
    fn resolve(&self, bucket: &str, key: &str) -> GatewayResult<PathBuf> {
        let is_safe = |p: &str| {
            Path::new(p)
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        };
        if !is_safe(bucket) || !is_safe(key) {
            return Err(GatewayError::InvalidKey(format!("{}/{}", bucket, key)));
        }
        Ok(self.root.join(bucket).join(key))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn get(&self, bucket: &str, key: &str) -> GatewayResult<Vec<u8>> {
        let path = self.resolve(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(GatewayError::ObjectNotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            }
            Err(e) => Err(GatewayError::Io(e)),
        }
    }
}
