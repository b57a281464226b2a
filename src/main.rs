// ==========================================
// CSV 导入工作进程 - 主入口
// ==========================================
// 用法: csv-import-worker [EVENT_FILE]
// - 未指定 EVENT_FILE 时从标准输入读取批量事件 JSON
// - 标准输出: 批次应答 {"statusCode":200}
// - 日志: 标准错误
// ==========================================

use anyhow::{anyhow, bail, Context};
use csv_import_worker::config::{AppEnv, ConfigManager, ImportConfigReader, Settings};
use csv_import_worker::db::{init_schema, open_sqlite_connection};
use csv_import_worker::domain::{BatchEvent, ImportTarget, USER_EMAIL_SET};
use csv_import_worker::engine::{
    BatchDispatcher, ImportOrchestrator, ImportPipelines, OrchestratorOptions,
};
use csv_import_worker::gateway::{
    load_aws_config, LocalFileQueue, LocalObjectStorage, ObjectStorage, S3ObjectStorage,
    SqsWorkQueue, WorkQueue,
};
use csv_import_worker::importer::{QueueRowSink, ReferenceData};
use csv_import_worker::logging;
use csv_import_worker::repository::{ImportStatusRepositoryImpl, UserRepository};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncReadExt;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    let settings = Settings::from_env()?;
    info!(
        version = csv_import_worker::VERSION,
        app_env = %settings.app_env,
        database = %settings.database_path,
        "{} 启动",
        csv_import_worker::APP_NAME
    );

    // 数据库
    if let Some(parent) = Path::new(&settings.database_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("无法创建数据库目录: {}", parent.display()))?;
        }
    }
    let conn = open_sqlite_connection(&settings.database_path)
        .with_context(|| format!("无法打开数据库: {}", settings.database_path))?;
    init_schema(&conn).context("数据库初始化失败")?;
    let conn = Arc::new(Mutex::new(conn));

    // 运行期配置
    let config = ConfigManager::from_connection(conn.clone())
        .map_err(|e| anyhow!("配置管理器初始化失败: {}", e))?;
    let locale = config
        .get_message_locale(&settings.message_locale)
        .await
        .map_err(|e| anyhow!("读取消息语言失败: {}", e))?;
    let failure_policy = config
        .get_failure_policy()
        .await
        .map_err(|e| anyhow!("读取失败处理策略失败: {}", e))?;

    // 参照集合（批处理开始前加载一次）
    let user_repo = UserRepository::from_connection(conn.clone());
    let emails = user_repo.all_emails().context("加载已有用户邮箱失败")?;
    let reference = Arc::new(ReferenceData::new().with_set(USER_EMAIL_SET, emails));
    info!(count = reference.set_len(USER_EMAIL_SET), "已加载用户邮箱参照集合");

    // 协作方
    let (storage, user_queue): (Arc<dyn ObjectStorage>, Arc<dyn WorkQueue>) =
        match settings.app_env {
            AppEnv::Local => (
                Arc::new(LocalObjectStorage::new(&settings.local_storage_root))
                    as Arc<dyn ObjectStorage>,
                Arc::new(LocalFileQueue::new(
                    settings
                        .local_queue_dir
                        .join(format!("{}.jsonl", ImportTarget::User.directory())),
                )) as Arc<dyn WorkQueue>,
            ),
            AppEnv::Aws => {
                let queue_url = match config
                    .get_queue_url(ImportTarget::User)
                    .await
                    .map_err(|e| anyhow!("读取队列配置失败: {}", e))?
                {
                    Some(url) => url,
                    None => match settings.user_queue_url.clone() {
                        Some(url) => url,
                        None => bail!("未配置用户队列 URL (USER_QUEUE_URL / QUEUE_URL)"),
                    },
                };
                let aws_config = load_aws_config(&settings.aws_region).await;
                (
                    Arc::new(S3ObjectStorage::new(&aws_config)) as Arc<dyn ObjectStorage>,
                    Arc::new(SqsWorkQueue::new(&aws_config, queue_url)) as Arc<dyn WorkQueue>,
                )
            }
        };

    let orchestrator = Arc::new(ImportOrchestrator::new(
        Arc::new(ImportStatusRepositoryImpl::from_connection(conn.clone())),
        reference,
        OrchestratorOptions {
            locale,
            failure_policy,
        },
    ));
    let dispatcher = BatchDispatcher::new(
        storage,
        orchestrator,
        ImportPipelines {
            user: Arc::new(QueueRowSink::new(user_queue)),
        },
    );

    // 批量事件
    let raw = match std::env::args().nth(1) {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("无法读取事件文件: {}", path))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("无法读取标准输入")?;
            buf
        }
    };
    let event = BatchEvent::from_json(&raw).context("批量事件格式错误")?;

    let response = dispatcher.dispatch(event).await;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
