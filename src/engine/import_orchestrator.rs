// ==========================================
// CSV 导入工作进程 - 单文件导入编排器
// ==========================================
// 状态机: PENDING → PROCESSING → {FINISHED, FAILED}
// 流程:
// 1. 前置检查（必须为 PENDING，否则零写入终止）
// 2. 原子切换为 PROCESSING
// 3. 编码规范化 / 4. 表头校验（失败 → FAILED + 文件级明细）
// 5. 解析 / 6. 记录数落库
// 7. 逐行: 校验 → 投递或记录行级明细 → 已处理数 +1 落库
// 8. FINISHED
// 红线: 单文件内严格顺序执行，每次状态变化立即落库
// ==========================================

use crate::domain::{ImportRow, ImportStatus, UnrecoveredFailurePolicy};
use crate::importer::{
    CsvParser, EncodingNormalizer, HeaderValidator, ImportError, ImportResult, ReferenceData,
    RowSink, RowValidator,
};
use crate::repository::ImportStatusRepository;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ==========================================
// ImportSummary - 单文件导入结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub file_path: String,
    pub record_count: usize,    // 解析出的行数
    pub processed_count: usize, // 已处理行数
    pub dispatched: usize,      // 投递到下游的行数
    pub rejected: usize,        // 校验失败的行数
}

// ==========================================
// OrchestratorOptions
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorOptions {
    /// 写入 ImportDetail 的消息语言
    pub locale: String,
    /// 传输 / 持久化 / 解析失败时的状态处理
    pub failure_policy: UnrecoveredFailurePolicy,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            locale: crate::i18n::DEFAULT_LOCALE.to_string(),
            failure_policy: UnrecoveredFailurePolicy::default(),
        }
    }
}

// ==========================================
// ImportOrchestrator
// ==========================================
pub struct ImportOrchestrator {
    repo: Arc<dyn ImportStatusRepository>,
    reference: Arc<ReferenceData>,
    normalizer: EncodingNormalizer,
    header_validator: HeaderValidator,
    parser: CsvParser,
    row_validator: RowValidator,
    options: OrchestratorOptions,
}

impl ImportOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    /// - repo: 导入状态仓储（进程内共享）
    /// - reference: 批处理开始前加载的参照集合
    /// - options: 语言与失败策略
    pub fn new(
        repo: Arc<dyn ImportStatusRepository>,
        reference: Arc<ReferenceData>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            repo,
            reference: reference.clone(),
            normalizer: EncodingNormalizer::new(),
            header_validator: HeaderValidator::new(),
            parser: CsvParser::new(),
            row_validator: RowValidator::new(reference, options.locale.clone()),
            options,
        }
    }

    /// 导入一个文件
    ///
    /// # 参数
    /// - file_path: 对象键（ImportStatus 业务键）
    /// - content: 文件原始字节
    /// - sink: 校验通过的行的投递目标
    ///
    /// # 返回
    /// - Ok(ImportSummary): 文件到达 FINISHED
    /// - Err(Precondition / Config): 未写入任何数据
    /// - Err(FileFormat / Header): 已置为 FAILED 并写入文件级明细
    /// - Err(其他): 按失败策略处理后返回
    #[instrument(skip(self, file_path, content, sink), fields(file_path = %file_path, bytes = content.len()))]
    pub async fn run<R: ImportRow>(
        &self,
        file_path: &str,
        content: &[u8],
        sink: &dyn RowSink<R>,
    ) -> ImportResult<ImportSummary> {
        self.reference.ensure_loaded(R::schema())?;
        let mut status = self.begin(file_path).await?;

        match self.process(&mut status, content, sink).await {
            Ok(summary) => {
                info!(
                    record_count = summary.record_count,
                    dispatched = summary.dispatched,
                    rejected = summary.rejected,
                    "文件导入完成"
                );
                Ok(summary)
            }
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "文件校验失败，置为 FAILED");
                status.fail(e.user_message(&self.options.locale))?;
                self.repo.save(&mut status).await?;
                Err(e)
            }
            Err(e) => {
                self.handle_unrecovered(&mut status, &e).await;
                Err(e)
            }
        }
    }

    /// 前置检查 + PENDING → PROCESSING
    async fn begin(&self, file_path: &str) -> ImportResult<ImportStatus> {
        let mut status = self.repo.get_by_file_path(file_path).await?;
        if !status.is_pending() {
            return Err(ImportError::Precondition {
                file_path: file_path.to_string(),
                status: status.status.to_string(),
            });
        }

        if !self.repo.try_begin_processing(status.id).await? {
            let current = self.repo.get_by_file_path(file_path).await?;
            return Err(ImportError::Precondition {
                file_path: file_path.to_string(),
                status: current.status.to_string(),
            });
        }

        status.start_processing()?;
        debug!(import_status_id = status.id, "已切换为 PROCESSING");
        Ok(status)
    }

    async fn process<R: ImportRow>(
        &self,
        status: &mut ImportStatus,
        content: &[u8],
        sink: &dyn RowSink<R>,
    ) -> ImportResult<ImportSummary> {
        let canonical = self.normalizer.normalize(content)?;
        self.header_validator.validate(&canonical, R::schema())?;

        let rows: Vec<R> = self.parser.parse_rows(&canonical)?;
        status.set_record_count(rows.len())?;
        self.repo.save(status).await?;
        debug!(record_count = rows.len(), "解析完成");

        let mut dispatched = 0;
        let mut rejected = 0;
        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 1;

            match self.row_validator.validate(row) {
                Ok(()) => {
                    sink.import(row).await?;
                    dispatched += 1;
                }
                Err(e) if e.is_recoverable() => {
                    let message = e.user_message(&self.options.locale);
                    debug!(row_number, message = %message, "行校验失败");
                    status.append_row_detail(row_number, message);
                    self.repo.save(status).await?;
                    rejected += 1;
                }
                Err(e) => return Err(e),
            }

            status.increment_processed_count()?;
            self.repo.save(status).await?;
        }

        status.finish()?;
        self.repo.save(status).await?;

        Ok(ImportSummary {
            file_path: status.file_path.clone(),
            record_count: status.record_count,
            processed_count: status.processed_count,
            dispatched,
            rejected,
        })
    }

    /// 未恢复失败: 按策略保持 PROCESSING 或尽力置为 FAILED
    async fn handle_unrecovered(&self, status: &mut ImportStatus, error: &ImportError) {
        match self.options.failure_policy {
            UnrecoveredFailurePolicy::LeaveProcessing => {
                warn!(
                    error = %error,
                    processed_count = status.processed_count,
                    "导入中止，状态保持 PROCESSING"
                );
            }
            UnrecoveredFailurePolicy::MarkFailed => {
                if let Err(e) = status.fail(error.user_message(&self.options.locale)) {
                    warn!(error = %e, "无法置为 FAILED");
                    return;
                }
                match self.repo.save(status).await {
                    Ok(()) => warn!(error = %error, "导入中止，已置为 FAILED"),
                    Err(e) => warn!(error = %error, save_error = %e, "导入中止，FAILED 状态落库失败"),
                }
            }
        }
    }
}
