// ==========================================
// CSV 导入工作进程 - CSV 解析器
// ==========================================
// 输入: 已规范化为 UTF-8 的文件内容
// 输出: 按表头列名反序列化的行（保持文件顺序）
// 空行跳过；字段两端空白去除
// ==========================================

use crate::domain::ImportRow;
use crate::importer::error::{ImportError, ImportResult};
use csv::{ReaderBuilder, Trim};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvParser;

impl CsvParser {
    pub fn new() -> Self {
        Self
    }

    /// 解析全部数据行
    ///
    /// # 错误
    /// 任意一行无法反序列化即返回 Parse（带行号）
    pub fn parse_rows<R: ImportRow>(&self, content: &[u8]) -> ImportResult<Vec<R>> {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(content);

        let mut rows = Vec::new();
        for (idx, result) in reader.deserialize::<R>().enumerate() {
            let row = result.map_err(|e| {
                ImportError::Parse(format!("第 {} 行: {}", idx + 1, e))
            })?;
            rows.push(row);
        }
        Ok(rows)
    }
}
