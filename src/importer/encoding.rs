// ==========================================
// CSV 导入工作进程 - 字符编码规范化
// ==========================================
// 检测: chardetng
// 转码: encoding_rs
// 规则:
// - Shift_JIS / windows-1252 → 按 Shift_JIS 解码为 UTF-8
// - ISO-8859-* → 按检测到的编码解码为 UTF-8
// - UTF-8 → 原样通过
// - 其他 → FileFormat 错误
// 已知限制: 非 ASCII 部分仅为半角片假名的 Shift_JIS 文件会被检测为 GBK
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, SHIFT_JIS, UTF_8, WINDOWS_1252};
use tracing::{debug, warn};

/// 检测结果对应的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingAction {
    /// 按指定编码解码为 UTF-8
    Transcode(&'static Encoding),
    /// 已是 UTF-8，原样通过
    PassThrough,
}

/// 编码判定（纯函数）
///
/// windows-1252 视为 Shift_JIS 的误判处理
pub fn classify(encoding: &'static Encoding) -> ImportResult<EncodingAction> {
    if encoding == SHIFT_JIS || encoding == WINDOWS_1252 {
        return Ok(EncodingAction::Transcode(SHIFT_JIS));
    }
    if encoding == UTF_8 {
        return Ok(EncodingAction::PassThrough);
    }
    if encoding.name().starts_with("ISO-8859") {
        return Ok(EncodingAction::Transcode(encoding));
    }
    Err(ImportError::FileFormat {
        detected: encoding.name().to_string(),
    })
}

/// 检测字节流编码
pub fn detect(data: &[u8]) -> &'static Encoding {
    let mut detector = EncodingDetector::new();
    detector.feed(data, true);
    detector.guess(None, true)
}

// ==========================================
// EncodingNormalizer
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct EncodingNormalizer;

impl EncodingNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// 规范化为 UTF-8 字节
    pub fn normalize(&self, data: &[u8]) -> ImportResult<Vec<u8>> {
        let detected = detect(data);
        debug!(detected = detected.name(), bytes = data.len(), "检测文件编码");

        match classify(detected)? {
            EncodingAction::PassThrough => Ok(data.to_vec()),
            EncodingAction::Transcode(encoding) => {
                let (decoded, had_errors) = encoding.decode_without_bom_handling(data);
                if had_errors {
                    warn!(
                        detected = detected.name(),
                        decoder = encoding.name(),
                        "解码存在无法映射的字节，已替换"
                    );
                }
                Ok(decoded.into_owned().into_bytes())
            }
        }
    }
}
