// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持日文（默认）、英文、中文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 导入管道只使用 t_in（显式传入 locale），不依赖全局 locale
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "ja";

/// 判断语言是否受支持
pub fn is_supported(locale: &str) -> bool {
    rust_i18n::available_locales!()
        .iter()
        .any(|l| *l == locale)
}

/// 翻译消息（指定语言，带参数）
///
/// # 示例
/// ```no_run
/// use csv_import_worker::i18n::t_in;
/// let msg = t_in("ja", "validation.required", &[("field", "ID")]);
/// ```
pub fn t_in(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key, locale = locale).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_in_explicit_locale() {
        assert_eq!(
            t_in("ja", "validation.required", &[("field", "ユーザ名")]),
            "ユーザ名は必須フィールドです"
        );
        assert_eq!(
            t_in("en", "validation.required", &[("field", "Name")]),
            "Name is a required field"
        );
        assert_eq!(
            t_in("zh-CN", "validation.duplicate", &[("field", "邮箱")]),
            "邮箱重复"
        );
    }

    #[test]
    fn test_supported_locales() {
        assert!(is_supported("ja"));
        assert!(is_supported("en"));
        assert!(is_supported("zh-CN"));
        assert!(!is_supported("fr"));
    }
}
