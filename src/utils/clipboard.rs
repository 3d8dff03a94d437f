//! Clipboard  cross-platform clipboard helpers for lineage export

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("clipboard error: {0}")]
    Clip(String),
}

/// 将文本复制到系统剪贴板
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    use copypasta::{ClipboardContext, ClipboardProvider};
    let mut ctx = ClipboardContext::new().map_err(|e| ClipboardError::Clip(e.to_string()))?;
    ctx.set_contents(text.to_string())
        .map_err(|e| ClipboardError::Clip(e.to_string()))?;
    tracing::info!("内容已复制到剪贴板，长度: {} 字符", text.chars().count());
    Ok(())
}

/// 从系统剪贴板获取文本（用于测试）
#[cfg(test)]
pub fn get_clipboard_contents() -> Result<String, ClipboardError> {
    use copypasta::{ClipboardContext, ClipboardProvider};
    let mut ctx = ClipboardContext::new().map_err(|e| ClipboardError::Clip(e.to_string()))?;
    ctx.get_contents()
        .map_err(|e| ClipboardError::Clip(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "需要图形会话中的系统剪贴板"]
    fn test_clipboard_lineage_text() {
        let lineage = "root\n└── server\n    └── tls\n";

        let copy_result = copy_to_clipboard(lineage);
        assert!(copy_result.is_ok(), "复制到剪贴板应该成功");

        let clipboard_content = get_clipboard_contents().unwrap();
        assert_eq!(clipboard_content, lineage, "剪贴板内容应该与谱系文本一致");
    }

    #[test]
    #[ignore = "需要图形会话中的系统剪贴板"]
    fn test_clipboard_unicode() {
        let unicode_text = "根\n└── 配置: ✨";

        let result = copy_to_clipboard(unicode_text);
        assert!(result.is_ok(), "复制Unicode文本应该成功");

        let clipboard_content = get_clipboard_contents().unwrap();
        assert_eq!(clipboard_content, unicode_text, "剪贴板应该正确处理Unicode字符");
    }
}
