//! 文档抽取器
//!
//! 流程：validate_upload（扩展名 + 大小）→ DocumentExtractor::extract → ensure_meaningful（≥ 最少字符）。

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::config::InterviewSection;

/// 支持的简历格式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResumeFormat {
    Pdf,
    Doc,
    Docx,
    Txt,
}

impl ResumeFormat {
    /// 扩展名（可带前导点，大小写不敏感）
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(ResumeFormat::Pdf),
            "doc" => Some(ResumeFormat::Doc),
            "docx" => Some(ResumeFormat::Docx),
            "txt" => Some(ResumeFormat::Txt),
            _ => None,
        }
    }
}

impl fmt::Display for ResumeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ext = match self {
            ResumeFormat::Pdf => "pdf",
            ResumeFormat::Doc => "doc",
            ResumeFormat::Docx => "docx",
            ResumeFormat::Txt => "txt",
        };
        f.write_str(ext)
    }
}

/// 抽取失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("unsupported file format: {0} (expected pdf, doc, docx or txt)")]
    UnsupportedFormat(String),

    #[error("file is too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("file could not be read: {0}")]
    Corrupt(String),

    #[error("resume appears to be empty or too short ({chars} chars, need at least {min})")]
    TooShort { chars: usize, min: usize },

    #[error("text extraction timed out after {0:?}")]
    Timeout(Duration),
}

/// 上传限制
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_bytes: usize,
    pub min_chars: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            min_chars: 50,
        }
    }
}

impl From<&InterviewSection> for UploadLimits {
    fn from(cfg: &InterviewSection) -> Self {
        Self {
            max_bytes: cfg.max_upload_bytes,
            min_chars: cfg.min_resume_chars,
        }
    }
}

/// 抽取前的格式与大小校验
pub fn validate_upload(
    size: usize,
    extension: &str,
    limits: &UploadLimits,
) -> Result<ResumeFormat, ExtractError> {
    let format = ResumeFormat::from_extension(extension)
        .ok_or_else(|| ExtractError::UnsupportedFormat(extension.to_string()))?;
    if size > limits.max_bytes {
        return Err(ExtractError::TooLarge {
            size,
            limit: limits.max_bytes,
        });
    }
    Ok(format)
}

/// 抽取后的长度校验，返回去掉首尾空白的文本
pub fn ensure_meaningful(text: &str, limits: &UploadLimits) -> Result<String, ExtractError> {
    let trimmed = text.trim();
    let chars = trimmed.chars().count();
    if chars < limits.min_chars {
        return Err(ExtractError::TooShort {
            chars,
            min: limits.min_chars,
        });
    }
    Ok(trimmed.to_string())
}

/// 文档抽取器：阻塞调用，控制器会放到 spawn_blocking 中并加超时
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8], format: ResumeFormat) -> Result<String, ExtractError>;
}

/// 纯文本抽取器：只处理 txt（UTF-8，可带 BOM）
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8], format: ResumeFormat) -> Result<String, ExtractError> {
        match format {
            ResumeFormat::Txt => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                String::from_utf8(bytes.to_vec())
                    .map_err(|e| ExtractError::Corrupt(e.to_string()))
            }
            other => Err(ExtractError::UnsupportedFormat(format!(
                "{other} (no decoder configured)"
            ))),
        }
    }
}

/// 默认抽取器：pdf 用 lopdf 逐页取文本，txt 交给 PlainTextExtractor；doc / docx 需宿主注入
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
        let doc = lopdf::Document::load_mem(bytes)
            .map_err(|e| ExtractError::Corrupt(format!("invalid pdf: {e}")))?;

        let mut text = String::new();
        for page_num in doc.get_pages().keys() {
            match doc.extract_text(&[*page_num]) {
                Ok(page_text) => {
                    text.push_str(&page_text);
                    text.push(' ');
                }
                Err(e) => tracing::warn!(page = *page_num, error = %e, "failed to extract pdf page text"),
            }
        }

        if text.trim().is_empty() {
            return Err(ExtractError::Corrupt("no text extracted from pdf".to_string()));
        }
        Ok(text.trim().to_string())
    }
}

impl DocumentExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8], format: ResumeFormat) -> Result<String, ExtractError> {
        match format {
            ResumeFormat::Pdf => Self::extract_pdf(bytes),
            other => PlainTextExtractor.extract(bytes, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ResumeFormat::from_extension("PDF"), Some(ResumeFormat::Pdf));
        assert_eq!(ResumeFormat::from_extension(".docx"), Some(ResumeFormat::Docx));
        assert_eq!(ResumeFormat::from_extension("txt"), Some(ResumeFormat::Txt));
        assert_eq!(ResumeFormat::from_extension("rtf"), None);
    }

    #[test]
    fn test_validate_upload() {
        let limits = UploadLimits::default();
        assert_eq!(validate_upload(100, "doc", &limits), Ok(ResumeFormat::Doc));
        assert_eq!(
            validate_upload(100, "odt", &limits),
            Err(ExtractError::UnsupportedFormat("odt".into()))
        );
        assert!(matches!(
            validate_upload(limits.max_bytes + 1, "pdf", &limits),
            Err(ExtractError::TooLarge { .. })
        ));
        assert!(validate_upload(limits.max_bytes, "pdf", &limits).is_ok());
    }

    #[test]
    fn test_ensure_meaningful() {
        let limits = UploadLimits::default();
        assert_eq!(
            ensure_meaningful("   short   ", &limits),
            Err(ExtractError::TooShort { chars: 5, min: 50 })
        );
        let long = format!("  {}  ", "x".repeat(60));
        assert_eq!(ensure_meaningful(&long, &limits).unwrap().len(), 60);
    }

    #[test]
    fn test_plain_text_extractor() {
        let extractor = PlainTextExtractor;
        let text = extractor
            .extract(b"\xEF\xBB\xBFJane Doe, engineer", ResumeFormat::Txt)
            .unwrap();
        assert_eq!(text, "Jane Doe, engineer");

        assert!(matches!(
            extractor.extract(&[0xff, 0xfe, 0x00], ResumeFormat::Txt),
            Err(ExtractError::Corrupt(_))
        ));
        assert!(matches!(
            extractor.extract(b"%PDF-1.4", ResumeFormat::Pdf),
            Err(ExtractError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_pdf_extractor_rejects_broken_pdf() {
        let extractor = PdfTextExtractor;
        assert!(matches!(
            extractor.extract(b"%PDF-1.4 truncated", ResumeFormat::Pdf),
            Err(ExtractError::Corrupt(_))
        ));
    }

    #[test]
    fn test_pdf_extractor_delegates_other_formats() {
        let extractor = PdfTextExtractor;
        assert_eq!(
            extractor.extract(b"Plain resume text", ResumeFormat::Txt),
            Ok("Plain resume text".to_string())
        );
        assert!(matches!(
            extractor.extract(b"PK\x03\x04", ResumeFormat::Docx),
            Err(ExtractError::UnsupportedFormat(_))
        ));
    }
}
