//! 简历文本抽取：格式 / 大小校验与抽取器抽象
//!
//! 自带 txt 与 pdf（lopdf）抽取器；doc / docx 的解析由宿主注入的 DocumentExtractor 负责。

pub mod extractor;

pub use extractor::{
    ensure_meaningful, validate_upload, DocumentExtractor, ExtractError, PdfTextExtractor,
    PlainTextExtractor, ResumeFormat, UploadLimits,
};
