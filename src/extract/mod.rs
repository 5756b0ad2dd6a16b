//! 文档文本提取模块（基础设施层）
//!
//! 把二进制文档（PDF / DOCX）转换成纯文本，供切分器消费。
//! 文件名只用于选择对应的解码器。

use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

/// 文本提取错误
///
/// 解码失败对该文档是致命的：不会带着半份文本继续往下走。
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF 文本提取失败 ({file_name}): {source}")]
    PdfParseFailed {
        file_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("DOCX 文本提取失败 ({file_name}): {source}")]
    DocxParseFailed {
        file_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("不支持旧版 .doc 格式: {file_name}")]
    LegacyDocUnsupported { file_name: String },
    #[error("无法识别的文档格式: {file_name}")]
    UnsupportedFormat { file_name: String },
    #[error("文档提取超时 ({file_name}): 超过 {seconds} 秒")]
    Timeout { file_name: String, seconds: u64 },
}

/// 根据文件扩展名选择解码器并提取纯文本
///
/// `.doc` 明确返回"旧版格式不支持"，不做静默跳过。
pub fn extract_text(bytes: &[u8], file_name: &str) -> Result<String, ExtractionError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    debug!("提取文档文本: {} (格式: {})", file_name, extension);

    match extension.as_str() {
        "pdf" => extract_pdf_text(bytes, file_name),
        "docx" => extract_docx_text(bytes, file_name),
        "doc" => Err(ExtractionError::LegacyDocUnsupported {
            file_name: file_name.to_string(),
        }),
        _ => Err(ExtractionError::UnsupportedFormat {
            file_name: file_name.to_string(),
        }),
    }
}

fn extract_pdf_text(bytes: &[u8], file_name: &str) -> Result<String, ExtractionError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractionError::PdfParseFailed {
        file_name: file_name.to_string(),
        source: Box::new(e),
    })
}

/// 从 DOCX 的 word/document.xml 中遍历文本节点
///
/// 段落结束补换行，保证切分器拿到的是按行组织的文本。
fn extract_docx_text(bytes: &[u8], file_name: &str) -> Result<String, ExtractionError> {
    let docx_err = |source: Box<dyn std::error::Error + Send + Sync>| {
        ExtractionError::DocxParseFailed {
            file_name: file_name.to_string(),
            source,
        }
    };

    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| docx_err(Box::new(e)))?;
    let mut document = archive
        .by_name("word/document.xml")
        .map_err(|e| docx_err(Box::new(e)))?;

    let mut xml = String::new();
    document
        .read_to_string(&mut xml)
        .map_err(|e| docx_err(Box::new(e)))?;

    let mut reader = XmlReader::from_str(&xml);
    let mut buf = Vec::new();
    let mut output = String::new();
    let mut in_text_node = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = true,
                b"w:tab" => output.push('\t'),
                b"w:br" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" => output.push('\t'),
                b"w:br" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text_node {
                    let value = e.unescape().map_err(|e| docx_err(Box::new(e)))?.into_owned();
                    output.push_str(&value);
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = false,
                b"w:p" => output.push('\n'),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(docx_err(Box::new(e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(output)
}
