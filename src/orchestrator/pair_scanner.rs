//! 文档对扫描 - 编排层
//!
//! 扫描输入目录，按文件名约定把学生卷和答案卷配成对。配对逻辑是
//! 路径列表上的纯函数，目录读取只负责收集路径。

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{AppError, AppResult, FileError};

/// 支持的文档扩展名
const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "doc"];

/// 答案卷文件名标志词
const KEY_TOKENS: &[&str] = &["answer", "key", "marking"];

/// 一对待评估的文档
#[derive(Debug, Clone)]
pub struct DocumentPair {
    pub submission_path: PathBuf,
    pub key_path: PathBuf,
    pub submission_name: String,
    pub key_name: String,
}

/// 按文件名判断是否为答案卷
pub fn is_answer_sheet_name(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    KEY_TOKENS.iter().any(|token| lower.contains(token))
}

/// 扫描目录并配对
pub async fn scan_document_pairs(folder: &str) -> AppResult<Vec<DocumentPair>> {
    let dir = Path::new(folder);
    if !dir.is_dir() {
        return Err(AppError::File(FileError::DirectoryNotFound {
            path: folder.to_string(),
        }));
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| AppError::file_read_failed(folder, e))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AppError::file_read_failed(folder, e))?
    {
        let path = entry.path();
        if path.is_file() && has_supported_extension(&path) {
            files.push(path);
        }
    }

    info!("📁 目录中找到 {} 个文档文件", files.len());
    Ok(pair_documents(files))
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// 配对逻辑（纯函数）
///
/// 规则：
/// 1. 文件名含标志词的是答案卷，其余是学生卷
/// 2. 学生卷优先匹配归一化主干相同的答案卷
/// 3. 匹配不上但目录里只有一份答案卷时，所有学生卷共用它
/// 4. 仍然配不上的学生卷记警告后跳过
fn pair_documents(files: Vec<PathBuf>) -> Vec<DocumentPair> {
    let (keys, submissions): (Vec<PathBuf>, Vec<PathBuf>) = files
        .into_iter()
        .partition(|p| is_answer_sheet_name(&file_name_of(p)));

    let mut pairs = Vec::new();
    for submission in submissions {
        let submission_name = file_name_of(&submission);
        let stem = normalized_stem(&submission);

        let matched = keys
            .iter()
            .find(|k| normalized_stem(k) == stem)
            .or_else(|| if keys.len() == 1 { keys.first() } else { None });

        match matched {
            Some(key) => pairs.push(DocumentPair {
                submission_name,
                key_name: file_name_of(key),
                submission_path: submission,
                key_path: key.clone(),
            }),
            None => {
                warn!("⚠️ 学生卷 {} 找不到对应的答案卷，跳过", submission_name);
            }
        }
    }

    pairs.sort_by(|a, b| a.submission_name.cmp(&b.submission_name));
    pairs
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// 归一化文件主干：小写、去掉答案卷标志词和分隔符
fn normalized_stem(path: &Path) -> String {
    let mut stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    for token in KEY_TOKENS.iter().chain(&["sheet"]) {
        stem = stem.replace(token, "");
    }
    stem.chars().filter(|c| c.is_alphanumeric()).collect()
}
