use serde::Deserialize;

use crate::error::{AppError, AppResult, FileError};

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 同时评估的文档对数量
    pub max_concurrent_evaluations: usize,
    /// 待评估文档存放目录
    pub input_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 评分服务配置 ---
    pub oracle_api_base_url: String,
    pub oracle_api_key: String,
    /// 评分服务请求超时（秒）
    pub oracle_timeout_secs: u64,
    // --- 提取 / 切分配置 ---
    /// 单份文档文本提取超时（秒）
    pub extract_timeout_secs: u64,
    /// 答案卷简答答案的前瞻窗口（行数）
    pub key_lookahead_window: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_evaluations: 4,
            input_folder: "exam_documents".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            oracle_api_base_url: "http://localhost:8080/api/evaluate".to_string(),
            oracle_api_key: String::new(),
            oracle_timeout_secs: 60,
            extract_timeout_secs: 15,
            key_lookahead_window: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_evaluations: std::env::var("MAX_CONCURRENT_EVALUATIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_evaluations),
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(default.input_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            oracle_api_base_url: std::env::var("ORACLE_API_BASE_URL").unwrap_or(default.oracle_api_base_url),
            oracle_api_key: std::env::var("ORACLE_API_KEY").unwrap_or(default.oracle_api_key),
            oracle_timeout_secs: std::env::var("ORACLE_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.oracle_timeout_secs),
            extract_timeout_secs: std::env::var("EXTRACT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.extract_timeout_secs),
            key_lookahead_window: std::env::var("KEY_LOOKAHEAD_WINDOW").ok().and_then(|v| v.parse().ok()).unwrap_or(default.key_lookahead_window),
        }
    }

    /// 从 TOML 配置文件加载，缺失字段用默认值补全
    pub fn from_toml_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::File(FileError::NotFound {
                    path: path.to_string(),
                })
            } else {
                AppError::file_read_failed(path, e)
            }
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
