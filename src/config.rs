use std::str::FromStr;

use tracing::warn;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的试卷数量
    pub max_concurrent_papers: usize,
    /// 试卷文本（PDF 抽取结果）存放目录
    pub input_folder: String,
    /// 解析结果 JSON 输出目录
    pub output_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 解析不完整的试卷写到这里
    pub warn_file: String,
    /// 解析策略参数文件（TOML），为空则使用默认参数
    pub policy_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_papers: 8,
            input_folder: "input_text".to_string(),
            output_folder: "output_json".to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            warn_file: "warn.txt".to_string(),
            policy_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_papers: parsed_env("MAX_CONCURRENT_PAPERS", "usize")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(default.max_concurrent_papers),
            input_folder: std::env::var("INPUT_FOLDER").unwrap_or(default.input_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            verbose_logging: parsed_env("VERBOSE_LOGGING", "bool")
                .unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            warn_file: std::env::var("WARN_FILE").unwrap_or(default.warn_file),
            policy_file: std::env::var("POLICY_FILE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .or(default.policy_file),
        }
    }
}

/// 读取并解析环境变量；值无法解析时记录警告并返回 None（使用默认值）
fn parsed_env<T: FromStr>(var_name: &str, expected_type: &str) -> Option<T> {
    let value = std::env::var(var_name).ok()?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            let err = ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            };
            warn!("{}，使用默认值", err);
            None
        }
    }
}
