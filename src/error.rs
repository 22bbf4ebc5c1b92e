use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 解析相关错误（只在解析策略内部出现，不会越过策略边界）
    #[error("解析错误: {0}")]
    Parse(#[from] ParseError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 解析策略内部错误
#[derive(Debug, Error)]
pub enum ParseError {
    /// 题号无法解析
    #[error("无法解析题号: '{raw}'")]
    InvalidNumber { raw: String },
    /// 题组范围不合法（起始大于结束或跨度过大）
    #[error("题组范围不合法: {start}-{end}")]
    InvalidGroupRange { start: u32, end: u32 },
    /// 动态正则构建失败
    #[error("正则构建失败: {0}")]
    Regex(#[from] regex::Error),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// JSON 序列化失败
    #[error("JSON序列化失败: {0}")]
    JsonFailed(#[from] serde_json::Error),
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 策略阈值不合法
    #[error("策略参数 {name} 不合法: {reason}")]
    InvalidPolicy { name: String, reason: String },
}

// ========== 从常见错误类型转换 ==========

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: err,
        })
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::File(FileError::TomlParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: err,
        })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::File(FileError::JsonFailed(err))
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Parse(ParseError::Regex(err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建文件不存在错误
    pub fn not_found(path: impl Into<String>) -> Self {
        AppError::File(FileError::NotFound { path: path.into() })
    }

    /// 创建目录不存在错误
    pub fn directory_not_found(path: impl Into<String>) -> Self {
        AppError::File(FileError::DirectoryNotFound { path: path.into() })
    }

    /// 创建策略参数错误
    pub fn invalid_policy(name: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Config(ConfigError::InvalidPolicy {
            name: name.into(),
            reason: reason.into(),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_wraps_into_app_error() {
        let err: AppError = ParseError::InvalidNumber {
            raw: "x1".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::Parse(_)));
        assert!(err.to_string().contains("x1"));
    }

    #[test]
    fn test_io_error_becomes_file_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = AppError::file_read_failed("a.txt", io);
        assert!(err.to_string().contains("a.txt"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
