//! 配置管理模块
//! 支持从环境变量和配置文件加载配置
//!
//! 派生密码从不出现在配置中，只能在每次调用时传入

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::{CompatFlag, CompatFlags, DerivationOptions, PathFormat};

/// 应用配置结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub derivation: DerivationConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
}

/// 派生默认值
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivationConfig {
    /// "short" or "full"
    pub path_format: String,
    pub test_network: bool,
    pub share_account_with_parent_chain: bool,
    /// 兼容开关名，例如 "bbc_use_standard_bip44_id"
    pub compat_flags: Vec<String>,
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()),
        }
    }
}

impl Default for DerivationConfig {
    fn default() -> Self {
        Self {
            path_format: std::env::var("WALLET_PATH_FORMAT").unwrap_or_else(|_| "full".into()),
            test_network: env_flag("WALLET_TEST_NETWORK"),
            share_account_with_parent_chain: env_flag("WALLET_SHARE_ACCOUNT"),
            compat_flags: std::env::var("WALLET_COMPAT_FLAGS")
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

impl DerivationConfig {
    pub fn path_format(&self) -> Result<PathFormat> {
        self.path_format
            .parse::<PathFormat>()
            .with_context(|| format!("WALLET_PATH_FORMAT must be 'short' or 'full', got '{}'", self.path_format))
    }

    pub fn flags(&self) -> Result<CompatFlags> {
        self.compat_flags
            .iter()
            .map(|name| {
                name.parse::<CompatFlag>()
                    .with_context(|| format!("Unknown compatibility flag in WALLET_COMPAT_FLAGS: {}", name))
            })
            .collect()
    }

    /// 配置默认值 + 调用方提供的密码
    pub fn options(&self, password: &str) -> Result<DerivationOptions> {
        Ok(DerivationOptions::new(self.path_format()?)
            .with_password(password)
            .with_shared_account(self.share_account_with_parent_chain)
            .with_test_network(self.test_network))
    }
}

impl Config {
    /// 从环境变量加载配置（先读取 .env）
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            logging: LoggingConfig::default(),
            derivation: DerivationConfig::default(),
        })
    }

    /// 从配置文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// 从环境变量和配置文件合并加载（配置文件优先级更高）
    pub fn from_env_and_file<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut config = Self::from_env()?;

        if let Some(path) = path {
            if path.as_ref().exists() {
                // 文件中缺省的字段仍回落到环境变量
                config = Self::from_file(path)?;
            }
        }

        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        // 验证日志级别
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            anyhow::bail!("LOG_LEVEL must be one of: {:?}", valid_levels);
        }

        // 验证日志格式
        if self.logging.format != "json" && self.logging.format != "text" {
            anyhow::bail!("LOG_FORMAT must be 'json' or 'text'");
        }

        self.derivation.path_format()?;
        self.derivation.flags()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use tempfile::NamedTempFile;

    use super::*;

    // 环境变量是进程级共享的
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_config_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("WALLET_PATH_FORMAT", "short");
        std::env::set_var("WALLET_COMPAT_FLAGS", "bbc_use_standard_bip44_id, mkf_use_bbc_bip44_id");
        std::env::set_var("WALLET_SHARE_ACCOUNT", "1");

        let config = Config::from_env().unwrap();

        std::env::remove_var("WALLET_PATH_FORMAT");
        std::env::remove_var("WALLET_COMPAT_FLAGS");
        std::env::remove_var("WALLET_SHARE_ACCOUNT");

        assert_eq!(config.derivation.path_format().unwrap(), PathFormat::Short);
        assert!(config.derivation.share_account_with_parent_chain);
        let flags = config.derivation.flags().unwrap();
        assert!(flags.contains(CompatFlag::BbcUseStandardBip44Id));
        assert!(flags.contains(CompatFlag::MkfUseBbcBip44Id));
    }

    #[test]
    fn test_config_from_file() {
        let _guard = ENV_LOCK.lock().unwrap();

        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[logging]
level = "debug"
format = "json"

[derivation]
path_format = "short"
test_network = true
share_account_with_parent_chain = false
compat_flags = ["mkf_use_bbc_bip44_id"]
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());

        let options = config.derivation.options("secret").unwrap();
        assert_eq!(options.path_format(), PathFormat::Short);
        assert!(options.test_network());
        assert_eq!(options.password(), "secret");
        assert_eq!(
            config.derivation.flags().unwrap(),
            CompatFlags::legacy().with(CompatFlag::MkfUseBbcBip44Id)
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        let config = Config::from_env_and_file(Some("/nonexistent/wallet.toml")).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let _guard = ENV_LOCK.lock().unwrap();
        let mut config = Config::from_env().unwrap();
        assert!(config.validate().is_ok());

        config.derivation.path_format = "medium".into();
        assert!(config.validate().is_err());

        config.derivation.path_format = "full".into();
        config.derivation.compat_flags = vec!["fix_everything".into()];
        assert!(config.validate().is_err());

        config.derivation.compat_flags.clear();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }
}
