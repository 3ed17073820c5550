//! 派生路径
//!
//! 路径形态有两种：
//! - short: `m/coin_type'/0/0`
//! - full:  `m/44'/coin_type'/0'/0/0`
//!
//! 两种形态在同一个主密钥下走到不同的子密钥，调用方用它区分历史钱包和标准钱包。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::coin_registry::CoinDescriptor;
use super::compat_flags::CompatFlags;
use crate::error::{Result, WalletError};

/// 硬化派生偏移量
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// BIP44 purpose
pub const BIP44_PURPOSE: u32 = 44;

/// 路径中的一级索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildIndex {
    Normal(u32),
    Hardened(u32),
}

impl ChildIndex {
    pub fn normal(index: u32) -> Result<Self> {
        Self::check_range(index).map(ChildIndex::Normal)
    }

    pub fn hardened(index: u32) -> Result<Self> {
        Self::check_range(index).map(ChildIndex::Hardened)
    }

    fn check_range(index: u32) -> Result<u32> {
        if index >= HARDENED_OFFSET {
            return Err(WalletError::InvalidDerivationPath(format!(
                "index {} exceeds 31 bits",
                index
            )));
        }
        Ok(index)
    }

    pub fn is_hardened(&self) -> bool {
        matches!(self, ChildIndex::Hardened(_))
    }

    pub fn index(&self) -> u32 {
        match *self {
            ChildIndex::Normal(i) | ChildIndex::Hardened(i) => i,
        }
    }

    /// BIP32 线上编码（硬化索引带最高位）
    pub fn raw(&self) -> u32 {
        match *self {
            ChildIndex::Normal(i) => i,
            ChildIndex::Hardened(i) => i | HARDENED_OFFSET,
        }
    }
}

impl fmt::Display for ChildIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildIndex::Normal(i) => write!(f, "{}", i),
            ChildIndex::Hardened(i) => write!(f, "{}'", i),
        }
    }
}

/// 有序的派生路径
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<ChildIndex>);

impl DerivationPath {
    pub fn new(components: Vec<ChildIndex>) -> Self {
        Self(components)
    }

    pub fn components(&self) -> &[ChildIndex] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for component in &self.0 {
            write!(f, "/{}", component)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = WalletError;

    fn from_str(path: &str) -> Result<Self> {
        let rest = path
            .strip_prefix('m')
            .ok_or_else(|| WalletError::InvalidDerivationPath(format!("{}: must start with 'm'", path)))?;
        if rest.is_empty() {
            return Ok(Self(Vec::new()));
        }

        let rest = rest
            .strip_prefix('/')
            .ok_or_else(|| WalletError::InvalidDerivationPath(format!("{}: expected '/' after 'm'", path)))?;

        rest.split('/')
            .map(|part| {
                let (digits, hardened) = match part.strip_suffix('\'').or_else(|| part.strip_suffix('h')) {
                    Some(digits) => (digits, true),
                    None => (part, false),
                };
                let index: u32 = digits.parse().map_err(|_| {
                    WalletError::InvalidDerivationPath(format!("{}: bad component '{}'", path, part))
                })?;
                if hardened {
                    ChildIndex::hardened(index)
                } else {
                    ChildIndex::normal(index)
                }
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }
}

/// 路径形态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathFormat {
    /// `m/coin_type'/0/0`
    Short,
    /// `m/44'/coin_type'/0'/0/0`
    #[default]
    Full,
}

impl PathFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathFormat::Short => "short",
            PathFormat::Full => "full",
        }
    }
}

impl FromStr for PathFormat {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(PathFormat::Short),
            "full" => Ok(PathFormat::Full),
            other => Err(WalletError::InvalidDerivationPath(format!(
                "unknown path format: {}",
                other
            ))),
        }
    }
}

/// 派生选项
///
/// 构造后不可变，按值传入每次派生。password 在 drop 时清零，Debug 不输出明文。
#[derive(Clone, PartialEq, Eq, Default, Zeroize, ZeroizeOnDrop)]
pub struct DerivationOptions {
    #[zeroize(skip)]
    path_format: PathFormat,
    password: String,
    #[zeroize(skip)]
    share_account_with_parent_chain: bool,
    #[zeroize(skip)]
    test_network: bool,
}

impl DerivationOptions {
    pub fn new(path_format: PathFormat) -> Self {
        Self {
            path_format,
            password: String::new(),
            share_account_with_parent_chain: false,
            test_network: false,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password.zeroize();
        self.password = password.into();
        self
    }

    pub fn with_shared_account(mut self, shared: bool) -> Self {
        self.share_account_with_parent_chain = shared;
        self
    }

    pub fn with_test_network(mut self, test_network: bool) -> Self {
        self.test_network = test_network;
        self
    }

    pub fn path_format(&self) -> PathFormat {
        self.path_format
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn share_account_with_parent_chain(&self) -> bool {
        self.share_account_with_parent_chain
    }

    pub fn test_network(&self) -> bool {
        self.test_network
    }
}

impl fmt::Debug for DerivationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivationOptions")
            .field("path_format", &self.path_format)
            .field("password", &"<redacted>")
            .field("share_account_with_parent_chain", &self.share_account_with_parent_chain)
            .field("test_network", &self.test_network)
            .finish()
    }
}

/// 路径解析器
pub struct PathResolver;

impl PathResolver {
    /// 选出 coin type
    ///
    /// 共享账户优先于兼容开关：OMNI 共享时直接使用 BTC 解析出的 id。
    pub fn coin_type(descriptor: &CoinDescriptor, options: &DerivationOptions, flags: &CompatFlags) -> u32 {
        match descriptor.parent {
            Some(parent) if options.share_account_with_parent_chain => {
                flags.coin_type_for(parent.descriptor())
            }
            _ => flags.coin_type_for(descriptor),
        }
    }

    pub fn resolve(
        descriptor: &CoinDescriptor,
        options: &DerivationOptions,
        flags: &CompatFlags,
    ) -> Result<DerivationPath> {
        descriptor.check_consistency()?;

        let coin_type = ChildIndex::hardened(Self::coin_type(descriptor, options, flags))?;

        let components = match options.path_format {
            PathFormat::Short => vec![coin_type, ChildIndex::Normal(0), ChildIndex::Normal(0)],
            PathFormat::Full => vec![
                ChildIndex::Hardened(BIP44_PURPOSE),
                coin_type,
                ChildIndex::Hardened(0),
                ChildIndex::Normal(0),
                ChildIndex::Normal(0),
            ],
        };

        Ok(DerivationPath(components))
    }
}
