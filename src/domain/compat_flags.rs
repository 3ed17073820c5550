//! 历史兼容开关
//!
//! 每个开关对应一段历史行为分支。默认全部关闭，关闭时必须完全复现历史地址；
//! 打开开关是选择修正后行为的唯一途径。开关之间相互独立，设置顺序不影响结果。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::coin_registry::{Coin, CoinDescriptor};
use crate::error::WalletError;

/// 单个兼容开关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatFlag {
    /// BBC 使用标准 coin type 代替历史值
    BbcUseStandardBip44Id,
    /// MKF 使用 BBC 解析出的 coin type（两条链地址相同）
    MkfUseBbcBip44Id,
}

impl CompatFlag {
    pub const ALL: [CompatFlag; 2] = [CompatFlag::BbcUseStandardBip44Id, CompatFlag::MkfUseBbcBip44Id];

    pub fn name(&self) -> &'static str {
        match self {
            CompatFlag::BbcUseStandardBip44Id => "bbc_use_standard_bip44_id",
            CompatFlag::MkfUseBbcBip44Id => "mkf_use_bbc_bip44_id",
        }
    }
}

impl fmt::Display for CompatFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompatFlag {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompatFlag::ALL
            .into_iter()
            .find(|flag| flag.name() == s.trim())
            .ok_or_else(|| WalletError::Unsupported(format!("unknown compatibility flag: {}", s)))
    }
}

/// 兼容开关集合
///
/// 不可变值，按值传入每次派生调用。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CompatFlags {
    pub bbc_use_standard_bip44_id: bool,
    pub mkf_use_bbc_bip44_id: bool,
}

impl CompatFlags {
    /// 全部关闭（历史行为）
    pub const fn legacy() -> Self {
        Self {
            bbc_use_standard_bip44_id: false,
            mkf_use_bbc_bip44_id: false,
        }
    }

    pub fn with(mut self, flag: CompatFlag) -> Self {
        match flag {
            CompatFlag::BbcUseStandardBip44Id => self.bbc_use_standard_bip44_id = true,
            CompatFlag::MkfUseBbcBip44Id => self.mkf_use_bbc_bip44_id = true,
        }
        self
    }

    pub fn contains(&self, flag: CompatFlag) -> bool {
        match flag {
            CompatFlag::BbcUseStandardBip44Id => self.bbc_use_standard_bip44_id,
            CompatFlag::MkfUseBbcBip44Id => self.mkf_use_bbc_bip44_id,
        }
    }

    /// 已打开的开关
    pub fn enabled(&self) -> Vec<CompatFlag> {
        CompatFlag::ALL
            .into_iter()
            .filter(|flag| self.contains(*flag))
            .collect()
    }

    /// 解析逗号分隔的开关名（空字符串表示全部关闭）
    pub fn parse_list(list: &str) -> Result<Self, WalletError> {
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .try_fold(Self::legacy(), |flags, name| Ok(flags.with(name.parse()?)))
    }

    /// 按开关策略选出币种的 coin type
    pub fn coin_type_for(&self, descriptor: &CoinDescriptor) -> u32 {
        match descriptor.coin {
            Coin::Bbc => match (self.bbc_use_standard_bip44_id, descriptor.standard_coin_type) {
                (true, Some(standard)) => standard,
                _ => descriptor.coin_type,
            },
            Coin::Mkf if self.mkf_use_bbc_bip44_id => self.coin_type_for(Coin::Bbc.descriptor()),
            _ => descriptor.coin_type,
        }
    }
}

impl FromIterator<CompatFlag> for CompatFlags {
    fn from_iter<I: IntoIterator<Item = CompatFlag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::legacy(), Self::with)
    }
}
