//! wallet-core - 多链 HD 钱包核心
//!
//! 从种子确定性派生私钥、公钥和链地址 (BTC, ETH, TRX, OMNI, USDT(Omni), BBC, MKF)，
//! 并解码 BigBang 家族的二进制交易。不做网络和持久化。

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// 重新导出常用类型
pub use error::{ErrorCode, Result, WalletError};

// 统一模块导出
pub mod prelude {
    pub use crate::{
        domain::{
            CompatFlag, CompatFlags, DerivationOptions, KeyInfo, MnemonicSeed, PathFormat, Seed, SeedSource,
            Transaction, WalletService,
        },
        error::{ErrorCode, Result, WalletError},
    };
}
