//! 测试辅助模块
//! 提供测试助记词和辅助函数

#![allow(dead_code)]

use wallet_core::domain::{CompatFlags, DerivationOptions, MnemonicSeed, PathFormat, WalletService};

pub const LECTURE: &str = "lecture leg select like delay limit spread retire toward west grape bachelor";
pub const CONNECT: &str = "connect auto goose panda extend ozone absent climb abstract doll west crazy";
pub const ABANDON: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

pub fn mnemonic(phrase: &str) -> MnemonicSeed {
    MnemonicSeed::parse(phrase).expect("test mnemonic must be valid")
}

pub fn full() -> DerivationOptions {
    DerivationOptions::new(PathFormat::Full)
}

pub fn short() -> DerivationOptions {
    DerivationOptions::new(PathFormat::Short)
}

pub fn legacy() -> CompatFlags {
    CompatFlags::legacy()
}

/// 派生地址的简写
pub fn address(phrase: &str, symbol: &str, options: &DerivationOptions, flags: &CompatFlags) -> String {
    WalletService::new()
        .derive_address(&mnemonic(phrase), symbol, options, flags)
        .unwrap_or_else(|e| panic!("{} derivation failed: {}", symbol, e))
}

/// 历史钱包的盐不随代码发布，从环境变量读取
pub fn legacy_password() -> String {
    std::env::var("WALLET_LEGACY_PASSWORD").expect("WALLET_LEGACY_PASSWORD must be set for legacy vectors")
}
