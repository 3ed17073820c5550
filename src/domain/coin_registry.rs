//! 币种注册表
//!
//! 定义所有支持的币种及其曲线、coin type、地址编码配置。
//! 描述符是编译期常量，注册表初始化一次后只读，可在任意线程无锁并发读取。

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};

/// BBC 非标准（历史）coin type 的占位值。
///
/// 旧钱包实际使用的常量尚未取得，这里的数值是临时选定的，旧钱包生成的地址
/// 目前无法由它复现。拿到真实常量后替换此值，默认派生随之改变。
/// 打开 `bbc_use_standard_bip44_id` 时改用标准 ID。
pub const BBC_LEGACY_COIN_TYPE: u32 = 5_718_350;
/// BBC 的标准 coin type
pub const BBC_STANDARD_COIN_TYPE: u32 = 223;
/// MKF 非标准（历史）coin type 的占位值，情况同 `BBC_LEGACY_COIN_TYPE`
pub const MKF_LEGACY_COIN_TYPE: u32 = 7_777_777;

/// 加密曲线类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveType {
    /// secp256k1 曲线 (BTC, ETH, TRX, OMNI)
    Secp256k1,
    /// ed25519 曲线 (BBC, MKF)
    Ed25519,
}

/// 私钥派生方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyScheme {
    /// 标准 BIP32 (secp256k1)
    Bip32,
    /// 先走 secp256k1 BIP32，再把子私钥的 32 字节作为 ed25519 种子
    Bip32Ed25519Seed,
}

/// 地址编码格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressFormat {
    /// Base58Check P2PKH (BTC, OMNI)
    P2pkh,
    /// EIP-55 大小写校验的十六进制 (ETH)
    Eip55Hex,
    /// Base58Check, 版本字节 0x41 (TRX)
    TronBase58,
    /// 前缀数字 + base32 + CRC24Q (BBC, MKF)
    BigBangBase32,
}

/// 私钥文本格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivateKeyFormat {
    /// 压缩公钥对应的 WIF
    Wif,
    Hex,
    /// 字节逆序的十六进制（BigBang uint256 的显示顺序）
    ReversedHex,
}

/// 公钥文本格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicKeyFormat {
    CompressedHex,
    /// 去掉 0x04 前缀的 64 字节未压缩公钥
    UncompressedHex,
    ReversedHex,
}

/// 已支持的币种（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Coin {
    Btc,
    Eth,
    Trx,
    Omni,
    Bbc,
    Mkf,
}

impl Coin {
    pub const ALL: [Coin; 6] = [Coin::Btc, Coin::Eth, Coin::Trx, Coin::Omni, Coin::Bbc, Coin::Mkf];

    pub fn descriptor(self) -> &'static CoinDescriptor {
        match self {
            Coin::Btc => &BTC,
            Coin::Eth => &ETH,
            Coin::Trx => &TRX,
            Coin::Omni => &OMNI,
            Coin::Bbc => &BBC,
            Coin::Mkf => &MKF,
        }
    }
}

/// 币种描述符
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoinDescriptor {
    pub coin: Coin,
    /// 规范符号
    pub symbol: &'static str,
    pub name: &'static str,
    /// 默认（历史）coin type
    pub coin_type: u32,
    /// 兼容开关打开后使用的标准 coin type
    pub standard_coin_type: Option<u32>,
    pub curve: CurveType,
    pub key_scheme: KeyScheme,
    pub address_format: AddressFormat,
    pub private_key_format: PrivateKeyFormat,
    pub public_key_format: PublicKeyFormat,
    /// 共享账户时跟随的父链
    pub parent: Option<Coin>,
}

impl CoinDescriptor {
    /// 检查曲线、派生方式与地址编码是否匹配
    pub fn check_consistency(&self) -> Result<()> {
        let ok = matches!(
            (self.curve, self.key_scheme, self.address_format),
            (
                CurveType::Secp256k1,
                KeyScheme::Bip32,
                AddressFormat::P2pkh | AddressFormat::Eip55Hex | AddressFormat::TronBase58
            ) | (
                CurveType::Ed25519,
                KeyScheme::Bip32Ed25519Seed,
                AddressFormat::BigBangBase32
            )
        );
        if ok {
            Ok(())
        } else {
            Err(WalletError::InvalidDerivationPath(format!(
                "{}: curve {:?} cannot be derived with {:?} and encoded as {:?}",
                self.symbol, self.curve, self.key_scheme, self.address_format
            )))
        }
    }

    /// 是否支持解码该链的交易
    pub fn supports_transaction_decode(&self) -> bool {
        self.address_format == AddressFormat::BigBangBase32
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Secp256k1 系列
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const BTC: CoinDescriptor = CoinDescriptor {
    coin: Coin::Btc,
    symbol: "BTC",
    name: "Bitcoin",
    coin_type: 0,
    standard_coin_type: None,
    curve: CurveType::Secp256k1,
    key_scheme: KeyScheme::Bip32,
    address_format: AddressFormat::P2pkh,
    private_key_format: PrivateKeyFormat::Wif,
    public_key_format: PublicKeyFormat::CompressedHex,
    parent: None,
};

const ETH: CoinDescriptor = CoinDescriptor {
    coin: Coin::Eth,
    symbol: "ETH",
    name: "Ethereum",
    coin_type: 60,
    standard_coin_type: None,
    curve: CurveType::Secp256k1,
    key_scheme: KeyScheme::Bip32,
    address_format: AddressFormat::Eip55Hex,
    private_key_format: PrivateKeyFormat::Hex,
    public_key_format: PublicKeyFormat::UncompressedHex,
    parent: None,
};

const TRX: CoinDescriptor = CoinDescriptor {
    coin: Coin::Trx,
    symbol: "TRX",
    name: "Tron",
    coin_type: 195,
    standard_coin_type: None,
    curve: CurveType::Secp256k1,
    key_scheme: KeyScheme::Bip32,
    address_format: AddressFormat::TronBase58,
    private_key_format: PrivateKeyFormat::Hex,
    public_key_format: PublicKeyFormat::UncompressedHex,
    parent: None,
};

// USDT(Omni) 与 OMNI 共用同一个描述符
// coin type 200 为临时选定值，旧钱包的 OMNI 常量尚未取得
const OMNI: CoinDescriptor = CoinDescriptor {
    coin: Coin::Omni,
    symbol: "OMNI",
    name: "Omni Layer",
    coin_type: 200,
    standard_coin_type: None,
    curve: CurveType::Secp256k1,
    key_scheme: KeyScheme::Bip32,
    address_format: AddressFormat::P2pkh,
    private_key_format: PrivateKeyFormat::Wif,
    public_key_format: PublicKeyFormat::CompressedHex,
    parent: Some(Coin::Btc),
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Ed25519 系列 (BigBang 家族)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const BBC: CoinDescriptor = CoinDescriptor {
    coin: Coin::Bbc,
    symbol: "BBC",
    name: "BigBang Core",
    coin_type: BBC_LEGACY_COIN_TYPE,
    standard_coin_type: Some(BBC_STANDARD_COIN_TYPE),
    curve: CurveType::Ed25519,
    key_scheme: KeyScheme::Bip32Ed25519Seed,
    address_format: AddressFormat::BigBangBase32,
    private_key_format: PrivateKeyFormat::ReversedHex,
    public_key_format: PublicKeyFormat::ReversedHex,
    parent: None,
};

const MKF: CoinDescriptor = CoinDescriptor {
    coin: Coin::Mkf,
    symbol: "MKF",
    name: "MarketFinance",
    coin_type: MKF_LEGACY_COIN_TYPE,
    standard_coin_type: None,
    curve: CurveType::Ed25519,
    key_scheme: KeyScheme::Bip32Ed25519Seed,
    address_format: AddressFormat::BigBangBase32,
    private_key_format: PrivateKeyFormat::ReversedHex,
    public_key_format: PublicKeyFormat::ReversedHex,
    parent: None,
};

static GLOBAL_REGISTRY: Lazy<CoinRegistry> = Lazy::new(CoinRegistry::new);

/// 币种注册表
pub struct CoinRegistry {
    symbol_map: HashMap<&'static str, Coin>,
    symbols: Vec<&'static str>,
}

impl CoinRegistry {
    /// 进程内共享的注册表
    pub fn global() -> &'static CoinRegistry {
        &GLOBAL_REGISTRY
    }

    fn new() -> Self {
        let mut registry = Self {
            symbol_map: HashMap::new(),
            symbols: Vec::new(),
        };

        for coin in Coin::ALL {
            registry.register(coin.descriptor().symbol, coin);
        }
        // 历史别名
        registry.register("USDT(Omni)", Coin::Omni);

        registry
    }

    fn register(&mut self, symbol: &'static str, coin: Coin) {
        self.symbol_map.insert(symbol, coin);
        self.symbols.push(symbol);
    }

    /// 按符号查找（大小写敏感，精确匹配）
    pub fn resolve(&self, symbol: &str) -> Result<&'static CoinDescriptor> {
        self.coin(symbol).map(Coin::descriptor)
    }

    pub fn coin(&self, symbol: &str) -> Result<Coin> {
        self.symbol_map
            .get(symbol)
            .copied()
            .ok_or_else(|| WalletError::UnknownSymbol(symbol.to_string()))
    }

    /// 所有可用符号（含别名），按注册顺序
    pub fn symbols(&self) -> &[&'static str] {
        &self.symbols
    }

    /// 按曲线类型分组获取
    pub fn get_by_curve_type(&self, curve: CurveType) -> Vec<&'static CoinDescriptor> {
        Coin::ALL
            .iter()
            .map(|coin| coin.descriptor())
            .filter(|d| d.curve == curve)
            .collect()
    }

    /// 验证所有描述符配置完整性
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for coin in Coin::ALL {
            let descriptor = coin.descriptor();

            if let Err(e) = descriptor.check_consistency() {
                errors.push(e.to_string());
            }

            if descriptor.coin_type >= crate::domain::derivation_path::HARDENED_OFFSET {
                errors.push(format!(
                    "{} has out-of-range coin_type: {}",
                    descriptor.symbol, descriptor.coin_type
                ));
            }

            if let Some(parent) = descriptor.parent {
                if parent.descriptor().curve != descriptor.curve {
                    errors.push(format!(
                        "{} shares an account with {} across different curves",
                        descriptor.symbol,
                        parent.descriptor().symbol
                    ));
                }
            }
        }

        for symbol in &self.symbols {
            if !self.symbol_map.contains_key(symbol) {
                errors.push(format!("symbol {} listed but not mapped", symbol));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
