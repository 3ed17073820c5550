//! 种子来源
//!
//! 助记词到种子的拉伸是标准 BIP39 算法，这里只做边界封装。

use std::fmt;

use bip39::{Language, Mnemonic};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Result, WalletError};

pub const MIN_SEED_LEN: usize = 16;
pub const MAX_SEED_LEN: usize = 64;

/// 种子字节（drop 时清零）
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Seed(Vec<u8>);

impl Seed {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if !(MIN_SEED_LEN..=MAX_SEED_LEN).contains(&bytes.len()) {
            return Err(WalletError::InvalidSeed(format!(
                "expected {}..={} bytes, got {}",
                MIN_SEED_LEN,
                MAX_SEED_LEN,
                bytes.len()
            )));
        }
        Ok(Self(bytes.to_vec()))
    }

    pub fn from_hex(seed_hex: &str) -> Result<Self> {
        let mut bytes = hex::decode(seed_hex.trim())
            .map_err(|e| WalletError::InvalidSeed(format!("not hex: {}", e)))?;
        let seed = Self::from_bytes(&bytes);
        bytes.zeroize();
        seed
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed(<{} bytes>)", self.0.len())
    }
}

/// 种子来源
///
/// password 参与种子拉伸，不同 password 得到不同的主密钥。
pub trait SeedSource: Send + Sync {
    fn to_seed(&self, password: &str) -> Result<Seed>;
}

/// 原始种子加盐时的 PBKDF2 参数（与 BIP39 拉伸同样的 HMAC-SHA512 和迭代次数）
const RAW_SEED_SALT_PREFIX: &str = "seed";
const RAW_SEED_ITERATIONS: u32 = 2048;

/// 空密码原样返回；非空密码时以种子为口令、"seed" + password 为盐再拉伸一次，
/// 输出固定 64 字节
impl SeedSource for Seed {
    fn to_seed(&self, password: &str) -> Result<Seed> {
        if password.is_empty() {
            return Ok(self.clone());
        }

        let mut salt = Zeroizing::new(String::with_capacity(RAW_SEED_SALT_PREFIX.len() + password.len()));
        salt.push_str(RAW_SEED_SALT_PREFIX);
        salt.push_str(password);

        let mut stretched = Zeroizing::new([0u8; MAX_SEED_LEN]);
        pbkdf2_hmac::<Sha512>(&self.0, salt.as_bytes(), RAW_SEED_ITERATIONS, stretched.as_mut_slice());
        Seed::from_bytes(stretched.as_slice())
    }
}

/// BIP39 助记词（英文词表）
pub struct MnemonicSeed {
    mnemonic: Mnemonic,
}

impl MnemonicSeed {
    pub fn parse(phrase: &str) -> Result<Self> {
        let mnemonic = Mnemonic::parse_in(Language::English, phrase)
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;
        Ok(Self { mnemonic })
    }

    pub fn word_count(&self) -> usize {
        self.mnemonic.word_count()
    }
}

impl SeedSource for MnemonicSeed {
    fn to_seed(&self, password: &str) -> Result<Seed> {
        let mut bytes = self.mnemonic.to_seed(password);
        let seed = Seed::from_bytes(&bytes);
        bytes.zeroize();
        seed
    }
}

impl fmt::Debug for MnemonicSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MnemonicSeed(<{} words>)", self.word_count())
    }
}
