//! 密钥派生策略
//!
//! 为不同的派生方式提供统一的接口：
//! - secp256k1 链 (BTC, ETH, TRX, OMNI): 标准 BIP32
//! - BigBang 家族 (BBC, MKF): 先走 secp256k1 BIP32，再把子私钥作为 ed25519 种子

use std::fmt;

use coins_bip32::path::DerivationPath as Bip32Path;
use zeroize::Zeroizing;

use super::coin_registry::{CurveType, KeyScheme};
use super::derivation_path::DerivationPath;
use super::seed::Seed;
use crate::error::{Result, WalletError};

/// 公钥
#[derive(Clone, PartialEq, Eq)]
pub enum PublicKey {
    Secp256k1(k256::ecdsa::VerifyingKey),
    Ed25519(ed25519_dalek::VerifyingKey),
}

impl PublicKey {
    pub fn curve(&self) -> CurveType {
        match self {
            PublicKey::Secp256k1(_) => CurveType::Secp256k1,
            PublicKey::Ed25519(_) => CurveType::Ed25519,
        }
    }

    /// 默认字节形式：secp256k1 为 33 字节压缩公钥，ed25519 为 32 字节原始公钥
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            PublicKey::Secp256k1(key) => key.to_encoded_point(true).as_bytes().to_vec(),
            PublicKey::Ed25519(key) => key.to_bytes().to_vec(),
        }
    }

    /// 去掉 0x04 前缀的 64 字节未压缩公钥（ed25519 没有这种形式）
    pub fn uncompressed_xy(&self) -> Option<[u8; 64]> {
        match self {
            PublicKey::Secp256k1(key) => {
                let point = key.to_encoded_point(false);
                let mut xy = [0u8; 64];
                xy.copy_from_slice(&point.as_bytes()[1..]);
                Some(xy)
            }
            PublicKey::Ed25519(_) => None,
        }
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey::{:?}({})", self.curve(), hex::encode(self.to_bytes()))
    }
}

/// 派生结果
///
/// 每次调用重新派生，本库从不持久化。私钥 drop 时清零。
#[derive(Clone)]
pub struct KeyPair {
    private_key: Zeroizing<[u8; 32]>,
    public_key: PublicKey,
}

impl KeyPair {
    pub fn curve(&self) -> CurveType {
        self.public_key.curve()
    }

    pub fn private_key(&self) -> &[u8; 32] {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .finish()
    }
}

/// 派生策略 trait
pub trait DerivationStrategy: Send + Sync {
    fn curve(&self) -> CurveType;

    /// 沿路径从种子派生密钥对
    fn derive(&self, seed: &Seed, path: &DerivationPath) -> Result<KeyPair>;

    /// 直接从 32 字节私钥构造密钥对（导入，不做派生）
    fn from_private_key(&self, private_key: &[u8]) -> Result<KeyPair>;
}

/// BIP32 secp256k1 路径遍历，返回子私钥
fn bip32_child_secret(seed: &Seed, path: &DerivationPath) -> Result<Zeroizing<[u8; 32]>> {
    use coins_bip32::prelude::*;
    use k256::ecdsa::SigningKey;

    let derivation_path = path
        .to_string()
        .parse::<Bip32Path>()
        .map_err(|e| WalletError::InvalidDerivationPath(format!("{}: {}", path, e)))?;

    let master_key = XPriv::root_from_seed(seed.as_bytes(), None)
        .map_err(|e| WalletError::KeyDerivationFailure(format!("master key: {}", e)))?;

    let derived_key = master_key
        .derive_path(&derivation_path)
        .map_err(|e| WalletError::KeyDerivationFailure(format!("{}: {}", path, e)))?;

    // XPriv 实现 AsRef<SigningKey>
    let signing_key: &SigningKey = derived_key.as_ref();
    Ok(Zeroizing::new(signing_key.to_bytes().into()))
}

fn private_key_array(private_key: &[u8]) -> Result<Zeroizing<[u8; 32]>> {
    if private_key.len() != 32 {
        return Err(WalletError::InvalidPrivateKeyFormat(format!(
            "expected 32 bytes, got {}",
            private_key.len()
        )));
    }
    let mut bytes = Zeroizing::new([0u8; 32]);
    bytes.copy_from_slice(private_key);
    Ok(bytes)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Secp256k1 策略 (BTC, ETH, TRX, OMNI)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct Secp256k1Strategy;

impl DerivationStrategy for Secp256k1Strategy {
    fn curve(&self) -> CurveType {
        CurveType::Secp256k1
    }

    fn derive(&self, seed: &Seed, path: &DerivationPath) -> Result<KeyPair> {
        let secret = bip32_child_secret(seed, path)?;
        self.from_private_key(secret.as_slice())
            .map_err(|e| WalletError::KeyDerivationFailure(e.to_string()))
    }

    fn from_private_key(&self, private_key: &[u8]) -> Result<KeyPair> {
        use k256::ecdsa::{SigningKey, VerifyingKey};

        let private_key = private_key_array(private_key)?;
        // 0 和 >= n 的标量都会被拒绝
        let signing_key = SigningKey::from_slice(private_key.as_slice()).map_err(|_| {
            WalletError::InvalidPrivateKeyFormat("scalar out of secp256k1 range".to_string())
        })?;

        Ok(KeyPair {
            public_key: PublicKey::Secp256k1(VerifyingKey::from(&signing_key)),
            private_key,
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Ed25519 策略 (BBC, MKF)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct Ed25519SeedStrategy;

impl DerivationStrategy for Ed25519SeedStrategy {
    fn curve(&self) -> CurveType {
        CurveType::Ed25519
    }

    fn derive(&self, seed: &Seed, path: &DerivationPath) -> Result<KeyPair> {
        // coins-bip32 只生成 secp256k1 密钥，子私钥的 32 字节直接作为 ed25519 种子
        let secret = bip32_child_secret(seed, path)?;
        self.from_private_key(secret.as_slice())
    }

    fn from_private_key(&self, private_key: &[u8]) -> Result<KeyPair> {
        use ed25519_dalek::SigningKey;

        let private_key = private_key_array(private_key)?;
        let signing_key = SigningKey::from_bytes(&private_key);

        Ok(KeyPair {
            public_key: PublicKey::Ed25519(signing_key.verifying_key()),
            private_key,
        })
    }
}

pub struct DerivationStrategyFactory;

impl DerivationStrategyFactory {
    pub fn create_strategy(scheme: KeyScheme) -> Box<dyn DerivationStrategy> {
        match scheme {
            KeyScheme::Bip32 => Box::new(Secp256k1Strategy),
            KeyScheme::Bip32Ed25519Seed => Box::new(Ed25519SeedStrategy),
        }
    }
}

/// 密钥派生器
pub struct KeyDeriver;

impl KeyDeriver {
    pub fn derive(seed: &Seed, path: &DerivationPath, scheme: KeyScheme) -> Result<KeyPair> {
        let strategy = DerivationStrategyFactory::create_strategy(scheme);
        tracing::debug!(path = %path, curve = ?strategy.curve(), "deriving key pair");
        strategy.derive(seed, path)
    }

    pub fn from_private_key(private_key: &[u8], scheme: KeyScheme) -> Result<KeyPair> {
        DerivationStrategyFactory::create_strategy(scheme).from_private_key(private_key)
    }
}
