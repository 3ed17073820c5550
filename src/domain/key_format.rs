//! 密钥文本格式
//!
//! - BTC/OMNI: 私钥 WIF（压缩），公钥压缩十六进制
//! - ETH/TRX: 私钥十六进制，公钥为去掉 0x04 的 64 字节十六进制
//! - BBC/MKF: 私钥和公钥都是字节逆序的十六进制

use bitcoin::secp256k1::SecretKey;
use bitcoin::PrivateKey;
use zeroize::Zeroizing;

use super::coin_registry::{CoinDescriptor, PrivateKeyFormat, PublicKeyFormat};
use super::derivation::KeyPair;
use crate::error::{Result, WalletError};

fn network(test_network: bool) -> bitcoin::Network {
    if test_network {
        bitcoin::Network::Testnet
    } else {
        bitcoin::Network::Bitcoin
    }
}

fn reversed_hex(bytes: &[u8]) -> String {
    let mut reversed = bytes.to_vec();
    reversed.reverse();
    hex::encode(reversed)
}

pub struct KeyEncoder;

impl KeyEncoder {
    pub fn private_key(descriptor: &CoinDescriptor, pair: &KeyPair, test_network: bool) -> Result<Zeroizing<String>> {
        let text = match descriptor.private_key_format {
            PrivateKeyFormat::Wif => {
                let secret = SecretKey::from_slice(pair.private_key())
                    .map_err(|e| WalletError::EncodingFailure(format!("secret key: {}", e)))?;
                PrivateKey::new(secret, network(test_network)).to_wif()
            }
            PrivateKeyFormat::Hex => hex::encode(pair.private_key()),
            PrivateKeyFormat::ReversedHex => reversed_hex(pair.private_key()),
        };
        Ok(Zeroizing::new(text))
    }

    pub fn public_key(descriptor: &CoinDescriptor, pair: &KeyPair) -> Result<String> {
        let public_key = pair.public_key();
        match descriptor.public_key_format {
            PublicKeyFormat::CompressedHex => Ok(hex::encode(public_key.to_bytes())),
            PublicKeyFormat::UncompressedHex => public_key
                .uncompressed_xy()
                .map(hex::encode)
                .ok_or_else(|| WalletError::EncodingFailure("no uncompressed form".to_string())),
            PublicKeyFormat::ReversedHex => Ok(reversed_hex(&public_key.to_bytes())),
        }
    }

    /// 解析导入的私钥文本，返回 32 字节原始私钥
    pub fn parse_private_key(descriptor: &CoinDescriptor, text: &str) -> Result<Zeroizing<Vec<u8>>> {
        Self::parse_private_key_with_network(descriptor, text).map(|(bytes, _)| bytes)
    }

    /// 同上，并返回私钥文本是否属于测试网
    ///
    /// 十六进制始终接受（BBC/MKF 按显示顺序逆序），不携带网络信息，视为主网；
    /// WIF 链额外接受 WIF，网络取自 WIF 版本字节。
    pub fn parse_private_key_with_network(
        descriptor: &CoinDescriptor,
        text: &str,
    ) -> Result<(Zeroizing<Vec<u8>>, bool)> {
        let text = text.trim();
        let text = text.strip_prefix("0x").unwrap_or(text);

        if descriptor.private_key_format == PrivateKeyFormat::Wif && text.len() != 64 {
            let key = PrivateKey::from_wif(text)
                .map_err(|e| WalletError::InvalidPrivateKeyFormat(format!("WIF: {}", e)))?;
            let test_network = key.network != bitcoin::Network::Bitcoin;
            return Ok((Zeroizing::new(key.inner.secret_bytes().to_vec()), test_network));
        }

        let mut bytes = Zeroizing::new(
            hex::decode(text).map_err(|e| WalletError::InvalidPrivateKeyFormat(format!("not hex: {}", e)))?,
        );
        if bytes.len() != 32 {
            return Err(WalletError::InvalidPrivateKeyFormat(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        if descriptor.private_key_format == PrivateKeyFormat::ReversedHex {
            bytes.reverse();
        }
        Ok((bytes, false))
    }
}
