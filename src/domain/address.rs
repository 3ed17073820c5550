//! 地址编码
//!
//! 按币种描述符的地址格式选择编码方式。每条链的哈希流水线各自独立实现，
//! 任一步失败都直接报错，不会退回到别的格式。

use bitcoin::address::NetworkUnchecked;
use bitcoin::{Address, AddressType, Network};
use sha3::{Digest, Keccak256};

use super::bbc::Destination;
use super::coin_registry::{AddressFormat, CoinDescriptor};
use super::derivation::PublicKey;
use crate::error::{Result, WalletError};

/// TRX 地址版本字节
pub const TRON_ADDRESS_PREFIX: u8 = 0x41;

fn bitcoin_network(test_network: bool) -> Network {
    if test_network {
        Network::Testnet
    } else {
        Network::Bitcoin
    }
}

fn uncompressed_xy(public_key: &PublicKey, format: AddressFormat) -> Result<[u8; 64]> {
    public_key.uncompressed_xy().ok_or_else(|| {
        WalletError::EncodingFailure(format!("{:?} needs a secp256k1 public key", format))
    })
}

/// keccak256(未压缩公钥)[12..]
fn keccak_address_bytes(xy: &[u8; 64]) -> [u8; 20] {
    let hash = Keccak256::digest(xy);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    out
}

/// EIP-55 大小写校验
/// https://eips.ethereum.org/EIPS/eip-55
pub fn to_checksum_address(address: &[u8; 20]) -> String {
    let lower = hex::encode(address);
    let hash = Keccak256::digest(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, ch) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
        if ch.is_ascii_alphabetic() && nibble >= 8 {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// 地址编码器
pub struct AddressEncoder;

impl AddressEncoder {
    pub fn encode(descriptor: &CoinDescriptor, public_key: &PublicKey, test_network: bool) -> Result<String> {
        if public_key.curve() != descriptor.curve {
            return Err(WalletError::EncodingFailure(format!(
                "{} expects a {:?} key",
                descriptor.symbol, descriptor.curve
            )));
        }

        match descriptor.address_format {
            AddressFormat::P2pkh => {
                let pubkey = bitcoin::PublicKey::from_slice(&public_key.to_bytes())
                    .map_err(|e| WalletError::EncodingFailure(format!("secp256k1 public key: {}", e)))?;
                Ok(Address::p2pkh(&pubkey, bitcoin_network(test_network)).to_string())
            }
            AddressFormat::Eip55Hex => {
                let xy = uncompressed_xy(public_key, descriptor.address_format)?;
                Ok(to_checksum_address(&keccak_address_bytes(&xy)))
            }
            AddressFormat::TronBase58 => {
                let xy = uncompressed_xy(public_key, descriptor.address_format)?;
                let mut payload = Vec::with_capacity(21);
                payload.push(TRON_ADDRESS_PREFIX);
                payload.extend_from_slice(&keccak_address_bytes(&xy));
                Ok(bs58::encode(payload).with_check().into_string())
            }
            AddressFormat::BigBangBase32 => {
                let mut data = [0u8; 32];
                data.copy_from_slice(&public_key.to_bytes());
                Ok(Destination::PubKey(data).to_string())
            }
        }
    }

    /// 地址格式校验（不抛错，格式不对返回 false）
    pub fn validate(descriptor: &CoinDescriptor, address: &str, test_network: bool) -> bool {
        match descriptor.address_format {
            AddressFormat::P2pkh => Self::validate_p2pkh(address, test_network),
            AddressFormat::Eip55Hex => Self::validate_evm_address(address),
            AddressFormat::TronBase58 => bs58::decode(address)
                .with_check(None)
                .into_vec()
                .map(|payload| payload.len() == 21 && payload[0] == TRON_ADDRESS_PREFIX)
                .unwrap_or(false),
            AddressFormat::BigBangBase32 => address.parse::<Destination>().is_ok(),
        }
    }

    fn validate_p2pkh(address: &str, test_network: bool) -> bool {
        address
            .parse::<Address<NetworkUnchecked>>()
            .ok()
            .and_then(|unchecked| unchecked.require_network(bitcoin_network(test_network)).ok())
            .map(|checked| checked.address_type() == Some(AddressType::P2pkh))
            .unwrap_or(false)
    }

    /// 全小写或全大写视为未带校验；混合大小写必须通过 EIP-55
    fn validate_evm_address(address: &str) -> bool {
        let Some(hex_part) = address.strip_prefix("0x") else {
            return false;
        };
        if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return false;
        }

        let has_upper = hex_part.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = hex_part.chars().any(|c| c.is_ascii_lowercase());
        if !(has_upper && has_lower) {
            return true;
        }

        let mut bytes = [0u8; 20];
        if hex::decode_to_slice(hex_part, &mut bytes).is_err() {
            return false;
        }
        to_checksum_address(&bytes) == address
    }
}
