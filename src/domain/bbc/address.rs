//! BigBang 地址
//!
//! 地址 = 前缀数字 + base32(data ‖ crc24q(data))
//! - 前缀: 0 = 空目标, 1 = 公钥, 2 = 模板
//! - data: 32 字节，crc 为 3 字节大端
//! - 字母表去掉了 i l o u，每 5 字节编码为 8 个字符，共 56 个字符

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Result, WalletError};

const ALPHABET: &[u8; 32] = b"0123456789abcdefghjkmnpqrstvwxyz";

const CRC24Q_POLY: u32 = 0x0186_4CFB;

/// 编码后的字符数（不含前缀）
pub const ENCODED_LEN: usize = 56;

pub const PREFIX_NULL: u8 = 0;
pub const PREFIX_PUBKEY: u8 = 1;
pub const PREFIX_TEMPLATE: u8 = 2;

/// CRC-24Q（初值 0，MSB 优先）
pub fn crc24q(data: &[u8]) -> u32 {
    let mut crc: u32 = 0;
    for &byte in data {
        crc ^= (byte as u32) << 16;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x0100_0000 != 0 {
                crc ^= CRC24Q_POLY;
            }
        }
    }
    crc & 0x00FF_FFFF
}

fn base32_encode(data: &[u8; 32]) -> String {
    let crc = crc24q(data);
    let mut buf = [0u8; 35];
    buf[..32].copy_from_slice(data);
    buf[32..].copy_from_slice(&crc.to_be_bytes()[1..]);

    let mut out = String::with_capacity(ENCODED_LEN);
    for chunk in buf.chunks(5) {
        let value = chunk.iter().fold(0u64, |acc, b| (acc << 8) | *b as u64);
        for shift in (0..8).rev() {
            out.push(ALPHABET[((value >> (shift * 5)) & 0x1f) as usize] as char);
        }
    }
    out
}

fn base32_decode(encoded: &str) -> Option<[u8; 32]> {
    if encoded.len() != ENCODED_LEN {
        return None;
    }

    let mut buf = [0u8; 35];
    for (i, chunk) in encoded.as_bytes().chunks(8).enumerate() {
        let mut value = 0u64;
        for c in chunk {
            let digit = ALPHABET.iter().position(|a| a == c)?;
            value = (value << 5) | digit as u64;
        }
        buf[i * 5..i * 5 + 5].copy_from_slice(&value.to_be_bytes()[3..]);
    }

    let mut data = [0u8; 32];
    data.copy_from_slice(&buf[..32]);
    let crc = u32::from_be_bytes([0, buf[32], buf[33], buf[34]]);
    (crc == crc24q(&data)).then_some(data)
}

/// 交易目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Destination {
    Null,
    PubKey([u8; 32]),
    Template([u8; 32]),
}

impl Destination {
    pub fn from_parts(prefix: u8, data: [u8; 32]) -> Result<Self> {
        match prefix {
            PREFIX_NULL if data == [0u8; 32] => Ok(Destination::Null),
            PREFIX_PUBKEY => Ok(Destination::PubKey(data)),
            PREFIX_TEMPLATE => Ok(Destination::Template(data)),
            PREFIX_NULL => Err(WalletError::EncodingFailure(
                "null destination carries data".to_string(),
            )),
            other => Err(WalletError::EncodingFailure(format!(
                "unknown destination prefix {}",
                other
            ))),
        }
    }

    pub fn prefix(&self) -> u8 {
        match self {
            Destination::Null => PREFIX_NULL,
            Destination::PubKey(_) => PREFIX_PUBKEY,
            Destination::Template(_) => PREFIX_TEMPLATE,
        }
    }

    pub fn data(&self) -> [u8; 32] {
        match self {
            Destination::Null => [0u8; 32],
            Destination::PubKey(data) | Destination::Template(data) => *data,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Destination::Null)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.prefix(), base32_encode(&self.data()))
    }
}

impl FromStr for Destination {
    type Err = WalletError;

    fn from_str(address: &str) -> Result<Self> {
        let invalid = || WalletError::EncodingFailure(format!("invalid BigBang address: {}", address));

        let mut chars = address.chars();
        let prefix = chars
            .next()
            .and_then(|c| c.to_digit(10))
            .ok_or_else(invalid)?;
        let data = base32_decode(chars.as_str()).ok_or_else(invalid)?;

        Destination::from_parts(prefix as u8, data).map_err(|_| invalid())
    }
}

impl Serialize for Destination {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
