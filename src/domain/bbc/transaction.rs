//! BigBang 交易编解码
//!
//! 线上格式（小端，无 schema）：
//!
//! ```text
//! version u16 | type u16 | timestamp u32 | lock_until u32 | anchor [32]
//! | compact-size n | n × (prev txid [32] | vout u8)
//! | send_to (prefix u8 | data [32]) | amount i64 | fee i64
//! | compact-size len | data | compact-size len | signature
//! ```
//!
//! 发送方地址不在这个版本的线上格式中。

use std::fmt;

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Serialize, Serializer};

use super::address::Destination;
use super::codec::{WireReader, WireWriter};
use crate::error::{Result, WalletError};

type Blake2b256 = Blake2b<U32>;

/// 1 个币 = 10^6 最小单位
pub const COIN: i64 = 1_000_000;

/// 固定部分长度（不含输入、附加数据和签名）
const FIXED_LEN: usize = 2 + 2 + 4 + 4 + 32 + 33 + 8 + 8;

/// 256 位哈希，显示时字节逆序
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    pub fn from_hex(display_hex: &str) -> Result<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(display_hex, &mut bytes)
            .map_err(|e| WalletError::EncodingFailure(format!("hash: {}", e)))?;
        bytes.reverse();
        Ok(Hash256(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut display = self.0;
        display.reverse();
        f.write_str(&hex::encode(display))
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 交易类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Token,
    Certification,
    Genesis,
    Stake,
    Work,
    Other(u16),
}

impl TransactionType {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x0000 => TransactionType::Token,
            0xff00 => TransactionType::Certification,
            0x0100 => TransactionType::Genesis,
            0x0200 => TransactionType::Stake,
            0x0300 => TransactionType::Work,
            other => TransactionType::Other(other),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match *self {
            TransactionType::Token => 0x0000,
            TransactionType::Certification => 0xff00,
            TransactionType::Genesis => 0x0100,
            TransactionType::Stake => 0x0200,
            TransactionType::Work => 0x0300,
            TransactionType::Other(other) => other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TransactionType::Token => "token",
            TransactionType::Certification => "certification",
            TransactionType::Genesis => "genesis",
            TransactionType::Stake => "stake",
            TransactionType::Work => "work",
            TransactionType::Other(_) => "unknown",
        }
    }
}

impl Serialize for TransactionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// 交易输入（引用的前序输出）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TxInput {
    #[serde(rename = "txid")]
    pub prev_txid: Hash256,
    pub vout: u8,
}

/// 最小单位格式化为 6 位小数
pub fn format_amount(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{}{}.{:06}", sign, abs / COIN as u64, abs % COIN as u64)
}

fn serialize_amount<S: Serializer>(amount: &i64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_amount(*amount))
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

/// 解码后的交易
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub version: u16,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    #[serde(rename = "time")]
    pub timestamp: u32,
    #[serde(rename = "lockuntil")]
    pub lock_until: u32,
    pub anchor: Hash256,
    #[serde(rename = "vin")]
    pub inputs: Vec<TxInput>,
    #[serde(rename = "sendfrom", skip_serializing_if = "Option::is_none")]
    pub send_from: Option<Destination>,
    #[serde(rename = "sendto")]
    pub send_to: Destination,
    #[serde(serialize_with = "serialize_amount")]
    pub amount: i64,
    #[serde(rename = "txfee", serialize_with = "serialize_amount")]
    pub fee: i64,
    #[serde(serialize_with = "serialize_hex")]
    pub data: Vec<u8>,
    #[serde(rename = "sig", serialize_with = "serialize_hex")]
    pub signature: Vec<u8>,
}

impl Transaction {
    /// 附加发送方（线上格式不携带，调用方根据花费的输出得知）
    pub fn with_sender(mut self, sender: Destination) -> Self {
        self.send_from = Some(sender);
        self
    }

    /// 交易哈希：blake2b-256(序列化字节)，最高 4 字节替换为时间戳
    pub fn txid(&self) -> Hash256 {
        let digest = Blake2b256::digest(self.to_bytes());
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&digest);
        hash[28..].copy_from_slice(&self.timestamp.to_le_bytes());
        Hash256(hash)
    }

    /// 序列化（decode 的严格逆操作）
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut writer = WireWriter::with_capacity(
            FIXED_LEN + 9 + self.inputs.len() * 33 + 9 + self.data.len() + 9 + self.signature.len(),
        );

        writer.write_u16_le(self.version);
        writer.write_u16_le(self.tx_type.as_u16());
        writer.write_u32_le(self.timestamp);
        writer.write_u32_le(self.lock_until);
        writer.write_bytes(self.anchor.as_bytes());

        writer.write_compact_size(self.inputs.len() as u64);
        for input in &self.inputs {
            writer.write_bytes(input.prev_txid.as_bytes());
            writer.write_u8(input.vout);
        }

        writer.write_u8(self.send_to.prefix());
        writer.write_bytes(&self.send_to.data());
        writer.write_i64_le(self.amount);
        writer.write_i64_le(self.fee);
        writer.write_var_bytes(&self.data);
        writer.write_var_bytes(&self.signature);

        writer.into_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn amount_display(&self) -> String {
        format_amount(self.amount)
    }

    pub fn fee_display(&self) -> String {
        format_amount(self.fee)
    }
}

/// 交易编解码器
pub struct TransactionCodec;

impl TransactionCodec {
    pub fn decode_hex(raw_hex: &str) -> Result<Transaction> {
        let bytes = hex::decode(raw_hex.trim())
            .map_err(|e| WalletError::malformed("hex", 0, e.to_string()))?;
        Self::decode(&bytes)
    }

    pub fn decode(raw: &[u8]) -> Result<Transaction> {
        let mut reader = WireReader::new(raw);

        let version = reader.read_u16_le("version")?;
        let tx_type = TransactionType::from_u16(reader.read_u16_le("type")?);
        let timestamp = reader.read_u32_le("timestamp")?;
        let lock_until = reader.read_u32_le("lock_until")?;
        let anchor = Hash256(reader.read_array("anchor")?);

        let count_offset = reader.position();
        let count = reader.read_compact_size("input_count")?;
        // 每个输入 33 字节，先按剩余长度检查，避免按声明值预分配
        if count > (reader.remaining() / 33) as u64 {
            return Err(WalletError::malformed(
                "input_count",
                count_offset,
                format!("declared {} inputs, {} bytes remain", count, reader.remaining()),
            ));
        }
        let inputs = (0..count)
            .map(|_| {
                Ok(TxInput {
                    prev_txid: Hash256(reader.read_array("input.prev_txid")?),
                    vout: reader.read_u8("input.vout")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let send_to_offset = reader.position();
        let prefix = reader.read_u8("send_to")?;
        let data = reader.read_array("send_to")?;
        let send_to = Destination::from_parts(prefix, data)
            .map_err(|e| WalletError::malformed("send_to", send_to_offset, e.to_string()))?;

        let amount_offset = reader.position();
        let amount = reader.read_i64_le("amount")?;
        let fee = reader.read_i64_le("fee")?;
        if amount < 0 || fee < 0 {
            return Err(WalletError::malformed(
                "amount",
                amount_offset,
                "negative amount or fee",
            ));
        }

        let data = reader.read_var_bytes("data")?.to_vec();
        let signature = reader.read_var_bytes("signature")?.to_vec();
        reader.finish()?;

        let tx = Transaction {
            version,
            tx_type,
            timestamp,
            lock_until,
            anchor,
            inputs,
            send_from: None,
            send_to,
            amount,
            fee,
            data,
            signature,
        };

        tracing::debug!(
            bytes = raw.len(),
            inputs = tx.inputs.len(),
            tx_type = tx.tx_type.name(),
            "decoded transaction"
        );

        Ok(tx)
    }

    pub fn encode(tx: &Transaction) -> Vec<u8> {
        tx.to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Transaction {
        Transaction {
            version: 1,
            tx_type: TransactionType::Token,
            timestamp: 1_600_000_000,
            lock_until: 0,
            anchor: Hash256([0x11; 32]),
            inputs: vec![TxInput {
                prev_txid: Hash256([0x22; 32]),
                vout: 3,
            }],
            send_from: None,
            send_to: Destination::PubKey([0x33; 32]),
            amount: 12_345_678,
            fee: 100,
            data: vec![0xde, 0xad],
            signature: vec![0x55; 64],
        }
    }

    #[test]
    fn test_encode_decode_inverse() {
        let tx = sample_tx();
        let bytes = TransactionCodec::encode(&tx);
        assert_eq!(bytes.len(), FIXED_LEN + 1 + 33 + 1 + 2 + 1 + 64);
        assert_eq!(TransactionCodec::decode(&bytes).unwrap(), tx);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(499_999_900), "499.999900");
        assert_eq!(format_amount(100), "0.000100");
        assert_eq!(format_amount(0), "0.000000");
        assert_eq!(format_amount(-1_500_000), "-1.500000");
        assert_eq!(format_amount(i64::MIN), "-9223372036854.775808");
    }

    #[test]
    fn test_transaction_types() {
        for value in [0x0000u16, 0xff00, 0x0100, 0x0200, 0x0300, 0x0042] {
            assert_eq!(TransactionType::from_u16(value).as_u16(), value);
        }
        assert_eq!(TransactionType::from_u16(0).name(), "token");
        assert_eq!(TransactionType::from_u16(0x0042), TransactionType::Other(0x42));
    }

    #[test]
    fn test_hash_display_is_reversed() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        bytes[31] = 0x01;
        let hash = Hash256(bytes);
        let shown = hash.to_string();
        assert!(shown.starts_with("01"));
        assert!(shown.ends_with("ab"));
        assert_eq!(Hash256::from_hex(&shown).unwrap(), hash);
    }

    #[test]
    fn test_txid_embeds_timestamp() {
        let tx = sample_tx();
        let txid = tx.txid().to_string();
        assert_eq!(&txid[..8], format!("{:08x}", tx.timestamp));
    }

    #[test]
    fn test_rejects_inflated_input_count() {
        let mut bytes = TransactionCodec::encode(&sample_tx());
        // 输入数量字段紧跟 anchor
        bytes[44] = 0xfc;
        assert!(matches!(
            TransactionCodec::decode(&bytes),
            Err(WalletError::MalformedTransaction { field: "input_count", offset: 44, .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_destination_prefix() {
        let mut bytes = TransactionCodec::encode(&sample_tx());
        bytes[44 + 1 + 33] = 9;
        assert!(matches!(
            TransactionCodec::decode(&bytes),
            Err(WalletError::MalformedTransaction { field: "send_to", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_hex() {
        assert!(matches!(
            TransactionCodec::decode_hex("0g"),
            Err(WalletError::MalformedTransaction { field: "hex", .. })
        ));
        assert!(TransactionCodec::decode_hex("").is_err());
    }
}
