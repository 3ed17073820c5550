//! 二进制读写游标
//!
//! 小端定长整数和 compact-size 变长整数。所有读取先检查剩余长度，
//! 越界时返回带字段名和偏移量的 MalformedTransaction，不会 panic。

use crate::error::{Result, WalletError};

/// 读游标
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        WireReader { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn read_bytes(&mut self, field: &'static str, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(WalletError::malformed(
                field,
                self.pos,
                format!("needs {} bytes, {} remain", n, self.remaining()),
            ));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(field, N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8> {
        Ok(self.read_array::<1>(field)?[0])
    }

    pub fn read_u16_le(&mut self, field: &'static str) -> Result<u16> {
        self.read_array(field).map(u16::from_le_bytes)
    }

    pub fn read_u32_le(&mut self, field: &'static str) -> Result<u32> {
        self.read_array(field).map(u32::from_le_bytes)
    }

    pub fn read_u64_le(&mut self, field: &'static str) -> Result<u64> {
        self.read_array(field).map(u64::from_le_bytes)
    }

    pub fn read_i64_le(&mut self, field: &'static str) -> Result<i64> {
        self.read_array(field).map(i64::from_le_bytes)
    }

    /// 读取 compact-size，拒绝非最短编码
    pub fn read_compact_size(&mut self, field: &'static str) -> Result<u64> {
        let start = self.pos;
        let first = self.read_u8(field)?;
        let (value, min) = match first {
            0xff => (self.read_u64_le(field)?, 0x1_0000_0000),
            0xfe => (self.read_u32_le(field)? as u64, 0x1_0000),
            0xfd => (self.read_u16_le(field)? as u64, 0xfd),
            b => return Ok(b as u64),
        };
        if value < min {
            return Err(WalletError::malformed(
                field,
                start,
                format!("non-canonical compact size {}", value),
            ));
        }
        Ok(value)
    }

    /// 读取 compact-size 长度前缀的字节串
    pub fn read_var_bytes(&mut self, field: &'static str) -> Result<&'a [u8]> {
        let start = self.pos;
        let len = self.read_compact_size(field)?;
        if len > self.remaining() as u64 {
            return Err(WalletError::malformed(
                field,
                start,
                format!("declared {} bytes, {} remain", len, self.remaining()),
            ));
        }
        self.read_bytes(field, len as usize)
    }

    /// 必须恰好读完
    pub fn finish(&self) -> Result<()> {
        if self.remaining() != 0 {
            return Err(WalletError::malformed(
                "end",
                self.pos,
                format!("{} trailing bytes", self.remaining()),
            ));
        }
        Ok(())
    }
}

/// 写缓冲
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        WireWriter {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    pub fn write_u16_le(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_u32_le(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_i64_le(&mut self, val: i64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    pub fn write_compact_size(&mut self, val: u64) {
        match val {
            0..=0xfc => self.write_u8(val as u8),
            0xfd..=0xffff => {
                self.write_u8(0xfd);
                self.write_u16_le(val as u16);
            }
            0x1_0000..=0xffff_ffff => {
                self.write_u8(0xfe);
                self.write_u32_le(val as u32);
            }
            _ => {
                self.write_u8(0xff);
                self.buf.extend_from_slice(&val.to_le_bytes());
            }
        }
    }

    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_compact_size(bytes.len() as u64);
        self.write_bytes(bytes);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
