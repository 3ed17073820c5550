//! 错误类型
//!
//! 派生和解码都是纯函数：同样的输入必然得到同样的错误，调用方不应重试

use thiserror::Error;

/// 稳定的错误码（对外暴露，不随错误消息变化）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnknownSymbol,
    InvalidMnemonic,
    InvalidSeed,
    InvalidDerivationPath,
    KeyDerivationFailure,
    InvalidPrivateKeyFormat,
    MalformedTransaction,
    EncodingFailure,
    Unsupported,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnknownSymbol => "unknown_symbol",
            ErrorCode::InvalidMnemonic => "invalid_mnemonic",
            ErrorCode::InvalidSeed => "invalid_seed",
            ErrorCode::InvalidDerivationPath => "invalid_derivation_path",
            ErrorCode::KeyDerivationFailure => "key_derivation_failure",
            ErrorCode::InvalidPrivateKeyFormat => "invalid_private_key_format",
            ErrorCode::MalformedTransaction => "malformed_transaction",
            ErrorCode::EncodingFailure => "encoding_failure",
            ErrorCode::Unsupported => "unsupported",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// 未注册的币种符号（大小写敏感，不会回落到默认链）
    #[error("unknown coin symbol: {0}")]
    UnknownSymbol(String),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// 索引越界，或曲线与路径形态不兼容
    #[error("invalid derivation path: {0}")]
    InvalidDerivationPath(String),

    /// 派生出无效密钥（概率极低，但必须上报而不是换一个索引重试）
    #[error("key derivation failed: {0}")]
    KeyDerivationFailure(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKeyFormat(String),

    #[error("malformed transaction at byte {offset} ({field}): {reason}")]
    MalformedTransaction {
        field: &'static str,
        offset: usize,
        reason: String,
    },

    #[error("encoding failure: {0}")]
    EncodingFailure(String),

    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl WalletError {
    pub fn code(&self) -> ErrorCode {
        match self {
            WalletError::UnknownSymbol(_) => ErrorCode::UnknownSymbol,
            WalletError::InvalidMnemonic(_) => ErrorCode::InvalidMnemonic,
            WalletError::InvalidSeed(_) => ErrorCode::InvalidSeed,
            WalletError::InvalidDerivationPath(_) => ErrorCode::InvalidDerivationPath,
            WalletError::KeyDerivationFailure(_) => ErrorCode::KeyDerivationFailure,
            WalletError::InvalidPrivateKeyFormat(_) => ErrorCode::InvalidPrivateKeyFormat,
            WalletError::MalformedTransaction { .. } => ErrorCode::MalformedTransaction,
            WalletError::EncodingFailure(_) => ErrorCode::EncodingFailure,
            WalletError::Unsupported(_) => ErrorCode::Unsupported,
        }
    }

    pub(crate) fn malformed(field: &'static str, offset: usize, reason: impl Into<String>) -> Self {
        WalletError::MalformedTransaction {
            field,
            offset,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(
            WalletError::UnknownSymbol("DOGE".into()).code().as_str(),
            "unknown_symbol"
        );
        assert_eq!(
            WalletError::malformed("amount", 120, "unexpected end of input")
                .code()
                .as_str(),
            "malformed_transaction"
        );
    }

    #[test]
    fn test_malformed_message_carries_position() {
        let err = WalletError::malformed("signature", 162, "declared 129 bytes, 3 remain");
        assert_eq!(
            err.to_string(),
            "malformed transaction at byte 162 (signature): declared 129 bytes, 3 remain"
        );
    }
}
