//! 钱包服务
//!
//! 无状态编排层：币种解析 → 路径解析 → 种子拉伸 → 密钥派生 → 地址编码。
//! 所有操作只依赖显式传入的参数，可以在任意线程并发调用。

use std::fmt;

use zeroize::Zeroizing;

use super::address::AddressEncoder;
use super::bbc::{Transaction, TransactionCodec};
use super::coin_registry::{CoinDescriptor, CoinRegistry};
use super::compat_flags::CompatFlags;
use super::derivation::{KeyDeriver, KeyPair};
use super::derivation_path::{DerivationOptions, PathResolver};
use super::key_format::KeyEncoder;
use super::seed::{Seed, SeedSource};
use crate::error::{Result, WalletError};

/// 一次派生或导入得到的完整密钥信息
#[derive(Clone)]
pub struct KeyInfo {
    pub symbol: &'static str,
    /// 导入的私钥没有派生路径
    pub derivation_path: Option<String>,
    pub private_key: Zeroizing<String>,
    pub public_key: String,
    pub address: String,
}

impl fmt::Debug for KeyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyInfo")
            .field("symbol", &self.symbol)
            .field("derivation_path", &self.derivation_path)
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .field("address", &self.address)
            .finish()
    }
}

/// 钱包服务
pub struct WalletService {
    registry: &'static CoinRegistry,
}

impl Default for WalletService {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletService {
    pub fn new() -> Self {
        Self {
            registry: CoinRegistry::global(),
        }
    }

    /// 所有可用的币种符号
    pub fn available_coins(&self) -> &[&'static str] {
        self.registry.symbols()
    }

    pub fn derive_address(
        &self,
        source: &dyn SeedSource,
        symbol: &str,
        options: &DerivationOptions,
        flags: &CompatFlags,
    ) -> Result<String> {
        let descriptor = self.registry.resolve(symbol)?;
        let seed = source.to_seed(options.password())?;
        let (pair, _) = self.derive_pair(&seed, descriptor, options, flags)?;
        AddressEncoder::encode(descriptor, pair.public_key(), options.test_network())
    }

    pub fn derive_private_key(
        &self,
        source: &dyn SeedSource,
        symbol: &str,
        options: &DerivationOptions,
        flags: &CompatFlags,
    ) -> Result<Zeroizing<String>> {
        let descriptor = self.registry.resolve(symbol)?;
        let seed = source.to_seed(options.password())?;
        let (pair, _) = self.derive_pair(&seed, descriptor, options, flags)?;
        KeyEncoder::private_key(descriptor, &pair, options.test_network())
    }

    pub fn derive_public_key(
        &self,
        source: &dyn SeedSource,
        symbol: &str,
        options: &DerivationOptions,
        flags: &CompatFlags,
    ) -> Result<String> {
        let descriptor = self.registry.resolve(symbol)?;
        let seed = source.to_seed(options.password())?;
        let (pair, _) = self.derive_pair(&seed, descriptor, options, flags)?;
        KeyEncoder::public_key(descriptor, &pair)
    }

    /// 一次派生同时得到私钥、公钥和地址
    pub fn derive_key_info(
        &self,
        source: &dyn SeedSource,
        symbol: &str,
        options: &DerivationOptions,
        flags: &CompatFlags,
    ) -> Result<KeyInfo> {
        let descriptor = self.registry.resolve(symbol)?;
        let seed = source.to_seed(options.password())?;
        self.key_info_from_seed(&seed, descriptor, options, flags)
    }

    /// 同一个种子批量派生多个币种的地址
    ///
    /// 种子只拉伸一次，各币种分批在独立线程上派生（每批不超过可用并行度），
    /// 结果顺序与输入一致。
    pub fn derive_addresses(
        &self,
        source: &dyn SeedSource,
        symbols: &[&str],
        options: &DerivationOptions,
        flags: &CompatFlags,
    ) -> Result<Vec<(String, Result<String>)>> {
        let seed = source.to_seed(options.password())?;
        let seed = &seed;
        let workers = std::thread::available_parallelism().map_or(1, |n| n.get());

        let mut results = Vec::with_capacity(symbols.len());
        for batch in symbols.chunks(workers) {
            std::thread::scope(|scope| {
                let handles: Vec<_> = batch
                    .iter()
                    .map(|symbol| {
                        scope.spawn(move || {
                            let descriptor = self.registry.resolve(symbol)?;
                            let (pair, _) = self.derive_pair(seed, descriptor, options, flags)?;
                            AddressEncoder::encode(descriptor, pair.public_key(), options.test_network())
                        })
                    })
                    .collect();

                results.extend(handles.into_iter().map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(WalletError::KeyDerivationFailure("derivation worker panicked".to_string()))
                    })
                }));
            });
        }

        Ok(symbols
            .iter()
            .map(|symbol| symbol.to_string())
            .zip(results)
            .collect())
    }

    /// 导入单个私钥（不做派生），计算公钥和地址
    ///
    /// 测试网 WIF 按测试网输出 WIF 和地址，十六进制私钥按主网处理。
    pub fn import_private_key(&self, symbol: &str, private_key: &str) -> Result<KeyInfo> {
        let descriptor = self.registry.resolve(symbol)?;
        let (raw, test_network) = KeyEncoder::parse_private_key_with_network(descriptor, private_key).map_err(|e| {
            tracing::warn!(symbol = descriptor.symbol, "rejected private key import");
            e
        })?;
        let pair = KeyDeriver::from_private_key(&raw, descriptor.key_scheme)?;

        Ok(KeyInfo {
            symbol: descriptor.symbol,
            derivation_path: None,
            private_key: KeyEncoder::private_key(descriptor, &pair, test_network)?,
            public_key: KeyEncoder::public_key(descriptor, &pair)?,
            address: AddressEncoder::encode(descriptor, pair.public_key(), test_network)?,
        })
    }

    /// 解码交易（仅 BigBang 家族）
    pub fn decode_transaction(&self, symbol: &str, raw_hex: &str) -> Result<Transaction> {
        let descriptor = self.registry.resolve(symbol)?;
        if !descriptor.supports_transaction_decode() {
            return Err(WalletError::Unsupported(format!(
                "transaction decoding is not available for {}",
                descriptor.symbol
            )));
        }

        TransactionCodec::decode_hex(raw_hex).map_err(|e| {
            tracing::warn!(symbol = descriptor.symbol, error = %e, "rejected transaction");
            e
        })
    }

    pub fn validate_address(&self, symbol: &str, address: &str, test_network: bool) -> Result<bool> {
        let descriptor = self.registry.resolve(symbol)?;
        Ok(AddressEncoder::validate(descriptor, address, test_network))
    }

    fn key_info_from_seed(
        &self,
        seed: &Seed,
        descriptor: &'static CoinDescriptor,
        options: &DerivationOptions,
        flags: &CompatFlags,
    ) -> Result<KeyInfo> {
        let (pair, path) = self.derive_pair(seed, descriptor, options, flags)?;

        Ok(KeyInfo {
            symbol: descriptor.symbol,
            derivation_path: Some(path),
            private_key: KeyEncoder::private_key(descriptor, &pair, options.test_network())?,
            public_key: KeyEncoder::public_key(descriptor, &pair)?,
            address: AddressEncoder::encode(descriptor, pair.public_key(), options.test_network())?,
        })
    }

    fn derive_pair(
        &self,
        seed: &Seed,
        descriptor: &CoinDescriptor,
        options: &DerivationOptions,
        flags: &CompatFlags,
    ) -> Result<(KeyPair, String)> {
        let path = PathResolver::resolve(descriptor, options, flags)?;
        tracing::debug!(
            symbol = descriptor.symbol,
            path = %path,
            flags = ?flags.enabled(),
            "deriving"
        );
        let pair = KeyDeriver::derive(seed, &path, descriptor.key_scheme)?;
        Ok((pair, path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::derivation_path::PathFormat;
    use crate::domain::seed::MnemonicSeed;

    const LECTURE: &str = "lecture leg select like delay limit spread retire toward west grape bachelor";

    fn source() -> MnemonicSeed {
        MnemonicSeed::parse(LECTURE).unwrap()
    }

    #[test]
    fn test_full_path_vectors() {
        let wallet = WalletService::new();
        let options = DerivationOptions::default();
        let flags = CompatFlags::default();

        assert_eq!(
            wallet.derive_address(&source(), "BTC", &options, &flags).unwrap(),
            "1NCvbkHN9bq97JfvTGQAonNn3KpPk73LEZ"
        );
        assert_eq!(
            wallet.derive_address(&source(), "ETH", &options, &flags).unwrap(),
            "0x18CACe95E0d5a3E0AC610dD8064490EdC16C176f"
        );
    }

    #[test]
    fn test_key_info_matches_single_calls() {
        let wallet = WalletService::new();
        let options = DerivationOptions::new(PathFormat::Short).with_password("pw");
        let flags = CompatFlags::default();

        for symbol in wallet.available_coins() {
            let info = wallet.derive_key_info(&source(), symbol, &options, &flags).unwrap();
            assert_eq!(info.address, wallet.derive_address(&source(), symbol, &options, &flags).unwrap());
            assert_eq!(info.public_key, wallet.derive_public_key(&source(), symbol, &options, &flags).unwrap());
            assert_eq!(
                info.private_key,
                wallet.derive_private_key(&source(), symbol, &options, &flags).unwrap()
            );
            assert!(info.derivation_path.is_some());
        }
    }

    #[test]
    fn test_unknown_symbol_never_falls_back() {
        let wallet = WalletService::new();
        let err = wallet
            .derive_address(&source(), "eth", &DerivationOptions::default(), &CompatFlags::default())
            .unwrap_err();
        assert_eq!(err, WalletError::UnknownSymbol("eth".into()));
    }

    #[test]
    fn test_decode_unsupported_for_btc() {
        let wallet = WalletService::new();
        assert!(matches!(
            wallet.decode_transaction("BTC", "00"),
            Err(WalletError::Unsupported(_))
        ));
        assert!(matches!(
            wallet.decode_transaction("DOGE", "00"),
            Err(WalletError::UnknownSymbol(_))
        ));
    }

    #[test]
    fn test_fan_out_matches_sequential() {
        let wallet = WalletService::new();
        let options = DerivationOptions::default();
        let flags = CompatFlags::default();

        let symbols = ["BTC", "ETH", "NOPE", "BBC"];
        let results = wallet.derive_addresses(&source(), &symbols, &options, &flags).unwrap();
        assert_eq!(results.len(), symbols.len());

        for (symbol, result) in results {
            match wallet.derive_address(&source(), &symbol, &options, &flags) {
                Ok(expected) => assert_eq!(result.unwrap(), expected),
                Err(expected) => assert_eq!(result.unwrap_err(), expected),
            }
        }
    }

    #[test]
    fn test_key_info_debug_is_redacted() {
        let wallet = WalletService::new();
        let info = wallet
            .import_private_key("ETH", "0000000000000000000000000000000000000000000000000000000000000001")
            .unwrap();
        assert!(info.derivation_path.is_none());
        assert!(!format!("{:?}", info).contains(info.private_key.as_str()));
    }
}
