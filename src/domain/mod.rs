//! Domain 模块
//!
//! 派生引擎和交易解码，全部是纯函数

pub mod address;
pub mod bbc;
pub mod coin_registry;
pub mod compat_flags;
pub mod derivation;
pub mod derivation_path;
pub mod key_format;
pub mod seed;
pub mod wallet;

// 重新导出常用类型
pub use address::AddressEncoder;
pub use bbc::{Destination, Transaction, TransactionCodec};
pub use coin_registry::{AddressFormat, Coin, CoinDescriptor, CoinRegistry, CurveType, KeyScheme};
pub use compat_flags::{CompatFlag, CompatFlags};
pub use derivation::{DerivationStrategy, DerivationStrategyFactory, KeyDeriver, KeyPair, PublicKey};
pub use derivation_path::{ChildIndex, DerivationOptions, DerivationPath, PathFormat, PathResolver};
pub use key_format::KeyEncoder;
pub use seed::{MnemonicSeed, Seed, SeedSource};
pub use wallet::{KeyInfo, WalletService};
