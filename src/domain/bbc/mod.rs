//! BigBang 家族 (BBC, MKF) 的地址与交易格式

pub mod address;
pub mod codec;
pub mod transaction;

pub use address::Destination;
pub use transaction::{format_amount, Hash256, Transaction, TransactionCodec, TransactionType, TxInput, COIN};
