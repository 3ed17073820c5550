//! BigBang 交易解码测试
//!
//! 样例交易来自链上真实的 token 转账（两个输入，一个 129 字节签名）。

use wallet_core::domain::bbc::{Hash256, TransactionType};
use wallet_core::domain::{Destination, TransactionCodec, WalletService};
use wallet_core::{ErrorCode, WalletError};

const SAMPLE_TX: &str = "01000000f345785e00000000701af4705c5e6fcb04efc3ca3c851c1e4d8948e10923025f54bea9b000000000026c2ffa7c6fce7b535aa06b436b7d239c18ec033bb886f689e0a0094beef0775e005a5e2804636414cacc577351e542ff4bb81afa23e45317d298d401fcf345785e010174bc27dc9bfdced95b9b01be398ddd1820350115024fcdb4afc23c3d36bd83bb9c64cd1d00000000640000000000000000816578f1ccb4309f9238db2538b8727952e917cbd3b9ee4dc54cbb8876e072a1e801d5748bcbd807c3c18c0120e88e1e592b339eff523b0fbd353182fe65a3a05ede4bac3d4622e8478ec542aabed3223b9862965289b1d35279ebb2e5b754c21cbc7d8fa7f5c23e4d246065cf12a5c4e29aa2be6b37c70cf8f0927536faa75ac303";

const SAMPLE_TXID: &str = "5e7845f31913abc371132db237f5b44379b9e718876a626230e5223d9e4780ab";
const SAMPLE_SENDER: &str = "20g03dfrhttamxxs3ca4fx7f7h1336h9hw9rnza1nb0e2666aq2e9sm9m";

fn sample_bytes() -> Vec<u8> {
    hex::decode(SAMPLE_TX).unwrap()
}

fn expect_malformed(result: Result<impl std::fmt::Debug, WalletError>) -> (&'static str, usize) {
    match result {
        Err(WalletError::MalformedTransaction { field, offset, .. }) => (field, offset),
        other => panic!("expected MalformedTransaction, got {:?}", other),
    }
}

#[test]
fn test_decode_sample_fields() {
    let tx = WalletService::new().decode_transaction("BBC", SAMPLE_TX).unwrap();

    assert_eq!(tx.version, 1);
    assert_eq!(tx.tx_type, TransactionType::Token);
    assert_eq!(tx.timestamp, 1_584_940_531);
    assert_eq!(tx.lock_until, 0);
    assert_eq!(
        tx.anchor.to_string(),
        "00000000b0a9be545f022309e148894d1e1c853ccac3ef04cb6f5e5c70f41a70"
    );

    assert_eq!(tx.inputs.len(), 2);
    assert_eq!(
        tx.inputs[0].prev_txid.to_string(),
        "5e77f0ee4b09a0e089f686b83b03ec189c237d6b436ba05a537bce6f7cfa2f6c"
    );
    assert_eq!(tx.inputs[0].vout, 0);
    assert_eq!(
        tx.inputs[1].prev_txid,
        Hash256::from_hex("5e7845f3fc01d498d21753e423fa1ab84bff42e5517357ccca14646304285e5a").unwrap()
    );
    assert_eq!(tx.inputs[1].vout, 1);

    assert_eq!(
        tx.send_to.to_string(),
        "1ejy2fq4vzq7djpwv06z3k3ex30g3a08n097wvd5fr8y3tdnxgexybjvm"
    );
    assert!(tx.send_from.is_none());
    assert_eq!(tx.amount, 499_999_900);
    assert_eq!(tx.amount_display(), "499.999900");
    assert_eq!(tx.fee, 100);
    assert_eq!(tx.fee_display(), "0.000100");
    assert!(tx.data.is_empty());
    assert_eq!(tx.signature.len(), 129);
    assert!(hex::encode(&tx.signature).starts_with("6578f1cc"));
    assert!(hex::encode(&tx.signature).ends_with("75ac303"));
}

#[test]
fn test_sample_txid() {
    let tx = TransactionCodec::decode_hex(SAMPLE_TX).unwrap();
    assert_eq!(tx.txid().to_string(), SAMPLE_TXID);
}

#[test]
fn test_reencode_is_byte_identical() {
    let tx = TransactionCodec::decode(&sample_bytes()).unwrap();
    assert_eq!(tx.to_hex(), SAMPLE_TX);
    assert_eq!(TransactionCodec::encode(&tx), sample_bytes());
}

#[test]
fn test_json_view() {
    let sender: Destination = SAMPLE_SENDER.parse().unwrap();
    assert!(matches!(sender, Destination::Template(_)));

    let tx = TransactionCodec::decode_hex(SAMPLE_TX).unwrap();
    let plain = serde_json::to_value(&tx).unwrap();
    assert!(plain.get("sendfrom").is_none());

    let json = serde_json::to_value(tx.with_sender(sender)).unwrap();
    assert_eq!(json["version"], 1);
    assert_eq!(json["type"], "token");
    assert_eq!(json["time"], 1_584_940_531u32);
    assert_eq!(json["lockuntil"], 0);
    assert_eq!(
        json["vin"][0]["txid"],
        "5e77f0ee4b09a0e089f686b83b03ec189c237d6b436ba05a537bce6f7cfa2f6c"
    );
    assert_eq!(json["vin"][1]["vout"], 1);
    assert_eq!(json["sendfrom"], SAMPLE_SENDER);
    assert_eq!(json["sendto"], "1ejy2fq4vzq7djpwv06z3k3ex30g3a08n097wvd5fr8y3tdnxgexybjvm");
    assert_eq!(json["amount"], "499.999900");
    assert_eq!(json["txfee"], "0.000100");
    assert_eq!(json["data"], "");
    assert!(json["sig"].as_str().unwrap().starts_with("6578f1cc"));
}

#[test]
fn test_mkf_shares_the_codec() {
    let wallet = WalletService::new();
    assert_eq!(
        wallet.decode_transaction("MKF", SAMPLE_TX).unwrap(),
        wallet.decode_transaction("BBC", SAMPLE_TX).unwrap()
    );
}

#[test]
fn test_non_bigbang_coins_are_unsupported() {
    let wallet = WalletService::new();
    for symbol in ["BTC", "ETH", "TRX", "OMNI", "USDT(Omni)"] {
        let err = wallet.decode_transaction(symbol, SAMPLE_TX).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unsupported, "{}", symbol);
    }
    assert_eq!(
        wallet.decode_transaction("DOGE", SAMPLE_TX).unwrap_err().code(),
        ErrorCode::UnknownSymbol
    );
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// 畸形输入
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn test_every_byte_truncation_is_rejected() {
    let bytes = sample_bytes();
    for len in 0..bytes.len() {
        let (_, offset) = expect_malformed(TransactionCodec::decode(&bytes[..len]));
        assert!(offset <= len, "offset {} beyond input of {} bytes", offset, len);
    }
}

#[test]
fn test_every_hex_truncation_is_rejected() {
    for len in 0..SAMPLE_TX.len() {
        expect_malformed(TransactionCodec::decode_hex(&SAMPLE_TX[..len]));
    }
}

#[test]
fn test_error_locates_the_field() {
    let bytes = sample_bytes();

    assert_eq!(expect_malformed(TransactionCodec::decode(&bytes[..44])), ("input_count", 44));
    assert_eq!(expect_malformed(TransactionCodec::decode(&bytes[..111])), ("send_to", 111));
    assert_eq!(expect_malformed(TransactionCodec::decode(&bytes[..150])).0, "amount");

    let mut trailing = bytes.clone();
    trailing.push(0);
    assert_eq!(expect_malformed(TransactionCodec::decode(&trailing)), ("end", 291));
}

#[test]
fn test_rejects_corrupted_fields() {
    let bytes = sample_bytes();

    // 声明的输入数量远超剩余字节
    let mut inflated = bytes.clone();
    inflated[44] = 0xff;
    assert_eq!(expect_malformed(TransactionCodec::decode(&inflated)).0, "input_count");

    let mut bad_prefix = bytes.clone();
    bad_prefix[111] = 9;
    assert_eq!(expect_malformed(TransactionCodec::decode(&bad_prefix)), ("send_to", 111));

    let mut negative = bytes.clone();
    negative[151] = 0x80;
    assert_eq!(expect_malformed(TransactionCodec::decode(&negative)), ("amount", 144));

    let mut oversized_sig = bytes;
    oversized_sig[161] = 0x82;
    assert_eq!(expect_malformed(TransactionCodec::decode(&oversized_sig)).0, "signature");
}

#[test]
fn test_rejects_non_hex() {
    let mut text = SAMPLE_TX.to_string();
    text.replace_range(0..2, "zz");
    assert_eq!(expect_malformed(TransactionCodec::decode_hex(&text)).0, "hex");
}
