//! OAuth1 单腿请求签名（HMAC-SHA1，仅 consumer key/secret）
//!
//! 签名流程：
//! 1. 生成 OAuth 参数：consumer_key、随机 nonce、签名方法、时间戳、版本
//! 2. 与请求参数合并，按键名字节序排序
//! 3. 按 RFC 3986 对键和值编码（仅保留 `A-Z a-z 0-9 - . _ ~`）
//! 4. 基串：`METHOD&enc(url)&enc(k1=v1&k2=v2...)`
//! 5. 签名密钥：`enc(consumer_secret)&`（无 token secret）
//! 6. oauth_signature = base64(HMAC-SHA1(密钥, 基串))
//!
//! 时钟和 nonce 通过 [`Clock`]、[`NonceSource`] 注入，便于用固定值复现签名。

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use rand::distributions::Alphanumeric;
use rand::Rng;
use sha1::Sha1;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha1 = Hmac<Sha1>;

pub const OAUTH_SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

/// 默认 nonce 长度
pub const NONCE_LEN: usize = 16;

/// 时钟
pub trait Clock: Send + Sync {
    /// Unix 时间（秒）
    fn unix_timestamp(&self) -> u64;
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// 固定时钟
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn unix_timestamp(&self) -> u64 {
        self.0
    }
}

/// nonce 生成器
pub trait NonceSource: Send + Sync {
    fn nonce(&self) -> String;
}

/// 随机字母数字 nonce
#[derive(Debug, Clone, Copy)]
pub struct RandomNonce {
    len: usize,
}

impl RandomNonce {
    pub fn new(len: usize) -> Self {
        Self { len: len.max(1) }
    }
}

impl Default for RandomNonce {
    fn default() -> Self {
        Self::new(NONCE_LEN)
    }
}

impl NonceSource for RandomNonce {
    fn nonce(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.len)
            .map(char::from)
            .collect()
    }
}

/// 固定 nonce
#[derive(Debug, Clone)]
pub struct FixedNonce(pub String);

impl NonceSource for FixedNonce {
    fn nonce(&self) -> String {
        self.0.clone()
    }
}

/// 请求签名器
pub struct RequestSigner {
    clock: Box<dyn Clock>,
    nonce: Box<dyn NonceSource>,
}

impl RequestSigner {
    /// 使用系统时钟和随机 nonce
    pub fn new() -> Self {
        Self::with_sources(SystemClock, RandomNonce::default())
    }

    /// 注入时钟和 nonce 来源
    pub fn with_sources(clock: impl Clock + 'static, nonce: impl NonceSource + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            nonce: Box::new(nonce),
        }
    }

    /// 生成 OAuth 参数（不含签名）
    pub fn oauth_params(&self, consumer_key: &str) -> BTreeMap<String, String> {
        let mut oauth = BTreeMap::new();
        oauth.insert("oauth_consumer_key".to_string(), consumer_key.to_string());
        oauth.insert("oauth_nonce".to_string(), self.nonce.nonce());
        oauth.insert(
            "oauth_signature_method".to_string(),
            OAUTH_SIGNATURE_METHOD.to_string(),
        );
        oauth.insert(
            "oauth_timestamp".to_string(),
            self.clock.unix_timestamp().to_string(),
        );
        oauth.insert("oauth_version".to_string(), OAUTH_VERSION.to_string());
        oauth
    }

    /// 签名请求，返回 OAuth 参数加 `oauth_signature`
    ///
    /// 返回值不含请求参数，发送请求前用 [`merge_signed`] 合并。
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        params: &BTreeMap<String, String>,
        consumer_key: &str,
        consumer_secret: &str,
    ) -> BTreeMap<String, String> {
        let mut oauth = self.oauth_params(consumer_key);

        // 键冲突时 OAuth 参数覆盖请求参数
        let mut all = params.clone();
        all.extend(oauth.iter().map(|(k, v)| (k.clone(), v.clone())));

        let base = signature_base_string(method, url, &all);
        let signature = hmac_sha1_base64(&signing_key(consumer_secret), &base);

        tracing::debug!(
            method = %method.to_uppercase(),
            url = %url,
            params = all.len(),
            "Signed OAuth1 request"
        );

        oauth.insert("oauth_signature".to_string(), signature);
        oauth
    }
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

/// 使用系统时钟和随机 nonce 签名
pub fn sign_request(
    method: &str,
    url: &str,
    params: &BTreeMap<String, String>,
    consumer_key: &str,
    consumer_secret: &str,
) -> BTreeMap<String, String> {
    RequestSigner::new().sign(method, url, params, consumer_key, consumer_secret)
}

/// 合并请求参数与签名参数，得到实际发送的查询参数
pub fn merge_signed(
    params: &BTreeMap<String, String>,
    signed: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = params.clone();
    merged.extend(signed.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// RFC 3986 百分号编码
///
/// 比常见 URL 编码更严格：`!*'()` 也会被编码。
pub fn percent_encode(input: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = String::with_capacity(input.len());
    for &byte in input.as_bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                out.push('%');
                out.push(HEX[(byte >> 4) as usize] as char);
                out.push(HEX[(byte & 0x0F) as usize] as char);
            }
        }
    }
    out
}

/// 规范化参数串：编码后按键排序，`k=v` 以 `&` 连接
pub fn normalize_params(params: &BTreeMap<String, String>) -> String {
    // BTreeMap<String, _> 按字节序迭代
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// 签名基串
pub fn signature_base_string(method: &str, url: &str, params: &BTreeMap<String, String>) -> String {
    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&normalize_params(params))
    )
}

/// 签名密钥，token secret 部分为空
pub fn signing_key(consumer_secret: &str) -> String {
    format!("{}&", percent_encode(consumer_secret))
}

/// base64(HMAC-SHA1(key, data))
pub fn hmac_sha1_base64(key: &str, data: &str) -> String {
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(data.as_bytes());
    base64_encode(&mac.finalize().into_bytes())
}

/// Base64 编码
pub fn base64_encode(data: &[u8]) -> String {
    BASE64.encode(data)
}
