//! 营养数据库搜索客户端

use crate::error::{Error, Result};
use crate::nutrition::{food_from_search, nutrition_from_serving};
use crate::oauth::{merge_signed, RequestSigner};
use crate::types::*;
use reqwest::Client;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// 默认 API 地址
pub const DEFAULT_API_URL: &str = "https://platform.fatsecret.com/rest/server.api";

/// 搜索词最少字符数
pub const MIN_QUERY_LEN: usize = 3;

/// 客户端配置
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API URL
    pub api_url: String,
    /// OAuth consumer key
    pub consumer_key: String,
    /// OAuth consumer secret
    pub consumer_secret: String,
    /// 请求超时（秒）
    pub timeout: u64,
    /// 每次搜索返回的最大条数
    pub max_results: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            consumer_key: String::new(),
            consumer_secret: String::new(),
            timeout: 30,
            max_results: 50,
        }
    }
}

impl ClientConfig {
    /// 从环境变量读取：`MACROTRACK_API_URL`、`FATSECRET_CONSUMER_KEY`、`FATSECRET_CONSUMER_SECRET`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("MACROTRACK_API_URL") {
            config.api_url = url;
        }
        if let Ok(key) = std::env::var("FATSECRET_CONSUMER_KEY") {
            config.consumer_key = key;
        }
        if let Ok(secret) = std::env::var("FATSECRET_CONSUMER_SECRET") {
            config.consumer_secret = secret;
        }
        config
    }
}

/// 食物搜索客户端
pub struct FoodSearchClient {
    config: ClientConfig,
    http_client: Client,
    signer: RequestSigner,
}

impl FoodSearchClient {
    /// 创建新的客户端实例
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_signer(config, RequestSigner::new())
    }

    /// 使用指定签名器（固定时钟/nonce）
    pub fn with_signer(config: ClientConfig, signer: RequestSigner) -> Result<Self> {
        if config.consumer_key.is_empty() || config.consumer_secret.is_empty() {
            return Err(Error::InvalidParam(
                "consumer key and secret are required".to_string(),
            ));
        }

        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            http_client,
            signer,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// 按关键字搜索食物
    ///
    /// 关键字先去掉首尾空白，再做长度校验并作为 `search_expression` 发送。
    pub async fn search_foods(&self, query: &str) -> Result<Vec<FoodItem>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Err(Error::InvalidParam(format!(
                "search query must be at least {} characters",
                MIN_QUERY_LEN
            )));
        }

        info!("Searching foods: {}", query);

        let params = BTreeMap::from([
            ("method".to_string(), "foods.search".to_string()),
            ("search_expression".to_string(), query.to_string()),
            ("format".to_string(), "json".to_string()),
            ("max_results".to_string(), self.config.max_results.to_string()),
        ]);

        let body = self.signed_get(params).await?;
        let foods = parse_search_response(&body)?;

        debug!("Found {} foods for {:?}", foods.len(), query);
        Ok(foods)
    }

    /// 按 ID 获取食物详情（取第一个份量）
    pub async fn get_food(&self, food_id: &str) -> Result<FoodItem> {
        if food_id.trim().is_empty() {
            return Err(Error::InvalidParam("food_id is empty".to_string()));
        }

        let params = BTreeMap::from([
            ("method".to_string(), "food.get".to_string()),
            ("food_id".to_string(), food_id.to_string()),
            ("format".to_string(), "json".to_string()),
        ]);

        let body = self.signed_get(params).await?;
        parse_food_response(&body)?.ok_or_else(|| Error::NotFound(format!("Food {}", food_id)))
    }

    /// 签名并发送 GET 请求，返回响应体
    async fn signed_get(&self, params: BTreeMap<String, String>) -> Result<String> {
        let url = &self.config.api_url;
        let signed = self.signer.sign(
            "GET",
            url,
            &params,
            &self.config.consumer_key,
            &self.config.consumer_secret,
        );
        let query = merge_signed(&params, &signed);

        let response = self
            .http_client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to connect to {}: {}", url, e)))?;

        // 检查 HTTP 状态码
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response from {}: {}", url, e)))?;
        if !status.is_success() {
            warn!("HTTP {} from {}", status, url);
            return Err(Error::Network(format!("HTTP {} from {}: {}", status, url, body)));
        }

        Ok(body)
    }
}

/// API 在 HTTP 200 中返回 `{"error": {...}}` 表示业务错误
fn check_api_error(value: &serde_json::Value) -> Result<()> {
    if value.get("error").is_some() {
        let resp: ApiErrorResponse = serde_json::from_value(value.clone())?;
        return Err(Error::Api {
            code: resp.error.code,
            message: resp.error.message,
        });
    }
    Ok(())
}

/// 解析 `foods.search` 响应；没有结果时返回空列表
pub fn parse_search_response(body: &str) -> Result<Vec<FoodItem>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    check_api_error(&value)?;

    let resp: FoodSearchResponse = serde_json::from_value(value)?;
    let foods = resp
        .foods
        .and_then(|page| page.food)
        .map(OneOrMany::into_vec)
        .unwrap_or_default();

    Ok(foods.into_iter().map(food_from_search).collect())
}

/// 解析 `food.get` 响应
pub fn parse_food_response(body: &str) -> Result<Option<FoodItem>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    check_api_error(&value)?;

    let resp: FoodGetResponse = serde_json::from_value(value)?;
    let Some(food) = resp.food else {
        return Ok(None);
    };

    let nutrition = food
        .servings
        .and_then(|s| s.serving.into_vec().into_iter().next())
        .map(|serving| nutrition_from_serving(&serving))
        .unwrap_or_default();

    Ok(Some(FoodItem {
        food_id: food.food_id,
        food_name: food.food_name,
        brand_name: food.brand_name,
        food_type: food.food_type,
        nutrition,
    }))
}
