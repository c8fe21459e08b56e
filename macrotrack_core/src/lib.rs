//! 饮食与健身记录核心库
//!
//! 提供：
//! - 每日营养目标计算（Mifflin-St Jeor + 活动系数）
//! - OAuth1 HMAC-SHA1 请求签名
//! - 营养数据库搜索与描述解析
//! - 按用户、按天的饮食/饮水记录

pub mod client;
pub mod error;
pub mod goals;
pub mod log;
pub mod nutrition;
pub mod oauth;
pub mod profile;
pub mod store;
pub mod tracker;
pub mod types;

pub use client::{ClientConfig, FoodSearchClient};
pub use error::{Error, Result};
pub use goals::compute_goals;
pub use log::{daily_log_key, Progress};
pub use nutrition::parse_nutrition_description;
pub use oauth::{sign_request, RequestSigner};
pub use profile::ProfileForm;
pub use store::{DocumentStore, FileStore, MemoryStore};
pub use tracker::{DailySummary, Tracker};
pub use types::*;
