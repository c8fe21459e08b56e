//! 饮食记录服务
//!
//! 在 [`DocumentStore`] 之上提供按用户、按天的读写操作。
//! 每次操作都是“读取 - 修改 - 整体写回”，同一天文档的并发写入以最后一次为准。

use crate::error::{Error, Result};
use crate::goals::goals_or_default;
use crate::log::{daily_log_key, Progress};
use crate::store::{DocumentStore, DAILY_LOGS, USERS};
use crate::types::{DailyLog, FoodItem, GoalSet, LoggedFood, UserProfile};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// 单次查询历史的最大天数
pub const MAX_HISTORY_DAYS: u32 = 3660;

/// 某天的汇总
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub goals: GoalSet,
    pub log: DailyLog,
    pub remaining_calories: f64,
    pub progress: Progress,
}

/// 饮食记录服务
pub struct Tracker<S> {
    store: S,
}

impl<S: DocumentStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 保存用户资料
    pub async fn save_profile(&self, user_id: &str, profile: &UserProfile) -> Result<()> {
        let doc = serde_json::to_value(profile)?;
        self.store.put(USERS, user_id, doc).await?;
        info!("Saved profile for user: {}", user_id);
        Ok(())
    }

    /// 读取用户资料
    pub async fn load_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        match self.store.get(USERS, user_id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    /// 当前目标；没有资料时使用默认目标
    pub async fn goals(&self, user_id: &str) -> Result<GoalSet> {
        let profile = self.load_profile(user_id).await?;
        Ok(goals_or_default(profile.as_ref()))
    }

    /// 读取某天的记录，不存在时创建空记录并写入
    pub async fn load_or_init_daily_log(&self, user_id: &str, date: NaiveDate) -> Result<DailyLog> {
        let key = daily_log_key(user_id, date);
        if let Some(doc) = self.store.get(DAILY_LOGS, &key).await? {
            return Ok(serde_json::from_value(doc)?);
        }

        debug!("Initializing daily log: {}", key);
        let log = DailyLog::default();
        self.write_daily_log(user_id, date, &log).await?;
        Ok(log)
    }

    /// 记录食物
    pub async fn log_food(
        &self,
        user_id: &str,
        date: NaiveDate,
        food: &FoodItem,
        quantity: f64,
    ) -> Result<LoggedFood> {
        if !quantity.is_finite() {
            return Err(Error::InvalidParam(format!("quantity must be finite, got {}", quantity)));
        }
        let mut log = self.load_or_init_daily_log(user_id, date).await?;
        let entry = log.log_food(food, quantity);
        self.write_daily_log(user_id, date, &log).await?;

        info!(
            "Logged {} x{} ({:.0} kcal) for {}",
            food.food_name, quantity, entry.calories, user_id
        );
        Ok(entry)
    }

    /// 删除已记录的食物
    pub async fn remove_food(&self, user_id: &str, date: NaiveDate, entry_id: &str) -> Result<LoggedFood> {
        let mut log = self.load_or_init_daily_log(user_id, date).await?;
        let entry = log
            .remove_food(entry_id)
            .ok_or_else(|| Error::NotFound(format!("Logged food {}", entry_id)))?;
        self.write_daily_log(user_id, date, &log).await?;

        info!("Removed {} from {}", entry.name, daily_log_key(user_id, date));
        Ok(entry)
    }

    /// 调整饮水量，返回调整后的值
    pub async fn adjust_water(&self, user_id: &str, date: NaiveDate, delta: f64) -> Result<f64> {
        if !delta.is_finite() {
            return Err(Error::InvalidParam(format!("water delta must be finite, got {}", delta)));
        }
        let mut log = self.load_or_init_daily_log(user_id, date).await?;
        let water = log.adjust_water(delta);
        self.write_daily_log(user_id, date, &log).await?;
        Ok(water)
    }

    /// 某天的目标、记录与进度
    pub async fn summary(&self, user_id: &str, date: NaiveDate) -> Result<DailySummary> {
        let goals = self.goals(user_id).await?;
        let log = self.load_or_init_daily_log(user_id, date).await?;
        Ok(DailySummary {
            date,
            goals,
            remaining_calories: log.remaining_calories(&goals),
            progress: log.progress(&goals),
            log,
        })
    }

    /// 截至 `end` 的最近 `days` 天记录（按日期升序），不存在的天跳过，不会创建文档
    ///
    /// `days` 超过 [`MAX_HISTORY_DAYS`] 时返回 `InvalidParam`；早于日历下限的日期跳过。
    pub async fn history(&self, user_id: &str, end: NaiveDate, days: u32) -> Result<Vec<(NaiveDate, DailyLog)>> {
        if days > MAX_HISTORY_DAYS {
            return Err(Error::InvalidParam(format!(
                "history is limited to {} days, got {}",
                MAX_HISTORY_DAYS, days
            )));
        }

        let mut out = Vec::new();
        for offset in (0..days).rev() {
            let Some(date) = end.checked_sub_signed(Duration::days(i64::from(offset))) else {
                continue;
            };
            let key = daily_log_key(user_id, date);
            if let Some(doc) = self.store.get(DAILY_LOGS, &key).await? {
                out.push((date, serde_json::from_value(doc)?));
            }
        }
        Ok(out)
    }

    async fn write_daily_log(&self, user_id: &str, date: NaiveDate, log: &DailyLog) -> Result<()> {
        let mut doc = serde_json::to_value(log)?;
        // 额外写入归属字段，便于按用户和日期查询
        if let Value::Object(fields) = &mut doc {
            fields.insert("userId".to_string(), Value::String(user_id.to_string()));
            fields.insert("date".to_string(), Value::String(date.format("%Y-%m-%d").to_string()));
        }
        self.store.put(DAILY_LOGS, &daily_log_key(user_id, date), doc).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MockDocumentStore;
    use crate::types::{ActivityLevel, Gender, NutritionInfo};
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn oats() -> FoodItem {
        FoodItem {
            food_id: "1001".to_string(),
            food_name: "Oats".to_string(),
            brand_name: None,
            food_type: "Generic".to_string(),
            nutrition: NutritionInfo {
                calories: 150.0,
                fat: 3.0,
                carbohydrate: 27.0,
                protein: 5.0,
            },
        }
    }

    #[tokio::test]
    async fn test_init_daily_log_when_missing() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .withf(|collection, key| collection == DAILY_LOGS && key == "u1_2024-05-01")
            .times(1)
            .returning(|_, _| Ok(None));
        store
            .expect_put()
            .withf(|collection, key, doc| {
                collection == DAILY_LOGS
                    && key == "u1_2024-05-01"
                    && doc["userId"] == "u1"
                    && doc["date"] == "2024-05-01"
                    && doc["caloriesConsumed"] == 0.0
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let tracker = Tracker::new(store);
        let log = tracker.load_or_init_daily_log("u1", date()).await.unwrap();
        assert_eq!(log, DailyLog::default());
    }

    #[tokio::test]
    async fn test_existing_daily_log_is_not_rewritten() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, _| Ok(Some(json!({"caloriesConsumed": 300.0, "waterIntake": 1.2}))));
        store.expect_put().never();

        let tracker = Tracker::new(store);
        let log = tracker.load_or_init_daily_log("u1", date()).await.unwrap();
        assert_eq!(log.calories_consumed, 300.0);
        assert_eq!(log.water_intake, 1.2);
    }

    #[tokio::test]
    async fn test_log_food_writes_totals() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, _| Ok(Some(json!({}))));
        store
            .expect_put()
            .withf(|_, _, doc| doc["caloriesConsumed"] == 300.0 && doc["loggedFoods"][0]["name"] == "Oats")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let tracker = Tracker::new(store);
        let entry = tracker.log_food("u1", date(), &oats(), 2.0).await.unwrap();
        assert_eq!(entry.protein, 10.0);
    }

    #[tokio::test]
    async fn test_remove_unknown_food() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, _| Ok(Some(json!({"loggedFoods": []}))));
        store.expect_put().never();

        let tracker = Tracker::new(store);
        let err = tracker.remove_food("u1", date(), "nope").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_storage_error_propagates() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .returning(|_, _| Err(Error::Storage("permission denied".to_string())));

        let tracker = Tracker::new(store);
        let err = tracker.adjust_water("u1", date(), 0.1).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_non_finite_input_rejected() {
        let mut store = MockDocumentStore::new();
        store.expect_get().never();
        store.expect_put().never();

        let tracker = Tracker::new(store);
        let err = tracker.adjust_water("u1", date(), f64::INFINITY).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParam(_)));
        let err = tracker.adjust_water("u1", date(), f64::NAN).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParam(_)));
        let err = tracker.log_food("u1", date(), &oats(), f64::INFINITY).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParam(_)));
    }

    #[tokio::test]
    async fn test_history_too_many_days() {
        let mut store = MockDocumentStore::new();
        store.expect_get().never();

        let tracker = Tracker::new(store);
        let err = tracker.history("u1", date(), 200_000_000).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParam(_)));
    }

    #[tokio::test]
    async fn test_history_at_calendar_start() {
        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|_, _| Ok(None));

        let tracker = Tracker::new(store);
        let history = tracker.history("u1", NaiveDate::MIN, 5).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_goals_from_profile() {
        let profile = UserProfile::new(70.0, 175.0, 30, Gender::Male, Some(ActivityLevel::Moderate));
        let doc = serde_json::to_value(&profile).unwrap();

        let mut store = MockDocumentStore::new();
        store
            .expect_get()
            .withf(|collection, key| collection == USERS && key == "u1")
            .returning(move |_, _| Ok(Some(doc.clone())));

        let tracker = Tracker::new(store);
        let goals = tracker.goals("u1").await.unwrap();
        assert_eq!(goals.calorie_goal, 2556);
    }
}
