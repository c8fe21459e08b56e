//! 数据类型定义

use serde::{Deserialize, Deserializer, Serialize};

/// 性别（只影响 BMR 公式的常数项）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Other,
}

impl Gender {
    /// "male" 为男性，其余一律视为 Other
    ///
    /// 有意放宽匹配：忽略大小写和首尾空白，`"Male"`、`" male "` 也视为男性。
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("male") {
            Gender::Male
        } else {
            Gender::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Other => "other",
        }
    }
}

impl From<String> for Gender {
    fn from(raw: String) -> Self {
        Gender::parse(&raw)
    }
}

impl From<Gender> for String {
    fn from(gender: Gender) -> Self {
        gender.as_str().to_string()
    }
}

/// 活动水平
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityLevel {
    /// 久坐
    Sedentary,
    /// 轻度活动
    Light,
    /// 中度活动
    #[default]
    Moderate,
    /// 积极活动
    Active,
    /// 高强度活动
    VeryActive,
}

impl ActivityLevel {
    /// 全部取值，按活动量递增
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::Light,
        ActivityLevel::Moderate,
        ActivityLevel::Active,
        ActivityLevel::VeryActive,
    ];

    /// TDEE 乘数
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    /// 线上名称，如 `veryActive`
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "veryActive",
        }
    }

    /// 解析线上名称；无法识别时返回 None，由调用方决定回退
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == raw.trim())
    }
}

/// 用户资料（存储于 `users/{userId}`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 体重（kg）
    pub weight: f64,
    /// 身高（cm）
    pub height: f64,
    /// 年龄（岁）
    pub age: u32,
    pub gender: Gender,
    /// 缺失或无法识别时为 None，计算时按 moderate 处理
    #[serde(
        default,
        deserialize_with = "lenient_activity_level",
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_level: Option<ActivityLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight: Option<f64>,
}

impl UserProfile {
    /// 仅包含生物特征的资料
    pub fn new(
        weight: f64,
        height: f64,
        age: u32,
        gender: Gender,
        activity_level: Option<ActivityLevel>,
    ) -> Self {
        Self {
            name: None,
            weight,
            height,
            age,
            gender,
            activity_level,
            goal: None,
            target_weight: None,
        }
    }
}

fn lenient_activity_level<'de, D>(deserializer: D) -> std::result::Result<Option<ActivityLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(ActivityLevel::parse))
}

/// 每日营养目标
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSet {
    /// kcal/天
    pub calorie_goal: i64,
    /// g/天
    pub protein_goal: i64,
    /// g/天
    pub fat_goal: i64,
    /// g/天，可能为负
    pub carb_goal: i64,
    /// L/天，一位小数
    pub water_goal: f64,
}

impl Default for GoalSet {
    /// 资料缺失时展示的默认目标
    fn default() -> Self {
        Self {
            calorie_goal: 2000,
            protein_goal: 150,
            fat_goal: 65,
            carb_goal: 250,
            water_goal: 2.5,
        }
    }
}

/// 单份食物营养成分
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionInfo {
    pub calories: f64,
    pub fat: f64,
    pub carbohydrate: f64,
    pub protein: f64,
}

/// 搜索结果中的食物
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub food_id: String,
    pub food_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    pub food_type: String,
    #[serde(flatten)]
    pub nutrition: NutritionInfo,
}

/// 已记录的食物（数值已乘以份数）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedFood {
    pub id: String,
    pub name: String,
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
}

/// 每日记录（存储于 `dailyLogs/{userId}_{date}`）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyLog {
    pub calories_consumed: f64,
    pub calories_burned: f64,
    /// 饮水量（L）
    pub water_intake: f64,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub logged_foods: Vec<LoggedFood>,
}

/// `foods.search` 响应
#[derive(Debug, Clone, Deserialize)]
pub struct FoodSearchResponse {
    pub foods: Option<FoodsPage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoodsPage {
    pub food: Option<OneOrMany<RawFood>>,
}

/// 只有一个结果时 API 返回对象而非数组
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// 搜索结果原始条目，营养信息在自由文本描述中
#[derive(Debug, Clone, Deserialize)]
pub struct RawFood {
    pub food_id: String,
    pub food_name: String,
    pub brand_name: Option<String>,
    #[serde(default)]
    pub food_type: String,
    #[serde(default)]
    pub food_description: String,
}

/// `food.get` 响应
#[derive(Debug, Clone, Deserialize)]
pub struct FoodGetResponse {
    pub food: Option<RawFoodDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFoodDetail {
    pub food_id: String,
    pub food_name: String,
    pub brand_name: Option<String>,
    #[serde(default)]
    pub food_type: String,
    pub servings: Option<Servings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Servings {
    pub serving: OneOrMany<RawServing>,
}

/// 份量数据，API 以字符串形式返回数值
#[derive(Debug, Clone, Deserialize)]
pub struct RawServing {
    #[serde(default)]
    pub calories: Option<String>,
    #[serde(default)]
    pub fat: Option<String>,
    #[serde(default)]
    pub carbohydrate: Option<String>,
    #[serde(default)]
    pub protein: Option<String>,
}

/// API 错误响应
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: i64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_level_parse() {
        assert_eq!(ActivityLevel::parse("veryActive"), Some(ActivityLevel::VeryActive));
        assert_eq!(ActivityLevel::parse(" light "), Some(ActivityLevel::Light));
        assert_eq!(ActivityLevel::parse("extreme"), None);
        assert_eq!(ActivityLevel::default().factor(), 1.55);
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse("Male"), Gender::Male);
        assert_eq!(Gender::parse(" MALE "), Gender::Male);
        assert_eq!(Gender::parse("female"), Gender::Other);
        assert_eq!(Gender::parse(""), Gender::Other);
    }

    #[test]
    fn test_profile_lenient_activity() {
        let json = r#"{"weight":70,"height":175,"age":30,"gender":"male","activityLevel":"couch"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.activity_level, None);
        assert_eq!(profile.gender, Gender::Male);

        let json = r#"{"weight":70,"height":175,"age":30,"gender":"other"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.activity_level, None);
    }

    #[test]
    fn test_daily_log_missing_fields() {
        let log: DailyLog = serde_json::from_str(r#"{"caloriesConsumed": 120.5}"#).unwrap();
        assert_eq!(log.calories_consumed, 120.5);
        assert!(log.logged_foods.is_empty());
    }

    #[test]
    fn test_one_or_many() {
        let one: OneOrMany<u32> = serde_json::from_str("3").unwrap();
        assert_eq!(one.into_vec(), vec![3]);
        let many: OneOrMany<u32> = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(many.into_vec(), vec![1, 2]);
    }
}
