//! 食物描述文本解析
//!
//! 搜索结果的营养信息以固定格式嵌在描述中，例如：
//! `Per 100g - Calories: 52kcal | Fat: 0.17g | Carbs: 13.81g | Protein: 0.26g`

use crate::types::{FoodItem, NutritionInfo, RawFood, RawServing};
use regex::Regex;
use std::sync::OnceLock;

fn description_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"Calories: (\d+)kcal \| Fat: ([\d.]+)g \| Carbs: ([\d.]+)g \| Protein: ([\d.]+)g")
            .expect("nutrition pattern is valid")
    })
}

/// 解析营养描述，格式不匹配时返回全零
pub fn parse_nutrition_description(description: &str) -> NutritionInfo {
    let Some(caps) = description_pattern().captures(description) else {
        tracing::debug!(description, "Nutrition description did not match");
        return NutritionInfo::default();
    };

    let number = |idx: usize| {
        caps.get(idx)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    NutritionInfo {
        calories: number(1),
        fat: number(2),
        carbohydrate: number(3),
        protein: number(4),
    }
}

/// 搜索结果条目转换为 [`FoodItem`]
pub fn food_from_search(raw: RawFood) -> FoodItem {
    let nutrition = parse_nutrition_description(&raw.food_description);
    FoodItem {
        food_id: raw.food_id,
        food_name: raw.food_name,
        brand_name: raw.brand_name,
        food_type: raw.food_type,
        nutrition,
    }
}

/// 份量数据转换为营养成分，无法解析的数值记为 0
pub fn nutrition_from_serving(serving: &RawServing) -> NutritionInfo {
    let number = |value: &Option<String>| {
        value
            .as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    NutritionInfo {
        calories: number(&serving.calories),
        fat: number(&serving.fat),
        carbohydrate: number(&serving.carbohydrate),
        protein: number(&serving.protein),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_description() {
        let info = parse_nutrition_description(
            "Per 100g - Calories: 52kcal | Fat: 0.17g | Carbs: 13.81g | Protein: 0.26g",
        );
        assert_eq!(info.calories, 52.0);
        assert_eq!(info.fat, 0.17);
        assert_eq!(info.carbohydrate, 13.81);
        assert_eq!(info.protein, 0.26);
    }

    #[test]
    fn test_parse_description_integer_grams() {
        let info = parse_nutrition_description(
            "Per 1 serving - Calories: 250kcal | Fat: 12g | Carbs: 30g | Protein: 8g",
        );
        assert_eq!(info.fat, 12.0);
        assert_eq!(info.carbohydrate, 30.0);
        assert_eq!(info.protein, 8.0);
    }

    #[test]
    fn test_parse_description_mismatch() {
        assert_eq!(parse_nutrition_description(""), NutritionInfo::default());
        // 小数热量不符合格式
        assert_eq!(
            parse_nutrition_description("Calories: 52.5kcal | Fat: 1g | Carbs: 1g | Protein: 1g"),
            NutritionInfo::default()
        );
    }

    #[test]
    fn test_food_from_search() {
        let raw = RawFood {
            food_id: "35718".to_string(),
            food_name: "Apples".to_string(),
            brand_name: None,
            food_type: "Generic".to_string(),
            food_description: "Per 100g - Calories: 52kcal | Fat: 0.17g | Carbs: 13.81g | Protein: 0.26g"
                .to_string(),
        };
        let food = food_from_search(raw);
        assert_eq!(food.food_id, "35718");
        assert_eq!(food.nutrition.calories, 52.0);
    }

    #[test]
    fn test_nutrition_from_serving() {
        let serving = RawServing {
            calories: Some("95".to_string()),
            fat: Some("0.31".to_string()),
            carbohydrate: Some("25.13".to_string()),
            protein: None,
        };
        let info = nutrition_from_serving(&serving);
        assert_eq!(info.calories, 95.0);
        assert_eq!(info.carbohydrate, 25.13);
        assert_eq!(info.protein, 0.0);
    }
}
