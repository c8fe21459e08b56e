//! 每日记录操作

use crate::types::{DailyLog, FoodItem, GoalSet, LoggedFood};
use chrono::NaiveDate;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;

/// 每次点击调整的饮水量（L）
pub const WATER_STEP: f64 = 0.1;

/// 每日记录的文档键：`{user_id}_{YYYY-MM-DD}`
pub fn daily_log_key(user_id: &str, date: NaiveDate) -> String {
    format!("{}_{}", user_id, date.format("%Y-%m-%d"))
}

/// 解析份数，无法解析时为 0
pub fn parse_quantity(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|q| q.is_finite())
        .unwrap_or(0.0)
}

fn entry_id(food_id: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{}-{}", food_id, suffix)
}

impl DailyLog {
    /// 记录食物，累加 `营养 × 份数`
    pub fn log_food(&mut self, food: &FoodItem, quantity: f64) -> LoggedFood {
        let n = &food.nutrition;
        let entry = LoggedFood {
            id: entry_id(&food.food_id),
            name: food.food_name.clone(),
            calories: n.calories * quantity,
            carbs: n.carbohydrate * quantity,
            protein: n.protein * quantity,
            fat: n.fat * quantity,
        };

        self.calories_consumed += entry.calories;
        self.carbs += entry.carbs;
        self.protein += entry.protein;
        self.fat += entry.fat;
        self.logged_foods.push(entry.clone());
        entry
    }

    /// 删除记录并扣减对应数值；id 不存在时不做修改
    pub fn remove_food(&mut self, id: &str) -> Option<LoggedFood> {
        let idx = self.logged_foods.iter().position(|f| f.id == id)?;
        let entry = self.logged_foods.remove(idx);

        self.calories_consumed -= entry.calories;
        self.carbs -= entry.carbs;
        self.protein -= entry.protein;
        self.fat -= entry.fat;
        Some(entry)
    }

    /// 调整饮水量，不低于 0；非有限值不做修改
    pub fn adjust_water(&mut self, delta: f64) -> f64 {
        if !delta.is_finite() {
            return self.water_intake;
        }
        self.water_intake = (self.water_intake + delta).max(0.0);
        self.water_intake
    }

    /// 剩余热量 = 目标 - 摄入 + 消耗
    pub fn remaining_calories(&self, goals: &GoalSet) -> f64 {
        goals.calorie_goal as f64 - self.calories_consumed + self.calories_burned
    }

    pub fn progress(&self, goals: &GoalSet) -> Progress {
        Progress {
            calories: ratio(self.calories_consumed, goals.calorie_goal as f64),
            protein: ratio(self.protein, goals.protein_goal as f64),
            fat: ratio(self.fat, goals.fat_goal as f64),
            carbs: ratio(self.carbs, goals.carb_goal as f64),
            water: ratio(self.water_intake, goals.water_goal),
        }
    }
}

fn ratio(current: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        current / goal
    } else {
        0.0
    }
}

/// 各项完成比例（1.0 为达标）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbs: f64,
    pub water: f64,
}
