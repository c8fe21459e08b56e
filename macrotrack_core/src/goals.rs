//! 每日营养目标计算
//!
//! 计算流程：
//! 1. BMR：Mifflin-St Jeor 公式，男性 +5，其他 -161
//! 2. TDEE = BMR × 活动系数（未提供活动水平时按 moderate 1.55）
//! 3. 目标：热量 = TDEE，蛋白质 1.6 g/kg，脂肪占热量 25%（9 kcal/g），
//!    碳水为剩余热量（4 kcal/g，不截断，可能为负），饮水 33 ml/kg
//!
//! 不校验输入范围，范围校验属于 [`crate::profile`]。

use crate::types::{ActivityLevel, Gender, GoalSet, UserProfile};

/// 每公斤体重蛋白质（g）
pub const PROTEIN_PER_KG: f64 = 1.6;
/// 脂肪热量占比
pub const FAT_CALORIE_SHARE: f64 = 0.25;
/// 每公斤体重饮水（L）
pub const WATER_PER_KG: f64 = 0.033;

pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARB: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

/// 基础代谢率（kcal/天）
pub fn bmr(profile: &UserProfile) -> f64 {
    let base = 10.0 * profile.weight + 6.25 * profile.height - 5.0 * f64::from(profile.age);
    match profile.gender {
        Gender::Male => base + 5.0,
        Gender::Other => base - 161.0,
    }
}

/// 每日总能量消耗（kcal/天）
pub fn tdee(profile: &UserProfile) -> f64 {
    let level = profile.activity_level.unwrap_or_default();
    bmr(profile) * level.factor()
}

/// 根据用户资料计算每日目标
pub fn compute_goals(profile: &UserProfile) -> GoalSet {
    let tdee = tdee(profile);

    let calorie_goal = round_half_up(tdee);
    let protein_goal = round_half_up(profile.weight * PROTEIN_PER_KG);
    let fat_goal = round_half_up(tdee * FAT_CALORIE_SHARE / KCAL_PER_G_FAT);
    let committed = protein_goal * KCAL_PER_G_PROTEIN + fat_goal * KCAL_PER_G_FAT;
    let carb_goal = round_half_up((tdee - committed) / KCAL_PER_G_CARB);
    let water_goal = round_half_up(profile.weight * WATER_PER_KG * 10.0) / 10.0;

    GoalSet {
        calorie_goal: calorie_goal as i64,
        protein_goal: protein_goal as i64,
        fat_goal: fat_goal as i64,
        carb_goal: carb_goal as i64,
        water_goal,
    }
}

/// 资料缺失时返回默认目标
pub fn goals_or_default(profile: Option<&UserProfile>) -> GoalSet {
    profile.map(compute_goals).unwrap_or_default()
}

/// 活动系数，None 时按 moderate
pub fn activity_factor(level: Option<ActivityLevel>) -> f64 {
    level.unwrap_or_default().factor()
}

/// .5 向正无穷取整（-1.5 → -1），与 `f64::round` 对负数的处理不同
fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}
