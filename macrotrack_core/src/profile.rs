//! 引导表单校验

use crate::error::{Error, Result};
use crate::types::{ActivityLevel, Gender, UserProfile};
use chrono::{Datelike, NaiveDate, Utc};

/// 引导页面收集的原始输入
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub name: String,
    /// `YYYY-MM-DD`
    pub birthdate: String,
    pub gender: String,
    /// cm
    pub height: String,
    /// kg
    pub weight: String,
    pub activity_level: Option<String>,
    pub goal: Option<String>,
    pub target_weight: Option<String>,
}

impl ProfileForm {
    /// 以今天（UTC）为基准校验
    pub fn validate(&self) -> Result<UserProfile> {
        self.validate_on(Utc::now().date_naive())
    }

    /// 以指定日期为基准校验并生成资料
    pub fn validate_on(&self, today: NaiveDate) -> Result<UserProfile> {
        let height = positive_number("height", &self.height)?;
        let weight = positive_number("weight", &self.weight)?;
        let birthdate = parse_date("birthdate", &self.birthdate)?;
        let age = age_on(birthdate, today)
            .ok_or_else(|| Error::InvalidParam("birthdate: must not be in the future".to_string()))?;

        let activity_level = match self.activity_level.as_deref() {
            Some(raw) => {
                let level = ActivityLevel::parse(raw);
                if level.is_none() {
                    tracing::warn!(activity_level = raw, "Unknown activity level, using moderate");
                }
                level
            }
            None => None,
        };

        let target_weight = match self.target_weight.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Some(positive_number("targetWeight", raw)?),
            _ => None,
        };

        let name = self.name.trim();
        Ok(UserProfile {
            name: (!name.is_empty()).then(|| name.to_string()),
            weight,
            height,
            age,
            gender: Gender::parse(&self.gender),
            activity_level,
            goal: self.goal.clone().filter(|g| !g.trim().is_empty()),
            target_weight,
        })
    }
}

fn positive_number(field: &str, raw: &str) -> Result<f64> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::InvalidParam(format!("{}: not a number: {:?}", field, raw)))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidParam(format!("{}: must be greater than 0", field)));
    }
    Ok(value)
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| Error::InvalidParam(format!("{}: {}", field, e)))
}

/// 截至 `today` 的周岁；出生日期晚于 `today` 时返回 None
pub fn age_on(birthdate: NaiveDate, today: NaiveDate) -> Option<u32> {
    if birthdate > today {
        return None;
    }
    let mut years = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}
