//! 饮食记录 FFI 绑定
//!
//! 提供 C ABI 兼容的接口，供移动端壳程序调用

use std::collections::BTreeMap;
use std::ffi::{c_char, c_double, c_int, c_uint, CStr, CString};
use std::ptr;

use macrotrack_core::{
    compute_goals, parse_nutrition_description, ActivityLevel, Gender, RequestSigner, UserProfile,
};

/// 错误码定义
pub const MT_OK: c_int = 0;
pub const MT_ERR_NULL_PTR: c_int = -1;
pub const MT_ERR_INVALID_PARAM: c_int = -2;
pub const MT_ERR_ENCODING: c_int = -5;

/// 每日目标
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct MtGoalSet {
    pub calorie_goal: i64,
    pub protein_goal: i64,
    pub fat_goal: i64,
    pub carb_goal: i64,
    pub water_goal: c_double,
}

/// 营养成分
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct MtNutritionInfo {
    pub calories: c_double,
    pub fat: c_double,
    pub carbohydrate: c_double,
    pub protein: c_double,
}

/// 读取 C 字符串参数
///
/// # Safety
/// `ptr` 必须为空或指向以 NUL 结尾的有效字符串
unsafe fn str_arg<'a>(ptr: *const c_char) -> Result<&'a str, c_int> {
    if ptr.is_null() {
        return Err(MT_ERR_NULL_PTR);
    }
    CStr::from_ptr(ptr).to_str().map_err(|_| MT_ERR_ENCODING)
}

/// 依次读取多个 C 字符串参数，遇到第一个无效参数即返回
///
/// # Safety
/// 同 [`str_arg`]
unsafe fn str_args<'a, const N: usize>(ptrs: [*const c_char; N]) -> Result<[&'a str; N], c_int> {
    let mut out = [""; N];
    for (slot, ptr) in out.iter_mut().zip(ptrs) {
        *slot = str_arg(ptr)?;
    }
    Ok(out)
}

/// 计算每日营养目标
///
/// `activity_level` 可为 NULL；无法识别的值按 moderate 计算。
#[no_mangle]
pub extern "C" fn mt_compute_goals(
    weight: c_double,
    height: c_double,
    age: c_uint,
    gender: *const c_char,
    activity_level: *const c_char,
    out_goals: *mut MtGoalSet,
) -> c_int {
    if out_goals.is_null() {
        return MT_ERR_NULL_PTR;
    }

    let gender = match unsafe { str_arg(gender) } {
        Ok(g) => Gender::parse(g),
        Err(code) => return code,
    };
    let activity_level = if activity_level.is_null() {
        None
    } else {
        match unsafe { str_arg(activity_level) } {
            Ok(raw) => ActivityLevel::parse(raw),
            Err(code) => return code,
        }
    };

    let profile = UserProfile::new(weight, height, age, gender, activity_level);
    let goals = compute_goals(&profile);

    unsafe {
        *out_goals = MtGoalSet {
            calorie_goal: goals.calorie_goal,
            protein_goal: goals.protein_goal,
            fat_goal: goals.fat_goal,
            carb_goal: goals.carb_goal,
            water_goal: goals.water_goal,
        };
    }
    MT_OK
}

/// 签名请求
///
/// `params_json` 为字符串到字符串的 JSON 对象。成功时 `out_json` 指向
/// 签名参数的 JSON 对象，需调用 [`mt_string_free`] 释放。
#[no_mangle]
pub extern "C" fn mt_sign_request(
    method: *const c_char,
    url: *const c_char,
    params_json: *const c_char,
    consumer_key: *const c_char,
    consumer_secret: *const c_char,
    out_json: *mut *mut c_char,
) -> c_int {
    if out_json.is_null() {
        return MT_ERR_NULL_PTR;
    }

    let [method, url, params_json, consumer_key, consumer_secret] =
        match unsafe { str_args([method, url, params_json, consumer_key, consumer_secret]) } {
            Ok(args) => args,
            Err(code) => return code,
        };

    let params: BTreeMap<String, String> = match serde_json::from_str(params_json) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("Invalid params JSON: {}", e);
            return MT_ERR_INVALID_PARAM;
        }
    };

    let signed = RequestSigner::new().sign(method, url, &params, consumer_key, consumer_secret);

    let json = match serde_json::to_string(&signed).map(CString::new) {
        Ok(Ok(s)) => s,
        _ => return MT_ERR_ENCODING,
    };
    unsafe {
        *out_json = json.into_raw();
    }
    MT_OK
}

/// 解析营养描述，格式不匹配时输出全零
#[no_mangle]
pub extern "C" fn mt_parse_nutrition(description: *const c_char, out_info: *mut MtNutritionInfo) -> c_int {
    if out_info.is_null() {
        return MT_ERR_NULL_PTR;
    }
    let description = match unsafe { str_arg(description) } {
        Ok(d) => d,
        Err(code) => return code,
    };

    let info = parse_nutrition_description(description);
    unsafe {
        *out_info = MtNutritionInfo {
            calories: info.calories,
            fat: info.fat,
            carbohydrate: info.carbohydrate,
            protein: info.protein,
        };
    }
    MT_OK
}

/// 释放本库返回的字符串
#[no_mangle]
pub extern "C" fn mt_string_free(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            drop(CString::from_raw(s));
        }
    }
}

/// 获取版本号，返回静态字符串，无需释放
#[no_mangle]
pub extern "C" fn mt_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_goals() {
        let gender = CString::new("male").unwrap();
        let activity = CString::new("moderate").unwrap();
        let mut goals = MtGoalSet::default();

        let rc = mt_compute_goals(70.0, 175.0, 30, gender.as_ptr(), activity.as_ptr(), &mut goals);
        assert_eq!(rc, MT_OK);
        assert_eq!(goals.calorie_goal, 2556);
        assert_eq!(goals.carb_goal, 367);
        assert_eq!(goals.water_goal, 2.3);

        // 活动水平为 NULL 时按 moderate
        let mut fallback = MtGoalSet::default();
        let rc = mt_compute_goals(70.0, 175.0, 30, gender.as_ptr(), ptr::null(), &mut fallback);
        assert_eq!(rc, MT_OK);
        assert_eq!(fallback.calorie_goal, goals.calorie_goal);
    }

    #[test]
    fn test_compute_goals_null() {
        let gender = CString::new("male").unwrap();
        assert_eq!(
            mt_compute_goals(70.0, 175.0, 30, gender.as_ptr(), ptr::null(), ptr::null_mut()),
            MT_ERR_NULL_PTR
        );
        let mut goals = MtGoalSet::default();
        assert_eq!(
            mt_compute_goals(70.0, 175.0, 30, ptr::null(), ptr::null(), &mut goals),
            MT_ERR_NULL_PTR
        );
    }

    #[test]
    fn test_sign_request() {
        let method = CString::new("GET").unwrap();
        let url = CString::new("https://platform.fatsecret.com/rest/server.api").unwrap();
        let params = CString::new(r#"{"method":"foods.search","search_expression":"apple"}"#).unwrap();
        let key = CString::new("demo-key").unwrap();
        let secret = CString::new("demo-secret").unwrap();
        let mut out: *mut c_char = ptr::null_mut();

        let rc = mt_sign_request(
            method.as_ptr(),
            url.as_ptr(),
            params.as_ptr(),
            key.as_ptr(),
            secret.as_ptr(),
            &mut out,
        );
        assert_eq!(rc, MT_OK);
        assert!(!out.is_null());

        let json = unsafe { CStr::from_ptr(out) }.to_str().unwrap().to_string();
        mt_string_free(out);

        let signed: BTreeMap<String, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(signed["oauth_consumer_key"], "demo-key");
        assert_eq!(signed["oauth_signature_method"], "HMAC-SHA1");
        assert!(signed.contains_key("oauth_signature"));
    }

    #[test]
    fn test_sign_request_bad_params() {
        let s = CString::new("x").unwrap();
        let bad = CString::new("[1, 2]").unwrap();
        let mut out: *mut c_char = ptr::null_mut();
        let rc = mt_sign_request(s.as_ptr(), s.as_ptr(), bad.as_ptr(), s.as_ptr(), s.as_ptr(), &mut out);
        assert_eq!(rc, MT_ERR_INVALID_PARAM);
        assert!(out.is_null());
    }

    #[test]
    fn test_parse_nutrition() {
        let text = CString::new("Per 100g - Calories: 52kcal | Fat: 0.17g | Carbs: 13.81g | Protein: 0.26g").unwrap();
        let mut info = MtNutritionInfo::default();
        assert_eq!(mt_parse_nutrition(text.as_ptr(), &mut info), MT_OK);
        assert_eq!(info.calories, 52.0);
        assert_eq!(info.protein, 0.26);
    }

    #[test]
    fn test_version() {
        let version = unsafe { CStr::from_ptr(mt_version()) };
        assert_eq!(version.to_str().unwrap(), env!("CARGO_PKG_VERSION"));
    }
}
