//! 饮食记录 CLI 工具

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use macrotrack_core::client::DEFAULT_API_URL;
use macrotrack_core::log::parse_quantity;
use macrotrack_core::oauth::{FixedClock, FixedNonce, RandomNonce, SystemClock};
use macrotrack_core::{
    compute_goals, ActivityLevel, ClientConfig, FileStore, FoodSearchClient, Gender, ProfileForm,
    RequestSigner, Tracker, UserProfile,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "macrotrack")]
#[command(about = "饮食与健身记录工具", long_about = None)]
struct Cli {
    /// 数据目录
    #[arg(short, long, env = "MACROTRACK_DATA_DIR", default_value = ".macrotrack")]
    data_dir: PathBuf,

    /// 用户 ID
    #[arg(short, long, env = "MACROTRACK_USER", default_value = "local")]
    user: String,

    #[command(flatten)]
    api: ApiArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ApiArgs {
    /// 营养 API 地址
    #[arg(long, env = "MACROTRACK_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// OAuth consumer key
    #[arg(long, env = "FATSECRET_CONSUMER_KEY", global = true, hide_env_values = true)]
    consumer_key: Option<String>,

    /// OAuth consumer secret
    #[arg(long, env = "FATSECRET_CONSUMER_SECRET", global = true, hide_env_values = true)]
    consumer_secret: Option<String>,
}

impl ApiArgs {
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let consumer_key = self
            .consumer_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("缺少 consumer key（--consumer-key 或 FATSECRET_CONSUMER_KEY）"))?;
        let consumer_secret = self
            .consumer_secret
            .clone()
            .ok_or_else(|| anyhow::anyhow!("缺少 consumer secret（--consumer-secret 或 FATSECRET_CONSUMER_SECRET）"))?;
        Ok(ClientConfig {
            api_url: self.api_url.clone(),
            consumer_key,
            consumer_secret,
            ..ClientConfig::default()
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 计算每日营养目标
    Goals {
        /// 体重（kg）
        #[arg(long)]
        weight: f64,
        /// 身高（cm）
        #[arg(long)]
        height: f64,
        /// 年龄
        #[arg(long)]
        age: u32,
        /// 性别（male / other）
        #[arg(long, default_value = "other")]
        gender: String,
        /// 活动水平（sedentary / light / moderate / active / veryActive）
        #[arg(long)]
        activity: Option<String>,
        /// 输出 JSON
        #[arg(long)]
        json: bool,
    },
    /// 用户资料
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// 签名请求参数（OAuth1 HMAC-SHA1）
    Sign {
        /// HTTP 方法
        #[arg(long, default_value = "GET")]
        method: String,
        /// 请求 URL
        #[arg(long, default_value = DEFAULT_API_URL)]
        url: String,
        /// 请求参数 key=value，可重复
        #[arg(short, long = "param", value_parser = parse_key_value)]
        params: Vec<(String, String)>,
        /// 固定 nonce
        #[arg(long)]
        nonce: Option<String>,
        /// 固定时间戳
        #[arg(long)]
        timestamp: Option<u64>,
    },
    /// 搜索食物
    Search {
        /// 关键字
        query: String,
    },
    /// 记录食物
    Log {
        /// 食物 ID
        food_id: String,
        /// 份数
        #[arg(short, long, default_value = "1")]
        quantity: String,
        /// 日期（YYYY-MM-DD），默认今天
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// 删除已记录的食物
    Unlog {
        /// 记录 ID
        entry_id: String,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// 调整饮水量（L），如 0.1 或 -0.1
    Water {
        #[arg(allow_hyphen_values = true)]
        delta: f64,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// 当日汇总
    Summary {
        #[arg(long)]
        date: Option<NaiveDate>,
        /// 输出 JSON
        #[arg(long)]
        json: bool,
    },
    /// 最近几天的记录
    History {
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// 保存资料
    Set {
        #[arg(long, default_value = "")]
        name: String,
        /// 出生日期（YYYY-MM-DD）
        #[arg(long)]
        birthdate: String,
        #[arg(long)]
        gender: String,
        /// 身高（cm）
        #[arg(long)]
        height: String,
        /// 体重（kg）
        #[arg(long)]
        weight: String,
        #[arg(long)]
        activity: Option<String>,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        target_weight: Option<String>,
    },
    /// 显示资料与目标
    Show,
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("参数格式应为 key=value: {}", raw))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let tracker = Tracker::new(FileStore::new(&cli.data_dir));

    match cli.command {
        Commands::Goals { weight, height, age, gender, activity, json } => {
            do_goals(weight, height, age, &gender, activity.as_deref(), json)?;
        }
        Commands::Profile(ProfileCommand::Set {
            name,
            birthdate,
            gender,
            height,
            weight,
            activity,
            goal,
            target_weight,
        }) => {
            let form = ProfileForm {
                name,
                birthdate,
                gender,
                height,
                weight,
                activity_level: activity,
                goal,
                target_weight,
            };
            do_profile_set(&tracker, &cli.user, &form).await?;
        }
        Commands::Profile(ProfileCommand::Show) => {
            do_profile_show(&tracker, &cli.user).await?;
        }
        Commands::Sign { method, url, params, nonce, timestamp } => {
            do_sign(&cli.api, &method, &url, params, nonce, timestamp)?;
        }
        Commands::Search { query } => {
            do_search(&cli.api, &query).await?;
        }
        Commands::Log { food_id, quantity, date } => {
            let date = date.unwrap_or_else(today);
            do_log(&cli.api, &tracker, &cli.user, &food_id, &quantity, date).await?;
        }
        Commands::Unlog { entry_id, date } => {
            let entry = tracker
                .remove_food(&cli.user, date.unwrap_or_else(today), &entry_id)
                .await?;
            println!("已删除: {}（{:.0} kcal）", entry.name, entry.calories);
        }
        Commands::Water { delta, date } => {
            let water = tracker
                .adjust_water(&cli.user, date.unwrap_or_else(today), delta)
                .await?;
            println!("今日饮水: {:.1} L", water);
        }
        Commands::Summary { date, json } => {
            do_summary(&tracker, &cli.user, date.unwrap_or_else(today), json).await?;
        }
        Commands::History { days } => {
            do_history(&tracker, &cli.user, days).await?;
        }
    }

    Ok(())
}

fn do_goals(
    weight: f64,
    height: f64,
    age: u32,
    gender: &str,
    activity: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    let activity_level = activity.and_then(ActivityLevel::parse);
    if let (Some(raw), None) = (activity, activity_level) {
        tracing::warn!("未知活动水平 {:?}，按 moderate 计算", raw);
    }

    let profile = UserProfile::new(weight, height, age, Gender::parse(gender), activity_level);
    let goals = compute_goals(&profile);

    if json {
        println!("{}", serde_json::to_string_pretty(&goals)?);
    } else {
        println!("热量:   {} kcal", goals.calorie_goal);
        println!("蛋白质: {} g", goals.protein_goal);
        println!("脂肪:   {} g", goals.fat_goal);
        println!("碳水:   {} g", goals.carb_goal);
        println!("饮水:   {:.1} L", goals.water_goal);
    }
    if goals.carb_goal < 0 {
        println!("注意: 蛋白质与脂肪目标已超过总热量，碳水目标为负");
    }

    Ok(())
}

async fn do_profile_set(tracker: &Tracker<FileStore>, user: &str, form: &ProfileForm) -> anyhow::Result<()> {
    let profile = form.validate()?;
    tracker.save_profile(user, &profile).await?;

    println!("资料已保存（年龄 {}）", profile.age);
    print_goals(&compute_goals(&profile));
    Ok(())
}

async fn do_profile_show(tracker: &Tracker<FileStore>, user: &str) -> anyhow::Result<()> {
    match tracker.load_profile(user).await? {
        Some(profile) => {
            println!("{}", serde_json::to_string_pretty(&profile)?);
            print_goals(&compute_goals(&profile));
        }
        None => println!("用户 {} 尚未设置资料", user),
    }
    Ok(())
}

fn print_goals(goals: &macrotrack_core::GoalSet) {
    println!(
        "目标: {} kcal | 蛋白质 {} g | 脂肪 {} g | 碳水 {} g | 饮水 {:.1} L",
        goals.calorie_goal, goals.protein_goal, goals.fat_goal, goals.carb_goal, goals.water_goal
    );
}

fn do_sign(
    api: &ApiArgs,
    method: &str,
    url: &str,
    params: Vec<(String, String)>,
    nonce: Option<String>,
    timestamp: Option<u64>,
) -> anyhow::Result<()> {
    let config = api.client_config()?;
    let params: BTreeMap<String, String> = params.into_iter().collect();

    let signer = match (nonce, timestamp) {
        (Some(n), Some(t)) => RequestSigner::with_sources(FixedClock(t), FixedNonce(n)),
        (Some(n), None) => RequestSigner::with_sources(SystemClock, FixedNonce(n)),
        (None, Some(t)) => RequestSigner::with_sources(FixedClock(t), RandomNonce::default()),
        (None, None) => RequestSigner::new(),
    };

    let signed = signer.sign(method, url, &params, &config.consumer_key, &config.consumer_secret);
    println!("{}", serde_json::to_string_pretty(&signed)?);
    Ok(())
}

async fn do_search(api: &ApiArgs, query: &str) -> anyhow::Result<()> {
    let client = FoodSearchClient::new(api.client_config()?)?;
    let foods = client.search_foods(query).await?;

    if foods.is_empty() {
        println!("没有找到相关食物");
        return Ok(());
    }

    for food in foods {
        let brand = food.brand_name.as_deref().map(|b| format!(" [{}]", b)).unwrap_or_default();
        println!(
            "{:>10}  {}{}  {:.0} kcal | 脂肪 {:.1} g | 碳水 {:.1} g | 蛋白质 {:.1} g",
            food.food_id,
            food.food_name,
            brand,
            food.nutrition.calories,
            food.nutrition.fat,
            food.nutrition.carbohydrate,
            food.nutrition.protein
        );
    }
    Ok(())
}

async fn do_log(
    api: &ApiArgs,
    tracker: &Tracker<FileStore>,
    user: &str,
    food_id: &str,
    quantity: &str,
    date: NaiveDate,
) -> anyhow::Result<()> {
    let client = FoodSearchClient::new(api.client_config()?)?;
    let food = client.get_food(food_id).await?;

    let entry = tracker.log_food(user, date, &food, parse_quantity(quantity)).await?;
    println!("已记录: {}（{:.0} kcal）", entry.name, entry.calories);
    println!("记录 ID: {}", entry.id);
    Ok(())
}

async fn do_summary(tracker: &Tracker<FileStore>, user: &str, date: NaiveDate, json: bool) -> anyhow::Result<()> {
    let summary = tracker.summary(user, date).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let goals = &summary.goals;
    let log = &summary.log;
    println!("日期: {}", summary.date);
    println!("剩余热量: {:.0} kcal", summary.remaining_calories);
    println!("热量:   {:.0} / {} kcal", log.calories_consumed, goals.calorie_goal);
    println!("蛋白质: {:.1} / {} g", log.protein, goals.protein_goal);
    println!("脂肪:   {:.1} / {} g", log.fat, goals.fat_goal);
    println!("碳水:   {:.1} / {} g", log.carbs, goals.carb_goal);
    println!("饮水:   {:.1} / {:.1} L", log.water_intake, goals.water_goal);

    for food in &log.logged_foods {
        println!("  - {} {}（{:.0} kcal）", food.id, food.name, food.calories);
    }
    Ok(())
}

async fn do_history(tracker: &Tracker<FileStore>, user: &str, days: u32) -> anyhow::Result<()> {
    let history = tracker.history(user, today(), days).await?;
    if history.is_empty() {
        println!("最近 {} 天没有记录", days);
        return Ok(());
    }

    for (date, log) in history {
        println!(
            "{}  {:>6.0} kcal | 蛋白质 {:>5.1} g | 饮水 {:.1} L",
            date, log.calories_consumed, log.protein, log.water_intake
        );
    }
    Ok(())
}
