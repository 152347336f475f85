//! 回复解析 - 业务能力层
//!
//! 把模型的自由文本回复还原成 [`ResumeRecord`]。模型经常把 JSON 包在说明文字或
//! 代码块里，这里按顺序尝试一组解码策略，第一个成功的策略胜出：
//!
//! 1. [`DirectParse`]：整段回复直接按 JSON 解析
//! 2. [`FencedBlock`]：提取 ``` 代码块（可带 json 标记），对内容递归解析
//! 3. [`BraceSpan`]：去掉代码块标记后，截取第一个 `{` 到最后一个 `}` 之间的内容
//!
//! 全部失败时返回降级记录（结构化字段为空，保留原始回复），从不报错。

use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::models::{Gender, ResumeRecord};

type JsonObject = Map<String, JsonValue>;

static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[ \t]*(?:[jJ][sS][oO][nN])?[ \t]*\r?\n?(.*?)```").expect("fence regex")
});

static FENCE_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[ \t]*(?:[jJ][sS][oO][nN])?").expect("fence marker regex"));

static AGE_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,3})\s*(?:岁|周岁|years?(?:\s+old)?)?\s*$").expect("age regex")
});

/// 年龄合理上限
const MAX_AGE: u64 = 150;

/// 解码策略
pub trait DecodeStrategy: Send + Sync {
    /// 策略名称（用于日志）
    fn name(&self) -> &'static str;

    /// 尝试解码，失败返回 `None`
    fn decode(&self, reply: &str) -> Option<JsonObject>;
}

/// 整段直接解析
pub struct DirectParse;

impl DecodeStrategy for DirectParse {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn decode(&self, reply: &str) -> Option<JsonObject> {
        parse_object(reply)
    }
}

/// 代码块提取
pub struct FencedBlock;

impl DecodeStrategy for FencedBlock {
    fn name(&self) -> &'static str {
        "fenced"
    }

    fn decode(&self, reply: &str) -> Option<JsonObject> {
        FENCE_RE.captures_iter(reply).find_map(|caps| {
            let inner = caps.get(1)?.as_str();
            DirectParse.decode(inner).or_else(|| BraceSpan.decode(inner))
        })
    }
}

/// 花括号区间提取
pub struct BraceSpan;

impl DecodeStrategy for BraceSpan {
    fn name(&self) -> &'static str {
        "brace-span"
    }

    fn decode(&self, reply: &str) -> Option<JsonObject> {
        let stripped = FENCE_MARKER_RE.replace_all(reply, "");
        let start = stripped.find('{')?;
        let end = stripped.rfind('}')?;
        if start >= end {
            return None;
        }
        parse_object(&stripped[start..=end])
    }
}

fn parse_object(text: &str) -> Option<JsonObject> {
    match serde_json::from_str::<JsonValue>(text.trim()) {
        Ok(JsonValue::Object(map)) => Some(map),
        _ => None,
    }
}

/// 回复解析器
///
/// 职责：
/// - 按顺序执行解码策略
/// - 把 JSON 对象映射为 [`ResumeRecord`]
/// - 永不失败
pub struct ReplyNormalizer {
    strategies: Vec<Box<dyn DecodeStrategy>>,
}

impl ReplyNormalizer {
    /// 默认策略链：直接解析 → 代码块 → 花括号区间
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(DirectParse),
            Box::new(FencedBlock),
            Box::new(BraceSpan),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn DecodeStrategy>>) -> Self {
        Self { strategies }
    }

    /// 解析模型回复
    pub fn normalize(&self, reply: &str) -> ResumeRecord {
        for strategy in &self.strategies {
            if let Some(object) = strategy.decode(reply) {
                debug!("回复解析成功，策略: {}", strategy.name());
                return record_from_object(&object);
            }
        }

        warn!(
            "无法从模型回复中解析出 JSON，保留原始回复: {}",
            crate::utils::logging::truncate_text(reply, 80)
        );
        ResumeRecord::degraded(reply)
    }
}

impl Default for ReplyNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// 使用默认策略链解析
pub fn normalize(reply: &str) -> ResumeRecord {
    ReplyNormalizer::new().normalize(reply)
}

/// 把 JSON 对象映射为简历记录，类型不符的字段一律为空
fn record_from_object(object: &JsonObject) -> ResumeRecord {
    ResumeRecord {
        name: text_field(object, "name"),
        gender: text_field(object, "gender").and_then(|g| Gender::parse(&g)),
        age: object.get("age").and_then(age_value),
        education: text_field(object, "education"),
        phone: text_field(object, "phone"),
        email: text_field(object, "email"),
        raw_reply: None,
    }
}

fn text_field(object: &JsonObject, key: &str) -> Option<String> {
    let text = match object.get(key)? {
        JsonValue::String(s) => s.trim().to_string(),
        // 电话号码有时被模型写成数字
        JsonValue::Number(n) => n.to_string(),
        _ => return None,
    };
    if is_placeholder(&text) {
        None
    } else {
        Some(text)
    }
}

/// 模型用来表示"没有"的字符串
fn is_placeholder(text: &str) -> bool {
    matches!(
        text.to_ascii_lowercase().as_str(),
        "" | "null" | "none" | "n/a" | "unknown" | "无" | "未知" | "未提及" | "-"
    )
}

fn age_value(value: &JsonValue) -> Option<u32> {
    let age = match value {
        JsonValue::Number(n) => n.as_u64()?,
        JsonValue::String(s) => AGE_TEXT_RE.captures(s)?.get(1)?.as_str().parse().ok()?,
        _ => return None,
    };
    (age <= MAX_AGE).then_some(age as u32)
}
