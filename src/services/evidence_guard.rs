//! 依据校验 - 业务能力层
//!
//! 模型不一定遵守"没有依据就为空"的规则。这里根据简历原文再检查一遍：
//! 原文没有明确年龄描述时清空 age，没有明确性别描述时清空 gender。

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::models::ResumeRecord;

/// 明确的年龄描述：年龄、N岁（阿拉伯数字或中文数字）、age、N years old
static AGE_EVIDENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)年\s*[龄纪]|\d{1,3}\s*周?岁|[零一二三四五六七八九十百两]+\s*周?岁|\bage\b|\d{1,3}\s*(?:years?|yrs?)\s*old",
    )
    .expect("age evidence regex")
});

/// 明确的性别描述
///
/// 只认"性别：男"这样的标注，或者被标点、空白隔开的单独"男 / 女 / 男性 / 女士"。
/// "男装"、"子女"、"女子学院"里的字不算。
static GENDER_EVIDENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)性\s*别\s*[:：]?\s*[男女]|(?:^|[\s,，、;；:：|/(（\[【])[男女](?:性|士)?(?:$|[\s,，、;；:：|/)）\]】。.])|\b(?:male|female|gender|sex)\b",
    )
    .expect("gender evidence regex")
});

/// 原文是否包含明确的年龄描述（出生日期不算）
pub fn has_age_evidence(document_text: &str) -> bool {
    AGE_EVIDENCE_RE.is_match(document_text)
}

/// 原文是否包含明确的性别描述
pub fn has_gender_evidence(document_text: &str) -> bool {
    GENDER_EVIDENCE_RE.is_match(document_text)
}

/// 清除原文中没有依据的推断字段，降级记录原样返回
pub fn enforce_evidence(mut record: ResumeRecord, document_text: &str) -> ResumeRecord {
    if record.is_degraded() {
        return record;
    }

    if record.age.is_some() && !has_age_evidence(document_text) {
        debug!("原文没有明确的年龄描述，清空 age: {:?}", record.age);
        record.age = None;
    }

    if record.gender.is_some() && !has_gender_evidence(document_text) {
        debug!("原文没有明确的性别描述，清空 gender: {:?}", record.gender);
        record.gender = None;
    }

    record
}
