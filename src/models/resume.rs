use serde::{Deserialize, Serialize};
use std::fmt;

/// 性别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// 获取中文名称
    pub fn name(self) -> &'static str {
        match self {
            Gender::Male => "男",
            Gender::Female => "女",
        }
    }

    /// 尝试从模型输出解析性别
    ///
    /// 接受 `male` / `female`（不区分大小写）以及中文的 `男` / `女`，其他值一律视为未知。
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "男" | "男性" => Some(Gender::Male),
            "female" | "女" | "女性" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 简历结构化信息
///
/// 每个字段都可以为空：原文中没有明确依据时必须为 `None`，不做推断。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub name: Option<String>,
    pub gender: Option<Gender>,
    pub age: Option<u32>,
    pub education: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// 无法解析出 JSON 时保留的模型原始回复
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_reply: Option<String>,
}

impl ResumeRecord {
    /// 创建降级记录：结构化字段全部为空，只保留原始回复
    pub fn degraded(raw_reply: impl Into<String>) -> Self {
        Self {
            raw_reply: Some(raw_reply.into()),
            ..Default::default()
        }
    }

    /// 是否为降级记录
    pub fn is_degraded(&self) -> bool {
        self.raw_reply.is_some()
    }

    /// 是否所有结构化字段都为空
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.gender.is_none()
            && self.age.is_none()
            && self.education.is_none()
            && self.phone.is_none()
            && self.email.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_accepts_english_and_chinese() {
        assert_eq!(Gender::parse("male"), Some(Gender::Male));
        assert_eq!(Gender::parse(" FEMALE "), Some(Gender::Female));
        assert_eq!(Gender::parse("男"), Some(Gender::Male));
        assert_eq!(Gender::parse("女"), Some(Gender::Female));
        assert_eq!(Gender::parse("unknown"), None);
    }

    #[test]
    fn test_record_serializes_null_fields() {
        let record = ResumeRecord {
            name: Some("张三".to_string()),
            gender: Some(Gender::Male),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "张三");
        assert_eq!(json["gender"], "male");
        assert!(json["age"].is_null());
        assert!(json.get("raw_reply").is_none());
    }

    #[test]
    fn test_degraded_record_has_no_fields() {
        let record = ResumeRecord::degraded("无法读取");
        assert!(record.is_degraded());
        assert!(record.is_empty());
    }
}
