//! 提示词构建 - 业务能力层
//!
//! 纯函数，无 IO。

/// 简历文本开始分隔符
pub const RESUME_BEGIN: &str = "<<<简历开始>>>";
/// 简历文本结束分隔符
pub const RESUME_END: &str = "<<<简历结束>>>";

/// 会话级系统消息，每次重置对话后保留
pub const SYSTEM_MESSAGE: &str = "你是一个严谨的简历信息提取助手。你只根据简历原文中明确写出的内容提取信息，\
绝不猜测或推断，并且只输出 JSON。";

/// 构建单份简历的提取提示词
///
/// 提示词包含：
/// - 固定的 JSON 结构（6 个字段）
/// - 只返回 JSON 的要求
/// - 默认为 null 的规则（年龄不能由出生日期推算，性别不能由姓名推断）
/// - 原样嵌入的简历文本
pub fn build_prompt(document_text: &str) -> String {
    format!(
        r#"请从下面的简历中提取候选人信息，按以下 JSON 结构返回：

{{
  "name": string | null,
  "gender": "male" | "female" | null,
  "age": integer | null,
  "education": string | null,
  "phone": string | null,
  "email": string | null
}}

【规则】
1. 只返回一个 JSON 对象，不要输出任何解释、说明或其他文字。
2. 所有字段默认都是 null：简历原文中没有明确依据的字段必须为 null，不要猜测。
3. age 只能来自明确的年龄描述（例如"年龄：28"或"28岁"）；只有出生日期时 age 必须为 null，不要推算。
4. gender 只能来自明确的性别描述（例如"性别：男"）；不要根据姓名、照片或其他信息推断。
5. education 填写最高学历（例如"本科"、"硕士"），phone 和 email 按原文填写。

简历原文位于两个分隔符之间：
{}
{}
{}"#,
        RESUME_BEGIN, document_text, RESUME_END
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_declares_all_six_fields() {
        let prompt = build_prompt("");
        for field in ["\"name\"", "\"gender\"", "\"age\"", "\"education\"", "\"phone\"", "\"email\""] {
            assert!(prompt.contains(field), "缺少字段 {}", field);
        }
    }

    #[test]
    fn test_prompt_embeds_text_verbatim_between_delimiters() {
        let text = "姓名：张三\n出生日期：1990-01-01\n{\"trap\": true}";
        let prompt = build_prompt(text);

        let begin = prompt.find(RESUME_BEGIN).unwrap() + RESUME_BEGIN.len();
        let end = prompt.rfind(RESUME_END).unwrap();
        assert_eq!(prompt[begin..end].trim_matches('\n'), text);
    }

    #[test]
    fn test_prompt_states_null_policy() {
        let prompt = build_prompt("x");
        assert!(prompt.contains("只返回一个 JSON 对象"));
        assert!(prompt.contains("只有出生日期时 age 必须为 null"));
        assert!(prompt.contains("不要根据姓名"));
    }
}
