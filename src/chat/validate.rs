//! Schema check for the body of `POST /api/chat`
//!
//! Works on an untyped `serde_json::Value` rather than deriving
//! `Deserialize` so that every offending field is reported at once,
//! each with the path that leads to it.
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::models::{ChatMessage, ChatRequest, Role};

pub const MIN_PROMPT_LEN: usize = 1;
pub const MAX_PROMPT_LEN: usize = 8000;

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidJson,
    InvalidType,
    TooSmall,
    TooBig,
    InvalidEnumValue,
}

/// One step of the path from the root of the body to the bad value
#[derive(Clone, Serialize, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct Issue {
    pub code: IssueCode,
    pub path: Vec<PathSegment>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Issue {
    fn new(code: IssueCode, path: Vec<PathSegment>, message: String) -> Self {
        Self {
            code,
            path,
            message,
            expected: None,
            received: None,
            minimum: None,
            maximum: None,
            options: None,
        }
    }

    pub fn invalid_json(err: &serde_json::Error) -> Self {
        Self::new(
            IssueCode::InvalidJson,
            vec![],
            format!("Body is not valid JSON: {}", err),
        )
    }

    /// The request carried no JSON body at all
    pub fn missing_body() -> Self {
        Self::invalid_type(vec![], "object", "undefined")
    }

    fn invalid_type(path: Vec<PathSegment>, expected: &str, received: &str) -> Self {
        let message = if received == "undefined" {
            String::from("Required")
        } else {
            format!("Expected {}, received {}", expected, received)
        };
        Self {
            expected: Some(expected.to_string()),
            received: Some(received.to_string()),
            ..Self::new(IssueCode::InvalidType, path, message)
        }
    }

    fn too_small(path: Vec<PathSegment>, minimum: usize) -> Self {
        Self {
            minimum: Some(minimum),
            ..Self::new(
                IssueCode::TooSmall,
                path,
                format!("String must contain at least {} character(s)", minimum),
            )
        }
    }

    fn too_big(path: Vec<PathSegment>, maximum: usize) -> Self {
        Self {
            maximum: Some(maximum),
            ..Self::new(
                IssueCode::TooBig,
                path,
                format!("String must contain at most {} character(s)", maximum),
            )
        }
    }

    fn invalid_enum_value(path: Vec<PathSegment>, received: &str) -> Self {
        Self {
            received: Some(received.to_string()),
            options: Some(Role::ALL.iter().map(|r| r.as_str().to_string()).collect()),
            ..Self::new(
                IssueCode::InvalidEnumValue,
                path,
                format!(
                    "Invalid enum value. Expected {}, received '{}'",
                    role_options(),
                    received
                ),
            )
        }
    }
}

#[derive(Debug, Error)]
#[error("Invalid body ({} issue(s))", .issues.len())]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

impl ValidationError {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(vec![Issue::invalid_json(&err)])
    }
}

/// Validate a request body, collecting every issue instead of stopping
/// at the first one. Unknown keys are ignored.
pub fn validate_chat_request(value: &Value) -> Result<ChatRequest, ValidationError> {
    let Some(body) = value.as_object() else {
        return Err(ValidationError::new(vec![Issue::invalid_type(
            vec![],
            "object",
            type_name(value),
        )]));
    };

    let mut issues = Vec::new();
    let prompt = validate_prompt(body, &mut issues);
    let messages = validate_messages(body, &mut issues);

    if !issues.is_empty() {
        return Err(ValidationError::new(issues));
    }

    Ok(ChatRequest { prompt, messages })
}

fn validate_prompt(body: &Map<String, Value>, issues: &mut Vec<Issue>) -> Option<String> {
    let value = body.get("prompt")?;
    let path = vec![PathSegment::from("prompt")];

    let Some(prompt) = value.as_str() else {
        issues.push(Issue::invalid_type(path, "string", type_name(value)));
        return None;
    };

    // Length in UTF-16 code units, the way the browser client measures it
    let len = prompt.encode_utf16().count();
    if len < MIN_PROMPT_LEN {
        issues.push(Issue::too_small(path, MIN_PROMPT_LEN));
    } else if len > MAX_PROMPT_LEN {
        issues.push(Issue::too_big(path, MAX_PROMPT_LEN));
    }

    Some(prompt.to_string())
}

fn validate_messages(
    body: &Map<String, Value>,
    issues: &mut Vec<Issue>,
) -> Option<Vec<ChatMessage>> {
    let value = body.get("messages")?;

    let Some(items) = value.as_array() else {
        issues.push(Issue::invalid_type(
            vec![PathSegment::from("messages")],
            "array",
            type_name(value),
        ));
        return None;
    };

    let mut messages = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let path = |field: Option<&str>| {
            let mut path = vec![PathSegment::from("messages"), PathSegment::from(idx)];
            if let Some(field) = field {
                path.push(PathSegment::from(field));
            }
            path
        };

        let Some(fields) = item.as_object() else {
            issues.push(Issue::invalid_type(path(None), "object", type_name(item)));
            continue;
        };

        let role = match fields.get("role") {
            None => {
                issues.push(Issue::invalid_type(
                    path(Some("role")),
                    &role_options(),
                    "undefined",
                ));
                None
            }
            Some(Value::String(name)) => {
                let role = Role::from_name(name);
                if role.is_none() {
                    issues.push(Issue::invalid_enum_value(path(Some("role")), name));
                }
                role
            }
            Some(other) => {
                issues.push(Issue::invalid_type(
                    path(Some("role")),
                    &role_options(),
                    type_name(other),
                ));
                None
            }
        };

        let content = match fields.get("content") {
            None => {
                issues.push(Issue::invalid_type(
                    path(Some("content")),
                    "string",
                    "undefined",
                ));
                None
            }
            Some(Value::String(content)) => Some(content.clone()),
            Some(other) => {
                issues.push(Issue::invalid_type(
                    path(Some("content")),
                    "string",
                    type_name(other),
                ));
                None
            }
        };

        if let (Some(role), Some(content)) = (role, content) {
            messages.push(ChatMessage { role, content });
        }
    }

    Some(messages)
}

fn role_options() -> String {
    Role::ALL
        .iter()
        .map(|r| format!("'{}'", r.as_str()))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issues_for(value: Value) -> Vec<Issue> {
        validate_chat_request(&value)
            .expect_err("Expected validation to fail")
            .issues
    }

    #[test]
    fn test_accepts_prompt_only() {
        let req = validate_chat_request(&json!({"prompt": "2+2"})).unwrap();
        assert_eq!(req.prompt.as_deref(), Some("2+2"));
        assert!(req.messages.is_none());
    }

    #[test]
    fn test_accepts_empty_object() {
        let req = validate_chat_request(&json!({})).unwrap();
        assert_eq!(req, ChatRequest::default());
    }

    #[test]
    fn test_accepts_messages_and_ignores_unknown_keys() {
        let req = validate_chat_request(&json!({
            "messages": [
                {"role": "system", "content": "be brief", "name": "ignored"},
                {"role": "user", "content": ""}
            ],
            "temperature": 0.2
        }))
        .unwrap();

        let messages = req.messages.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::new(Role::System, "be brief"));
        assert_eq!(messages[1], ChatMessage::new(Role::User, ""));
    }

    #[test]
    fn test_rejects_empty_prompt() {
        let issues = issues_for(json!({"prompt": ""}));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::TooSmall);
        assert_eq!(issues[0].path, vec![PathSegment::from("prompt")]);
        assert_eq!(issues[0].minimum, Some(1));
    }

    #[test]
    fn test_prompt_length_bounds() {
        let at_max = "a".repeat(MAX_PROMPT_LEN);
        assert!(validate_chat_request(&json!({ "prompt": at_max })).is_ok());

        let over_max = "a".repeat(MAX_PROMPT_LEN + 1);
        let issues = issues_for(json!({ "prompt": over_max }));
        assert_eq!(issues[0].code, IssueCode::TooBig);
        assert_eq!(issues[0].maximum, Some(MAX_PROMPT_LEN));
    }

    #[test]
    fn test_prompt_length_counts_utf16_units() {
        // Each crab is one char but two UTF-16 code units
        let at_max = "🦀".repeat(MAX_PROMPT_LEN / 2);
        assert!(validate_chat_request(&json!({ "prompt": at_max })).is_ok());

        let over_max = "🦀".repeat(MAX_PROMPT_LEN / 2 + 1);
        let issues = issues_for(json!({ "prompt": over_max }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::TooBig);

        // "é" is a single UTF-16 unit even though it takes two bytes
        let wide = "é".repeat(MAX_PROMPT_LEN);
        assert!(validate_chat_request(&json!({ "prompt": wide })).is_ok());
    }

    #[test]
    fn test_rejects_null_prompt() {
        let issues = issues_for(json!({"prompt": null}));
        assert_eq!(issues[0].code, IssueCode::InvalidType);
        assert_eq!(issues[0].received.as_deref(), Some("null"));
        assert_eq!(issues[0].message, "Expected string, received null");
    }

    #[test]
    fn test_rejects_unknown_role() {
        let issues = issues_for(json!({
            "messages": [{"role": "admin", "content": "hi"}]
        }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::InvalidEnumValue);
        assert_eq!(
            issues[0].path,
            vec![
                PathSegment::from("messages"),
                PathSegment::from(0),
                PathSegment::from("role")
            ]
        );
        assert_eq!(
            issues[0].message,
            "Invalid enum value. Expected 'user' | 'assistant' | 'system', received 'admin'"
        );
    }

    #[test]
    fn test_reports_missing_fields_as_required() {
        let issues = issues_for(json!({"messages": [{}]}));
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.code == IssueCode::InvalidType));
        assert!(issues.iter().all(|i| i.message == "Required"));
    }

    #[test]
    fn test_collects_all_issues() {
        let issues = issues_for(json!({
            "prompt": 42,
            "messages": [
                {"role": "user", "content": "ok"},
                "not an object",
                {"role": "user", "content": 7}
            ]
        }));
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].path, vec![PathSegment::from("prompt")]);
        assert_eq!(
            issues[1].path,
            vec![PathSegment::from("messages"), PathSegment::from(1)]
        );
        assert_eq!(
            issues[2].path,
            vec![
                PathSegment::from("messages"),
                PathSegment::from(2),
                PathSegment::from("content")
            ]
        );
    }

    #[test]
    fn test_rejects_non_object_body() {
        let issues = issues_for(json!(["prompt"]));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].path.is_empty());
        assert_eq!(issues[0].expected.as_deref(), Some("object"));
        assert_eq!(issues[0].received.as_deref(), Some("array"));
    }

    #[test]
    fn test_rejects_messages_not_array() {
        let issues = issues_for(json!({"messages": {"role": "user"}}));
        assert_eq!(issues[0].code, IssueCode::InvalidType);
        assert_eq!(issues[0].expected.as_deref(), Some("array"));
    }

    #[test]
    fn test_issue_serialization() {
        let issues = issues_for(json!({"messages": [{"role": "admin", "content": "x"}]}));
        let out = serde_json::to_value(&issues[0]).unwrap();
        assert_eq!(out["code"], "invalid_enum_value");
        assert_eq!(out["path"], json!(["messages", 0, "role"]));
        assert_eq!(out["options"], json!(["user", "assistant", "system"]));
        assert!(out.get("minimum").is_none());
    }

    #[test]
    fn test_missing_body_issue() {
        let issue = Issue::missing_body();
        assert_eq!(issue.code, IssueCode::InvalidType);
        assert!(issue.path.is_empty());
        assert_eq!(issue.message, "Required");
    }

    #[test]
    fn test_invalid_json_issue() {
        let err = serde_json::from_str::<Value>("{not json").unwrap_err();
        let validation_err = ValidationError::from(err);
        assert_eq!(validation_err.issues.len(), 1);
        assert_eq!(validation_err.issues[0].code, IssueCode::InvalidJson);
        assert_eq!(validation_err.to_string(), "Invalid body (1 issue(s))");
    }
}
