//! Login Context - Value Objects

use serde::{Deserialize, Serialize};

use super::LoginFlowError;

/// 国际格式手机号（E.164，`+` 开头）
///
/// 不变量:
/// - 以 `+` 开头
/// - 其余为 7~15 位数字（空格 / 连字符在构造时剔除）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(raw: impl Into<String>) -> Result<Self, LoginFlowError> {
        let raw = raw.into();
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();

        let Some(digits) = cleaned.strip_prefix('+') else {
            return Err(LoginFlowError::InvalidPhone(raw));
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(LoginFlowError::InvalidPhone(raw));
        }
        if !(7..=15).contains(&digits.len()) {
            return Err(LoginFlowError::InvalidPhone(raw));
        }

        Ok(Self(cleaned))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 日志用打点形式，只保留国家码附近和末两位
    pub fn masked(&self) -> String {
        let s = &self.0;
        if s.len() <= 6 {
            return "+***".to_string();
        }
        format!("{}***{}", &s[..4], &s[s.len() - 2..])
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
