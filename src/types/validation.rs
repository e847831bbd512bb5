//! Request Validation
//!
//! 요청 DTO는 `validate()`에서 필드별 에러 목록(`FieldErrors`)을 모아 반환한다.
//! 한 필드에서 실패해도 나머지 필드 검사는 계속된다.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

/// 필드 하나의 검증 실패
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// 필드 에러 목록
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.field.as_str())
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }

    /// 에러가 없으면 `value`를 돌려준다
    pub fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "{}", fields.join(", "))
    }
}

/// 수정 요청에서 "필드 없음"과 명시적 `null`을 구분
///
/// `#[serde(default, deserialize_with = "nullable")]`와 함께 쓴다.
/// - 필드 없음 → `None` (변경 안 함)
/// - `null` → `Some(None)` (값 지우기)
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============ Field Parsers ============

/// `HH:MM` (시는 한 자리 허용, 00-23)
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let (hour, minute) = raw.split_once(':')?;
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return None;
    }
    if !hour.chars().chain(minute.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    NaiveTime::from_hms_opt(hour.parse().ok()?, minute.parse().ok()?, 0)
}

/// `YYYY-MM-DD`
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

pub fn is_valid_email(raw: &str) -> bool {
    let Some((local, domain)) = raw.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !raw.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .map(|(host, tld)| !host.is_empty() && tld.len() >= 2 && !tld.ends_with('.'))
            .unwrap_or(false)
}

/// `+` 선택, 숫자 7-15자리
pub fn is_valid_mobile(raw: &str) -> bool {
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    (7..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

pub fn is_valid_url(raw: &str) -> bool {
    reqwest::Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}

/// 요일 목록 (0 = 일요일 ... 6 = 토요일), 정렬 및 중복 제거
pub fn normalize_days_of_week(days: &[i16]) -> Option<Vec<i16>> {
    if days.iter().any(|d| !(0..=6).contains(d)) {
        return None;
    }
    let mut days = days.to_vec();
    days.sort_unstable();
    days.dedup();
    Some(days)
}

/// 앞뒤 공백 제거 후 글자 수 범위 확인
pub fn trimmed_len_between(raw: &str, min: usize, max: usize) -> Option<String> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    (min..=max).contains(&len).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        note: Option<Option<String>>,
    }

    #[test]
    fn test_nullable_distinguishes_missing_from_null() {
        let patch: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.note, None);

        let patch: Patch = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(patch.note, Some(None));

        let patch: Patch = serde_json::from_str(r#"{"note": "hi"}"#).unwrap();
        assert_eq!(patch.note, Some(Some("hi".to_string())));
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(parse_time_of_day("07:30"), NaiveTime::from_hms_opt(7, 30, 0));
        assert_eq!(parse_time_of_day("7:05"), NaiveTime::from_hms_opt(7, 5, 0));
        assert_eq!(parse_time_of_day("23:59"), NaiveTime::from_hms_opt(23, 59, 0));
        assert!(parse_time_of_day("24:00").is_none());
        assert!(parse_time_of_day("12:60").is_none());
        assert!(parse_time_of_day("12:5").is_none());
        assert!(parse_time_of_day("12:30:00").is_none());
        assert!(parse_time_of_day("noon").is_none());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-02-29"), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert!(parse_date("2023-02-29").is_none());
        assert!(parse_date("29/02/2024").is_none());
    }

    #[test]
    fn test_email_and_mobile() {
        assert!(is_valid_email("jane@example.com"));
        assert!(!is_valid_email("jane@example"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ja ne@example.com"));

        assert!(is_valid_mobile("+821012345678"));
        assert!(is_valid_mobile("5551234567"));
        assert!(!is_valid_mobile("555-1234"));
        assert!(!is_valid_mobile("+12"));
    }

    #[test]
    fn test_url() {
        assert!(is_valid_url("https://cdn.example.com/a.png"));
        assert!(!is_valid_url("ftp://example.com/a.png"));
        assert!(!is_valid_url("not a url"));
    }

    #[test]
    fn test_days_of_week() {
        assert_eq!(normalize_days_of_week(&[5, 1, 1, 0]), Some(vec![0, 1, 5]));
        assert_eq!(normalize_days_of_week(&[]), Some(vec![]));
        assert!(normalize_days_of_week(&[7]).is_none());
        assert!(normalize_days_of_week(&[-1]).is_none());
    }

    #[test]
    fn test_field_errors_collects_all() {
        let mut errors = FieldErrors::default();
        errors.push("title", "Reminder title is required");
        errors.push("reminder_time", "Invalid time format (HH:MM)");
        assert_eq!(errors.to_string(), "title, reminder_time");
        assert!(errors.finish(()).is_err());
        assert_eq!(FieldErrors::default().finish(3), Ok(3));
    }
}
