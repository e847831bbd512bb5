//! Common Types Module
//!
//! 애플리케이션 전반에서 사용되는 공통 타입 정의

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

mod validation;

pub use validation::*;

/// 단순 메시지 응답
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 문자열 enum 공통 구현 (DB에는 VARCHAR로 저장)
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {}: {}", stringify!($name), other)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// 습관 반복 주기
    Frequency {
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
    }
}

string_enum! {
    /// 진행 지표 종류
    MetricType {
        WaterIntake => "water_intake",
        SleepHours => "sleep_hours",
        ExerciseMinutes => "exercise_minutes",
        MeditationMinutes => "meditation_minutes",
    }
}

string_enum! {
    /// 일정 활동 종류
    ActivityType {
        Sleep => "sleep",
        Breakfast => "breakfast",
        Lunch => "lunch",
        Dinner => "dinner",
        Work => "work",
        Exercise => "exercise",
        Other => "other",
    }
}

string_enum! {
    /// OTP 발송 채널
    OtpChannel {
        Email => "email",
        Mobile => "mobile",
    }
}
