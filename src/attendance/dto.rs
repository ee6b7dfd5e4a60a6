use serde::{Deserialize, Serialize};

use super::engine::AttendanceSummary;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub first_date: String,
    pub last_date: String,
    pub total_days: u32,
    pub current_streak: u32,
    pub month_key: String,
    pub month_streak: u32,
    pub month_days: u32,
    pub coins: u32,
    pub today_coins: u32,
}

impl From<AttendanceSummary> for StatusResponse {
    fn from(s: AttendanceSummary) -> Self {
        Self {
            first_date: s.first_date.to_string(),
            last_date: s.last_date.to_string(),
            total_days: s.total_days,
            current_streak: s.current_streak,
            month_key: s.month_key.to_string(),
            month_streak: s.month_streak,
            month_days: s.month_days,
            coins: s.coins,
            today_coins: s.today_coins,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckInRequest {
    /// `YYYY-MM-DD`; defaults to today.
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstLoginResponse {
    pub first_date: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub dates: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub days: Vec<u8>,
}
