//! Streak and coin arithmetic over a customer's set of check-in dates.
//!
//! Nothing here touches the database: every figure is recomputed from the
//! date set and a reference "today".

use std::{collections::BTreeSet, fmt};

use time::{util::days_in_year_month, Date, Duration, Month};

pub type CheckIns = BTreeSet<Date>;

/// A calendar month, represented by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth(Date);

impl YearMonth {
    pub fn containing(d: Date) -> Self {
        Self(d - Duration::days(i64::from(d.day()) - 1))
    }

    /// Parses `YYYY-MM`.
    pub fn parse(s: &str) -> Option<Self> {
        let (y, m) = s.trim().split_once('-')?;
        if y.len() != 4 || m.len() != 2 {
            return None;
        }
        let year: i32 = y.parse().ok()?;
        let month = Month::try_from(m.parse::<u8>().ok()?).ok()?;
        Date::from_calendar_date(year, month, 1).ok().map(Self)
    }

    pub fn first_day(self) -> Date {
        self.0
    }

    pub fn day_count(self) -> u8 {
        days_in_year_month(self.0.year(), self.0.month())
    }

    pub fn last_day(self) -> Date {
        self.0 + Duration::days(i64::from(self.day_count()) - 1)
    }

    pub fn next(self) -> Self {
        Self(self.last_day() + Duration::days(1))
    }

    pub fn days(self) -> impl Iterator<Item = Date> {
        let first = self.0;
        (0..i64::from(self.day_count())).map(move |i| first + Duration::days(i))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0.year(), u8::from(self.0.month()))
    }
}

/// Consecutive days ending today, or yesterday when today has no check-in yet.
pub fn current_streak(days: &CheckIns, today: Date) -> u32 {
    let Some(mut cursor) = streak_anchor(days, today) else {
        return 0;
    };
    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        match cursor.previous_day() {
            Some(prev) => cursor = prev,
            None => break,
        }
    }
    streak
}

/// Consecutive check-ins from the 1st of today's month up to today (or yesterday).
pub fn month_streak(days: &CheckIns, today: Date) -> u32 {
    let Some(end) = streak_anchor(days, today) else {
        return 0;
    };
    YearMonth::containing(today)
        .days()
        .take_while(|d| *d <= end && days.contains(d))
        .count() as u32
}

fn streak_anchor(days: &CheckIns, today: Date) -> Option<Date> {
    if days.is_empty() {
        return None;
    }
    if days.contains(&today) {
        Some(today)
    } else {
        today.previous_day()
    }
}

pub fn is_month_perfect(days: &CheckIns, month: YearMonth) -> bool {
    month.days().all(|d| days.contains(&d))
}

pub fn month_days(days: &CheckIns, month: YearMonth) -> u32 {
    days.range(month.first_day()..=month.last_day()).count() as u32
}

/// `total/2 + 30*(total/30) + 15*perfect_months`, perfect months counted from the
/// first check-in month through today's month.
pub fn coin_total(days: &CheckIns, today: Date) -> u32 {
    let total = days.len() as u32;
    let mut coins = total / 2 + (total / 30) * 30;

    if let Some(first) = days.first() {
        let current = YearMonth::containing(today);
        let mut month = YearMonth::containing(*first);
        while month <= current {
            if is_month_perfect(days, month) {
                coins += 15;
            }
            month = month.next();
        }
    }
    coins
}

/// Coins earned by today's check-in; zero until today is checked in.
pub fn today_coins(days: &CheckIns, today: Date) -> u32 {
    if !days.contains(&today) {
        return 0;
    }
    let total = days.len();
    let month = YearMonth::containing(today);
    let mut coins = 0;
    if total % 2 == 0 {
        coins += 1;
    }
    if total % 30 == 0 {
        coins += 30;
    }
    if today == month.last_day() && is_month_perfect(days, month) {
        coins += 15;
    }
    coins
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceSummary {
    pub first_date: Date,
    pub last_date: Date,
    pub total_days: u32,
    pub current_streak: u32,
    pub month_key: YearMonth,
    pub month_streak: u32,
    pub month_days: u32,
    pub coins: u32,
    pub today_coins: u32,
}

/// `fallback` stands in for first/last date when there are no check-ins.
pub fn summarize(days: &CheckIns, today: Date, fallback: Date) -> AttendanceSummary {
    let month = YearMonth::containing(today);
    AttendanceSummary {
        first_date: days.first().copied().unwrap_or(fallback),
        last_date: days.last().copied().unwrap_or(fallback),
        total_days: days.len() as u32,
        current_streak: current_streak(days, today),
        month_key: month,
        month_streak: month_streak(days, today),
        month_days: month_days(days, month),
        coins: coin_total(days, today),
        today_coins: today_coins(days, today),
    }
}
