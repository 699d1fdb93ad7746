//! Date literals offered as dictionary shortcuts (きょう → 1/15, ...).
//!
//! Format specifiers:
//! - `%Y` year, `%m`/`%d` zero-padded month/day, `%-m`/`%-d` unpadded
//! - `%a` weekday kanji (日..土)
//! - `%G` era name, `%gy` era year (`元` for the first year)

use time::{Date, Duration, OffsetDateTime};

use crate::candidate::DictEntry;

struct EraEntry {
    name: &'static str,
    start: (i32, u8, u8),
}

const ERA_TABLE: &[EraEntry] = &[
    EraEntry {
        name: "令和",
        start: (2019, 5, 1),
    },
    EraEntry {
        name: "平成",
        start: (1989, 1, 8),
    },
    EraEntry {
        name: "昭和",
        start: (1926, 12, 25),
    },
    EraEntry {
        name: "大正",
        start: (1912, 7, 30),
    },
    EraEntry {
        name: "明治",
        start: (1868, 1, 25),
    },
];

const DAY_READINGS: [(&str, i64); 5] = [
    ("オトトイ", -2),
    ("キノウ", -1),
    ("キョウ", 0),
    ("アシタ", 1),
    ("アサッテ", 2),
];

const DAY_FORMATS: [(&str, f32); 7] = [
    ("%-m/%-d", -18.0),
    ("%Y/%m/%d", -18.1),
    ("%Y-%m-%d", -18.2),
    ("%-m月%-d日（%a）", -18.3),
    ("%Y年%-m月%-d日", -18.4),
    ("%G%gy年%-m月%-d日", -18.5),
    ("%a曜日", -18.6),
];

const WEEKDAYS: [char; 7] = ['日', '月', '火', '水', '木', '金', '土'];

/// Today in the local time zone, or UTC when the offset is unknown.
pub fn today_local() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// All shortcuts for `today`, readings in katakana.
pub fn date_shortcuts(today: Date) -> Vec<DictEntry> {
    let mut entries = Vec::with_capacity(DAY_FORMATS.len() * DAY_READINGS.len() + 3);
    for (format, value) in DAY_FORMATS {
        for (ruby, delta) in DAY_READINGS {
            let Some(date) = today.checked_add(Duration::days(delta)) else {
                continue;
            };
            entries.push(DictEntry::proper_noun(
                format_date(format, date),
                ruby,
                value,
            ));
        }
    }
    entries.push(DictEntry::proper_noun(format_date("%m月", today), "コンゲツ", -18.0));
    entries.push(DictEntry::proper_noun(format_date("%Y年", today), "コトシ", -18.0));
    entries.push(DictEntry::proper_noun(format_date("%G%gy年", today), "コトシ", -18.1));
    entries
}

fn format_date(fmt: &str, date: Date) -> String {
    let (era_name, era_year) = era_of(date);
    let month = u8::from(date.month());

    let mut result = String::with_capacity(fmt.len() + 8);
    let mut chars = fmt.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('Y') => result.push_str(&format!("{:04}", date.year())),
            Some('m') => result.push_str(&format!("{month:02}")),
            Some('d') => result.push_str(&format!("{:02}", date.day())),
            Some('-') => match chars.next() {
                Some('m') => result.push_str(&month.to_string()),
                Some('d') => result.push_str(&date.day().to_string()),
                other => {
                    result.push_str("%-");
                    result.extend(other);
                }
            },
            Some('a') => {
                result.push(WEEKDAYS[date.weekday().number_days_from_sunday() as usize])
            }
            Some('G') => result.push_str(era_name),
            Some('g') if chars.peek() == Some(&'y') => {
                chars.next();
                match era_year {
                    1 => result.push('元'),
                    y => result.push_str(&y.to_string()),
                }
            }
            Some(other) => {
                result.push('%');
                result.push(other);
            }
            None => result.push('%'),
        }
    }
    result
}

fn era_of(date: Date) -> (&'static str, i32) {
    let key = (date.year(), u8::from(date.month()), date.day());
    ERA_TABLE
        .iter()
        .find(|era| key >= era.start)
        .map(|era| (era.name, date.year() - era.start.0 + 1))
        .unwrap_or(("", date.year()))
}
