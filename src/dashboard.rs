//! Dashboard widgets: record counts, the greeting and a month calendar.

use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::api::ApiClient;
use crate::error::{ClientError, Result};
use crate::repository::{BooksRepository, StaffKind, StaffRepository, UsersRepository};

/// One cell per widget; `None` means that widget's fetch failed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardCounts {
    pub users: Option<usize>,
    pub teachers: Option<usize>,
    pub admins: Option<usize>,
    pub books: Option<usize>,
}

/// Fetch all counts concurrently. A widget that fails degrades to `None`,
/// except an expired or missing session, which fails the whole dashboard.
pub async fn load_counts(client: &ApiClient) -> Result<DashboardCounts> {
    let users = UsersRepository::new(client.clone());
    let teachers = StaffRepository::new(client.clone(), StaffKind::Teacher);
    let admins = StaffRepository::new(client.clone(), StaffKind::Admin);
    let books = BooksRepository::new(client.clone());

    let (users, teachers, admins, books) =
        tokio::join!(users.list(), teachers.list(), admins.list(), books.list());

    Ok(DashboardCounts {
        users: count_cell("users", users.map(|v| v.len()))?,
        teachers: count_cell("teachers", teachers.map(|v| v.len()))?,
        admins: count_cell("admins", admins.map(|v| v.len()))?,
        books: count_cell("books", books.map(|v| v.len()))?,
    })
}

fn count_cell(widget: &str, result: Result<usize>) -> Result<Option<usize>> {
    match result {
        Ok(count) => Ok(Some(count)),
        Err(e) if e.needs_login() => Err(e),
        Err(e) => {
            warn!(widget, error = %e, "Dashboard widget unavailable");
            Ok(None)
        }
    }
}

pub fn greeting(name: Option<&str>, hour: u32) -> String {
    let salutation = match hour {
        0..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    };
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("{}, {}!", salutation, name),
        None => format!("{}!", salutation),
    }
}

/// Monday-first month grid.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthCalendar {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<[Option<u32>; 7]>,
    pub today: Option<u32>,
}

pub fn month_calendar(year: i32, month: u32, today: Option<NaiveDate>) -> Result<MonthCalendar> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        ClientError::validation_field("month", format!("Invalid month: {}-{}", year, month))
    })?;
    let days = days_in_month(first);

    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut column = first.weekday().num_days_from_monday() as usize;

    for day in 1..=days {
        week[column] = Some(day);
        column += 1;
        if column == 7 {
            weeks.push(week);
            week = [None; 7];
            column = 0;
        }
    }
    if column > 0 {
        weeks.push(week);
    }

    let today = today
        .filter(|t| t.year() == year && t.month() == month)
        .map(|t| t.day());

    Ok(MonthCalendar {
        year,
        month,
        weeks,
        today,
    })
}

fn days_in_month(first: NaiveDate) -> u32 {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

impl MonthCalendar {
    /// Plain-text rendering; today is wrapped in brackets.
    pub fn render(&self) -> String {
        let title = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default();

        let mut out = format!("{:^28}\n", title);
        out.push_str(" Mo  Tu  We  Th  Fr  Sa  Su\n");
        for week in &self.weeks {
            let line: Vec<String> = week
                .iter()
                .map(|day| match day {
                    Some(d) if Some(*d) == self.today => format!("[{:>2}]", d),
                    Some(d) => format!(" {:>2} ", d),
                    None => "    ".to_string(),
                })
                .collect();
            out.push_str(line.join("").trim_end());
            out.push('\n');
        }
        out
    }
}
