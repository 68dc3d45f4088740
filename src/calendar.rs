//! Contribution activity calendar.
//!
//! The calendar is keyed only by a username. It loads the past year of daily
//! contribution counts and lays them out as week columns, Sunday first, each
//! day carrying a palette level from 0 (no activity) to 4.

use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::Deserialize;

use crate::client::{FetchError, GitHubClient};

pub const MAX_LEVEL: u8 = 4;

/// A year spans at most 54 Sunday-first columns.
const MAX_WEEKS: usize = 54;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    Light,
    #[default]
    Dark,
}

impl FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ColorScheme::Light),
            "dark" => Ok(ColorScheme::Dark),
            other => Err(format!("Invalid color scheme: {other}. Use 'light' or 'dark'")),
        }
    }
}

/// Display options handed to the calendar widget alongside the username.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarOptions {
    pub block_size: f32,
    pub block_margin: f32,
    pub font_size: f32,
    pub color_scheme: ColorScheme,
    pub light: [u32; 5],
    pub dark: [u32; 5],
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            block_size: 15.0,
            block_margin: 5.0,
            font_size: 16.0,
            color_scheme: ColorScheme::Dark,
            light: [0xebedf0, 0x9be9a8, 0x40c463, 0x30a14e, 0x216e39],
            dark: [0x1a1a1a, 0x0e4429, 0x006d32, 0x26a641, 0x39d353],
        }
    }
}

impl CalendarOptions {
    pub fn with_scheme(color_scheme: ColorScheme) -> Self {
        Self {
            color_scheme,
            ..Self::default()
        }
    }

    /// Level colors for the active scheme, as `(r, g, b)`.
    pub fn palette(&self) -> [(u8, u8, u8); 5] {
        let theme = match self.color_scheme {
            ColorScheme::Light => self.light,
            ColorScheme::Dark => self.dark,
        };
        theme.map(|c| ((c >> 16) as u8, (c >> 8) as u8, c as u8))
    }
}

#[derive(Debug, Deserialize)]
struct ContributionsResponse {
    contributions: Vec<Contribution>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Contribution {
    pub date: NaiveDate,
    pub count: u32,
    pub level: u8,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityCalendar {
    /// Seven slots per week, Sunday first. `None` pads days outside the range.
    pub weeks: Vec<[Option<u8>; 7]>,
    pub total: u32,
}

impl ActivityCalendar {
    /// Lays `days` out in week columns. Input spanning more than a year, or
    /// dates with no Sunday before them, yield an empty calendar.
    pub fn from_contributions(mut days: Vec<Contribution>) -> Self {
        days.sort_by_key(|d| d.date);

        let Some(origin) = days.first().and_then(|d| week_start(d.date)) else {
            return Self::default();
        };

        let mut weeks: Vec<[Option<u8>; 7]> = Vec::new();
        let mut total: u32 = 0;
        for day in &days {
            total = total.saturating_add(day.count);

            let Some(start) = week_start(day.date) else {
                return Self::default();
            };
            let index = ((start - origin).num_days() / 7) as usize;
            if index >= MAX_WEEKS {
                return Self::default();
            }
            if weeks.len() <= index {
                weeks.resize(index + 1, [None; 7]);
            }
            let weekday = day.date.weekday().num_days_from_sunday() as usize;
            weeks[index][weekday] = Some(day.level.min(MAX_LEVEL));
        }

        Self { weeks, total }
    }

    pub fn summary(&self, username: &str) -> String {
        let noun = if self.total == 1 { "contribution" } else { "contributions" };
        format!("{} {noun} in the last year by {username}", self.total)
    }
}

/// The Sunday on or before `date`.
fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_sunday())))
}

/// Loads the last year of contributions for `username`.
pub async fn load_calendar(
    client: &GitHubClient,
    username: &str,
) -> Result<ActivityCalendar, FetchError> {
    let url = client.config().contributions_url(username);
    let response: ContributionsResponse = client.get_json(&url).await?;
    Ok(ActivityCalendar::from_contributions(response.contributions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use mockito::{Matcher, Server};

    fn day(date: &str, count: u32, level: u8) -> Contribution {
        Contribution {
            date: date.parse().unwrap(),
            count,
            level,
        }
    }

    #[test]
    fn default_options_use_dark_palette() {
        let options = CalendarOptions::default();
        assert_eq!(options.block_size, 15.0);
        assert_eq!(options.block_margin, 5.0);
        assert_eq!(options.font_size, 16.0);
        assert_eq!(options.palette()[0], (0x1a, 0x1a, 0x1a));
        assert_eq!(options.palette()[4], (0x39, 0xd3, 0x53));
    }

    #[test]
    fn light_scheme_uses_light_palette() {
        let options = CalendarOptions::with_scheme("Light".parse().unwrap());
        assert_eq!(options.color_scheme, ColorScheme::Light);
        assert_eq!(options.block_size, 15.0);
        assert_eq!(options.palette()[0], (0xeb, 0xed, 0xf0));
        assert_eq!(options.palette()[4], (0x21, 0x6e, 0x39));
        assert!("neon".parse::<ColorScheme>().is_err());
    }

    #[test]
    fn pads_first_week_from_sunday() {
        // 2024-01-03 is a Wednesday
        let calendar = ActivityCalendar::from_contributions(vec![
            day("2024-01-03", 1, 1),
            day("2024-01-04", 0, 0),
            day("2024-01-05", 12, 4),
            day("2024-01-06", 3, 2),
            day("2024-01-07", 5, 3),
        ]);

        assert_eq!(calendar.weeks.len(), 2);
        assert_eq!(
            calendar.weeks[0],
            [None, None, None, Some(1), Some(0), Some(4), Some(2)]
        );
        assert_eq!(calendar.weeks[1][0], Some(3));
        assert_eq!(calendar.weeks[1][1..], [None; 6]);
        assert_eq!(calendar.total, 21);
    }

    #[test]
    fn unordered_input_and_gaps_land_in_the_right_week() {
        let calendar = ActivityCalendar::from_contributions(vec![
            day("2024-01-16", 1, 1),
            day("2024-01-01", 2, 9),
        ]);

        // Mon Jan 1 and Tue Jan 16 are two week columns apart
        assert_eq!(calendar.weeks.len(), 3);
        assert_eq!(calendar.weeks[0][1], Some(MAX_LEVEL));
        assert_eq!(calendar.weeks[1], [None; 7]);
        assert_eq!(calendar.weeks[2][2], Some(1));
    }

    #[test]
    fn total_saturates_instead_of_overflowing() {
        let calendar = ActivityCalendar::from_contributions(vec![
            day("2024-01-01", u32::MAX, 4),
            day("2024-01-02", 10, 4),
        ]);
        assert_eq!(calendar.total, u32::MAX);
        assert_eq!(calendar.weeks.len(), 1);
    }

    #[test]
    fn out_of_range_dates_give_an_empty_calendar() {
        let calendar = ActivityCalendar::from_contributions(vec![
            Contribution {
                date: NaiveDate::MIN,
                count: 1,
                level: 1,
            },
            day("2024-01-02", 1, 1),
        ]);
        assert_eq!(calendar, ActivityCalendar::default());

        let calendar = ActivityCalendar::from_contributions(vec![
            day("1990-01-01", 1, 1),
            day("2024-01-02", 1, 1),
        ]);
        assert_eq!(calendar, ActivityCalendar::default());
    }

    #[test]
    fn summary_pluralizes() {
        let mut calendar = ActivityCalendar::default();
        assert_eq!(calendar.summary("octocat"), "0 contributions in the last year by octocat");
        calendar.total = 1;
        assert_eq!(calendar.summary("octocat"), "1 contribution in the last year by octocat");
    }

    #[tokio::test]
    async fn loads_calendar_from_contributions_api() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v4/torvalds")
            .match_query(Matcher::UrlEncoded("y".into(), "last".into()))
            .with_status(200)
            .with_body(
                r#"{"total":{"lastYear":7},"contributions":[
                    {"date":"2024-01-07","count":7,"level":3}
                ]}"#,
            )
            .create_async()
            .await;

        let client = GitHubClient::new(ApiConfig {
            contributions_url: server.url().parse().unwrap(),
            ..ApiConfig::default()
        })
        .unwrap();
        let calendar = load_calendar(&client, "torvalds").await.unwrap();

        mock.assert_async().await;
        assert_eq!(calendar.total, 7);
        assert_eq!(calendar.weeks, vec![[Some(3), None, None, None, None, None, None]]);
    }

    #[tokio::test]
    async fn unknown_user_is_a_status_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/v4/nobody")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":"not found"}"#)
            .create_async()
            .await;

        let client = GitHubClient::new(ApiConfig {
            contributions_url: server.url().parse().unwrap(),
            ..ApiConfig::default()
        })
        .unwrap();
        let err = load_calendar(&client, "nobody").await.unwrap_err();

        mock.assert_async().await;
        assert!(
            matches!(err, FetchError::Status { status, .. } if status == reqwest::StatusCode::NOT_FOUND)
        );
    }
}
