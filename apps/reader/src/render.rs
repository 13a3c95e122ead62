//! Plain-text table renderer for the article list.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use client_core::ListState;
use shared::domain::{parse_publish_date, Article, SortColumn, SortDirection};

const TITLE_WIDTH: usize = 42;
const AUTHOR_WIDTH: usize = 22;
const WORDS_WIDTH: usize = 11;
const SUBMITTED_WIDTH: usize = 18;

pub struct TableRenderer {
    pub show_images: bool,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self { show_images: true }
    }
}

impl TableRenderer {
    /// Draws `articles[start..stop]` under a header carrying the live `stop` count.
    pub fn render<W: Write>(
        &self,
        out: &mut W,
        state: &ListState,
        now: DateTime<Utc>,
    ) -> io::Result<()> {
        let heading = format!("Unpublished Articles ({})", state.stop);
        let words = format!(
            "Words {}",
            arrow(state.next_direction(SortColumn::Words))
        );
        let submitted = format!(
            "Submitted {}",
            arrow(state.next_direction(SortColumn::PublishAt))
        );
        writeln!(
            out,
            "{:<TITLE_WIDTH$} {:<AUTHOR_WIDTH$} {:>WORDS_WIDTH$} {:<SUBMITTED_WIDTH$}",
            truncate(&heading, TITLE_WIDTH),
            "Author",
            words,
            submitted
        )?;
        writeln!(
            out,
            "{}",
            "-".repeat(TITLE_WIDTH + AUTHOR_WIDTH + WORDS_WIDTH + SUBMITTED_WIDTH + 3)
        )?;
        for article in state.visible() {
            self.render_row(out, article, now)?;
        }
        Ok(())
    }

    fn render_row<W: Write>(
        &self,
        out: &mut W,
        article: &Article,
        now: DateTime<Utc>,
    ) -> io::Result<()> {
        writeln!(
            out,
            "{:<TITLE_WIDTH$} {:<AUTHOR_WIDTH$} {:>WORDS_WIDTH$} {:<SUBMITTED_WIDTH$}",
            truncate(&article.title, TITLE_WIDTH),
            truncate(&article.author(), AUTHOR_WIDTH),
            article.words,
            time_since(&article.publish_at, now)
        )?;
        if self.show_images && !article.image.is_empty() {
            writeln!(out, "  {}", article.image)?;
        }
        Ok(())
    }
}

/// Points the way the column will sort when activated next.
fn arrow(next: SortDirection) -> &'static str {
    match next {
        SortDirection::Asc => "^",
        SortDirection::Desc => "v",
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

/// Relative label for a `YYYYMMDD` date, e.g. "3 days ago" or "in a month".
pub fn time_since(publish_at: &str, now: DateTime<Utc>) -> String {
    let Some(published) = parse_publish_date(publish_at)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
    else {
        return "Invalid date".to_string();
    };

    let elapsed = now.signed_duration_since(published).num_seconds();
    let phrase = humanize(elapsed.unsigned_abs());
    if elapsed >= 0 {
        format!("{phrase} ago")
    } else {
        format!("in {phrase}")
    }
}

fn humanize(seconds: u64) -> String {
    let exact_seconds = seconds as f64;
    let exact_days = exact_seconds / 86_400.0;
    let exact_months = exact_days * 4_800.0 / 146_097.0;

    let seconds = exact_seconds.round() as u64;
    let minutes = (exact_seconds / 60.0).round() as u64;
    let hours = (exact_seconds / 3_600.0).round() as u64;
    let days = exact_days.round() as u64;
    let months = exact_months.round() as u64;
    let years = (exact_months / 12.0).round() as u64;

    if seconds < 45 {
        "a few seconds".to_string()
    } else if minutes <= 1 {
        "a minute".to_string()
    } else if minutes < 45 {
        format!("{minutes} minutes")
    } else if hours <= 1 {
        "an hour".to_string()
    } else if hours < 22 {
        format!("{hours} hours")
    } else if days <= 1 {
        "a day".to_string()
    } else if days < 26 {
        format!("{days} days")
    } else if months <= 1 {
        "a month".to_string()
    } else if months < 11 {
        format!("{months} months")
    } else if years <= 1 {
        "a year".to_string()
    } else {
        format!("{years} years")
    }
}
