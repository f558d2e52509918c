//! Text output formatting with progress bars and colors.

use chrono::{DateTime, Local, Utc};
use wwpoints_core::{AccountId, Metric, POINTS_UNIT, PointsSnapshot, PollResult, Region};
use wwpoints_store::{AccountState, Availability};

const RESET: &str = "\x1b[0m";
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// ANSI styles used by the text output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Bold,
    Dim,
    Green,
    Yellow,
    Red,
    Cyan,
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "\x1b[1m",
            Style::Dim => "\x1b[2m",
            Style::Green => "\x1b[32m",
            Style::Yellow => "\x1b[33m",
            Style::Red => "\x1b[31m",
            Style::Cyan => "\x1b[36m",
        }
    }

    /// Style for a share of points left.
    fn for_remaining(percent: f64) -> Self {
        if percent < 20.0 {
            Style::Red
        } else if percent < 50.0 {
            Style::Yellow
        } else {
            Style::Green
        }
    }
}

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 10,
        }
    }

    /// Formats a snapshot under an account header.
    pub fn format_snapshot(&self, id: &AccountId, snapshot: &PointsSnapshot) -> String {
        let mut lines = vec![self.paint(Style::Bold, &title(id))];
        lines.push(self.format_daily_bar(snapshot));

        for metric in Metric::all() {
            lines.push(format!(
                "  {:<30} {}",
                metric.display_name(),
                self.format_points(snapshot.value(*metric))
            ));
        }

        let updated = format!("  Updated {}", format_time(snapshot.retrieved_at));
        lines.push(self.paint(Style::Dim, &updated));
        lines.join("\n")
    }

    /// Formats a one-shot cycle result.
    pub fn format_result(&self, id: &AccountId, result: &PollResult) -> String {
        match result {
            PollResult::Success(snapshot) => self.format_snapshot(id, snapshot),
            failure => self.format_error(
                &title(id),
                failure.kind().display_name(),
                failure.reason().unwrap_or_default(),
            ),
        }
    }

    /// Formats published state for the watch screen.
    pub fn format_state(&self, id: &AccountId, state: &AccountState) -> String {
        let mut out = match state.published_snapshot() {
            Some(snapshot) => self.format_snapshot(id, snapshot),
            None => format!(
                "{}\n  {}",
                self.paint(Style::Bold, &title(id)),
                self.paint(Style::Dim, "No data")
            ),
        };

        let note = match state.availability {
            Availability::Available => None,
            Availability::Pending => Some((Style::Dim, "Waiting for first update")),
            Availability::Stale => Some((Style::Yellow, "Stale: service unreachable")),
            Availability::NeedsReauth => Some((
                Style::Red,
                "Needs reauthentication: check username and password",
            )),
        };
        if let Some((style, text)) = note {
            out.push_str(&format!("\n  {}", self.paint(style, text)));
        }

        if let Some(error) = &state.last_error {
            out.push_str(&format!("\n  {}", self.paint(Style::Dim, error)));
        }
        out
    }

    /// Formats daily usage as a bar of points left.
    fn format_daily_bar(&self, snapshot: &PointsSnapshot) -> String {
        let total = snapshot.daily_points_remaining + snapshot.daily_points_used;
        let remaining_pct = if total > 0.0 {
            (snapshot.daily_points_remaining / total * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        format!(
            "  {:<30} {} {}",
            "Today",
            self.progress_bar(remaining_pct),
            self.color_for_percent(remaining_pct, &format!("{remaining_pct:.0}% left"))
        )
    }

    /// Formats a progress bar.
    pub fn progress_bar(&self, percent_remaining: f64) -> String {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let filled = ((percent_remaining / 100.0) * self.bar_width as f64).round() as usize;
        let filled = filled.min(self.bar_width);
        let empty = self.bar_width - filled;

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        self.color_for_percent(percent_remaining, &bar)
    }

    /// Formats the region table.
    pub fn format_regions(&self) -> String {
        let mut lines = vec![self.paint(Style::Bold, &format!("{:<6} {}", "Code", "Domain"))];
        for region in Region::all() {
            let domain = self.paint(Style::Cyan, region.domain());
            lines.push(format!("{:<6} {domain}", region.code()));
        }
        lines.join("\n")
    }

    /// Formats a credential check outcome.
    pub fn format_check(&self, id: &AccountId, code: &str, error: Option<&str>) -> String {
        let status = if code == "ok" {
            self.paint(Style::Green, "✓ ok")
        } else {
            self.paint(Style::Red, &format!("✗ {code}"))
        };
        match error {
            Some(error) => format!(
                "{:<30} {status}\n  {}",
                id.as_str(),
                self.paint(Style::Dim, error)
            ),
            None => format!("{:<30} {status}", id.as_str()),
        }
    }

    /// Formats an error message.
    pub fn format_error(&self, title: &str, kind: &str, error: &str) -> String {
        format!(
            "{}: {} - {error}",
            self.paint(Style::Bold, title),
            self.paint(Style::Red, kind)
        )
    }

    fn format_points(&self, value: f64) -> String {
        if value.fract() == 0.0 {
            format!("{value:.0} {POINTS_UNIT}")
        } else {
            format!("{value:.1} {POINTS_UNIT}")
        }
    }

    fn color_for_percent(&self, percent: f64, text: &str) -> String {
        self.paint(Style::for_remaining(percent), text)
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.use_colors {
            format!("{}{text}{RESET}", style.code())
        } else {
            text.to_string()
        }
    }
}

fn title(id: &AccountId) -> String {
    format!("WeightWatchers ({id})")
}

fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_points() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.format_points(12.0), "12 pt");
        assert_eq!(formatter.format_points(11.5), "11.5 pt");
        assert_eq!(formatter.format_points(-3.0), "-3 pt");
    }

    #[test]
    fn test_style_for_remaining() {
        assert_eq!(Style::for_remaining(15.0), Style::Red);
        assert_eq!(Style::for_remaining(35.0), Style::Yellow);
        assert_eq!(Style::for_remaining(75.0), Style::Green);
    }

    #[test]
    fn test_paint_without_colors_is_plain() {
        let formatter = TextFormatter::new(false);
        assert_eq!(formatter.paint(Style::Red, "x"), "x");
    }

    #[test]
    fn test_daily_bar_handles_zero_total() {
        let formatter = TextFormatter::new(false);
        let bar = formatter.format_daily_bar(&PointsSnapshot::new(0.0, 0.0, 0.0, 10.0));
        assert!(bar.contains("0% left"));
    }
}
