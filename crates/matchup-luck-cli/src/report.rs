// Luck report rendering: pipe table for the terminal and text file, HTML
// document, and the files written to the output directory.

use chrono::NaiveDate;
use crossterm::style::Stylize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use matchup_luck_core::{Exclusion, ExtremeResult, LuckReport, Team, TeamId};
use matchup_luck_espn::LeagueKey;

const TITLE: &str = "Team Luck (Actual - Expected) by Week:";
const LEGEND_LUCKY: &str = "Positive values = Lucky (performed better than expected)";
const LEGEND_UNLUCKY: &str = "Negative values = Unlucky (performed worse than expected)";

// ---------------------------------------------------------------------------
// Table model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Lucky,
    Unlucky,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LuckRow {
    pub team: Team,
    pub season: f64,
    /// One cell per column period; `None` when the team has no record there.
    pub cells: Vec<Option<f64>>,
}

/// Team × period luck grid, luckiest team first.
#[derive(Debug, Clone, PartialEq)]
pub struct LuckTable {
    pub periods: Vec<u32>,
    pub rows: Vec<LuckRow>,
    lucky: (TeamId, u32),
    unlucky: (TeamId, u32),
}

impl LuckTable {
    pub fn from_report(report: &LuckReport) -> Self {
        let rows = report
            .season
            .iter()
            .map(|season| LuckRow {
                team: season.team.clone(),
                season: season.luck,
                cells: report
                    .periods
                    .iter()
                    .map(|&p| report.record(season.team.id, p).map(|r| r.luck))
                    .collect(),
            })
            .collect();

        Self {
            periods: report.periods.clone(),
            rows,
            lucky: extreme_cell(&report.most_lucky),
            unlucky: extreme_cell(&report.most_unlucky),
        }
    }

    pub fn headers(&self) -> Vec<String> {
        let mut headers = vec!["Team".to_string(), "Season".to_string()];
        headers.extend(self.periods.iter().map(|p| format!("Week {p}")));
        headers
    }

    /// Highlight for the cell of `row` in period column `col`. The lucky
    /// highlight wins when both extremes land on the same cell.
    pub fn highlight(&self, row: usize, col: usize) -> Option<Highlight> {
        let team = self.rows.get(row)?.team.id;
        let period = *self.periods.get(col)?;
        if (team, period) == self.lucky {
            Some(Highlight::Lucky)
        } else if (team, period) == self.unlucky {
            Some(Highlight::Unlucky)
        } else {
            None
        }
    }

    fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut cells = vec![row.team.name.clone(), format_luck(row.season)];
                cells.extend(row.cells.iter().map(|c| c.map_or_else(|| "-".to_string(), format_luck)));
                cells
            })
            .collect()
    }

    /// Markdown pipe table. With `colored`, the extreme cells carry ANSI
    /// colors (green lucky, red unlucky); padding is computed on plain text.
    pub fn to_pipe(&self, colored: bool) -> String {
        let headers = self.headers();
        let body = self.text_rows();

        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &body {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        push_line(&mut out, headers.iter().enumerate().map(|(i, h)| pad(h, widths[i], i == 0)));

        let rule: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                if i == 0 {
                    format!(":{}", "-".repeat(w + 1))
                } else {
                    format!("{}:", "-".repeat(w + 1))
                }
            })
            .collect();
        out.push('|');
        out.push_str(&rule.join("|"));
        out.push_str("|\n");

        for (r, row) in body.iter().enumerate() {
            let cells = row.iter().enumerate().map(|(i, cell)| {
                let padded = pad(cell, widths[i], i == 0);
                let highlight = i.checked_sub(2).and_then(|col| self.highlight(r, col));
                match (colored, highlight) {
                    (true, Some(Highlight::Lucky)) => padded.green().to_string(),
                    (true, Some(Highlight::Unlucky)) => padded.red().to_string(),
                    _ => padded,
                }
            });
            push_line(&mut out, cells);
        }
        out
    }
}

fn extreme_cell(result: &ExtremeResult) -> (TeamId, u32) {
    (result.team.id, result.period)
}

pub fn format_luck(value: f64) -> String {
    format!("{value:.3}")
}

fn pad(text: &str, width: usize, left: bool) -> String {
    if left {
        format!(" {text:<width$} ")
    } else {
        format!(" {text:>width$} ")
    }
}

fn push_line(out: &mut String, cells: impl Iterator<Item = String>) {
    out.push('|');
    for cell in cells {
        out.push_str(&cell);
        out.push('|');
    }
    out.push('\n');
}

// ---------------------------------------------------------------------------
// Text and HTML documents
// ---------------------------------------------------------------------------

fn extreme_lines(label: &str, result: &ExtremeResult) -> String {
    format!(
        "{label}:\nWeek {}: {}\nLuck Score: {}\n",
        result.period,
        result.team.name,
        format_luck(result.luck)
    )
}

pub fn exclusion_reason(reason: &Exclusion) -> String {
    match reason {
        Exclusion::Incomplete => "still in progress".to_string(),
        Exclusion::NoMatchups => "no matchups".to_string(),
        Exclusion::InsufficientTeams { teams } => format!("only {teams} team(s) with stats"),
    }
}

/// The full plain-text report: legend, table, extremes and skipped weeks.
/// `colored` only affects the table cells.
pub fn render_text(report: &LuckReport, table: &LuckTable, colored: bool) -> String {
    let mut out = format!("{TITLE}\n{LEGEND_LUCKY}\n{LEGEND_UNLUCKY}\n\n");
    out.push_str(&table.to_pipe(colored));
    out.push('\n');
    out.push_str(&extreme_lines("Most Lucky Result", &report.most_lucky));
    out.push('\n');
    out.push_str(&extreme_lines("Most Unlucky Result", &report.most_unlucky));

    if !report.excluded.is_empty() {
        out.push_str("\nSkipped weeks:\n");
        for excluded in &report.excluded {
            let _ = writeln!(out, "Week {}: {}", excluded.period, exclusion_reason(&excluded.reason));
        }
    }
    out
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const HTML_STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
table { border-collapse: collapse; margin: 20px 0; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: right; }
td:first-child, th:first-child { text-align: left; }
th { background-color: #f5f5f5; }
tr:nth-child(even) { background-color: #f9f9f9; }
.lucky { color: green; font-weight: bold; }
.unlucky { color: red; font-weight: bold; }
.summary { margin: 20px 0; }";

pub fn render_html(league_name: &str, report: &LuckReport, table: &LuckTable) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>{}: Team Luck</title>", escape_html(league_name));
    let _ = writeln!(out, "<style>\n{HTML_STYLE}\n</style>\n</head>\n<body>");
    let _ = writeln!(out, "<h1>Team Luck Analysis</h1>");
    let _ = writeln!(out, "<h2>{}</h2>", escape_html(league_name));
    let _ = writeln!(out, "<p>{LEGEND_LUCKY}<br>\n{LEGEND_UNLUCKY}</p>");

    out.push_str("<table>\n<tr>");
    for header in table.headers() {
        let _ = write!(out, "<th>{}</th>", escape_html(&header));
    }
    out.push_str("</tr>\n");
    for (r, row) in table.rows.iter().enumerate() {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td>",
            escape_html(&row.team.name),
            format_luck(row.season)
        );
        for (col, cell) in row.cells.iter().enumerate() {
            let class = match table.highlight(r, col) {
                Some(Highlight::Lucky) => " class='lucky'",
                Some(Highlight::Unlucky) => " class='unlucky'",
                None => "",
            };
            let text = cell.map_or_else(|| "-".to_string(), format_luck);
            let _ = write!(out, "<td{class}>{text}</td>");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");

    out.push_str("<div class='summary'>\n");
    for (label, result) in [
        ("Most Lucky Result", &report.most_lucky),
        ("Most Unlucky Result", &report.most_unlucky),
    ] {
        let _ = writeln!(
            out,
            "<p><strong>{label}:</strong><br>\nWeek {}: {}<br>\nLuck Score: {}</p>",
            result.period,
            escape_html(&result.team.name),
            format_luck(result.luck)
        );
    }
    out.push_str("</div>\n</body>\n</html>\n");
    out
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedReports {
    pub text: PathBuf,
    pub html: PathBuf,
}

pub fn report_file_stem(key: &LeagueKey, date: NaiveDate) -> String {
    format!("{}_{}_{}_luck", date.format("%Y-%m-%d"), key.league_id, key.season)
}

/// Write `{date}_{league}_{season}_luck.txt` and `.html` into `dir`,
/// creating it if needed.
pub fn save_reports(
    dir: &Path,
    key: &LeagueKey,
    date: NaiveDate,
    league_name: &str,
    report: &LuckReport,
    table: &LuckTable,
) -> std::io::Result<SavedReports> {
    std::fs::create_dir_all(dir)?;
    let stem = report_file_stem(key, date);

    let text = dir.join(format!("{stem}.txt"));
    std::fs::write(&text, render_text(report, table, false))?;

    let html = dir.join(format!("{stem}.html"));
    std::fs::write(&html, render_html(league_name, report, table))?;

    Ok(SavedReports { text, html })
}
