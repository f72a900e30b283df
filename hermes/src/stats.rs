//! `hermes stats`: render the efficiency report from the ledger.

use crate::core::format::format_duration;
use crate::core::stats::StatsSummary;
use crate::io::ledger::Ledger;

/// Window used by `--all-time`.
pub const ALL_TIME_DAYS: u32 = 9999;
pub const DEFAULT_WINDOW_DAYS: u32 = 30;
const BAR_WIDTH: usize = 20;
/// Projected efficiency gains are capped at this percentage.
const MAX_EFFICIENCY_PERCENT: f64 = 50.0;

pub fn window_days(days: Option<u32>, all_time: bool) -> u32 {
    if all_time {
        ALL_TIME_DAYS
    } else {
        days.unwrap_or(DEFAULT_WINDOW_DAYS)
    }
}

/// Print the report for the chosen window and return it.
pub fn run_stats(ledger: &Ledger, days: Option<u32>, all_time: bool) -> String {
    let summary = ledger.summarize(window_days(days, all_time));
    let report = render_report(&summary, all_time);
    print!("{report}");
    report
}

/// Hermes commands as a percentage reduction of the git commands they ran.
pub fn command_reduction_percent(summary: &StatsSummary) -> i64 {
    if summary.git_commands_run == 0 {
        return 0;
    }
    let ratio = summary.total_commands as f64 / summary.git_commands_run as f64;
    ((1.0 - ratio) * 100.0).round() as i64
}

pub fn render_report(summary: &StatsSummary, all_time: bool) -> String {
    let days = summary.window_days.max(1);
    let mut out = format!("Hermes Efficiency Report - Last {days} Days\n\n");

    let hours = summary.time_saved_seconds / 3600.0;
    let all_time_hours = summary.all_time_time_saved_seconds / 3600.0;
    out.push_str(&format!(
        "Time Saved\n   {} ({hours:.1} hours)\n",
        format_duration(summary.time_saved_seconds)
    ));
    if !all_time {
        out.push_str(&format!(
            "   All-time: {} ({all_time_hours:.1} hours)\n",
            format_duration(summary.all_time_time_saved_seconds)
        ));
    }
    out.push('\n');

    out.push_str(&format!(
        "Commands\n   Hermes: {} commands\n   Git equivalents: {} commands\n",
        summary.total_commands, summary.git_commands_run
    ));
    let reduction = command_reduction_percent(summary);
    if reduction > 0 {
        out.push_str(&format!("   {reduction}% reduction\n"));
    }
    out.push('\n');

    out.push_str(&format!(
        "Success Rate\n   {}% of commands completed successfully\n\n",
        (summary.success_rate * 100.0).round() as i64
    ));

    if let Some(top) = summary.top_commands.first() {
        out.push_str("Most Used Commands\n");
        for (index, entry) in summary.top_commands.iter().enumerate() {
            let width = (entry.count as f64 / top.count as f64 * BAR_WIDTH as f64).ceil() as usize;
            out.push_str(&format!(
                "   {}. {:<12} {} {}x\n",
                index + 1,
                entry.command,
                "#".repeat(width),
                entry.count
            ));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "Productivity\n   Active days: {}\n   Avg commands/day: {:.1}\n\n",
        summary.days_active, summary.commands_per_day
    ));

    if hours > 0.0 {
        let per_day = hours / f64::from(days);
        let efficiency = (hours / (f64::from(days) / 30.0) * 10.0)
            .round()
            .min(MAX_EFFICIENCY_PERCENT);
        out.push_str(&format!(
            "Efficiency Insights\n   Weekly time saved: ~{:.1}h\n   Monthly time saved: ~{:.1}h\n   Efficiency gain: +{efficiency}% compared to raw Git\n\n",
            per_day * 7.0,
            per_day * 30.0
        ));
    }

    if summary.days_active >= 7 {
        out.push_str(&format!(
            "Productivity Streak\n   {} days using Hermes\n\n",
            summary.days_active
        ));
    }
    out
}
