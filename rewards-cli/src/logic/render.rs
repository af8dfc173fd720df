//! Table rendering for command results

use super::replay::PalliativeSummary;
use lib_rewards::{
    Amount, EarningsProjection, EarningsReport, QualificationMethod, QualificationOutcome,
    RewardBreakdown, RewardType,
};
use lib_types::bps_to_percentage;

/// `1234567` -> `1,234,567`
pub fn format_amount(amount: Amount) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn breakdown_header(first: &str, second: &str) -> String {
    let mut line = format!("{:<8}{:>12}", first, second);
    for reward_type in RewardType::ALL {
        line.push_str(&format!("{:>14}", reward_type.display_name()));
    }
    line.push_str(&format!("{:>16}", "Total"));
    line
}

fn breakdown_row(first: &str, second: &str, totals: &RewardBreakdown) -> String {
    let mut line = format!("{:<8}{:>12}", first, second);
    for reward_type in RewardType::ALL {
        line.push_str(&format!("{:>14}", format_amount(totals.get(reward_type))));
    }
    let total = totals
        .checked_total()
        .map(format_amount)
        .unwrap_or_else(|| "overflow".to_string());
    line.push_str(&format!("{:>16}", total));
    line
}

pub fn render_projection(projection: &EarningsProjection) -> Vec<String> {
    let mut lines = vec![
        format!("Package:          {}", projection.package),
        format!("Personal invites: {}", format_amount(projection.personal_invites)),
        String::new(),
        breakdown_header("Level", "Members"),
    ];
    for level in &projection.levels {
        lines.push(breakdown_row(
            &level.level.to_string(),
            &format_amount(level.member_count),
            &level.totals,
        ));
    }
    lines.push(breakdown_row("All", "", &projection.totals_by_type));
    lines.push(String::new());
    lines.push(format!("Grand total:      {}", format_amount(projection.grand_total)));
    lines.push(format!("Rate table:       {}", projection.rate_table_version.short()));
    lines
}

pub fn render_earnings(report: &EarningsReport) -> Vec<String> {
    let mut lines = vec![
        format!("Member:           {}", report.root),
        format!("Descendants:      {}", format_amount(report.descendant_count())),
        String::new(),
        breakdown_header("Level", "Active"),
    ];
    for level in &report.levels {
        lines.push(breakdown_row(
            &level.level.to_string(),
            &format!("{}/{}", level.active_count, level.member_count),
            &level.totals,
        ));
    }
    lines.push(breakdown_row("All", "", &report.totals_by_type));
    lines.push(String::new());
    lines.push(format!("Grand total:      {}", format_amount(report.grand_total)));
    if let Some(reason) = report.truncation {
        lines.push(format!("PARTIAL RESULT:   traversal stopped early ({:?})", reason));
    }
    lines.push(format!("Rate table:       {}", report.rate_table_version.short()));
    lines
}

pub fn render_qualification(outcome: &QualificationOutcome) -> Vec<String> {
    let report = &outcome.report;
    let package = report
        .own_package
        .map(|p| p.to_string())
        .unwrap_or_else(|| "none".to_string());
    let mark = |ok: bool| if ok { "yes" } else { "no" };

    let mut lines = vec![
        format!("Member:           {}", report.member),
        format!("Own package:      {} (qualifying tier: {})", package, mark(report.has_qualifying_tier)),
        format!(
            "Option 1:         {}/{} direct ({:.2}%)",
            report.option1.direct_qualified_count,
            report.option1.threshold,
            report.option1_percentage()
        ),
        format!(
            "Option 2:         {}/{} first gen, {}/{} second gen ({:.2}%)",
            report.option2.first_gen,
            report.option2.first_gen_threshold,
            report.option2.second_gen,
            report.option2.second_gen_threshold,
            report.option2_percentage()
        ),
    ];

    if let Some(recommendation) = report.recommendation {
        lines.push(format!("Closest path:     {}", recommendation));
    }

    let status = &outcome.status;
    if status.is_qualified {
        let since = status
            .qualified_at
            .map(|t| t.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let method = if status.method == QualificationMethod::None {
            "unknown".to_string()
        } else {
            status.method.to_string()
        };
        lines.push(format!("Status:           QUALIFIED via {} since {}", method, since));
    } else {
        lines.push("Status:           NOT QUALIFIED".to_string());
    }
    if outcome.newly_qualified {
        lines.push("                  (qualified on this run)".to_string());
    }
    lines
}

pub fn render_palliative(summary: &PalliativeSummary) -> Vec<String> {
    let account = &summary.account;
    let mut lines = vec![
        format!("Member:           {}", summary.member),
        format!("State:            {}", account.state),
        format!("Balance:          {}", format_amount(account.current_balance)),
    ];

    match (account.selected_target, account.target_amount) {
        (Some(target), Some(amount)) => {
            lines.push(format!("Target:           {} ({})", target, format_amount(amount)))
        }
        _ => lines.push(format!("Threshold:        {}", format_amount(account.threshold))),
    }
    lines.push(format!(
        "Progress:         {:.2}%",
        bps_to_percentage(summary.progress_bps)
    ));
    lines.push(format!(
        "Credits applied:  {} ({} replayed)",
        summary.credits.iter().filter(|c| c.applied).count(),
        summary.credits.iter().filter(|c| !c.applied).count()
    ));

    for transition in &summary.transitions {
        lines.push(format!("Transition:       {} -> {}", transition.from, transition.to));
    }

    match &summary.maturity.record {
        Some(record) => lines.push(format!(
            "Matured:          {} at {} with {}",
            record.target_type,
            record.matured_at,
            format_amount(record.balance_at_maturity)
        )),
        None => lines.push("Matured:          no".to_string()),
    }
    lines
}
