// src/cli/dashboard.rs — Account overview

use crate::models::DataUsage;
use crate::portal::SelfcarePortal;

const BAR_WIDTH: usize = 20;

/// Handle `selfcare dashboard`.
pub async fn show_dashboard(portal: &SelfcarePortal) -> anyhow::Result<()> {
    let Some(session) = portal.current_session() else {
        anyhow::bail!("Please login to access your account (run `selfcare login`)");
    };

    println!("Welcome back, {}", session.user.name);
    println!();

    match portal.get_profile().await {
        Ok(user) => {
            println!("  Phone:    {}", user.phone);
            println!("  Plan:     {}", user.plan);
            println!("  Status:   {:?}", user.account_status);
        }
        Err(e) => println!("  Profile:  unavailable ({e})"),
    }

    match portal.get_balance().await {
        Ok(balance) => println!("  Balance:  {} {:.2}", balance.currency, balance.balance),
        Err(e) => println!("  Balance:  unavailable ({e})"),
    }

    match portal.get_data_usage().await {
        Ok(usage) => println!("  Data:     {}", usage_line(&usage)),
        Err(e) => println!("  Data:     unavailable ({e})"),
    }

    println!();
    match portal.get_transactions().await {
        Ok(txns) if txns.is_empty() => println!("  No recent transactions."),
        Ok(txns) => {
            println!("  Recent transactions:");
            for t in &txns {
                println!(
                    "    {}  {:<22} {:>9.2}  {}",
                    t.date, t.kind, t.amount, t.status
                );
            }
        }
        Err(e) => println!("  Transactions unavailable ({e})"),
    }

    Ok(())
}

fn usage_line(usage: &DataUsage) -> String {
    let filled = (usage.percentage.min(100) as usize * BAR_WIDTH) / 100;
    let unit = usage.unit.as_deref().unwrap_or("GB");
    let mut line = format!(
        "[{}{}] {}% ({} / {} {unit})",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        usage.percentage,
        usage.used_gb,
        usage.total_gb,
    );
    if let Some(reset) = &usage.reset_date {
        line.push_str(&format!(", resets {reset}"));
    }
    line
}
