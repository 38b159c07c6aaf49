/// Terminal rendering of analysis reports

use colored::Colorize;

use crate::core::WalletAnalysisReport;

const MAX_LISTED_PURCHASES: usize = 15;

pub fn print_analysis_report(report: &WalletAnalysisReport) {
    println!("\n{} {}", "🔍", "WALLET ANALYSIS".bold());
    println!("{}", "=".repeat(70));
    println!("   Wallet: {}", report.wallet);

    match report.sol_balance {
        Some(balance) => println!("   SOL Balance: {}", format!("{:.6} SOL", balance).bold()),
        None => println!("   SOL Balance: {}", "unavailable (lookup failed)".dimmed()),
    }

    match report.last_token_purchase {
        Some(date) => println!("   Last Token Purchase: {}", date.to_rfc3339()),
        None => println!("   Last Token Purchase: {}", "no purchases".dimmed()),
    }

    println!("\n{}", "🪙 TOKEN PURCHASES:".bold());
    if report.token_purchases.is_empty() {
        println!("   none in the analyzed window");
    } else {
        for record in report.token_purchases.iter().take(MAX_LISTED_PURCHASES) {
            let amount = record
                .amount
                .map(|amount| format!("{:.4}", amount))
                .unwrap_or_else(|| "?".to_string());
            let date = record
                .date
                .map(|date| date.to_rfc3339())
                .unwrap_or_else(|| "unknown time".to_string());
            println!("   {} {} ({})", amount, record.token, date);
        }
        if report.token_purchases.len() > MAX_LISTED_PURCHASES {
            println!(
                "   ... and {} more",
                report.token_purchases.len() - MAX_LISTED_PURCHASES
            );
        }
    }

    println!("\n{}", "🔁 FREQUENT TRANSFER DESTINATIONS:".bold());
    if report.frequent_transfers.is_empty() {
        println!("   none above the threshold");
    } else {
        for destination in &report.frequent_transfers {
            println!("   {}", destination);
            println!("      Solscan: https://solscan.io/account/{}", destination);
        }
    }

    println!("{}", "=".repeat(70));
}
