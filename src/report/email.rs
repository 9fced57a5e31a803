//! Text summary and optional SMTP delivery.

use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::analysis::filter::rank_of;
use crate::error::{Error, Result};
use crate::models::{AnalysisSnapshot, SmtpConfig};

/// Render the ranking summary the report stage writes to disk and mails
pub fn build_summary_text(snapshot: &AnalysisSnapshot) -> String {
    let mut lines = Vec::new();

    lines.push(format!("65-week new-high screening - {}", snapshot.analysis_date));
    lines.push(String::new());

    lines.push("Recommended (top non-holding picks):".to_string());
    if snapshot.top3_stocks.is_empty() {
        lines.push("  (none qualified)".to_string());
    }
    for (index, stock) in snapshot.top3_stocks.iter().enumerate() {
        let mark = if stock.candidate.is_new_high_today {
            " *65w new high"
        } else {
            ""
        };
        lines.push(format!(
            "  {}. {} {}  score {:.4}  cap {:.0} oku-yen  P/E {:.1}{}",
            index + 1,
            stock.candidate.code,
            stock.candidate.name,
            stock.candidate.comprehensive_score,
            stock.valuation.market_cap,
            stock.valuation.per,
            mark
        ));
    }

    lines.push(String::new());
    lines.push("Holdings:".to_string());
    if snapshot.holding_stocks.is_empty() {
        lines.push("  (none)".to_string());
    }
    for stock in &snapshot.holding_stocks {
        let rank = rank_of(&snapshot.qualified_stocks, &stock.candidate.code)
            .map(|rank| format!("rank {}", rank))
            .unwrap_or_else(|| "unranked".to_string());
        lines.push(format!(
            "  {} {}  score {:.4}  {}  cap {:.0} oku-yen  P/E {:.1}",
            stock.candidate.code,
            stock.candidate.name,
            stock.candidate.comprehensive_score,
            rank,
            stock.valuation.market_cap,
            stock.valuation.per,
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "Analyzed {} candidates: {} qualified, {} excluded",
        snapshot.summary.total_analyzed,
        snapshot.summary.qualified_count,
        snapshot.summary.excluded_count
    ));

    for excluded in &snapshot.excluded_stocks {
        lines.push(format!(
            "  excluded {} {}: {}",
            excluded.code, excluded.name, excluded.reason
        ));
    }

    lines.join("\n")
}

/// Deliver the summary over SMTP. Callers treat a failure here as a
/// warning, never a pipeline failure.
pub fn send_summary(config: &SmtpConfig, subject: &str, body: &str) -> Result<()> {
    let message = Message::builder()
        .from(
            config
                .from
                .parse()
                .map_err(|e| Error::Config(format!("invalid SMTP_FROM address: {}", e)))?,
        )
        .to(config
            .to
            .parse()
            .map_err(|e| Error::Config(format!("invalid SMTP_TO address: {}", e)))?)
        .subject(subject)
        .body(body.to_string())
        .map_err(|e| Error::InvalidInput(format!("failed to build message: {}", e)))?;

    let transport = SmtpTransport::relay(&config.host)
        .map_err(|e| Error::Network(format!("SMTP relay setup failed: {}", e)))?
        .credentials(Credentials::new(
            config.username.clone(),
            config.password.clone(),
        ))
        .build();

    transport
        .send(&message)
        .map_err(|e| Error::Network(format!("SMTP send failed: {}", e)))?;

    Ok(())
}
