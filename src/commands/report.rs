use chrono::Duration;

use crate::constants::PRICE_CHART_DAYS;
use crate::error::Result;
use crate::models::PipelineConfig;
use crate::report::{build_summary_text, chart_set, price_chart, send_summary};
use crate::services::{snapshot_store, JquantsClient};

pub fn run(config: PipelineConfig) {
    println!("📈 Chart artifacts and summary");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ Failed to create runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(report_stage(&config)) {
        eprintln!("❌ Report failed: {}", e);
        std::process::exit(1);
    }
}

async fn report_stage(config: &PipelineConfig) -> Result<()> {
    let analysis = snapshot_store::load_analysis_snapshot(&config.analysis_snapshot_path)?;
    println!(
        "✓ Loaded analysis snapshot {}: {} recommended, {} holdings",
        config.analysis_snapshot_path.display(),
        analysis.top3_stocks.len(),
        analysis.holding_stocks.len()
    );

    std::fs::create_dir_all(&config.report_dir)?;

    println!("\n【Radar charts】");
    let charts = chart_set(&analysis.top3_stocks, &analysis.holding_stocks);
    for (filename, chart) in &charts {
        snapshot_store::write_json(&config.report_dir.join(filename), chart)?;
        println!("  ✓ {} ({} series)", filename, chart.series.len());
    }
    if charts.is_empty() {
        println!("  (no qualified recommendations - nothing to chart)");
    }

    println!("\n【Price charts】");
    let mut client = JquantsClient::connect(config).await?;
    let chart_from = config.today - Duration::days(PRICE_CHART_DAYS);

    for stock in analysis.top3_stocks.iter().take(3) {
        let code = &stock.candidate.code;
        match client.daily_quotes(code, chart_from, config.today).await {
            Ok(quotes) => match price_chart(code, &stock.candidate.name, &quotes) {
                Some(chart) => {
                    let filename = format!("price_chart_{}.json", code);
                    snapshot_store::write_json(&config.report_dir.join(&filename), &chart)?;
                    println!(
                        "  ✓ {} ({} days, 2y high {:.0}, low {:.0})",
                        filename, chart.data_points, chart.stats.period_high, chart.stats.period_low
                    );
                }
                None => println!("  ✗ {} {}: no usable prices", code, stock.candidate.name),
            },
            Err(e) => {
                tracing::warn!("price chart skipped for {}: {}", code, e);
                println!("  ✗ {} {}: quote fetch failed", code, stock.candidate.name);
            }
        }
    }

    let summary = build_summary_text(&analysis);
    let summary_path = config.report_dir.join("summary.txt");
    std::fs::write(&summary_path, &summary)?;
    println!("\n✓ summary: {}", summary_path.display());

    match &config.smtp {
        Some(smtp) => {
            let subject = format!("takane screening {}", analysis.analysis_date);
            match send_summary(smtp, &subject, &summary) {
                Ok(()) => println!("📧 Summary emailed to {}", smtp.to),
                Err(e) => eprintln!("⚠️  Email delivery failed (artifacts are on disk): {}", e),
            }
        }
        None => println!("💡 SMTP not configured; summary written to disk only"),
    }

    println!("\n✅ Report complete: artifacts in {}", config.report_dir.display());
    Ok(())
}
