use std::collections::BTreeMap;

use chrono::Duration;

use crate::analysis::{factors, filter, scoring, CandidateMetrics, FilterThresholds};
use crate::constants::{TOP_RECOMMENDED, VOLUME_FETCH_DAYS};
use crate::error::{Error, Result};
use crate::models::{AnalysisSnapshot, AnalysisSummary, MetricVector, PipelineConfig};
use crate::services::{snapshot_store, JquantsClient};

pub fn run(config: PipelineConfig) {
    println!("📊 7-factor analysis and qualification filter");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ Failed to create runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(analyze_stage(&config)) {
        eprintln!("❌ Analysis failed: {}", e);
        std::process::exit(1);
    }
}

struct Target {
    code: String,
    name: String,
    new_high_count: u32,
    is_new_high_today: bool,
}

async fn analyze_stage(config: &PipelineConfig) -> Result<()> {
    let scan = snapshot_store::load_scan_snapshot(&config.scan_snapshot_path)?;
    println!(
        "✓ Loaded scan snapshot {}: {} new-high stocks, {} holdings, {} market data entries",
        config.scan_snapshot_path.display(),
        scan.new_high_stocks.len(),
        scan.holding_stock_info.len(),
        scan.market_data.len()
    );

    // Candidate universe: today's new-high stocks, then watch-list
    // entries not already present. Holding status comes from watch-list
    // membership, so a holding that broke out keeps its exemption.
    let mut targets: Vec<Target> = Vec::new();
    for stock in &scan.new_high_stocks {
        targets.push(Target {
            code: stock.code.clone(),
            name: stock.name.clone(),
            new_high_count: stock.new_high_count,
            is_new_high_today: true,
        });
    }
    for holding in &scan.holding_stock_info {
        if !targets.iter().any(|target| target.code == holding.code) {
            targets.push(Target {
                code: holding.code.clone(),
                name: holding.name.clone(),
                new_high_count: holding.new_high_count,
                is_new_high_today: holding.is_new_high_today,
            });
        }
    }

    if targets.is_empty() {
        return Err(Error::NoData(
            "scan snapshot holds no candidates to analyze".to_string(),
        ));
    }
    println!("   analyzing {} candidates", targets.len());

    let mut client = JquantsClient::connect(config).await?;
    let volume_from = config.today - Duration::days(VOLUME_FETCH_DAYS);

    let mut candidates: Vec<CandidateMetrics> = Vec::new();
    let mut metrics_data: BTreeMap<String, MetricVector> = BTreeMap::new();

    for (index, target) in targets.iter().enumerate() {
        println!(
            "📐 Metrics {}/{}: {} {}",
            index + 1,
            targets.len(),
            target.code,
            target.name
        );

        let quotes = match client.daily_quotes(&target.code, volume_from, config.today).await {
            Ok(quotes) => quotes,
            Err(e) => {
                tracing::warn!("no recent quotes for {}: {}", target.code, e);
                Vec::new()
            }
        };
        let statements = match client.annual_statements(&target.code).await {
            Ok(statements) => statements,
            Err(e) => {
                tracing::warn!("no statements for {}: {}", target.code, e);
                Vec::new()
            }
        };

        let metrics = factors::build_metric_vector(target.new_high_count, &quotes, &statements);
        metrics_data.insert(target.code.clone(), metrics.clone());
        candidates.push(CandidateMetrics {
            code: target.code.clone(),
            name: target.name.clone(),
            metrics,
            is_holding: config.is_holding(&target.code),
            is_new_high_today: target.is_new_high_today,
        });
    }

    let scored = scoring::score_universe(&candidates)?;

    println!("\n=== Composite scores (area × shape) ===");
    for stock in &scored.ranked {
        let holding_mark = if stock.is_holding { " (holding)" } else { "" };
        println!(
            "   {} {}{}: {:.4} ({:.4} × {:.4})",
            stock.code,
            stock.name,
            holding_mark,
            stock.comprehensive_score,
            stock.area_score,
            stock.shape_score
        );
    }

    println!(
        "\n=== Qualification filter: cap ≤ {:.0} oku-yen AND P/E ≥ {:.1} (holdings exempt) ===",
        config.max_market_cap_okuyen, config.min_per
    );
    let outcome = filter::apply(
        &scored.ranked,
        &scan.market_data,
        FilterThresholds {
            max_market_cap_okuyen: config.max_market_cap_okuyen,
            min_per: config.min_per,
        },
    );

    for stock in &outcome.qualified {
        let status = if stock.candidate.is_holding {
            "(holding)"
        } else {
            "passed"
        };
        println!(
            "  ✓ {} {}: cap {:.0} oku-yen, P/E {:.1} - {}",
            stock.candidate.code,
            stock.candidate.name,
            stock.valuation.market_cap,
            stock.valuation.per,
            status
        );
    }
    for stock in &outcome.excluded {
        println!("  ✗ {} {}: {}", stock.code, stock.name, stock.reason);
    }

    let top3 = filter::recommended(&outcome.qualified, TOP_RECOMMENDED);
    let holding_stocks = filter::holdings(&outcome.qualified);

    println!("\n=== Recommended ===");
    for (index, stock) in top3.iter().enumerate() {
        let mark = if stock.candidate.is_new_high_today {
            " ★65w new high"
        } else {
            ""
        };
        println!(
            "{}. {} {} - score {:.4}{}",
            index + 1,
            stock.candidate.code,
            stock.candidate.name,
            stock.candidate.comprehensive_score,
            mark
        );
    }

    println!("\n=== Holdings ===");
    for stock in &holding_stocks {
        let rank = filter::rank_of(&outcome.qualified, &stock.candidate.code)
            .map(|rank| format!("rank {}", rank))
            .unwrap_or_else(|| "unranked".to_string());
        println!(
            "{} {} - score {:.4} ({})",
            stock.candidate.code, stock.candidate.name, stock.candidate.comprehensive_score, rank
        );
    }

    let summary = AnalysisSummary {
        total_analyzed: candidates.len(),
        qualified_count: outcome.qualified.len(),
        excluded_count: outcome.excluded.len(),
    };
    let snapshot = AnalysisSnapshot {
        analysis_date: scan.scan_date.clone(),
        top3_stocks: top3,
        holding_stocks,
        qualified_stocks: outcome.qualified,
        excluded_stocks: outcome.excluded,
        metrics_data,
        scaling_info: scored.scaling,
        summary,
    };
    snapshot_store::write_json(&config.analysis_snapshot_path, &snapshot)?;

    println!(
        "\n✅ Analysis complete: {} qualified, {} excluded",
        snapshot.summary.qualified_count, snapshot.summary.excluded_count
    );
    println!("   snapshot: {}", config.analysis_snapshot_path.display());

    Ok(())
}
