use std::collections::BTreeMap;

use crate::analysis::{high_watermark, valuation};
use crate::constants::SCAN_BATCH_SIZE;
use crate::error::Result;
use crate::models::{
    DailyQuote, HoldingStockInfo, NewHighStock, PipelineConfig, ScanSnapshot, ScanSummary,
    ValuationSnapshot,
};
use crate::services::{snapshot_store, JquantsClient};
use crate::utils::compact_date;

pub fn run(config: PipelineConfig) {
    println!("🔍 65-week new-high scan - {}", compact_date(config.today));

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ Failed to create runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(scan_stage(&config)) {
        eprintln!("❌ Scan failed: {}", e);
        std::process::exit(1);
    }
}

async fn scan_stage(config: &PipelineConfig) -> Result<()> {
    let mut client = JquantsClient::connect(config).await?;

    let window_start = config.window_start();
    println!(
        "   window: {} → {}",
        compact_date(window_start),
        compact_date(config.today)
    );

    let universe = client.listed_tickers(Some(&config.segment)).await?;
    println!("📋 {} tickers in segment \"{}\"", universe.len(), config.segment);

    let mut new_high_stocks: Vec<NewHighStock> = Vec::new();
    let mut market_data: BTreeMap<String, ValuationSnapshot> = BTreeMap::new();

    let total_batches = (universe.len() + SCAN_BATCH_SIZE - 1) / SCAN_BATCH_SIZE;
    for (batch_index, batch) in universe.chunks(SCAN_BATCH_SIZE).enumerate() {
        println!(
            "⏳ Batch {}/{}: scanning {} tickers...",
            batch_index + 1,
            total_batches,
            batch.len()
        );
        let mut batch_hits = 0usize;

        for ticker in batch {
            let quotes = match client
                .daily_quotes(&ticker.code, window_start, config.today)
                .await
            {
                Ok(quotes) => quotes,
                Err(e) => {
                    tracing::warn!("skipping {}: {}", ticker.code, e);
                    continue;
                }
            };

            let result = high_watermark::scan(&quotes, config.today);
            if !result.is_new_high_today {
                continue;
            }

            let snapshot = fetch_valuation(&mut client, &ticker.code, &quotes).await;
            println!(
                "  ✓ 65w new high: {} {} (breaks: {}, cap: {:.0} oku-yen)",
                ticker.code, ticker.name, result.break_count, snapshot.market_cap
            );

            market_data.insert(ticker.code.clone(), snapshot);
            new_high_stocks.push(NewHighStock {
                code: ticker.code.clone(),
                name: ticker.name.clone(),
                new_high_count: result.break_count,
                today_high: result.today_high,
                past_max: result.past_max_high,
                total_days: result.sample_size,
            });
            batch_hits += 1;
        }

        println!("   batch {} hits: {}", batch_index + 1, batch_hits);
    }

    // Holdings are always evaluated and always get market data,
    // whether or not they broke out today
    println!("📌 Evaluating {} holdings", config.holding_codes.len());
    let mut holding_stock_info: Vec<HoldingStockInfo> = Vec::new();

    for code in &config.holding_codes {
        let quotes = match client.daily_quotes(code, window_start, config.today).await {
            Ok(quotes) => quotes,
            Err(e) => {
                tracing::warn!("no quotes for holding {}: {}", code, e);
                Vec::new()
            }
        };

        let result = high_watermark::scan(&quotes, config.today);
        let snapshot = fetch_valuation(&mut client, code, &quotes).await;
        market_data.insert(code.clone(), snapshot);

        let name = universe
            .iter()
            .find(|ticker| &ticker.code == code)
            .map(|ticker| ticker.name.clone())
            .unwrap_or_else(|| format!("Holding {}", code));

        if result.is_new_high_today {
            println!(
                "  ✓ holding at 65w new high: {} {} (breaks: {})",
                code, name, result.break_count
            );
            if !new_high_stocks.iter().any(|stock| &stock.code == code) {
                new_high_stocks.push(NewHighStock {
                    code: code.clone(),
                    name: name.clone(),
                    new_high_count: result.break_count,
                    today_high: result.today_high,
                    past_max: result.past_max_high,
                    total_days: result.sample_size,
                });
            }
        } else {
            println!("  - holding: {} {} (breaks: {})", code, name, result.break_count);
        }

        holding_stock_info.push(HoldingStockInfo {
            code: code.clone(),
            name,
            new_high_count: result.break_count,
            is_new_high_today: result.is_new_high_today,
        });
    }

    let summary = ScanSummary {
        total_new_high: new_high_stocks.len(),
        universe_count: universe.len(),
    };
    let snapshot = ScanSnapshot {
        scan_date: compact_date(config.today),
        new_high_stocks,
        holding_stock_info,
        market_data,
        summary,
    };
    snapshot_store::write_json(&config.scan_snapshot_path, &snapshot)?;

    println!(
        "\n✅ Scan complete: {} new-high stocks out of {} scanned",
        snapshot.summary.total_new_high, snapshot.summary.universe_count
    );
    println!("   snapshot: {}", config.scan_snapshot_path.display());

    Ok(())
}

/// Valuation inputs: latest close from the already-fetched quote window,
/// fundamentals from the latest annual filing. Any failure resolves to
/// the documented fallback pair.
async fn fetch_valuation(
    client: &mut JquantsClient,
    code: &str,
    quotes: &[DailyQuote],
) -> ValuationSnapshot {
    let statements = match client.annual_statements(code).await {
        Ok(statements) => statements,
        Err(e) => {
            tracing::warn!("no statements for {}: {}", code, e);
            Vec::new()
        }
    };

    valuation::estimate(latest_finite_close(quotes), statements.last())
}

fn latest_finite_close(quotes: &[DailyQuote]) -> Option<f64> {
    quotes.iter().rev().map(|quote| quote.close).find(|close| close.is_finite())
}
