use crate::models::PipelineConfig;
use crate::services::snapshot_store;

pub fn run(config: PipelineConfig) {
    println!("📊 Pipeline Status\n");

    match snapshot_store::load_scan_snapshot(&config.scan_snapshot_path) {
        Ok(snapshot) => {
            println!("🔹 Scan snapshot: {}", config.scan_snapshot_path.display());
            println!("   date:            {}", snapshot.scan_date);
            println!("   new-high stocks: {}", snapshot.new_high_stocks.len());
            println!("   holdings:        {}", snapshot.holding_stock_info.len());
            println!("   market data:     {}", snapshot.market_data.len());
            println!("   segment size:    {}", snapshot.summary.universe_count);
        }
        Err(e) => println!("⚠️  Scan snapshot: {}", e),
    }

    println!();

    match snapshot_store::load_analysis_snapshot(&config.analysis_snapshot_path) {
        Ok(snapshot) => {
            println!("🔹 Analysis snapshot: {}", config.analysis_snapshot_path.display());
            println!("   date:       {}", snapshot.analysis_date);
            println!("   analyzed:   {}", snapshot.summary.total_analyzed);
            println!("   qualified:  {}", snapshot.summary.qualified_count);
            println!("   excluded:   {}", snapshot.summary.excluded_count);
            for (index, stock) in snapshot.top3_stocks.iter().enumerate() {
                println!(
                    "   {}. {} {} (score {:.4})",
                    index + 1,
                    stock.candidate.code,
                    stock.candidate.name,
                    stock.candidate.comprehensive_score
                );
            }
        }
        Err(e) => println!("⚠️  Analysis snapshot: {}", e),
    }

    println!("\n💡 Stages run in order: scan → analyze → report");
}
