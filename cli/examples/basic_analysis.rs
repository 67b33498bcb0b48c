//! Basic Analysis Example
//!
//! Builds a small in-memory dataset and walks through the month change
//! report, the holdings table and a single stock's history.

use etfwatch::prelude::*;
use etfwatch::models::SortField;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    etfwatch::init_logger()?;

    println!("🚀 Basic Analysis Example - ETF constituent changes");
    println!("{}", "=".repeat(60));

    let dataset = HoldingsDataset::from_records(vec![
        HoldingRecord::new("2025-05-30", "2330", "台積電", 1_000_000, 9.10),
        HoldingRecord::new("2025-05-30", "2317", "鴻海", 800_000, 4.20),
        HoldingRecord::new("2025-05-30", "2454", "聯發科", 90_000, 3.30),
        HoldingRecord::new("2025-06-02", "2330", "台積電", 1_010_000, 9.25),
        HoldingRecord::new("2025-06-02", "2317", "鴻海", 800_000, 4.05),
        HoldingRecord::new("2025-06-02", "3711", "日月光投控", 300_000, 1.10),
        HoldingRecord::new("2025-06-03", "2330", "台積電", 1_020_000, 9.40),
        HoldingRecord::new("2025-06-03", "2317", "鴻海", 780_000, 3.90),
        HoldingRecord::new("2025-06-03", "3711", "日月光投控", 320_000, 1.18),
    ]);
    let analyzer = HoldingsAnalyzer::new(dataset);

    // Example 1: Month-over-month changes
    println!("\n📊 Example 1: Month change report");
    let june = MonthKey::parse("2025-06")?;
    let report = analyzer.analyze_month(&june)?;
    for event in &report.added {
        println!("   🟢 {} {} on {}", event.record.stock_code, event.record.stock_name, event.change_date);
    }
    for event in &report.removed {
        println!("   🔴 {} {} on {}", event.record.stock_code, event.record.stock_name, event.change_date);
    }
    let (stable, remaining) = report.top_stable(STABLE_DISPLAY_LIMIT);
    for holding in stable {
        println!("   ⚪ {} {}", holding.stock_code, holding.weight_change_text);
    }
    println!("   ({} more stable holdings)", remaining);

    // Example 2: Holdings table with a filter
    println!("\n📈 Example 2: Holdings above 3% by weight");
    let query = HoldingsQueryBuilder::new()
        .with_min_weight(3.0)
        .sort_by(SortField::Weight)
        .descending()
        .build();
    let page = analyzer.query_holdings(&query);
    for record in &page.records {
        println!("   {} {} {:.2}%", record.date, record.stock_code, record.weight);
    }
    println!("   page {}/{} of {} rows", page.page, page.total_pages, page.total_records);

    // Example 3: One stock's history
    println!("\n🔍 Example 3: 台積電 history");
    let history = analyzer.stock_history("2330")?;
    for row in &history.rows {
        println!("   {} {:+.2}% {:+}", row.record.date, row.weight_change, row.shares_change);
    }

    println!("\n✅ Done");
    Ok(())
}
