use std::sync::Arc;

use chartwell::{Dashboard, TimeRange};
use chartwell_mock::{FIXTURE_AS_OF, MockSource};
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,chartwell=debug,chartwell_core=debug
    // (build with `--features tracing` to see spans).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .try_init();

    let dash = Dashboard::builder(Arc::new(MockSource::new()))
        .watchlist(["AAPL", "MSFT", "GOOG", "TSLA"])
        .clock(Arc::new(|| FIXTURE_AS_OF))
        .build()?;

    let report = dash.refresh().await?;
    println!(
        "refreshed {} symbols (generation {}, {} records dropped)",
        report.refreshed.len(),
        report.generation,
        report.dropped_records
    );

    for range in TimeRange::ALL {
        let chart = dash.chart(range).await;
        println!("{range}: {} points on the axis", chart.data.labels.len());
        for ds in &chart.data.datasets {
            let filled = ds.values.iter().filter(|v| v.is_some()).count();
            println!("  {:<5} {} {filled}/{}", ds.symbol, ds.color, ds.values.len());
        }
    }

    let chart = dash.chart(TimeRange::D30).await;
    println!("{}", serde_json::to_string_pretty(&chart.data)?);
    Ok(())
}
