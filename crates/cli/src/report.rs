use salescope_core::domain::metrics::DashboardMetrics;
use salescope_core::domain::series::PointKind;
use salescope_core::pipeline::ForecastRun;

pub fn print_metrics(metrics: &DashboardMetrics) {
    let kpis = &metrics.kpis;

    println!("== KPIs ==");
    println!("total sales     {}", money(kpis.total_sales));
    println!("average sales   {}", money(kpis.average_sales));
    println!("latest sales    {}", money(kpis.latest_sales));
    println!("growth          {}", percent(kpis.growth_percent));
    if let Some(profit) = kpis.total_profit {
        println!("total profit    {}", money(profit));
        println!("gross margin    {}", percent(kpis.gross_margin_percent));
    }
    if let Some(orders) = kpis.order_count {
        println!("orders          {orders}");
    }

    if !metrics.trend.is_empty() {
        println!();
        println!("== Monthly trend ==");
        for point in &metrics.trend {
            println!("{}  {}", point.month.format("%Y-%m"), money(point.total_sales));
        }
    }

    if let Some(top) = &metrics.top_products {
        println!();
        println!("== Top products ==");
        for (rank, entity) in top.iter().enumerate() {
            println!("{}. {}  {}", rank + 1, entity.name, money(entity.total_sales));
        }
    }
}

pub fn print_forecast(run: &ForecastRun) {
    println!();
    println!("== Forecast ==");
    if run.degraded {
        println!("note: forecast service was unavailable; showing a flat fallback forecast");
    }

    for point in &run.series.points {
        let segment = match point.kind {
            PointKind::Actual => "actual  ",
            PointKind::Forecast => "forecast",
        };
        println!("{}  {}  {}", point.date, segment, money(point.value));
    }

    if let Some(explanation) = &run.explanation {
        println!();
        println!("Explanation: {explanation}");
    }
    if let Some(recommendations) = &run.recommendations {
        println!();
        println!("Recommended actions:");
        println!("{recommendations}");
    }
}

fn money(value: f64) -> String {
    format!("${value:.2}")
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:+.2}%"),
        None => "N/A".to_string(),
    }
}
