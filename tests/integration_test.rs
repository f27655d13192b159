use chrono::NaiveDate;
use sales_dashboard::aggregate::Aggregates;
use sales_dashboard::dashboard::Dashboard;
use sales_dashboard::error::DashboardError;
use sales_dashboard::filter::FilterSelection;
use sales_dashboard::loader;
use sales_dashboard::schema::{MONTH, REQUIRED_COLUMNS};
use std::fs;
use std::path::{Path, PathBuf};

const HEADER: &str = "OrderID,OrderDate,Region,Product,CustomerSegment,Quantity,DiscountPct,Revenue_INR";

fn write_sales(dir: &Path, rows: &[&str]) -> PathBuf {
    let path = dir.join("sales_data.csv");
    let mut body = String::from(HEADER);
    for row in rows {
        body.push('\n');
        body.push_str(row);
    }
    body.push('\n');
    fs::write(&path, body).unwrap();
    path
}

fn mixed_sales(dir: &Path) -> PathBuf {
    write_sales(
        dir,
        &[
            "O1,2024-01-05,North,Laptop,Retail,2,10,1000",
            "O2,2024-02-11,South,Phone,Corporate,1,0,450.5",
            "O2,2024-02-11,South,Laptop,Corporate,1,5,900",
            "O3,2024-03-20,East,Tablet,SMB,3,15,N/A",
            "O4,2024-01-28,North,Phone,SMB,4,0,1200",
            "O5,2024-03-02,West,Laptop,Retail,1,20,800",
        ],
    )
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

#[test]
fn test_two_row_scenario_region_filter() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_sales(
        dir.path(),
        &[
            "A1,2024-03-01,R1,P1,Seg1,2,10,100",
            "A2,2024-03-02,R2,P1,Seg1,1,0,50",
        ],
    );

    let mut dashboard = Dashboard::new(path);
    let selection = dashboard.default_selection()?.with_regions(["R1"]);
    let filtered = selection.apply(dashboard.table()?)?;
    let agg = Aggregates::compute(&filtered)?;

    assert_eq!(filtered.height(), 1);
    assert_eq!(agg.kpis.total_revenue, 100.0);
    assert_eq!(agg.kpis.total_orders, 1);
    assert_eq!(agg.revenue_by_region.len(), 1);
    assert_eq!(agg.revenue_by_region[0].key, "R1");
    assert_eq!(agg.revenue_by_region[0].revenue, 100.0);

    Ok(())
}

#[test]
fn test_non_numeric_revenue_counts_as_zero() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = mixed_sales(dir.path());

    let mut dashboard = Dashboard::new(path);
    let selection = dashboard.default_selection()?.with_regions(["East"]);
    let payload = dashboard.render_on(&selection, today())?;

    // The N/A row stays: it has quantity and a row in the table, but no revenue.
    assert_eq!(payload.table.rows.len(), 1);
    assert_eq!(payload.metrics[0].value, "₹0");
    assert_eq!(payload.metrics[1].value, "1");
    assert_eq!(payload.metrics[3].value, "3");

    Ok(())
}

#[test]
fn test_empty_product_selection_renders_empty_dashboard() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = mixed_sales(dir.path());

    let mut dashboard = Dashboard::new(path);
    let selection = dashboard
        .default_selection()?
        .with_products(Vec::<String>::new());
    let payload = dashboard.render_on(&selection, today())?;

    let raw: Vec<f64> = payload.metrics.iter().map(|m| m.raw).collect();
    assert!(raw.iter().all(|v| *v == 0.0));
    assert!(payload.charts().all(|c| c.is_empty()));
    assert!(payload.table.rows.is_empty());
    assert_eq!(payload.table.columns.len(), REQUIRED_COLUMNS.len() + 1);

    Ok(())
}

#[test]
fn test_grouped_aggregations_partition_total_revenue() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let table = loader::load(mixed_sales(dir.path()))?;

    for selection in [
        FilterSelection::all(&table),
        FilterSelection::all(&table).with_segments(["Retail", "SMB"]),
        FilterSelection::all(&table).with_regions(["South"]),
    ] {
        let agg = Aggregates::compute(&selection.apply(&table)?)?;
        for groups in [
            &agg.revenue_by_region,
            &agg.revenue_by_product,
            &agg.revenue_by_month,
            &agg.revenue_by_segment,
        ] {
            let sum: f64 = groups.iter().map(|g| g.revenue).sum();
            assert!((sum - agg.kpis.total_revenue).abs() < 1e-6);
        }
    }

    Ok(())
}

#[test]
fn test_filter_is_idempotent_on_loaded_table() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let table = loader::load(mixed_sales(dir.path()))?;
    let selection = FilterSelection::all(&table)
        .with_regions(["North", "South"])
        .with_products(["Laptop", "Phone"]);

    let once = selection.apply(&table)?;
    let twice = sales_dashboard::filter(
        &once,
        &selection.regions,
        &selection.products,
        &selection.segments,
    )?;

    assert!(once.equals_missing(&twice));
    assert_eq!(table.height(), 6);

    Ok(())
}

#[test]
fn test_zero_orders_means_zero_average() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_sales(dir.path(), &[]);

    let mut dashboard = Dashboard::new(path);
    let selection = dashboard.default_selection()?;
    let payload = dashboard.render_on(&selection, today())?;

    assert_eq!(payload.metrics[1].raw, 0.0);
    assert_eq!(payload.metrics[2].raw, 0.0);
    assert_eq!(payload.metrics[2].value, "₹0");

    Ok(())
}

#[test]
fn test_header_only_file_renders_empty_dashboard() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut dashboard = Dashboard::new(write_sales(dir.path(), &[]));
    let selection = dashboard.default_selection()?;
    let payload = dashboard.render_on(&selection, today())?;

    assert!(payload.metrics.iter().all(|m| m.raw == 0.0));
    assert_eq!(payload.metrics[0].value, "₹0");
    assert!(payload.charts().all(|c| c.is_empty()));
    assert!(payload.table.rows.is_empty());
    assert!(payload.filters.iter().all(|f| f.options.is_empty()));

    Ok(())
}

#[test]
fn test_nan_revenue_does_not_poison_kpis() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_sales(
        dir.path(),
        &[
            "N1,2024-03-01,North,Laptop,Retail,1,0,NaN",
            "N2,2024-03-02,North,Laptop,Retail,1,0,100",
        ],
    );

    let mut dashboard = Dashboard::new(path);
    let selection = dashboard.default_selection()?;
    let payload = dashboard.render_on(&selection, today())?;

    assert_eq!(payload.metrics[0].raw, 100.0);
    assert_eq!(payload.metrics[0].value, "₹100");
    assert_eq!(payload.metrics[2].raw, 50.0);

    let agg = Aggregates::compute(&selection.apply(dashboard.table()?)?)?;
    assert_eq!(agg.revenue_by_month[0].revenue, 100.0);

    Ok(())
}

#[test]
fn test_mixed_date_layouts_share_month_buckets() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = write_sales(
        dir.path(),
        &[
            "D1,2024-03-15 10:30:00,North,Laptop,Retail,2.0,0,100",
            "D2,03/20/2024,North,Laptop,Retail,3,0,50",
            "D3,2024-04-01,North,Laptop,Retail,1,0,25",
        ],
    );

    let table = loader::load(path)?;
    let agg = Aggregates::compute(&FilterSelection::all(&table).apply(&table)?)?;

    let months: Vec<(&str, f64)> = agg
        .revenue_by_month
        .iter()
        .map(|g| (g.key.as_str(), g.revenue))
        .collect();
    assert_eq!(months, vec![("2024-03", 150.0), ("2024-04", 25.0)]);
    assert_eq!(agg.kpis.total_quantity, 6);

    Ok(())
}

#[test]
fn test_months_are_chronological_in_trend_chart() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let table = loader::load(mixed_sales(dir.path()))?;
    let agg = Aggregates::compute(&FilterSelection::all(&table).apply(&table)?)?;

    let months: Vec<&str> = agg.revenue_by_month.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(months, vec!["2024-01", "2024-02", "2024-03"]);
    assert_eq!(agg.revenue_by_month[0].revenue, 2200.0);

    Ok(())
}

#[test]
fn test_export_round_trip_reproduces_rows() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut dashboard = Dashboard::new(mixed_sales(dir.path()));
    let selection = dashboard.default_selection()?.with_regions(["North", "East"]);
    let payload = dashboard.render_on(&selection, today())?;

    assert_eq!(payload.download.file_name, "filtered_sales_20240630.csv");
    let export_dir = dir.path().join("exports");
    let exported = payload.download.write_to(&export_dir)?;

    let original = selection.apply(dashboard.table()?)?.drop(MONTH)?;
    let reloaded = loader::load(&exported)?.data_frame().drop(MONTH)?;

    assert_eq!(original.get_column_names(), reloaded.get_column_names());
    assert!(original.equals_missing(&reloaded));

    Ok(())
}

#[test]
fn test_cache_serves_table_until_invalidated() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = mixed_sales(dir.path());

    let mut dashboard = Dashboard::new(path.clone());
    let selection = dashboard.default_selection()?;
    assert_eq!(dashboard.render_on(&selection, today())?.table.rows.len(), 6);

    // Rewriting the source does not affect the memoized table.
    write_sales(dir.path(), &["Z1,2024-05-05,North,Laptop,Retail,1,0,10"]);
    assert_eq!(dashboard.render_on(&selection, today())?.table.rows.len(), 6);

    assert!(dashboard.invalidate());
    let selection = dashboard.default_selection()?;
    assert_eq!(dashboard.render_on(&selection, today())?.table.rows.len(), 1);

    Ok(())
}

#[test]
fn test_missing_source_is_data_source_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut dashboard = Dashboard::new(dir.path().join("missing.csv"));

    let err = dashboard.default_selection().unwrap_err();
    assert!(matches!(err, DashboardError::DataSource(_)));
}

#[test]
fn test_bad_dates_are_data_format_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sales(dir.path(), &["O1,not-a-date,North,Laptop,Retail,1,0,10"]);

    let err = loader::load(path).unwrap_err();
    assert!(matches!(err, DashboardError::DataFormat(_)));
}

#[test]
fn test_payload_serializes_for_hosts() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut dashboard = Dashboard::new(mixed_sales(dir.path()));
    let selection = dashboard.default_selection()?;
    let payload = dashboard.render_on(&selection, today())?;

    let json = serde_json::to_value(&payload)?;
    assert_eq!(json["title"], "Sales Analytics Dashboard");
    assert_eq!(json["chart_rows"][0][1]["kind"], "pie");
    assert_eq!(json["chart_rows"][2][0]["color"], "Product");
    assert_eq!(json["filters"][0]["options"], serde_json::json!(["North", "South", "East", "West"]));

    Ok(())
}
