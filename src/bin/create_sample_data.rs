//! Write a small sales_data.csv for local runs of the dashboard.

use polars::prelude::*;
use std::path::PathBuf;

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const PRODUCTS: [(&str, f64); 4] = [
    ("Laptop", 55000.0),
    ("Phone", 22000.0),
    ("Tablet", 18000.0),
    ("Headphones", 3500.0),
];
const SEGMENTS: [&str; 3] = ["Retail", "Corporate", "SMB"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sales_data.csv"));

    let mut order_ids = Vec::new();
    let mut dates = Vec::new();
    let mut regions = Vec::new();
    let mut products = Vec::new();
    let mut segments = Vec::new();
    let mut quantities = Vec::new();
    let mut discounts = Vec::new();
    let mut revenues = Vec::new();

    for i in 0..120usize {
        let (product, unit_price) = PRODUCTS[(i * 7) % PRODUCTS.len()];
        let quantity = (i % 5 + 1) as i64;
        let discount = ((i * 3) % 4) as f64 * 5.0;
        let month = i % 12 + 1;
        let day = (i * 11) % 28 + 1;

        order_ids.push(format!("ORD{:05}", 1000 + i));
        dates.push(format!("2024-{:02}-{:02}", month, day));
        regions.push(REGIONS[i % REGIONS.len()]);
        products.push(product);
        segments.push(SEGMENTS[(i / 2) % SEGMENTS.len()]);
        quantities.push(quantity);
        discounts.push(discount);

        // A few unparseable amounts, as seen in real exports
        if i % 37 == 36 {
            revenues.push("N/A".to_string());
        } else {
            let revenue = unit_price * quantity as f64 * (1.0 - discount / 100.0);
            revenues.push(format!("{:.2}", revenue));
        }
    }

    let mut sales = df! [
        "OrderID" => order_ids,
        "OrderDate" => dates,
        "Region" => regions,
        "Product" => products,
        "CustomerSegment" => segments,
        "Quantity" => quantities,
        "DiscountPct" => discounts,
        "Revenue_INR" => revenues,
    ]?;

    let mut file = std::fs::File::create(&path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut sales)?;

    println!("✅ Created {} ({} rows)", path.display(), sales.height());
    Ok(())
}
