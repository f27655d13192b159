//! Column names of the sales transaction table.

pub const ORDER_ID: &str = "OrderID";
pub const ORDER_DATE: &str = "OrderDate";
pub const REGION: &str = "Region";
pub const PRODUCT: &str = "Product";
pub const CUSTOMER_SEGMENT: &str = "CustomerSegment";
pub const QUANTITY: &str = "Quantity";
pub const DISCOUNT_PCT: &str = "DiscountPct";
pub const REVENUE: &str = "Revenue_INR";

/// Derived at load time from `OrderDate`.
pub const MONTH: &str = "Month";

/// Columns the source file must carry (after header whitespace is stripped).
pub const REQUIRED_COLUMNS: [&str; 8] = [
    ORDER_ID,
    ORDER_DATE,
    REGION,
    PRODUCT,
    CUSTOMER_SEGMENT,
    QUANTITY,
    DISCOUNT_PCT,
    REVENUE,
];

/// Categorical dimensions a user can filter on.
pub const DIMENSION_COLUMNS: [&str; 3] = [REGION, PRODUCT, CUSTOMER_SEGMENT];

/// Label substituted for empty categorical cells.
pub const UNKNOWN_LABEL: &str = "Unknown";
