use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Services,
    Software,
    Hardware,
    Training,
}

impl Category {
    pub fn all() -> [Category; 4] {
        [
            Category::Services,
            Category::Software,
            Category::Hardware,
            Category::Training,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Services => "Services",
            Category::Software => "Software",
            Category::Hardware => "Hardware",
            Category::Training => "Training",
        }
    }

    /// Next category in form order, wrapping around
    pub fn next(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|c| *c == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|c| *c == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleStatus {
    Completed,
    Pending,
    Cancelled,
}

impl SaleStatus {
    pub fn all() -> [SaleStatus; 3] {
        [SaleStatus::Completed, SaleStatus::Pending, SaleStatus::Cancelled]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "Completed",
            SaleStatus::Pending => "Pending",
            SaleStatus::Cancelled => "Cancelled",
        }
    }

    pub fn next(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|s| *s == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|s| *s == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

/// One row of the data sheet. Immutable once it is in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub id: String,
    pub date: NaiveDate,
    pub product: String,
    pub category: Category,
    pub units: u32,
    pub revenue: Decimal,
    pub status: SaleStatus,
}

/// A record as submitted by the entry form, before it has an identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSalesRecord {
    pub date: NaiveDate,
    pub product: String,
    pub category: Category,
    pub units: u32,
    pub revenue: Decimal,
    pub status: SaleStatus,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Product name is required")]
    EmptyProduct,

    #[error("Units must be at least 1")]
    ZeroUnits,

    #[error("Revenue cannot be negative")]
    NegativeRevenue,

    #[error("Revenue cannot have more than two decimal places")]
    RevenueTooPrecise,

    #[error("Revenue must be below $10,000,000,000,000")]
    RevenueTooLarge,
}

/// 10^13: with two decimal places a revenue stays exact as a JSON float
const MAX_REVENUE: Decimal = Decimal::from_parts(1_316_134_912, 2_328, 0, false, 0);
const MAX_REVENUE_SCALE: u32 = 2;

impl NewSalesRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.product.trim().is_empty() {
            return Err(ValidationError::EmptyProduct);
        }
        if self.units == 0 {
            return Err(ValidationError::ZeroUnits);
        }
        if self.revenue < Decimal::ZERO {
            return Err(ValidationError::NegativeRevenue);
        }
        if self.revenue.normalize().scale() > MAX_REVENUE_SCALE {
            return Err(ValidationError::RevenueTooPrecise);
        }
        if self.revenue >= MAX_REVENUE {
            return Err(ValidationError::RevenueTooLarge);
        }
        Ok(())
    }

    pub(crate) fn with_id(self, id: String) -> SalesRecord {
        SalesRecord {
            id,
            date: self.date,
            product: self.product,
            category: self.category,
            units: self.units,
            revenue: self.revenue,
            status: self.status,
        }
    }
}

/// The data sheet a fresh session starts with
pub fn sample_records() -> Vec<SalesRecord> {
    let rows: [(&str, (i32, u32, u32), &str, Category, u32, i64, SaleStatus); 6] = [
        ("1", (2023, 10, 1), "Consulting Pro", Category::Services, 5, 2500, SaleStatus::Completed),
        ("2", (2023, 10, 3), "Basic License", Category::Software, 12, 1200, SaleStatus::Completed),
        ("3", (2023, 10, 5), "Premium Audit", Category::Services, 1, 1500, SaleStatus::Pending),
        ("4", (2023, 10, 10), "Hardware Kit", Category::Hardware, 3, 4500, SaleStatus::Completed),
        ("5", (2023, 10, 12), "Maintenance", Category::Services, 10, 1000, SaleStatus::Cancelled),
        ("6", (2023, 10, 15), "Enterprise Lic", Category::Software, 2, 5000, SaleStatus::Completed),
    ];

    rows.into_iter()
        .filter_map(|(id, (y, m, d), product, category, units, revenue, status)| {
            Some(SalesRecord {
                id: id.to_string(),
                date: NaiveDate::from_ymd_opt(y, m, d)?,
                product: product.to_string(),
                category,
                units,
                revenue: Decimal::from(revenue),
                status,
            })
        })
        .collect()
}
