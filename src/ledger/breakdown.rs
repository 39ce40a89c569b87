use serde::Serialize;

use super::category::SpendingCategory;

/// Palette used to color category slices in the breakdown, cycled by
/// position in the category list.
pub const CATEGORY_COLORS: [&str; 7] = [
    "#ffd700", "#d72660", "#b350e0", "#5ddcbe", "#6b21a8", "#abc6ea", "#f7931e",
];

/// Derived totals for one category.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryBreakdown {
    pub name: String,
    pub limit: f64,
    pub spent: f64,
    pub over_limit: bool,
    pub color: String,
}

/// Aggregate spending view across all categories and the monthly income.
///
/// `unused` is income minus total spending, floored at zero. `percent_used`
/// is rounded to two decimals and zero whenever income is not positive.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpendingBreakdown {
    pub categories: Vec<CategoryBreakdown>,
    pub total_spent: f64,
    pub unused: f64,
    pub percent_used: f64,
}

impl SpendingBreakdown {
    pub(crate) fn compute(categories: &[SpendingCategory], income: f64) -> Self {
        let categories: Vec<CategoryBreakdown> = categories
            .iter()
            .enumerate()
            .map(|(index, category)| {
                let spent = category.spent();
                CategoryBreakdown {
                    name: category.name.clone(),
                    limit: category.limit,
                    spent,
                    over_limit: spent >= category.limit,
                    color: CATEGORY_COLORS[index % CATEGORY_COLORS.len()].to_string(),
                }
            })
            .collect();
        let total_spent: f64 = categories.iter().map(|category| category.spent).sum();
        let unused = (income - total_spent).max(0.0);
        let percent_used = if income > 0.0 {
            round2(total_spent / income * 100.0)
        } else {
            0.0
        };
        Self {
            categories,
            total_spent,
            unused,
            percent_used,
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
