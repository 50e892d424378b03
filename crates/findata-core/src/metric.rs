//! Metric catalogue.
//!
//! Filers report the same metric under different us-gaap concept tags. Each
//! [`Metric`] lists the tags worth trying, most prevalent first.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quarterly income statement metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Total revenue.
    Revenue,
    /// Cost of revenue (COGS).
    CostOfRevenue,
    /// Gross profit.
    GrossProfit,
    /// Operating expenses.
    OperatingExpenses,
    /// Operating income or loss.
    OperatingIncome,
    /// Net income or loss.
    NetIncome,
}

impl Metric {
    /// All supported metrics.
    pub const ALL: [Self; 6] = [
        Self::Revenue,
        Self::CostOfRevenue,
        Self::GrossProfit,
        Self::OperatingExpenses,
        Self::OperatingIncome,
        Self::NetIncome,
    ];

    /// Column label used in the output table.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::CostOfRevenue => "Cost of Revenue",
            Self::GrossProfit => "Gross Profit",
            Self::OperatingExpenses => "Operating Expenses",
            Self::OperatingIncome => "Operating Income",
            Self::NetIncome => "Net Income",
        }
    }

    /// Candidate us-gaap concept tags in priority order.
    #[must_use]
    pub const fn concept_tags(&self) -> &'static [&'static str] {
        match self {
            Self::Revenue => &[
                "SalesRevenueNet",
                "RevenueFromContractWithCustomerExcludingAssessedTax",
                "SalesRevenueGoodsNet",
                "Revenues",
                "RevenueNet",
                "RevenuesNet",
            ],
            Self::CostOfRevenue => &[
                "CostOfRevenue",
                "CostOfGoodsAndServicesSold",
                "CostOfGoodsSold",
                "CostOfGoodsAndServiceExcludingDepreciationDepletionAndAmortization",
            ],
            Self::GrossProfit => &["GrossProfit"],
            Self::OperatingExpenses => &["OperatingExpenses", "CostsAndExpenses"],
            Self::OperatingIncome => &[
                "OperatingIncomeLoss",
                "IncomeLossFromContinuingOperationsBeforeIncomeTaxesExtraordinaryItemsNoncontrollingInterest",
            ],
            Self::NetIncome => &[
                "NetIncomeLoss",
                "ProfitLoss",
                "NetIncomeLossAvailableToCommonStockholdersBasic",
            ],
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_metric_has_tags() {
        for metric in Metric::ALL {
            assert!(!metric.concept_tags().is_empty(), "{metric}");
        }
    }

    #[test]
    fn test_revenue_tag_priority() {
        let tags = Metric::Revenue.concept_tags();
        assert_eq!(tags[0], "SalesRevenueNet");
        assert_eq!(tags[3], "Revenues");
        assert_eq!(tags.len(), 6);
    }
}
