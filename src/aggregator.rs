use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Datelike, Month};
use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::{LoadError, LoaderConfig, Sale, SalesLoader, Status};

/// Possible errors to occur while aggregating sales
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("There are no sales matching the query")]
    NoMatchingRecords,
}

/// Business metrics over a fixed set of sales
///
/// The sales are owned by the aggregator and never change after construction,
/// so every query is a plain read over the same sequence. Queries that rank or
/// pick a single sale resolve ties by the original order of the sales.
#[derive(Debug, Default)]
pub struct SalesAggregator {
    sales: Vec<Sale>,
}

impl SalesAggregator {
    /// Creates an aggregator over the given sales
    pub fn new(sales: Vec<Sale>) -> Self {
        log::debug!("Aggregating over {} sales", sales.len());
        Self { sales }
    }

    /// Loads the sales file at `path` and creates an aggregator over its sales
    ///
    /// Fails with [`LoadError::DataUnavailable`] if the file is missing or holds no sales.
    pub fn load(path: impl AsRef<Path>, config: LoaderConfig) -> Result<Self, LoadError> {
        let sales = SalesLoader::new(config).load_path(path)?;
        Ok(Self::new(sales))
    }

    /// All sales in their original order
    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    /// The number of sales
    pub fn len(&self) -> usize {
        self.sales.len()
    }

    /// Whether there are no sales at all
    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    /// The value of all sales, regardless of their status
    pub fn total_of_all_sales(&self) -> Decimal {
        self.sales.iter().map(Sale::value).sum()
    }

    /// The value of all completed sales
    pub fn total_of_completed_sales(&self) -> Decimal {
        self.completed().map(Sale::value).sum()
    }

    /// The value of all cancelled sales
    pub fn total_of_cancelled_sales(&self) -> Decimal {
        self.cancelled().map(Sale::value).sum()
    }

    /// The completed sale with the latest delivery date
    ///
    /// If several sales share that date, the first of them is returned.
    /// Completed sales without a delivery date rank below all others.
    pub fn most_recent_completed_sale(&self) -> Option<&Sale> {
        self.completed().fold(None, |latest, sale| match latest {
            Some(latest) if latest.delivery_date() >= sale.delivery_date() => Some(latest),
            _ => Some(sale),
        })
    }

    /// The number of days between the earliest and the latest cancelled sale
    ///
    /// Fails with [`AggregateError::NoMatchingRecords`] if no sale was cancelled.
    pub fn days_between_first_and_last_cancelled_sale(&self) -> Result<i64, AggregateError> {
        let mut dates = self.cancelled().map(Sale::sale_date);
        let first = dates.next().ok_or(AggregateError::NoMatchingRecords)?;
        let (earliest, latest) = dates.fold((first, first), |(earliest, latest), date| {
            (earliest.min(date), latest.max(date))
        });

        Ok((latest - earliest).num_days())
    }

    /// The value of all completed sales of the seller with exactly this name
    pub fn total_completed_sales_by_seller(&self, seller: &str) -> Decimal {
        self.completed()
            .filter(|sale| sale.seller() == seller)
            .map(Sale::value)
            .sum()
    }

    /// The number of sales of any status managed by the manager with exactly this name
    pub fn count_all_sales_by_manager(&self, manager: &str) -> u64 {
        self.sales
            .iter()
            .filter(|sale| sale.manager() == manager)
            .count() as u64
    }

    /// The value of all sales with `status` that were initiated in one of `months`
    ///
    /// Months match regardless of the year. No months means no matching sales.
    pub fn total_sales_by_status_and_months(&self, status: Status, months: &[Month]) -> Decimal {
        self.sales
            .iter()
            .filter(|sale| sale.status() == status)
            .filter(|sale| {
                months
                    .iter()
                    .any(|month| month.number_from_month() == sale.sale_date().month())
            })
            .map(Sale::value)
            .sum()
    }

    /// Completed sales counted per department
    pub fn count_completed_sales_by_department(&self) -> BTreeMap<String, u64> {
        let mut counts = BTreeMap::new();
        for sale in self.completed() {
            *counts.entry(sale.department().to_owned()).or_insert(0) += 1;
        }

        log::trace!("Completed sales span {} departments", counts.len());
        counts
    }

    /// Completed sales counted per payment method, grouped by the year they were initiated
    pub fn count_completed_sales_by_payment_method_and_year(
        &self,
    ) -> BTreeMap<i32, BTreeMap<String, u64>> {
        let mut counts: BTreeMap<i32, BTreeMap<String, u64>> = BTreeMap::new();
        for sale in self.completed() {
            *counts
                .entry(sale.sale_date().year())
                .or_default()
                .entry(sale.payment_method().to_owned())
                .or_insert(0) += 1;
        }

        log::trace!("Completed sales span {} years", counts.len());
        counts
    }

    /// The three sellers with the highest completed sales value
    ///
    /// See [`SalesAggregator::top_sellers`].
    pub fn top3_best_sellers(&self) -> IndexMap<String, Decimal> {
        self.top_sellers(3)
    }

    /// The `n` sellers with the highest completed sales value, best first
    ///
    /// Sellers with equal totals keep the order in which they first appear
    /// among the completed sales.
    pub fn top_sellers(&self, n: usize) -> IndexMap<String, Decimal> {
        let mut totals: IndexMap<&str, Decimal> = IndexMap::new();
        for sale in self.completed() {
            *totals.entry(sale.seller()).or_insert(Decimal::ZERO) += sale.value();
        }

        // `sort_by` is stable, equal totals stay in encounter order
        totals.sort_by(|_, a, _, b| b.cmp(a));
        totals
            .into_iter()
            .take(n)
            .map(|(seller, total)| (seller.to_owned(), total))
            .collect()
    }

    fn completed(&self) -> impl Iterator<Item = &Sale> {
        self.sales.iter().filter(|sale| sale.is_completed())
    }

    fn cancelled(&self) -> impl Iterator<Item = &Sale> {
        self.sales.iter().filter(|sale| sale.is_cancelled())
    }
}
