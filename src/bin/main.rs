use chrono::Month;
use clap::Parser;

use sales_report::{AggregateError, DateFormat, LoaderConfig, SalesAggregator, Status};

/// A cli interface to the sales aggregator
///
/// Writes the report as `metric,key,value` CSV rows to stdout.
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// The path to the sales file
    filename: std::path::PathBuf,
    /// The format of both date columns (`dd/mm/yyyy` or `yyyy-mm-dd`)
    #[clap(long, default_value = "dd/mm/yyyy")]
    date_format: DateFormat,
    /// The field delimiter of the sales file
    #[clap(long, default_value = ";")]
    delimiter: char,
    /// Report the completed sales value of this seller
    #[clap(long)]
    seller: Option<String>,
    /// Report the number of sales of this manager
    #[clap(long)]
    manager: Option<String>,
    /// The status used together with `--month`
    #[clap(long, default_value = "completed")]
    status: Status,
    /// Report the value of sales with `--status` in these months (1-12 or name)
    #[clap(long = "month", parse(try_from_str = parse_month))]
    months: Vec<Month>,
}

#[derive(Debug, serde::Serialize)]
struct ReportRow {
    metric: &'static str,
    key: String,
    value: String,
}

impl ReportRow {
    fn new(metric: &'static str, key: impl Into<String>, value: impl ToString) -> Self {
        Self {
            metric,
            key: key.into(),
            value: value.to_string(),
        }
    }
}

fn parse_month(s: &str) -> Result<Month, String> {
    match s.parse::<u8>() {
        Ok(number) => {
            Month::try_from(number).map_err(|_| format!("`{number}` is not a month number"))
        }
        Err(_) => s.parse::<Month>().map_err(|_| format!("`{s}` is not a month name")),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if !args.delimiter.is_ascii() {
        anyhow::bail!("The delimiter must be a single ASCII character");
    }
    let config = LoaderConfig::new()
        .delimiter(args.delimiter as u8)
        .date_format(args.date_format);
    let aggregator = SalesAggregator::load(&args.filename, config)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(std::io::stdout());

    for row in report(&aggregator, &args) {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

fn report(aggregator: &SalesAggregator, args: &Args) -> Vec<ReportRow> {
    let mut rows = vec![
        ReportRow::new("total_of_completed_sales", "", aggregator.total_of_completed_sales()),
        ReportRow::new("total_of_cancelled_sales", "", aggregator.total_of_cancelled_sales()),
    ];

    match aggregator.most_recent_completed_sale() {
        Some(sale) => rows.push(ReportRow::new(
            "most_recent_completed_sale",
            sale.seller(),
            sale.delivery_date().map(|date| date.to_string()).unwrap_or_default(),
        )),
        None => log::warn!("Skipping the most recent completed sale, no sale was completed"),
    }

    match aggregator.days_between_first_and_last_cancelled_sale() {
        Ok(days) => rows.push(ReportRow::new(
            "days_between_first_and_last_cancelled_sale",
            "",
            days,
        )),
        Err(AggregateError::NoMatchingRecords) => {
            log::warn!("Skipping the days between cancelled sales, no sale was cancelled");
        }
    }

    if let Some(seller) = &args.seller {
        rows.push(ReportRow::new(
            "total_completed_sales_by_seller",
            seller.as_str(),
            aggregator.total_completed_sales_by_seller(seller),
        ));
    }

    if let Some(manager) = &args.manager {
        rows.push(ReportRow::new(
            "count_all_sales_by_manager",
            manager.as_str(),
            aggregator.count_all_sales_by_manager(manager),
        ));
    }

    if !args.months.is_empty() {
        let months = args.months
            .iter()
            .map(|month| month.name())
            .collect::<Vec<_>>()
            .join("+");
        rows.push(ReportRow::new(
            "total_sales_by_status_and_months",
            format!("{:?} {months}", args.status),
            aggregator.total_sales_by_status_and_months(args.status, &args.months),
        ));
    }

    for (department, count) in aggregator.count_completed_sales_by_department() {
        rows.push(ReportRow::new("count_completed_sales_by_department", department, count));
    }

    for (year, methods) in aggregator.count_completed_sales_by_payment_method_and_year() {
        for (method, count) in methods {
            rows.push(ReportRow::new(
                "count_completed_sales_by_payment_method_and_year",
                format!("{year}/{method}"),
                count,
            ));
        }
    }

    for (seller, total) in aggregator.top3_best_sellers() {
        rows.push(ReportRow::new("top3_best_sellers", seller, total));
    }

    rows
}
