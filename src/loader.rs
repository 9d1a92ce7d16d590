use std::fs::File;
use std::io;
use std::path::Path;

use rust_decimal::Decimal;

use crate::{DateFormat, Sale, Status};

/// The largest accepted sale value, 10^15
///
/// Sums of bounded values stay far below [`Decimal::MAX`], so the aggregates
/// cannot overflow.
pub const MAX_SALE_VALUE: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Possible errors to occur while loading a sales file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("The sales data `{resource}` was not found or is empty")]
    DataUnavailable {
        resource: String,
        #[source]
        source: Option<io::Error>,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("Row {row}: `{value}` is not a date of the form {format}")]
    InvalidDate {
        row: usize,
        value: String,
        format: DateFormat,
    },
    #[error(
        "Row {row}: `{value}` is not an exact decimal value of at most {max}",
        max = MAX_SALE_VALUE
    )]
    InvalidValue { row: usize, value: String },
    #[error("Row {row}: the sale value {value} is negative")]
    NegativeValue { row: usize, value: Decimal },
    #[error("Row {row}: `{value}` is not a sale status")]
    InvalidStatus { row: usize, value: String },
}

/// Settings that apply to a whole sales file
#[derive(Clone, Copy, Debug)]
pub struct LoaderConfig {
    delimiter: u8,
    date_format: DateFormat,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: b';',
            date_format: DateFormat::default(),
        }
    }
}

impl LoaderConfig {
    /// Creates the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// The field delimiter, `;` by default
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// The format of both date columns, [`DateFormat::DayMonthYear`] by default
    pub fn date_format(mut self, date_format: DateFormat) -> Self {
        self.date_format = date_format;
        self
    }
}

/// One row of a sales file, as written
///
/// Columns are matched by position, not by header name.
#[derive(Debug, serde::Deserialize)]
struct SaleRecord {
    sale_date: String,
    delivery_date: String,
    value: String,
    status: String,
    seller: String,
    manager: String,
    department: String,
    payment_method: String,
}

/// Reads sales files into [`Sale`]s
#[derive(Clone, Copy, Debug, Default)]
pub struct SalesLoader {
    config: LoaderConfig,
}

impl SalesLoader {
    /// Creates a loader using `config` for every file
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Loads all sales from the file at `path`
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<Vec<Sale>, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| LoadError::DataUnavailable {
            resource: path.display().to_string(),
            source: Some(err),
        })?;

        self.load_reader(&path.display().to_string(), file)
    }

    /// Loads all sales from `reader`
    ///
    /// `resource` names the data in errors and log messages. The first row is
    /// treated as a header and skipped. Sales keep the order of their rows.
    pub fn load_reader<R: io::Read>(
        &self,
        resource: &str,
        reader: R,
    ) -> Result<Vec<Sale>, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.config.delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut sales = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record: SaleRecord = record?.deserialize(None)?;
            sales.push(self.convert(idx + 1, record)?);
        }

        if sales.is_empty() {
            return Err(LoadError::DataUnavailable {
                resource: resource.to_owned(),
                source: None,
            });
        }

        log::debug!(
            "Loaded {} sales from `{}` using the {} date format",
            sales.len(),
            resource,
            self.config.date_format,
        );

        Ok(sales)
    }

    fn convert(&self, row: usize, record: SaleRecord) -> Result<Sale, LoadError> {
        let sale_date = self.parse_date(row, &record.sale_date)?;
        let delivery_date = if record.delivery_date.is_empty() {
            None
        } else {
            Some(self.parse_date(row, &record.delivery_date)?)
        };

        let value = Decimal::from_str_exact(&record.value)
            .map_err(|_| LoadError::InvalidValue { row, value: record.value.clone() })?;
        if value < Decimal::ZERO {
            return Err(LoadError::NegativeValue { row, value });
        }
        if value > MAX_SALE_VALUE {
            return Err(LoadError::InvalidValue { row, value: record.value });
        }

        let status = record.status
            .parse::<Status>()
            .map_err(|_| LoadError::InvalidStatus { row, value: record.status.clone() })?;

        Ok(Sale::new(sale_date, value, status)
            .with_delivery_date(delivery_date)
            .with_seller(record.seller)
            .with_manager(record.manager)
            .with_department(record.department)
            .with_payment_method(record.payment_method))
    }

    fn parse_date(&self, row: usize, value: &str) -> Result<chrono::NaiveDate, LoadError> {
        self.config.date_format
            .parse(value)
            .map_err(|_| LoadError::InvalidDate {
                row,
                value: value.to_owned(),
                format: self.config.date_format,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;

    const HEADER: &str =
        "sale date;delivery date;value;status;seller;manager;department;payment method\n";

    fn load(config: LoaderConfig, rows: &str) -> Result<Vec<Sale>, LoadError> {
        let data = format!("{HEADER}{rows}");
        SalesLoader::new(config).load_reader("test", data.as_bytes())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_month_year_rows() {
        let sales = load(
            LoaderConfig::new(),
            "01/02/2023; 05/02/2023; 1250.40; Completed; Ana; Bruno; Electronics; Credit card\n\
             03/02/2023;           ;   99.90;   Pending; Caio; Bruno; Toys; Pix\n",
        ).unwrap();

        assert_eq!(sales.len(), 2);
        assert_eq!(
            sales[0],
            Sale::new(date(2023, 2, 1), dec!(1250.40), Status::Completed)
                .with_delivery_date(date(2023, 2, 5))
                .with_seller("Ana")
                .with_manager("Bruno")
                .with_department("Electronics")
                .with_payment_method("Credit card"),
        );
        assert_eq!(sales[1].delivery_date(), None);
        assert_eq!(sales[1].status(), Status::Pending);
        assert_eq!(sales[1].value(), dec!(99.90));
    }

    #[test]
    fn year_month_day_rows() {
        let config = LoaderConfig::new()
            .delimiter(b',')
            .date_format(DateFormat::YearMonthDay);
        let data = "a,b,c,d,e,f,g,h\n2024-01-10,2024-01-12,10,cancelled,Ana,Bruno,Toys,Cash\n";
        let sales = SalesLoader::new(config).load_reader("test", data.as_bytes()).unwrap();

        assert_eq!(sales[0].sale_date(), date(2024, 1, 10));
        assert_eq!(sales[0].delivery_date(), Some(date(2024, 1, 12)));
        assert!(sales[0].is_cancelled());
    }

    #[test]
    fn header_only_is_unavailable() {
        let result = load(LoaderConfig::new(), "");
        assert!(matches!(result, Err(LoadError::DataUnavailable { source: None, .. })));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let result = SalesLoader::default().load_path("does/not/exist.csv");
        assert!(matches!(result, Err(LoadError::DataUnavailable { source: Some(_), .. })));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}01/02/2023;05/02/2023;10.00;Completed;Ana;Bruno;Toys;Pix").unwrap();

        let sales = SalesLoader::default().load_path(file.path()).unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].seller(), "Ana");
    }

    #[test]
    fn invalid_date_reports_row() {
        let result = load(
            LoaderConfig::new(),
            "01/02/2023;05/02/2023;10;Completed;Ana;Bruno;Toys;Pix\n\
             2023-02-01;05/02/2023;10;Completed;Ana;Bruno;Toys;Pix\n",
        );
        match result {
            Err(LoadError::InvalidDate { row, value, format }) => {
                assert_eq!(row, 2);
                assert_eq!(value, "2023-02-01");
                assert_eq!(format, DateFormat::DayMonthYear);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn invalid_value() {
        let result = load(LoaderConfig::new(), "01/02/2023;;ten;Pending;Ana;Bruno;Toys;Pix\n");
        assert!(matches!(result, Err(LoadError::InvalidValue { row: 1, .. })));
    }

    #[test]
    fn negative_value() {
        let result = load(LoaderConfig::new(), "01/02/2023;;-5.00;Pending;Ana;Bruno;Toys;Pix\n");
        assert!(matches!(result, Err(LoadError::NegativeValue { row: 1, .. })));
    }

    #[test]
    fn values_are_not_rounded() {
        let result = load(
            LoaderConfig::new(),
            "01/02/2023;;0.00000000000000000000000000001;Pending;Ana;Bruno;Toys;Pix\n",
        );
        match result {
            Err(LoadError::InvalidValue { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "0.00000000000000000000000000001");
            }
            other => panic!("unexpected result {other:?}"),
        }

        let sales = load(
            LoaderConfig::new(),
            "01/02/2023;;0.0000000000000000000000000001;Pending;Ana;Bruno;Toys;Pix\n",
        ).unwrap();
        assert_eq!(sales[0].value(), dec!(0.0000000000000000000000000001));
    }

    #[test]
    fn values_above_the_bound() {
        let sales = load(
            LoaderConfig::new(),
            "01/02/2023;;1000000000000000;Pending;Ana;Bruno;Toys;Pix\n",
        ).unwrap();
        assert_eq!(sales[0].value(), MAX_SALE_VALUE);

        for value in ["1000000000000000.01", "79228162514264337593543950335"] {
            let result = load(
                LoaderConfig::new(),
                &format!("01/02/2023;;{value};Pending;Ana;Bruno;Toys;Pix\n"),
            );
            assert!(matches!(result, Err(LoadError::InvalidValue { row: 1, .. })), "{value}");
        }
    }

    #[test]
    fn invalid_status() {
        let result = load(LoaderConfig::new(), "01/02/2023;;5.00;Shipped;Ana;Bruno;Toys;Pix\n");
        assert!(matches!(result, Err(LoadError::InvalidStatus { row: 1, .. })));
    }

    #[test]
    fn wrong_column_count() {
        let result = load(LoaderConfig::new(), "01/02/2023;;5.00;Pending\n");
        assert!(matches!(result, Err(LoadError::Csv(_))));
    }
}
