use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// The text could not be read as a [`Status`]
#[derive(Debug, thiserror::Error)]
#[error("Unknown sale status `{0}`")]
pub struct UnknownStatus(String);

/// The lifecycle state of a sale
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// The sale was initiated but not delivered yet
    Pending,
    /// The sale was delivered to the customer
    Completed,
    /// The sale was called off
    Cancelled,
}

impl Status {
    /// Whether the sale was delivered
    pub fn is_completed(self) -> bool {
        self == Status::Completed
    }

    /// Whether the sale was called off
    pub fn is_cancelled(self) -> bool {
        self == Status::Cancelled
    }
}

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("pending") {
            Ok(Status::Pending)
        } else if s.eq_ignore_ascii_case("completed") {
            Ok(Status::Completed)
        } else if s.eq_ignore_ascii_case("cancelled") {
            Ok(Status::Cancelled)
        } else {
            Err(UnknownStatus(s.to_owned()))
        }
    }
}

/// A single sale
///
/// Sales are immutable once built. The loader produces them from the rows of a
/// sales file, tests and other callers can assemble them with [`Sale::new`]
/// and the `with_*` methods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sale {
    sale_date: NaiveDate,
    delivery_date: Option<NaiveDate>,
    value: Decimal,
    status: Status,
    seller: String,
    manager: String,
    department: String,
    payment_method: String,
}

impl Sale {
    /// Creates a sale with the required attributes
    ///
    /// The delivery date starts out empty and all names start out as empty strings.
    pub fn new(sale_date: NaiveDate, value: Decimal, status: Status) -> Self {
        Self {
            sale_date,
            delivery_date: None,
            value,
            status,
            seller: String::new(),
            manager: String::new(),
            department: String::new(),
            payment_method: String::new(),
        }
    }

    /// Sets the day the sale was delivered
    pub fn with_delivery_date(mut self, delivery_date: impl Into<Option<NaiveDate>>) -> Self {
        self.delivery_date = delivery_date.into();
        self
    }

    /// Sets the name of the seller
    pub fn with_seller(mut self, seller: impl Into<String>) -> Self {
        self.seller = seller.into();
        self
    }

    /// Sets the name of the responsible manager
    pub fn with_manager(mut self, manager: impl Into<String>) -> Self {
        self.manager = manager.into();
        self
    }

    /// Sets the department the sale belongs to
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = department.into();
        self
    }

    /// Sets the way the sale was paid
    pub fn with_payment_method(mut self, payment_method: impl Into<String>) -> Self {
        self.payment_method = payment_method.into();
        self
    }

    /// The day the sale was initiated
    pub fn sale_date(&self) -> NaiveDate {
        self.sale_date
    }

    /// The day the sale was delivered
    /// Only meaningful for completed sales
    pub fn delivery_date(&self) -> Option<NaiveDate> {
        self.delivery_date
    }

    /// The value of the sale
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// The current status of the sale
    pub fn status(&self) -> Status {
        self.status
    }

    /// Whether the sale was delivered
    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    /// Whether the sale was called off
    pub fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }

    /// The name of the seller
    pub fn seller(&self) -> &str {
        &self.seller
    }

    /// The name of the responsible manager
    pub fn manager(&self) -> &str {
        &self.manager
    }

    /// The department the sale belongs to
    pub fn department(&self) -> &str {
        &self.department
    }

    /// The way the sale was paid
    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names_ignore_case_and_whitespace() {
        assert_eq!("Completed".parse::<Status>().unwrap(), Status::Completed);
        assert_eq!(" CANCELLED ".parse::<Status>().unwrap(), Status::Cancelled);
        assert_eq!("pending".parse::<Status>().unwrap(), Status::Pending);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = "shipped".parse::<Status>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown sale status `shipped`");
    }

    #[test]
    fn status_predicates() {
        assert!(Status::Completed.is_completed());
        assert!(!Status::Completed.is_cancelled());
        assert!(Status::Cancelled.is_cancelled());
        assert!(!Status::Pending.is_completed());
        assert!(!Status::Pending.is_cancelled());
    }
}
