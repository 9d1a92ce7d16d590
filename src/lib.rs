//! Business metrics over a file of sales.
//!
//! A [`SalesLoader`] reads the rows of a delimited sales file into [`Sale`]s,
//! a [`SalesAggregator`] answers the fixed set of queries over them.

pub use self::{
    aggregator::{AggregateError, SalesAggregator},
    date_format::{DateFormat, UnknownDateFormat},
    loader::{LoadError, LoaderConfig, SalesLoader, MAX_SALE_VALUE},
    sale::{Sale, Status, UnknownStatus},
};

mod aggregator;
mod date_format;
mod loader;
mod sale;
