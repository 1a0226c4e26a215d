//! Recurring expense inputs and purchase frequencies

mod data;

pub use data::{Frequency, RecurringExpense, DEFAULT_ANNUAL_RETURN_RATE, DAYS_PER_YEAR};
