//! Output formatting: invoice amounts in words and CSV export.

pub mod csv;
pub mod words;

pub use csv::to_csv;
pub use words::{amount_to_words, number_to_words};
