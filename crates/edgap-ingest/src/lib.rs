pub mod csv_table;
pub mod numeric;

pub use csv_table::{CsvTable, column_index, is_missing_value, read_csv_table};
pub use numeric::{format_numeric, parse_f64};
