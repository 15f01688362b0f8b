mod month_year;

pub use month_year::{parse_month_year, InvalidDateFormat, MonthYear};
