use chrono::{DateTime, FixedOffset, TimeZone};

pub fn datetime_to_string<Tz: TimeZone>(datetime: DateTime<Tz>) -> String {
    datetime
        .fixed_offset()
        .format("%Y-%m-%d %H:%M:%S%:z")
        .to_string()
}

pub fn datetime_to_string_opt(datetime: Option<DateTime<FixedOffset>>) -> Option<String> {
    datetime.map(datetime_to_string)
}
