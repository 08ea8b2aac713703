use std::{fmt::Display, time::Duration};

use clap::builder::styling::AnsiColor;
use humansize::{ToF64, Unsigned, DECIMAL};
use humantime::format_duration;
use log::info;

pub fn format_size<T: ToF64 + Unsigned>(input: T) -> String {
    humansize::format_size(input, DECIMAL)
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    format_duration(Duration::from_millis(millis)).to_string()
}

pub fn print_stat<T: Display>(name: &str, value: T) {
    let style = AnsiColor::Cyan.on_default();
    info!("{style}{name}:{style:#} {value}");
}
