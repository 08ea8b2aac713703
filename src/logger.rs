use std::io::{self, Write};

use concolor_clap::ColorChoice;
use env_logger::{fmt::Formatter, Target, WriteStyle};
use log::{Level, LevelFilter, Record};

const CRATE_TARGET: &str = "gcstarget::";

/// The AWS SDK logs every request at debug level; keep it quiet below trace.
const SDK_MODULES: [&str; 4] = ["aws_config", "aws_sdk_s3", "aws_smithy_runtime", "hyper"];

/// Logs go to stderr so `cat` can stream object bytes on stdout.
pub fn init(verbose: u8, quiet: u8, color: ColorChoice) {
    let level = level_from_args(verbose, quiet);
    let mut builder = env_logger::Builder::new();
    builder
        .format(format)
        .filter_level(level)
        .write_style(write_style(color))
        .target(Target::Stderr);

    for module in SDK_MODULES {
        builder.filter_module(module, sdk_level(level));
    }

    builder.init();
}

fn level_from_args(verbose: u8, quiet: u8) -> LevelFilter {
    match i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=-2 => LevelFilter::Error,
        -1 => LevelFilter::Warn,
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn sdk_level(level: LevelFilter) -> LevelFilter {
    match level {
        LevelFilter::Trace => LevelFilter::Debug,
        level => level.min(LevelFilter::Warn),
    }
}

fn write_style(color: ColorChoice) -> WriteStyle {
    match color {
        ColorChoice::Auto => WriteStyle::Auto,
        ColorChoice::Never => WriteStyle::Never,
        _ => WriteStyle::Always,
    }
}

fn format(f: &mut Formatter, record: &Record) -> io::Result<()> {
    let args = record.args();
    let level = record.level();
    let style = f.default_level_style(level);
    match level {
        Level::Error => writeln!(f, "{style}error:{style:#} {args}"),
        Level::Warn => writeln!(f, "{style}warning:{style:#} {args}"),
        Level::Info => writeln!(f, "{args}"),
        Level::Debug | Level::Trace => {
            let target = short_target(record.target());
            writeln!(f, "{style}[{target}]{style:#} {args}")
        }
    }
}

fn short_target(target: &str) -> &str {
    target.strip_prefix(CRATE_TARGET).unwrap_or(target)
}

#[cfg(test)]
mod tests {
    use log::LevelFilter;

    use super::{level_from_args, sdk_level, short_target};

    #[test]
    fn verbosity() {
        assert_eq!(level_from_args(0, 0), LevelFilter::Info);
        assert_eq!(level_from_args(1, 0), LevelFilter::Debug);
        assert_eq!(level_from_args(5, 0), LevelFilter::Trace);
        assert_eq!(level_from_args(0, 1), LevelFilter::Warn);
        assert_eq!(level_from_args(0, 9), LevelFilter::Error);
    }

    #[test]
    fn sdk_stays_quiet_until_trace() {
        assert_eq!(sdk_level(LevelFilter::Info), LevelFilter::Warn);
        assert_eq!(sdk_level(LevelFilter::Debug), LevelFilter::Warn);
        assert_eq!(sdk_level(LevelFilter::Error), LevelFilter::Error);
        assert_eq!(sdk_level(LevelFilter::Trace), LevelFilter::Debug);
    }

    #[test]
    fn targets_drop_crate_name() {
        assert_eq!(short_target("gcstarget::storage::gcs"), "storage::gcs");
        assert_eq!(short_target("aws_sdk_s3::client"), "aws_sdk_s3::client");
    }
}
