use clap::Args;
use themetimer_core::{format_time_lossy, parse_time, FormatOptions};

#[derive(Args)]
pub struct FormatArgs {
    /// Milliseconds; negative or non-numeric input renders as 00:00
    #[arg(allow_hyphen_values = true)]
    pub ms: String,
    /// Append centiseconds (".CC")
    #[arg(long)]
    pub show_ms: bool,
    /// Always include the hours field
    #[arg(long)]
    pub force_hours: bool,
    /// Compact "1h 30m 5s" style
    #[arg(long)]
    pub compact: bool,
    /// Drop the leading zero of the first field
    #[arg(long)]
    pub no_leading_zero: bool,
}

impl FormatArgs {
    fn options(&self) -> FormatOptions {
        FormatOptions {
            show_milliseconds: self.show_ms,
            force_hours: self.force_hours,
            compact: self.compact,
            show_leading_zero: !self.no_leading_zero,
        }
    }
}

pub fn run_format(args: FormatArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", format_time_lossy(&args.ms, args.options()));
    Ok(())
}

pub fn run_parse(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let ms = parse_time(input)?;
    println!("{ms}");
    Ok(())
}
