use std::convert::Infallible;
use std::ffi::OsString;
use std::time::Duration;

use clap::Parser;

pub const PROGRAM: &str = "sysgauges";
pub const VERSION: &str = "v.1.0.0";

const DEFAULT_ALERT: f64 = 0.95;
const DEFAULT_INTERVAL_SECS: u32 = 1;
const DEFAULT_X: i16 = 20;
const DEFAULT_Y: i16 = 20;

/// Process-wide settings, built once from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Fraction of a row's max at which its indicator turns on.
    pub alert: f64,
    pub interval_secs: u32,
    pub show_max: bool,
    pub verbose: bool,
    /// Forced window width in pixels, 0 when unset.
    pub width: u16,
    pub x: i16,
    pub y: i16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alert: DEFAULT_ALERT,
            interval_secs: DEFAULT_INTERVAL_SECS,
            show_max: false,
            verbose: false,
            width: 0,
            x: DEFAULT_X,
            y: DEFAULT_Y,
        }
    }
}

impl Settings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_secs))
    }
}

/// Why parsing stopped before producing settings. Both end the process with status 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Help,
    BadFlag,
}

// getopt-like surface: single-letter flags only, no built-in help/version,
// repeated flags keep the last value, stray operands are ignored.
#[derive(Parser, Debug)]
#[command(
    name = PROGRAM,
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
struct Cli {
    #[arg(short = 'a', value_parser = float_arg, allow_hyphen_values = true)]
    alert: Option<f64>,

    #[arg(short = 'h')]
    help: bool,

    #[arg(short = 'i', value_parser = interval_arg, allow_hyphen_values = true)]
    interval: Option<u32>,

    #[arg(short = 'm')]
    show_max: bool,

    #[arg(short = 'v')]
    verbose: bool,

    #[arg(short = 'w', value_parser = width_arg, allow_hyphen_values = true)]
    width: Option<u16>,

    #[arg(short = 'x', value_parser = coordinate_arg, allow_hyphen_values = true)]
    x: Option<i16>,

    #[arg(short = 'y', value_parser = coordinate_arg, allow_hyphen_values = true)]
    y: Option<i16>,

    #[arg(hide = true)]
    operands: Vec<String>,
}

pub fn usage() -> String {
    format!(
        "{PROGRAM} {VERSION}\n\
         usage: {PROGRAM} [option] <value>\n\
         \t-a <0.0..1.0> : alert threshold\n\
         \t-h            : print this help\n\
         \t-i <uint>     : update interval in seconds\n\
         \t-m            : show max MEM and SWP values\n\
         \t-v            : print extra information (window width and height)\n\
         \t-w <uint16_t> : custom width\n\
         \t-x <int16_t>  : custom x coordinate\n\
         \t-y <int16_t>  : custom y coordinate\n"
    )
}

/// Parse `args` (program name first) into settings.
pub fn parse_from<I, T>(args: I) -> Result<Settings, Exit>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    // Runs before the logger exists, so nothing here logs.
    let cli = Cli::try_parse_from(args).map_err(|_| Exit::BadFlag)?;
    if cli.help {
        return Err(Exit::Help);
    }

    let defaults = Settings::default();
    Ok(Settings {
        alert: cli.alert.unwrap_or(defaults.alert),
        interval_secs: cli.interval.unwrap_or(defaults.interval_secs),
        show_max: cli.show_max,
        verbose: cli.verbose,
        width: cli.width.unwrap_or(defaults.width),
        x: cli.x.unwrap_or(defaults.x),
        y: cli.y.unwrap_or(defaults.y),
    })
}

/// Parse the process arguments, printing usage or a hint and exiting with
/// status 0 when no settings come out of it.
pub fn parse() -> Settings {
    match parse_from(std::env::args_os()) {
        Ok(settings) => settings,
        Err(Exit::Help) => {
            print!("{}", usage());
            std::process::exit(0);
        }
        Err(Exit::BadFlag) => {
            eprintln!("try '{PROGRAM} -h' for more information");
            std::process::exit(0);
        }
    }
}

// ─── C-STYLE NUMBER PARSING ─────────────────────────────────────
//
// Flag values are read the way strtod/strtoul/strtol read them: longest
// numeric prefix wins, garbage reads as zero, nothing is range-checked.

fn float_arg(s: &str) -> Result<f64, Infallible> {
    Ok(c_double(s))
}

fn interval_arg(s: &str) -> Result<u32, Infallible> {
    Ok(c_unsigned(s) as u32)
}

fn width_arg(s: &str) -> Result<u16, Infallible> {
    Ok(c_unsigned(s) as u16)
}

fn coordinate_arg(s: &str) -> Result<i16, Infallible> {
    Ok(c_signed(s) as i16)
}

/// `strtod(input, NULL)`: leading decimal or hex float, `inf`, `infinity`
/// or `nan` (any case), else 0.0.
pub fn c_double(input: &str) -> f64 {
    let s = input.trim_start();
    let (negative, body) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let starts_with = |word: &str| {
        body.get(..word.len()).is_some_and(|head| head.eq_ignore_ascii_case(word))
    };

    let magnitude = if starts_with("nan") {
        f64::NAN
    } else if starts_with("inf") {
        f64::INFINITY
    } else if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        hex_float(hex)
    } else {
        decimal_float(body)
    };
    if negative { -magnitude } else { magnitude }
}

/// Unsigned decimal float prefix of `s`, or 0.0.
fn decimal_float(s: &str) -> f64 {
    let bytes = s.as_bytes();
    let mut end = 0;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa_digits = end;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}

/// Hex float after the `0x`: hex digits with an optional point, then an
/// optional binary exponent `p[+-]digits`. No digits reads as the bare `0`.
fn hex_float(s: &str) -> f64 {
    let mut chars = s.chars().peekable();
    let mut mantissa = 0.0f64;
    let mut exponent: i64 = 0;
    let mut digits = 0;
    let mut seen_point = false;

    while let Some(&c) = chars.peek() {
        if let Some(d) = c.to_digit(16) {
            mantissa = mantissa * 16.0 + f64::from(d);
            if seen_point {
                exponent -= 4;
            }
            digits += 1;
        } else if c == '.' && !seen_point {
            seen_point = true;
        } else {
            break;
        }
        chars.next();
    }
    if digits == 0 {
        return 0.0;
    }

    let rest: String = chars.collect();
    if let Some(exp) = rest.strip_prefix(['p', 'P']) {
        let (exp_negative, exp_digits) = match exp.as_bytes().first() {
            Some(b'-') => (true, &exp[1..]),
            Some(b'+') => (false, &exp[1..]),
            _ => (false, exp),
        };
        let len = exp_digits.bytes().take_while(u8::is_ascii_digit).count();
        if len > 0 {
            let value = exp_digits[..len].parse::<i64>().unwrap_or(i64::MAX);
            exponent = if exp_negative {
                exponent.saturating_sub(value)
            } else {
                exponent.saturating_add(value)
            };
        }
    }

    let exponent = i32::try_from(exponent).unwrap_or(if exponent < 0 { i32::MIN } else { i32::MAX });
    mantissa * 2f64.powi(exponent)
}

/// Sign and magnitude of the leading integer, radix chosen like base 0.
/// A `None` magnitude means it overflowed `u64`.
fn c_integer(input: &str) -> (bool, Option<u64>) {
    let s = input.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let (radix, digits) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_hexdigit()) => (16, rest),
        Some(_) => (10, "0"),
        None if s.starts_with('0') => (8, s),
        None => (10, s),
    };

    let mut magnitude = Some(0u64);
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else { break };
        magnitude = magnitude
            .and_then(|m| m.checked_mul(u64::from(radix)))
            .and_then(|m| m.checked_add(u64::from(digit)));
    }
    (negative, magnitude)
}

/// `strtoul(input, NULL, 0)`: saturates on overflow, negation wraps.
pub fn c_unsigned(input: &str) -> u64 {
    match c_integer(input) {
        (_, None) => u64::MAX,
        (true, Some(m)) => m.wrapping_neg(),
        (false, Some(m)) => m,
    }
}

/// `strtol(input, NULL, 0)`: saturates at both ends.
pub fn c_signed(input: &str) -> i64 {
    match c_integer(input) {
        (false, None) => i64::MAX,
        (true, None) => i64::MIN,
        (false, Some(m)) => i64::try_from(m).unwrap_or(i64::MAX),
        (true, Some(m)) => 0i64.checked_sub_unsigned(m).unwrap_or(i64::MIN),
    }
}
