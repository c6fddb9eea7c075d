use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::time::Duration;

/// A failed attempt at coercing raw argument text into a typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueError {
    InvalidBool(String),
    InvalidInt(String),
    InvalidFloat(String),
    InvalidDuration(String),
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueError::InvalidBool(text) => write!(f, "invalid boolean value '{}'", text),
            ValueError::InvalidInt(text) => write!(f, "invalid integer value '{}'", text),
            ValueError::InvalidFloat(text) => write!(f, "invalid numeric value '{}'", text),
            ValueError::InvalidDuration(text) => write!(f, "invalid duration value '{}'", text),
        }
    }
}

impl std::error::Error for ValueError {}

static DURATION_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+(?:\.[0-9]+)?)(ns|us|µs|ms|s|m|h)").unwrap());

/// Parses a compound duration literal such as `300ms`, `1.5h` or `2h45m`.
pub fn parse_duration(text: &str) -> Result<Duration, ValueError> {
    if text == "0" {
        return Ok(Duration::ZERO);
    }
    if text.is_empty() {
        return Err(ValueError::InvalidDuration(text.to_string()));
    }

    let mut rest = text;
    let mut nanos = 0.0f64;

    while !rest.is_empty() {
        let caps = DURATION_SEGMENT
            .captures(rest)
            .ok_or_else(|| ValueError::InvalidDuration(text.to_string()))?;
        let amount: f64 = caps[1]
            .parse()
            .map_err(|_| ValueError::InvalidDuration(text.to_string()))?;
        let unit = match &caps[2] {
            "ns" => 1.0,
            "us" | "µs" => 1_000.0,
            "ms" => 1_000_000.0,
            "s" => 1_000_000_000.0,
            "m" => 60.0 * 1_000_000_000.0,
            "h" => 3600.0 * 1_000_000_000.0,
            _ => return Err(ValueError::InvalidDuration(text.to_string())),
        };
        nanos += amount * unit;
        rest = &rest[caps[0].len()..];
    }

    Ok(Duration::from_nanos(nanos as u64))
}

/// Renders a duration back into the compact literal form accepted by
/// [`parse_duration`], used when displaying defaults.
pub fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }

    let mut nanos = d.as_nanos();
    let mut out = String::new();

    let units: [(u128, &str); 6] = [
        (3_600_000_000_000, "h"),
        (60_000_000_000, "m"),
        (1_000_000_000, "s"),
        (1_000_000, "ms"),
        (1_000, "us"),
        (1, "ns"),
    ];

    for (size, suffix) in units {
        if nanos >= size {
            out.push_str(&format!("{}{}", nanos / size, suffix));
            nanos %= size;
        }
    }

    out
}

fn parse_bool(raw: &str) -> Result<bool, ValueError> {
    raw.parse::<bool>()
        .map_err(|_| ValueError::InvalidBool(raw.to_string()))
}

fn parse_int(raw: &str) -> Result<i64, ValueError> {
    raw.parse::<i64>()
        .map_err(|_| ValueError::InvalidInt(raw.to_string()))
}

fn parse_float(raw: &str) -> Result<f64, ValueError> {
    raw.parse::<f64>()
        .map_err(|_| ValueError::InvalidFloat(raw.to_string()))
}

/// A single-valued cell: the live value plus the declared default.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarCell<T> {
    pub value: T,
    pub default: T,
}

impl<T: Clone + PartialEq> ScalarCell<T> {
    fn new(default: T) -> Self {
        Self {
            value: default.clone(),
            default,
        }
    }

    fn is_default(&self) -> bool {
        self.value == self.default
    }
}

/// An ordered-sequence cell: repeated bindings append in match order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeqCell<T> {
    pub items: Vec<T>,
    pub default: Vec<T>,
}

impl<T: Clone + PartialEq> SeqCell<T> {
    fn new(default: Vec<T>) -> Self {
        Self {
            items: default.clone(),
            default,
        }
    }

    fn is_default(&self) -> bool {
        self.items == self.default
    }
}

/// The typed storage bound to one descriptor.
///
/// Scalar kinds overwrite on each write; sequence kinds append. The matcher
/// clears a sequence cell once per match run before its first write so that
/// seeded or default content never mixes with user input.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueCell {
    Bool(ScalarCell<bool>),
    Str(ScalarCell<String>),
    Int(ScalarCell<i64>),
    Float(ScalarCell<f64>),
    Duration(ScalarCell<Duration>),
    Strs(SeqCell<String>),
    Ints(SeqCell<i64>),
    Floats(SeqCell<f64>),
}

impl ValueCell {
    pub fn new_bool(default: bool) -> Self {
        ValueCell::Bool(ScalarCell::new(default))
    }

    pub fn new_string(default: impl Into<String>) -> Self {
        ValueCell::Str(ScalarCell::new(default.into()))
    }

    pub fn new_int(default: i64) -> Self {
        ValueCell::Int(ScalarCell::new(default))
    }

    pub fn new_float(default: f64) -> Self {
        ValueCell::Float(ScalarCell::new(default))
    }

    pub fn new_duration(default: Duration) -> Self {
        ValueCell::Duration(ScalarCell::new(default))
    }

    pub fn new_strings(default: Vec<String>) -> Self {
        ValueCell::Strs(SeqCell::new(default))
    }

    pub fn new_ints(default: Vec<i64>) -> Self {
        ValueCell::Ints(SeqCell::new(default))
    }

    pub fn new_floats(default: Vec<f64>) -> Self {
        ValueCell::Floats(SeqCell::new(default))
    }

    /// Whether an option bound to this cell consumes a following token.
    /// Boolean options are pure flags; everything else takes a value.
    pub fn takes_value(&self) -> bool {
        !matches!(self, ValueCell::Bool(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(
            self,
            ValueCell::Strs(_) | ValueCell::Ints(_) | ValueCell::Floats(_)
        )
    }

    /// Checks that `raw` coerces into this cell's type without mutating it.
    pub fn validate(&self, raw: &str) -> Result<(), ValueError> {
        match self {
            ValueCell::Bool(_) => parse_bool(raw).map(|_| ()),
            ValueCell::Str(_) | ValueCell::Strs(_) => Ok(()),
            ValueCell::Int(_) | ValueCell::Ints(_) => parse_int(raw).map(|_| ()),
            ValueCell::Float(_) | ValueCell::Floats(_) => parse_float(raw).map(|_| ()),
            ValueCell::Duration(_) => parse_duration(raw).map(|_| ()),
        }
    }

    /// Coerces `raw` and stores it: scalars overwrite, sequences append.
    pub fn write(&mut self, raw: &str) -> Result<(), ValueError> {
        match self {
            ValueCell::Bool(cell) => cell.value = parse_bool(raw)?,
            ValueCell::Str(cell) => cell.value = raw.to_string(),
            ValueCell::Int(cell) => cell.value = parse_int(raw)?,
            ValueCell::Float(cell) => cell.value = parse_float(raw)?,
            ValueCell::Duration(cell) => cell.value = parse_duration(raw)?,
            ValueCell::Strs(cell) => cell.items.push(raw.to_string()),
            ValueCell::Ints(cell) => cell.items.push(parse_int(raw)?),
            ValueCell::Floats(cell) => cell.items.push(parse_float(raw)?),
        }
        Ok(())
    }

    /// Empties a sequence cell. No effect on scalars.
    pub fn clear(&mut self) {
        match self {
            ValueCell::Strs(cell) => cell.items.clear(),
            ValueCell::Ints(cell) => cell.items.clear(),
            ValueCell::Floats(cell) => cell.items.clear(),
            _ => {}
        }
    }

    /// Whether the cell still holds its declared default.
    pub fn is_default(&self) -> bool {
        match self {
            ValueCell::Bool(cell) => cell.is_default(),
            ValueCell::Str(cell) => cell.is_default(),
            ValueCell::Int(cell) => cell.is_default(),
            ValueCell::Float(cell) => cell.is_default(),
            ValueCell::Duration(cell) => cell.is_default(),
            ValueCell::Strs(cell) => cell.is_default(),
            ValueCell::Ints(cell) => cell.is_default(),
            ValueCell::Floats(cell) => cell.is_default(),
        }
    }

    /// Seeds the cell from the first populated variable in a space-separated
    /// environment variable list. Sequence kinds split the variable's value
    /// on commas. Returns true when a variable was found and coerced.
    pub fn seed_from_env(&mut self, env_vars: &str) -> bool {
        for name in env_vars.split_whitespace() {
            let Ok(value) = std::env::var(name) else {
                continue;
            };

            if self.is_sequence() {
                let parts: Vec<&str> = value.split(',').map(str::trim).collect();
                if parts.iter().any(|p| self.validate(p).is_err()) {
                    return false;
                }
                self.clear();
                for part in parts {
                    let _ = self.write(part);
                }
                return true;
            }

            return self.write(&value).is_ok();
        }
        false
    }
}

impl fmt::Display for ValueCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueCell::Bool(cell) => write!(f, "{}", cell.value),
            ValueCell::Str(cell) => write!(f, "\"{}\"", cell.value),
            ValueCell::Int(cell) => write!(f, "{}", cell.value),
            ValueCell::Float(cell) => write!(f, "{}", cell.value),
            ValueCell::Duration(cell) => write!(f, "{}", format_duration(cell.value)),
            ValueCell::Strs(cell) => {
                let quoted: Vec<String> =
                    cell.items.iter().map(|s| format!("\"{}\"", s)).collect();
                write!(f, "[{}]", quoted.join(", "))
            }
            ValueCell::Ints(cell) => {
                let items: Vec<String> = cell.items.iter().map(|i| i.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
            ValueCell::Floats(cell) => {
                let items: Vec<String> = cell.items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}
