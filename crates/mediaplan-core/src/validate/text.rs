//! Heuristic readers for numbers embedded in free text.
//!
//! Plans state many figures as prose ("$75", "200 leads/month",
//! "60-90 days"). These helpers pull the numbers back out without trying to
//! understand the surrounding language.

use std::ops::Range;

// ---------------------------------------------------------------------------
// Amounts
// ---------------------------------------------------------------------------

/// A number found in text, with the byte range it occupies.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberToken {
    pub span: Range<usize>,
    pub value: f64,
    /// Preceded by `$`.
    pub currency: bool,
    /// Number of digits after the decimal point as written.
    pub decimals: usize,
    /// Written with a `k` or `m` magnitude suffix.
    pub suffix: Option<char>,
}

/// Find every number in `text`, e.g. `$15,000`, `$12.5k`, `3.5`, `200`.
///
/// Commas are accepted as thousands separators only between digits.
pub fn scan_numbers(text: &str) -> Vec<NumberToken> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        // Skip digits glued to a preceding letter or digit run ("Q3", "H2").
        if i > 0 && bytes[i - 1].is_ascii_alphabetic() {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            continue;
        }

        let currency = i > 0 && bytes[i - 1] == b'$';
        let start = if currency { i - 1 } else { i };

        let mut digits = String::new();
        let mut decimals = 0;
        let mut seen_dot = false;
        while i < bytes.len() {
            let b = bytes[i];
            if b.is_ascii_digit() {
                digits.push(b as char);
                if seen_dot {
                    decimals += 1;
                }
                i += 1;
            } else if b == b',' && !seen_dot && next_is_digit_group(bytes, i) {
                i += 1;
            } else if b == b'.' && !seen_dot && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
                digits.push('.');
                seen_dot = true;
                i += 1;
            } else {
                break;
            }
        }

        let mut suffix = None;
        if let Some(&b) = bytes.get(i) {
            let lower = b.to_ascii_lowercase();
            let standalone = !bytes.get(i + 1).is_some_and(u8::is_ascii_alphabetic);
            if (lower == b'k' || lower == b'm') && standalone {
                suffix = Some(lower as char);
                i += 1;
            }
        }

        let Ok(mut value) = digits.parse::<f64>() else {
            continue;
        };
        match suffix {
            Some('k') => value *= 1_000.0,
            Some('m') => value *= 1_000_000.0,
            _ => {}
        }

        tokens.push(NumberToken {
            span: start..i,
            value,
            currency,
            decimals,
            suffix,
        });
    }
    tokens
}

fn next_is_digit_group(bytes: &[u8], comma: usize) -> bool {
    let group = &bytes[comma + 1..];
    group.len() >= 3
        && group[..3].iter().all(u8::is_ascii_digit)
        && !group.get(3).is_some_and(u8::is_ascii_digit)
}

/// The first number in `text`, e.g. `75.0` for "$75 per lead" or `3.5` for
/// "3.5:1".
pub fn parse_amount(text: &str) -> Option<f64> {
    scan_numbers(text).first().map(|t| t.value)
}

/// A ratio written as `X:1` or `X.X:1`.
#[derive(Debug, Clone, PartialEq)]
pub struct RatioToken {
    pub span: Range<usize>,
    pub value: f64,
}

/// Find every `N:1` ratio in `text`.
pub fn scan_ratios(text: &str) -> Vec<RatioToken> {
    scan_numbers(text)
        .into_iter()
        .filter(|t| !t.currency && t.suffix.is_none())
        .filter_map(|t| {
            let rest = &text[t.span.end..];
            let tail = rest.strip_prefix(":1")?;
            if tail.starts_with(|c: char| c.is_ascii_digit()) {
                return None;
            }
            Some(RatioToken {
                span: t.span.start..t.span.end + 2,
                value: t.value,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Durations
// ---------------------------------------------------------------------------

/// A duration read from text such as "60-90 days" or "Weeks 1-4".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationExpr {
    pub low: f64,
    pub high: f64,
    /// Days per unit (1, 7, 30, 90 or 365).
    pub unit_days: f64,
    /// The unit came before the numbers ("Month 3", "Weeks 1-4"): the
    /// numbers are positions on a calendar rather than a length.
    pub positional: bool,
}

impl DurationExpr {
    /// Length in days of a phase described by this expression.
    ///
    /// "4 weeks" is 28 days, "2-4 weeks" 21 days (the midpoint), "Weeks 1-4"
    /// 28 days and "Month 2" 30 days.
    pub fn length_days(&self) -> f64 {
        if self.positional {
            (self.high - self.low + 1.0) * self.unit_days
        } else {
            (self.low + self.high) / 2.0 * self.unit_days
        }
    }

    /// Range of days by which something is expected, e.g. "60-90 days" is
    /// (60, 90) and "by month 3" is (90, 90).
    pub fn range_days(&self) -> (f64, f64) {
        (self.low * self.unit_days, self.high * self.unit_days)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tok {
    Number(f64),
    Dash,
    Unit(f64),
    Other,
}

/// Read the first duration expression in `text`.
pub fn parse_duration(text: &str) -> Option<DurationExpr> {
    let tokens = tokenize_duration(text);

    for (ui, tok) in tokens.iter().enumerate() {
        let Tok::Unit(unit_days) = *tok else {
            continue;
        };
        if let Some((low, high)) = numbers_before(&tokens, ui) {
            return Some(DurationExpr {
                low: low.min(high),
                high: low.max(high),
                unit_days,
                positional: false,
            });
        }
        if let Some((low, high)) = numbers_after(&tokens, ui) {
            return Some(DurationExpr {
                low: low.min(high),
                high: low.max(high),
                unit_days,
                positional: true,
            });
        }
    }
    None
}

fn numbers_before(tokens: &[Tok], unit: usize) -> Option<(f64, f64)> {
    let at = |i: usize| tokens.get(i).copied();

    // "90-day": a hyphen joins the number to the unit.
    if unit >= 2 && at(unit - 1) == Some(Tok::Dash) {
        if let Some(Tok::Number(n)) = at(unit - 2) {
            let ranged = unit >= 4 && at(unit - 3) == Some(Tok::Dash);
            if !ranged {
                return Some((n, n));
            }
            if let Some(Tok::Number(a)) = at(unit - 4) {
                return Some((a, n));
            }
        }
        return None;
    }

    let Some(Tok::Number(b)) = unit.checked_sub(1).and_then(at) else {
        return None;
    };
    if unit >= 3 && at(unit - 2) == Some(Tok::Dash) {
        if let Some(Tok::Number(a)) = at(unit - 3) {
            return Some((a, b));
        }
    }
    Some((b, b))
}

fn numbers_after(tokens: &[Tok], unit: usize) -> Option<(f64, f64)> {
    let Some(Tok::Number(a)) = tokens.get(unit + 1).copied() else {
        return None;
    };
    if tokens.get(unit + 2) == Some(&Tok::Dash) {
        if let Some(Tok::Number(b)) = tokens.get(unit + 3).copied() {
            return Some((a, b));
        }
    }
    Some((a, a))
}

fn tokenize_duration(text: &str) -> Vec<Tok> {
    let lower = text.to_lowercase();
    let chars: Vec<char> = lower.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let raw: String = chars[start..i].iter().collect();
            let raw = raw.trim_end_matches('.');
            tokens.push(raw.parse().map(Tok::Number).unwrap_or(Tok::Other));
        } else if c.is_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_alphabetic() {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            tokens.push(match word.as_str() {
                "to" | "through" => Tok::Dash,
                w => unit_days(w).map(Tok::Unit).unwrap_or(Tok::Other),
            });
        } else if matches!(c, '-' | '\u{2013}' | '\u{2014}') {
            tokens.push(Tok::Dash);
            i += 1;
        } else {
            i += 1;
        }
    }
    tokens
}

fn unit_days(word: &str) -> Option<f64> {
    match word {
        "day" | "days" => Some(1.0),
        "week" | "weeks" | "wk" | "wks" => Some(7.0),
        "month" | "months" | "mo" | "mos" => Some(30.0),
        "quarter" | "quarters" => Some(90.0),
        "year" | "years" | "yr" | "yrs" => Some(365.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_currency_with_separators() {
        let tokens = scan_numbers("Budget of $15,000 per month");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].value, 15_000.0);
        assert!(tokens[0].currency);
        assert_eq!(&"Budget of $15,000 per month"[tokens[0].span.clone()], "$15,000");
    }

    #[test]
    fn scans_magnitude_suffix() {
        let tokens = scan_numbers("about $12.5k/mo");
        assert_eq!(tokens[0].value, 12_500.0);
        assert_eq!(tokens[0].suffix, Some('k'));
        assert_eq!(tokens[0].decimals, 1);
    }

    #[test]
    fn suffix_requires_word_boundary() {
        let tokens = scan_numbers("5 months and 3mph");
        assert_eq!(tokens[0].suffix, None);
        assert_eq!(tokens[1].value, 3.0);
        assert_eq!(tokens[1].suffix, None);
    }

    #[test]
    fn ignores_digits_glued_to_letters() {
        let tokens = scan_numbers("Q3 target of $750");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].value, 750.0);
    }

    #[test]
    fn trailing_period_is_not_a_decimal() {
        let tokens = scan_numbers("CAC is $750.");
        assert_eq!(tokens[0].value, 750.0);
        assert_eq!(tokens[0].decimals, 0);
    }

    #[test]
    fn comma_list_is_not_a_thousands_separator() {
        let values: Vec<f64> = scan_numbers("1,2,3").iter().map(|t| t.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn parse_amount_reads_first_number() {
        assert_eq!(parse_amount("$75 per lead"), Some(75.0));
        assert_eq!(parse_amount("3.5:1"), Some(3.5));
        assert_eq!(parse_amount("200 leads/month"), Some(200.0));
        assert_eq!(parse_amount("TBD"), None);
    }

    #[test]
    fn scans_ratios() {
        let text = "Target an LTV:CAC of 15.9:1 or better (industry 3:1).";
        let ratios = scan_ratios(text);
        assert_eq!(ratios.len(), 2);
        assert_eq!(&text[ratios[0].span.clone()], "15.9:1");
        assert_eq!(ratios[1].value, 3.0);
    }

    #[test]
    fn ratio_excludes_times() {
        assert!(scan_ratios("launch at 3:15").is_empty());
    }

    #[test]
    fn parses_length_ranges() {
        let d = parse_duration("Expect results in 60-90 days").unwrap();
        assert_eq!(d.range_days(), (60.0, 90.0));
        assert!(!d.positional);

        let d = parse_duration("3 to 6 months").unwrap();
        assert_eq!(d.range_days(), (90.0, 180.0));
    }

    #[test]
    fn parses_hyphenated_unit() {
        let d = parse_duration("a 90-day ramp").unwrap();
        assert_eq!(d.range_days(), (90.0, 90.0));
    }

    #[test]
    fn parses_positional_windows() {
        let d = parse_duration("Weeks 1-4").unwrap();
        assert!(d.positional);
        assert_eq!(d.length_days(), 28.0);

        let d = parse_duration("Month 2").unwrap();
        assert_eq!(d.length_days(), 30.0);
    }

    #[test]
    fn length_of_plain_duration() {
        assert_eq!(parse_duration("4 weeks").unwrap().length_days(), 28.0);
        assert_eq!(parse_duration("2-4 weeks").unwrap().length_days(), 21.0);
    }

    #[test]
    fn no_duration_in_plain_text() {
        assert!(parse_duration("as soon as possible").is_none());
        assert!(parse_duration("ongoing").is_none());
    }
}
