//! Arithmetic and formatting shared by the validators.

/// Two amounts closer than this are the same amount.
pub const EPSILON: f64 = 1e-6;

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Round to whole cents.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Replace NaN, infinities and negatives with `0.0`.
///
/// Returns the clamped value and whether clamping happened.
pub fn non_negative(x: f64) -> (f64, bool) {
    if x.is_finite() && x >= 0.0 {
        (x, false)
    } else {
        (0.0, true)
    }
}

/// Split `total` proportionally to `weights` in whole units.
///
/// Each share is floored; whatever remains (the integer rounding remainder
/// plus any fractional part of `total`) goes to the entry with the largest
/// weight, the first one on ties. Negative weights count as zero, and when
/// every weight is zero the split is even. The result always sums to
/// `total` (to the cent).
pub fn distribute(weights: &[f64], total: f64) -> Vec<f64> {
    if weights.is_empty() {
        return Vec::new();
    }

    let clean: Vec<f64> = weights.iter().map(|w| non_negative(*w).0).collect();
    let sum: f64 = clean.iter().sum();
    let clean = if sum > EPSILON {
        clean
    } else {
        vec![1.0; weights.len()]
    };
    let sum: f64 = clean.iter().sum();

    let mut shares: Vec<f64> = clean
        .iter()
        .map(|w| (w / sum * total + EPSILON).floor())
        .collect();

    let assigned: f64 = shares.iter().sum();
    let remainder = round2(total - assigned);
    let largest = largest_index(&clean);
    shares[largest] = round2(shares[largest] + remainder);
    shares
}

/// Index of the largest value, first on ties.
pub fn largest_index(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] + EPSILON {
            best = i;
        }
    }
    best
}

/// Format a dollar amount: `$15,000` for whole amounts, `$33.33` otherwise.
pub fn format_currency(amount: f64) -> String {
    let amount = round2(amount);
    let negative = amount < 0.0;
    let abs = amount.abs();
    let whole = abs.trunc() as u64;
    let cents = ((abs - abs.trunc()) * 100.0).round() as u64;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push('$');
    out.push_str(&group_thousands(whole));
    if cents > 0 {
        out.push_str(&format!(".{cents:02}"));
    }
    out
}

/// Format a whole count with thousands separators.
pub fn format_count(count: u64) -> String {
    group_thousands(count)
}

/// Format an LTV:CAC ratio as `X.X:1`.
pub fn format_ratio(ratio: f64) -> String {
    format!("{ratio:.1}:1")
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
