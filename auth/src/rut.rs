//! Chilean RUT (national identifier) checksum and formatting.
//!
//! A RUT is a numeric body followed by a modulo-11 check character
//! (`0`-`9` or `K`), usually written as `12.345.678-5`.

const WEIGHTS: [u32; 6] = [2, 3, 4, 5, 6, 7];

/// Strip separators (`.` and `-`) and uppercase the check character.
///
/// Any other character, including whitespace, is kept so that validation
/// rejects it.
pub fn clean(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '.' && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Compute the check character for a numeric body.
///
/// # Returns
/// `None` if the body is empty or contains anything but ASCII digits.
pub fn check_digit(body: &str) -> Option<char> {
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let sum: u32 = body
        .chars()
        .rev()
        .filter_map(|c| c.to_digit(10))
        .zip(WEIGHTS.iter().cycle())
        .map(|(digit, weight)| digit * weight)
        .sum();

    match 11 - sum % 11 {
        11 => Some('0'),
        10 => Some('K'),
        n => char::from_digit(n, 10),
    }
}

/// Validate a RUT in any common notation (`12.345.678-5`, `12345678-5`, `123456785`).
pub fn validate(raw: &str) -> bool {
    let cleaned = clean(raw);
    let mut chars = cleaned.chars();
    let Some(supplied) = chars.next_back() else {
        return false;
    };
    let body = chars.as_str();

    match check_digit(body) {
        Some(expected) => expected == supplied,
        None => false,
    }
}

/// Render a RUT as `XX.XXX.XXX-D`.
///
/// Inputs shorter than two characters once cleaned are returned unchanged.
/// Formatting an already formatted RUT yields the same string.
pub fn format(raw: &str) -> String {
    let cleaned = clean(raw);
    let chars: Vec<char> = cleaned.chars().collect();
    if chars.len() < 2 {
        return raw.to_string();
    }

    let (body, check) = chars.split_at(chars.len() - 1);
    let mut grouped = String::with_capacity(body.len() + body.len() / 3 + 2);
    for (index, c) in body.iter().enumerate() {
        if index > 0 && (body.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }
    grouped.push('-');
    grouped.push(check[0]);
    grouped
}
