//! A1-style cell references

use submission_core::error::{Result, SubmissionError};

/// Column letters for a zero-based column index: 0 is `A`, 26 is `AA`
#[must_use]
pub fn column_letter(column: u16) -> String {
    let mut n = u32::from(column) + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Parse a reference such as `B12` into zero-based `(row, column)`.
///
/// # Errors
///
/// Returns a parse error for anything that is not letters followed by a
/// positive row number.
pub fn parse_cell_ref(reference: &str) -> Result<(u32, u16)> {
    let invalid = || SubmissionError::parse(format!("'{reference}' is not a cell reference"));

    let reference = reference.trim().trim_start_matches('$');
    let split = reference
        .find(|c: char| !c.is_ascii_alphabetic())
        .ok_or_else(invalid)?;
    let (letters, digits) = reference.split_at(split);
    let digits = digits.trim_start_matches('$');
    if letters.is_empty() || digits.is_empty() {
        return Err(invalid());
    }

    let mut column: u32 = 0;
    for c in letters.chars() {
        let value = u32::from(c.to_ascii_uppercase()) - u32::from('A') + 1;
        column = column
            .checked_mul(26)
            .and_then(|n| n.checked_add(value))
            .ok_or_else(invalid)?;
    }
    let column = u16::try_from(column - 1).map_err(|_| invalid())?;

    let row: u32 = digits.parse().map_err(|_| invalid())?;
    if row == 0 {
        return Err(invalid());
    }
    Ok((row - 1, column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A2").unwrap(), (1, 0));
        assert_eq!(parse_cell_ref("aa10").unwrap(), (9, 26));
        assert_eq!(parse_cell_ref("$C$3").unwrap(), (2, 2));
        assert!(parse_cell_ref("A0").is_err());
        assert!(parse_cell_ref("12").is_err());
        assert!(parse_cell_ref("B").is_err());
        assert!(parse_cell_ref("B2C").is_err());
    }
}
