//! Luhn (mod 10) checksum used by credit card numbers.

/// True when `value` is all ASCII digits and passes the Luhn checksum.
///
/// An all-zero number has a zero sum and is rejected.
pub fn is_valid(value: &str) -> bool {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = value
        .bytes()
        .rev()
        .enumerate()
        .map(|(position, byte)| {
            let digit = u32::from(byte - b'0');
            if position % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                digit
            }
        })
        .sum();
    sum > 0 && sum % 10 == 0
}
