//! Conversion of MAC addresses to the dotted notation used by IOS devices.
//!
//! ```
//! use l2trace::mac::normalize;
//!
//! assert_eq!(normalize("AA:BB:CC:DD:EE:FF"), "aabb.ccdd.eeff");
//! assert_eq!(normalize("aa-bb-cc-dd-ee-ff"), "aabb.ccdd.eeff");
//! ```

fn is_separator(c: char) -> bool {
    c == '-' || c == ':' || c == '.' || c.is_whitespace()
}

/// Rewrite a MAC address in any notation as `xxxx.xxxx.xxxx`.
///
/// Separators are removed and a period is inserted every 4 characters.
/// The input is not validated: an address that is not a multiple of 4
/// characters long yields a short trailing group. Use [`is_valid`] first.
pub fn normalize(raw: &str) -> String {
    let digits: Vec<char> = raw
        .chars()
        .filter(|c| !is_separator(*c))
        .map(|c| c.to_ascii_lowercase())
        .collect();
    digits
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<String>>()
        .join(".")
}

/// Return true if the address contains exactly 12 hex digits once separators are removed.
pub fn is_valid(raw: &str) -> bool {
    let digits: Vec<char> = raw.chars().filter(|c| !is_separator(*c)).collect();
    digits.len() == 12 && digits.iter().all(|c| c.is_ascii_hexdigit())
}
