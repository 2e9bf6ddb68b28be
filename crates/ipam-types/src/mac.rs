//! MAC address type and normalized textual comparison.

use std::fmt;

/// Characters accepted as octet separators in textual MAC addresses.
const SEPARATORS: [char; 3] = [':', '-', '.'];

/// A 48-bit Ethernet MAC address.
///
/// # Examples
///
/// ```
/// use ipam_types::MacAddress;
///
/// let mac = MacAddress::new([0x00, 0x0d, 0x3a, 0x6e, 0x18, 0x25]);
/// assert_eq!(mac.to_string(), "00:0d:3a:6e:18:25");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Creates a new MAC address from raw bytes.
    pub const fn new(bytes: [u8; 6]) -> Self {
        MacAddress(bytes)
    }

    /// Returns true if this is the zero address.
    pub const fn is_zero(&self) -> bool {
        self.0[0] == 0
            && self.0[1] == 0
            && self.0[2] == 0
            && self.0[3] == 0
            && self.0[4] == 0
            && self.0[5] == 0
    }

    /// Normalizes a textual hardware address for comparison.
    ///
    /// Lower-cases the input and strips `:`, `-` and `.` separators. The input
    /// is not validated: `"000D3A6E1825"` and `"00:0d:3a:6e:18:25"` normalize
    /// to the same value, while a malformed string normalizes to something
    /// that no real hardware address will ever equal.
    ///
    /// ```
    /// use ipam_types::MacAddress;
    ///
    /// assert_eq!(MacAddress::normalize("00-0D-3A-6E-18-25"), "000d3a6e1825");
    /// assert_eq!(MacAddress::normalize("invalid"), "invalid");
    /// ```
    pub fn normalize(s: &str) -> String {
        s.chars()
            .filter(|c| !SEPARATORS.contains(c))
            .map(|c| c.to_ascii_lowercase())
            .collect()
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}
