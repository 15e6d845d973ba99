//! Link-layer addresses as captured by the MAC layer.

/// An IEEE 802.15.4 link-layer address.
///
/// The MAC layer stores the addresses it decodes in printing order (most
/// significant byte first), reversed from the little-endian wire order. The
/// IPHC layer reads them back unchanged to reconstruct elided IPv6
/// interface identifiers.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Address {
    /// No address was captured.
    #[default]
    Absent,
    /// A 16-bit short address.
    Short([u8; 2]),
    /// A 64-bit extended address.
    Extended([u8; 8]),
}

impl Address {
    /// The broadcast address.
    pub const BROADCAST: Address = Address::Short([0xff; 2]);

    /// Query whether this address is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Build an address from wire bytes, reversing them into printing order.
    ///
    /// Slices that are not 2 or 8 bytes long yield [`Address::Absent`].
    pub fn from_wire(wire: &[u8]) -> Self {
        match wire.len() {
            2 => {
                let mut b = [0u8; 2];
                b.copy_from_slice(wire);
                b.reverse();
                Address::Short(b)
            }
            8 => {
                let mut b = [0u8; 8];
                b.copy_from_slice(wire);
                b.reverse();
                Address::Extended(b)
            }
            _ => Address::Absent,
        }
    }

    /// Return the address bytes, most significant byte first.
    pub const fn as_bytes(&self) -> &[u8] {
        match self {
            Address::Absent => &[],
            Address::Short(value) => value,
            Address::Extended(value) => value,
        }
    }

    /// Return the length of the address in octets.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        match self {
            Address::Absent => 0,
            Address::Short(_) => 2,
            Address::Extended(_) => 8,
        }
    }
}

impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Address::Absent => write!(f, "-"),
            Address::Short(value) => write!(f, "0x{:02x}{:02x}", value[0], value[1]),
            Address::Extended(value) => write!(
                f,
                "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
                value[0], value[1], value[2], value[3], value[4], value[5], value[6], value[7]
            ),
        }
    }
}
