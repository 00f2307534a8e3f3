//! Identifier space and XOR distance metric

use primitive_types::U256;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ProtocolError;

/// Size of an identifier in bytes (32 bytes / 256 bits)
pub const ID_SIZE: usize = 32;

/// Width of the identifier space in bits
pub const ID_BITS: usize = ID_SIZE * 8;

/// A fixed-width identifier for nodes and samples in the overlay
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Identifier([u8; ID_SIZE]);

impl Identifier {
    /// The all-zero identifier
    pub const ZERO: Identifier = Identifier([0u8; ID_SIZE]);

    /// Create an Identifier from a big-endian byte array
    pub fn from_bytes(bytes: [u8; ID_SIZE]) -> Self {
        Identifier(bytes)
    }

    /// Get the big-endian bytes of this Identifier
    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }

    /// Draw an identifier uniformly from the whole space
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Identifier(rng.gen())
    }

    /// Interpret the identifier as an unsigned integer
    pub fn to_u256(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }

    /// Build an identifier from an unsigned integer
    pub fn from_u256(value: U256) -> Self {
        let mut bytes = [0u8; ID_SIZE];
        value.to_big_endian(&mut bytes);
        Identifier(bytes)
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> crate::error::Result<Self> {
        let bytes =
            hex::decode(s).map_err(|e| ProtocolError::InvalidIdentifier(e.to_string()))?;

        if bytes.len() != ID_SIZE {
            return Err(ProtocolError::InvalidIdentifier(format!(
                "expected {} bytes, got {}",
                ID_SIZE,
                bytes.len()
            )));
        }

        let mut arr = [0u8; ID_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Identifier(arr))
    }

    /// XOR distance between two identifiers (Kademlia metric)
    pub fn distance(&self, other: &Identifier) -> Distance {
        let mut result = [0u8; ID_SIZE];
        for (i, item) in result.iter_mut().enumerate() {
            *item = self.0[i] ^ other.0[i];
        }
        Distance(result)
    }

    /// Check whether `other` lies within `radius` of this identifier
    pub fn within_radius(&self, other: &Identifier, radius: &Distance) -> bool {
        self.distance(other) <= *radius
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.to_hex())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Unsigned magnitude of an XOR distance.
///
/// Bytes are big-endian, so the derived ordering is the numeric ordering.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct Distance([u8; ID_SIZE]);

impl Distance {
    /// Distance of an identifier to itself
    pub const ZERO: Distance = Distance([0u8; ID_SIZE]);

    /// Largest representable distance (covers the whole space)
    pub const MAX: Distance = Distance([0xFF; ID_SIZE]);

    pub fn from_bytes(bytes: [u8; ID_SIZE]) -> Self {
        Distance(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Distance::ZERO
    }

    pub fn to_u256(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }

    pub fn from_u256(value: U256) -> Self {
        let mut bytes = [0u8; ID_SIZE];
        value.to_big_endian(&mut bytes);
        Distance(bytes)
    }

    /// Position of the most significant set bit plus one (0 for a zero distance)
    pub fn bit_length(&self) -> usize {
        for (byte_idx, &byte) in self.0.iter().enumerate() {
            if byte != 0 {
                return (ID_SIZE - byte_idx) * 8 - byte.leading_zeros() as usize;
            }
        }
        0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Distance({})", self.to_hex())
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "2^{}", self.bit_length())
    }
}

/// Free-function form of [`Identifier::distance`]
pub fn distance(a: &Identifier, b: &Identifier) -> Distance {
    a.distance(b)
}

/// `distance(a, b) <= radius`
pub fn within_radius(a: &Identifier, b: &Identifier, radius: &Distance) -> bool {
    a.within_radius(b, radius)
}
