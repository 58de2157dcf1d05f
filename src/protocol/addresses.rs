//! Address-to-parameter mapping for the v2 face-tracking namespace.
//!
//! Every tracked channel has exactly one canonical OSC address. The table is
//! consulted once per inbound message, so lookup goes through a hash map
//! rather than a scan of the variant list.

use std::collections::HashMap;

/// Root of the parameter address namespace shared with the sender ecosystem.
pub const ADDRESS_ROOT: &str = "/avatar/parameters/v2/";

/// Addresses under this prefix refresh the eye-channel freshness stamp.
///
/// Brow channels deliberately live outside this prefix even though their
/// values feed the derived eye output.
pub const EYE_PREFIX: &str = "/avatar/parameters/v2/Eye";

/// Addresses under this prefix refresh the face-channel freshness stamp.
pub const FACE_PREFIX: &str = "/avatar/parameters/v2/Mouth";

macro_rules! count_params {
    () => { 0 };
    ($head:ident $(, $tail:ident)*) => { 1 + count_params!($($tail),*) };
}

macro_rules! parameters {
    ($($name:ident),+ $(,)?) => {
        /// Tracked facial and eye channels, one per canonical address.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[allow(missing_docs)]
        #[repr(usize)]
        pub enum Parameter {
            $($name),+
        }

        /// Number of tracked channels.
        pub const PARAMETER_COUNT: usize = count_params!($($name),+);

        impl Parameter {
            /// Every parameter in declaration order.
            ///
            /// The order is stable across runs; peers cache the advertised
            /// address list, so reordering variants is a breaking change.
            pub const ALL: [Self; PARAMETER_COUNT] = [$(Self::$name),+];

            /// Canonical protocol address for this parameter.
            #[must_use]
            pub const fn address(self) -> &'static str {
                match self {
                    $(Self::$name => concat!("/avatar/parameters/v2/", stringify!($name))),+
                }
            }

            /// Dense index in `[0, PARAMETER_COUNT)`.
            #[must_use]
            pub const fn index(self) -> usize {
                self as usize
            }
        }
    };
}

parameters! {
    // Eye gaze and lids
    EyeLeftX,
    EyeLeftY,
    EyeRightX,
    EyeRightY,
    EyeOpenLeft,
    EyeOpenRight,
    EyeWideLeft,
    EyeWideRight,
    EyeSquintLeft,
    EyeSquintRight,
    // Brows
    BrowPinchLeft,
    BrowPinchRight,
    BrowLowererLeft,
    BrowLowererRight,
    BrowInnerUpLeft,
    BrowInnerUpRight,
    BrowOuterUpLeft,
    BrowOuterUpRight,
    // Jaw
    JawLeft,
    JawRight,
    JawForward,
    JawOpen,
    // Mouth
    MouthClosed,
    MouthSmileLeft,
    MouthSmileRight,
    MouthFrownLeft,
    MouthFrownRight,
    MouthDimpleLeft,
    MouthDimpleRight,
    MouthUpperUpLeft,
    MouthUpperUpRight,
    MouthLowerDownLeft,
    MouthLowerDownRight,
    MouthUpperX,
    MouthLowerX,
    MouthStretchLeft,
    MouthStretchRight,
    MouthTightenerLeft,
    MouthTightenerRight,
    MouthPressLeft,
    MouthPressRight,
    MouthRaiserUpper,
    MouthRaiserLower,
    // Lips
    LipPuckerUpperLeft,
    LipPuckerUpperRight,
    LipPuckerLowerLeft,
    LipPuckerLowerRight,
    LipFunnelUpperLeft,
    LipFunnelUpperRight,
    LipFunnelLowerLeft,
    LipFunnelLowerRight,
    LipSuckUpperLeft,
    LipSuckUpperRight,
    LipSuckLowerLeft,
    LipSuckLowerRight,
    // Cheeks
    CheekPuffSuckLeft,
    CheekPuffSuckRight,
    CheekSquintLeft,
    CheekSquintRight,
    // Nose
    NoseSneerLeft,
    NoseSneerRight,
    // Tongue
    TongueX,
    TongueY,
    TongueOut,
    TongueRoll,
}

/// Bidirectional address/parameter table with O(1) address resolution.
#[derive(Debug)]
pub struct AddressTable {
    by_address: HashMap<&'static str, Parameter>,
}

impl AddressTable {
    /// Build the table from the canonical parameter list.
    #[must_use]
    pub fn new() -> Self {
        let by_address = Parameter::ALL
            .iter()
            .map(|parameter| (parameter.address(), *parameter))
            .collect();
        Self { by_address }
    }

    /// Resolve an inbound address to its parameter, if known.
    #[must_use]
    pub fn index_of(&self, address: &str) -> Option<Parameter> {
        self.by_address.get(address).copied()
    }

    /// Canonical address for a parameter.
    #[must_use]
    pub fn address_of(&self, parameter: Parameter) -> &'static str {
        parameter.address()
    }

    /// All canonical addresses in declaration order.
    pub fn addresses(&self) -> impl Iterator<Item = &'static str> {
        Parameter::ALL.iter().map(|parameter| parameter.address())
    }
}

impl Default for AddressTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_address_resolves_back_to_its_parameter() {
        let table = AddressTable::new();
        for parameter in Parameter::ALL {
            let address = table.address_of(parameter);
            assert_eq!(table.index_of(address), Some(parameter), "{address}");
        }
    }

    #[test]
    fn unknown_address_is_not_found() {
        let table = AddressTable::new();
        assert_eq!(table.index_of("/avatar/parameters/v2/Nope"), None);
        assert_eq!(table.index_of(""), None);
    }

    #[test]
    fn mapping_is_injective() {
        let table = AddressTable::new();
        assert_eq!(table.by_address.len(), PARAMETER_COUNT);
    }

    #[test]
    fn address_order_is_declaration_order() {
        let table = AddressTable::new();
        let addresses: Vec<_> = table.addresses().collect();
        assert_eq!(addresses.len(), PARAMETER_COUNT);
        assert_eq!(addresses[0], "/avatar/parameters/v2/EyeLeftX");
        assert_eq!(
            addresses[PARAMETER_COUNT - 1],
            "/avatar/parameters/v2/TongueRoll"
        );
    }

    #[test]
    fn prefixes_gate_the_expected_channels() {
        assert!(Parameter::EyeLeftX.address().starts_with(EYE_PREFIX));
        assert!(Parameter::MouthSmileLeft.address().starts_with(FACE_PREFIX));
        // Brow and jaw channels update neither freshness stamp.
        assert!(!Parameter::BrowPinchLeft.address().starts_with(EYE_PREFIX));
        assert!(!Parameter::JawOpen.address().starts_with(FACE_PREFIX));
        assert!(Parameter::BrowPinchLeft.address().starts_with(ADDRESS_ROOT));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Round-trip stability: resolving an address, mapping it back to
            /// an address and resolving again is a fixed point.
            #[test]
            fn prop_roundtrip_is_stable(index in 0usize..PARAMETER_COUNT) {
                let table = AddressTable::new();
                let parameter = Parameter::ALL[index];
                let address = table.address_of(parameter);
                let resolved = table.index_of(address).unwrap();
                prop_assert_eq!(table.index_of(table.address_of(resolved)), Some(resolved));
                prop_assert_eq!(resolved.index(), index);
            }
        }
    }
}
