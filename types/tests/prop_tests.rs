use proptest::prelude::*;

use herald_types::{Signature, ValidatorAddress};

fn arb_signature() -> impl Strategy<Value = Signature> {
    prop::collection::vec(any::<u8>(), 64).prop_map(|v| {
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&v);
        Signature(arr)
    })
}

proptest! {
    /// ValidatorAddress roundtrip: new -> as_bytes -> from_slice is identity.
    #[test]
    fn address_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = ValidatorAddress::new(bytes);
        prop_assert_eq!(addr.as_bytes(), &bytes);
        prop_assert_eq!(ValidatorAddress::from_slice(&bytes), Some(addr));
    }

    /// The hex form is always 0x + 40 lowercase hex chars.
    #[test]
    fn address_hex_shape(bytes in prop::array::uniform20(0u8..)) {
        let hex = ValidatorAddress::new(bytes).to_hex();
        prop_assert!(hex.starts_with("0x"));
        prop_assert_eq!(hex.len(), 42);
        prop_assert!(hex[2..].bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }

    /// The hand-written Signature serde impls roundtrip under bincode.
    #[test]
    fn signature_bincode_roundtrip(sig in arb_signature()) {
        let encoded = bincode::serialize(&sig).unwrap();
        let decoded: Signature = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, sig);
    }
}
