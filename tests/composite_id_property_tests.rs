// Copyright 2025 Cowboy AI, LLC.

//! Composite id codec properties: encode/parse round-trips and parser
//! totality over arbitrary input.

use proptest::prelude::*;

use commerce_compose::CompositeId;

proptest! {
    #[test]
    fn encode_then_parse_round_trips(
        index in 0usize..64,
        original in "[A-Za-z0-9_\\-]{1,24}",
    ) {
        let encoded = CompositeId::encode(index, &original);
        let decoded = CompositeId::parse(&encoded).expect("encoded ids always parse");
        prop_assert_eq!(decoded.index, index);
        prop_assert_eq!(decoded.original, original);
    }

    #[test]
    fn parse_never_panics(input in ".{0,64}") {
        // Anything that parses must re-encode to itself modulo leading
        // zeros in the index; anything else is a bare id.
        if let Some(id) = CompositeId::parse(&input) {
            let round = CompositeId::parse(&id.to_string()).unwrap();
            prop_assert_eq!(round, id);
        }
    }

    #[test]
    fn bare_ids_without_prefix_do_not_parse(original in "[A-Za-z][A-Za-z0-9\\-]{0,16}") {
        // Ids that do not start with 'p' can never be mistaken for
        // composite ids.
        prop_assume!(!original.starts_with('p'));
        prop_assert!(CompositeId::parse(&original).is_none());
    }
}
