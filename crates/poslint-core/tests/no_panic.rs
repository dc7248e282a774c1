//! Property tests: the pipeline is total and deterministic for any input.

use std::sync::OnceLock;

use proptest::prelude::*;

use poslint_core::prelude::*;

fn registry() -> &'static SchemaRegistry {
    static REG: OnceLock<SchemaRegistry> = OnceLock::new();
    REG.get_or_init(|| SchemaRegistry::from_config(&EngineConfig::default()).unwrap())
}

proptest! {
    #[test]
    fn any_string_classifies_without_panicking(url in ".*") {
        let rec = validate_link(&url, registry());
        // Every input lands on exactly one terminal status.
        let _ = rec.status.key();
    }

    #[test]
    fn classification_is_idempotent(url in ".*") {
        let a = validate_link(&url, registry());
        let b = validate_link(&url, registry());
        prop_assert_eq!(a.status, b.status);
        prop_assert_eq!(a.channel, b.channel);
        prop_assert_eq!(a.params.len(), b.params.len());
    }

    #[test]
    fn query_mutations_never_escape_the_status_set(suffix in "[a-z0-9=&%]{0,40}") {
        let url = format!("https://pos.gosuslugi.ru/form/?opaId=1&{suffix}");
        let rec = validate_link(&url, registry());
        prop_assert!(matches!(
            rec.status,
            LinkStatus::Valid
                | LinkStatus::NotMatch
                | LinkStatus::UtmInvalid
                | LinkStatus::Spacer
                | LinkStatus::Undefined
        ));
    }
}
