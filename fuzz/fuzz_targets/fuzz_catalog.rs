#![no_main]

//! Level table loader fuzzer.
//!
//! Feeds arbitrary bytes to the loader. Whatever loads must satisfy the
//! data model the rest of the game relies on.

use lemmings::Catalog;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(catalog) = Catalog::from_json(text) else {
        return;
    };

    for level in &catalog {
        assert!(level.required_to_save() > 0);
        assert!(level.required_to_save() <= level.lemmings_to_release());
        assert!(level.map().in_bounds(level.entry_point()));
        assert!(level.map().in_bounds(level.exit_point()));
        assert!(!level.map().get(level.entry_point()).is_some_and(|t| t.is_solid()));
    }
    for warning in catalog.warnings() {
        assert!(warning.index() < catalog.len());
    }
});
