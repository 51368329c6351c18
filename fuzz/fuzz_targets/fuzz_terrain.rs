#![no_main]

//! Terrain map parser fuzzer.

use arbitrary::Arbitrary;
use lemmings::TerrainMap;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzMap {
    rows: Vec<String>,
}

fuzz_target!(|input: FuzzMap| {
    if let Ok(map) = TerrainMap::parse(&input.rows) {
        assert_eq!(usize::from(map.height()), input.rows.len());
        assert_eq!(map.to_rows(), input.rows);
        assert_eq!(
            map.cells().len(),
            usize::from(map.width()) * usize::from(map.height())
        );
    }
});
