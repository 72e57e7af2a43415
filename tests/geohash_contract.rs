//! End-to-end behaviour of a freshly constructed registry.

use geohash_registry::*;

const NAME: &str = "Geohash";
const SYMBOL: &str = "GEO";
const GENESIS_ZERO: &str =
    "1937035142596246788172577232054709726386880441279550832067530347910661804397";

fn owner() -> Address {
    Address::repeat_byte(0x0E)
}

fn deploy() -> GeohashRegistry {
    GeohashRegistry::new(NAME, SYMBOL, owner())
}

#[test]
fn constructor_sets_name_and_symbol() {
    let registry = deploy();
    assert_eq!(registry.name(), NAME);
    assert_eq!(registry.symbol(), SYMBOL);
}

#[test]
fn total_supply_is_32_after_genesis() {
    assert_eq!(deploy().total_supply(), 32);
}

#[test]
fn token_by_index_is_keccak_of_path() {
    let registry = deploy();
    assert_eq!(
        registry.token_by_index(0).unwrap(),
        GENESIS_ZERO.parse::<TokenId>().unwrap()
    );
}

#[test]
fn token_by_uri_maps_text_to_id() {
    let registry = deploy();
    assert_eq!(
        registry.token_by_uri("0").unwrap(),
        GENESIS_ZERO.parse::<TokenId>().unwrap()
    );
    assert_eq!(registry.token_by_uri("0"), registry.token_by_index(0));
}

#[test]
fn token_by_uri_rejects_excluded_letters() {
    let registry = deploy();
    for uri in ["a", "i", "l", "o"] {
        let err = registry.token_by_uri(uri).unwrap_err();
        assert_eq!(err, RegistryError::NotFoundOrInvalid);
        assert_eq!(err.to_string(), "URI nonexistent token");
    }
}

#[test]
fn every_genesis_symbol_is_enumerated_and_resolvable() {
    let registry = deploy();
    for (i, symbol) in Symbol::ALL.iter().enumerate() {
        let path = GeohashPath::root().child(*symbol);
        let id = id_of(&path);
        assert_eq!(registry.token_by_index(i).unwrap(), id);
        assert_eq!(registry.token_by_uri(path.as_str()).unwrap(), id);
        assert_eq!(registry.owner_of(id), Some(owner()));
    }
}

#[test]
fn subdivision_keeps_index_and_uri_in_step() {
    let mut registry = deploy();
    let alice = Address::repeat_byte(0xA1);

    let sf = encode(37.7749, -122.4194, 5).unwrap();
    registry
        .mint_path(sf.as_str(), alice, &ParentOwner::new(owner()))
        .unwrap();

    assert_eq!(registry.total_supply(), 32 + 4);
    for i in 0..registry.total_supply() {
        let id = registry.token_by_index(i).unwrap();
        let uri = registry.token_uri(id).unwrap().clone();
        assert_eq!(registry.token_by_uri(uri.as_str()).unwrap(), id);
    }

    // Alice owns the new cells and may subdivide them further
    let leaf = registry.token_by_uri(sf.as_str()).unwrap();
    let child = registry
        .mint_child(leaf, Symbol::from_char('k').unwrap(), alice, &ParentOwner::new(alice))
        .unwrap();
    assert_eq!(registry.parent_of(child.id), Some(leaf));
    assert_eq!(registry.children_of(leaf), vec![child.id]);

    let outer = bounds(registry.token_uri(leaf).unwrap());
    let inner = bounds(&child.path);
    assert!(inner.min_lat >= outer.min_lat && inner.max_lat <= outer.max_lat);
    assert!(inner.min_lon >= outer.min_lon && inner.max_lon <= outer.max_lon);
}

#[test]
fn unminted_but_valid_path_is_not_found() {
    let registry = deploy();
    assert_eq!(
        registry.token_by_uri("9q8yy"),
        Err(RegistryError::NotFoundOrInvalid)
    );
    // Validation alone succeeds, so the unified error hides which case occurred
    assert!(validate("9q8yy").is_ok());
}

#[test]
fn lookups_do_not_mutate() {
    let registry = deploy();
    let before = registry.clone();
    for uri in ["0", "a", "", "9q", "zzzz", "Ω"] {
        let first = registry.token_by_uri(uri);
        assert_eq!(registry.token_by_uri(uri), first);
    }
    assert_eq!(registry, before);
}
