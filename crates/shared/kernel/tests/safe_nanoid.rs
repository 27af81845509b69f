use depot_kernel::SAFE_ALPHABET;
use depot_kernel::safe_nanoid;
use std::collections::HashSet;

#[test]
fn suffixes_use_only_unambiguous_characters() {
    let id = safe_nanoid!(6);
    assert_eq!(id.len(), 6);
    assert!(id.chars().all(|ch| SAFE_ALPHABET.contains(&ch)), "unexpected character in {id}");
}

#[test]
fn default_length_ids_do_not_repeat() {
    let ids: HashSet<String> = (0..1_000).map(|_| safe_nanoid!()).collect();
    assert_eq!(ids.len(), 1_000);
    assert!(ids.iter().all(|id| id.len() == 12));
}
