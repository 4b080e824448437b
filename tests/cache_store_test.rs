//! Cache store persistence and key normalization

use kodegen_tools_batchfetch::{CounterSnapshot, SuccessArtifact, normalize_key};
use proptest::prelude::*;

mod common;

#[test]
fn test_save_then_get_round_trips() {
    let (_dir, cache) = common::temp_cache("181_200");
    let artifact = SuccessArtifact::new("https://example.com/a", "<pre>{}</pre>");

    assert!(!cache.exists("Main St"));
    cache.save("Main St", &artifact);

    assert!(cache.exists("Main St"));
    assert_eq!(cache.get("Main St"), Some(artifact));
    assert!(cache.success_dir().join("Main St.json").is_file());
}

#[test]
fn test_second_save_replaces_first() {
    let (_dir, cache) = common::temp_cache("run");
    cache.save("k", &SuccessArtifact::new("https://a", "first"));
    cache.save("k", &SuccessArtifact::new("https://a", "second"));

    assert_eq!(cache.get("k").unwrap().content, "second");
    assert_eq!(cache.counters().successes(), 2);
}

#[test]
fn test_separators_collapse_to_one_artifact() {
    let (_dir, cache) = common::temp_cache("run");
    cache.save(" a/b:c ", &SuccessArtifact::new("https://a", "x"));

    assert!(cache.exists("abc"));
    assert!(cache.exists("a\\bc"));
    assert!(cache.success_dir().join("abc.json").is_file());
}

#[test]
fn test_empty_key_is_never_persisted() {
    let (_dir, cache) = common::temp_cache("run");
    cache.save("", &SuccessArtifact::new("https://a", "x"));
    cache.save(" / ", &SuccessArtifact::new("https://a", "x"));
    cache.save_error("", "blocked");

    assert_eq!(cache.counters().snapshot(), CounterSnapshot::default());
    assert_eq!(std::fs::read_dir(cache.success_dir()).unwrap().count(), 0);
    assert_eq!(std::fs::read_dir(cache.error_dir()).unwrap().count(), 0);
    assert!(!cache.exists(""));
}

#[test]
fn test_error_namespace_is_disjoint() {
    let (_dir, cache) = common::temp_cache("run");
    cache.save_error("k", "<html>captcha</html>");

    assert!(!cache.exists("k"));
    assert!(cache.error_exists("k"));
    assert_eq!(cache.get_error("k").as_deref(), Some("<html>captcha</html>"));
    assert_eq!(
        cache.counters().snapshot(),
        CounterSnapshot {
            successes: 0,
            errors: 1
        }
    );
}

#[test]
fn test_clones_share_counters() {
    let (_dir, cache) = common::temp_cache("run");
    let clone = cache.clone();
    clone.save("a", &SuccessArtifact::new("https://a", "x"));
    clone.save_error("b", "x");

    assert_eq!(cache.counters().successes(), 1);
    assert_eq!(cache.counters().errors(), 1);
}

proptest! {
    #[test]
    fn normalization_is_idempotent(raw in ".{0,40}") {
        let once = normalize_key(&raw);
        prop_assert_eq!(normalize_key(&once), once);
    }

    #[test]
    fn separator_free_keys_are_only_trimmed(raw in "[^/\\\\:]{0,40}") {
        prop_assert_eq!(normalize_key(&raw), raw.trim());
    }
}
