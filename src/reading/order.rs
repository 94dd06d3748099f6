//! Newest-first ordering over chapters with mixed numbering

use std::cmp::Ordering;

use crate::models::Chapter;

/// Compare two chapters, newest first.
///
/// Volumes decide only when both sides have one and they differ. After
/// that, a numeric chapter number outranks a missing one on either side,
/// and two numeric chapter numbers compare descending. `Less` means `a`
/// sorts before `b`.
pub fn compare_newest_first(a: &Chapter, b: &Chapter) -> Ordering {
    if let (Some(volume_a), Some(volume_b)) = (a.volume_value(), b.volume_value()) {
        match volume_b.partial_cmp(&volume_a) {
            Some(Ordering::Equal) | None => {}
            Some(ordering) => return ordering,
        }
    }

    match (a.chapter_value(), b.chapter_value()) {
        (Some(chapter_a), Some(chapter_b)) => {
            chapter_b.partial_cmp(&chapter_a).unwrap_or(Ordering::Equal)
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort chapters newest first, in place.
///
/// The volume rule only applies when both sides carry a volume, so the
/// relation is not transitive once a feed mixes chapters with and without
/// volumes. `slice::sort_by` may panic on such input; this stable
/// insertion pass only ever compares neighbours, leaves ties in input
/// order, and leaves an already sorted slice untouched. Feeds usually
/// arrive close to ordered, which keeps it near linear.
pub fn sort_newest_first(chapters: &mut [Chapter]) {
    for i in 1..chapters.len() {
        let mut j = i;
        while j > 0 && compare_newest_first(&chapters[j], &chapters[j - 1]) == Ordering::Less {
            chapters.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// Sorted copy of a chapter list
pub fn sorted_newest_first(chapters: &[Chapter]) -> Vec<Chapter> {
    let mut sorted = chapters.to_vec();
    sort_newest_first(&mut sorted);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chapter(id: &str, volume: Option<&str>, number: Option<&str>) -> Chapter {
        Chapter {
            id: id.to_string(),
            title: None,
            chapter_number: number.map(String::from),
            volume_number: volume.map(String::from),
            created_at: 0,
        }
    }

    fn ids(chapters: &[Chapter]) -> Vec<&str> {
        chapters.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_greater_volume_wins_over_chapter_number() {
        let v2 = chapter("v2c1", Some("2"), Some("1"));
        let v1 = chapter("v1c99", Some("1"), Some("99"));
        assert_eq!(compare_newest_first(&v2, &v1), Ordering::Less);
        assert_eq!(compare_newest_first(&v1, &v2), Ordering::Greater);
    }

    #[test]
    fn test_volume_tie_falls_through_to_chapter() {
        let a = chapter("a", Some("3"), Some("20"));
        let b = chapter("b", Some("3"), Some("21"));
        assert_eq!(compare_newest_first(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_missing_volume_compares_chapters() {
        let with_volume = chapter("a", Some("5"), Some("10"));
        let without = chapter("b", None, Some("11"));
        assert_eq!(compare_newest_first(&without, &with_volume), Ordering::Less);
    }

    #[test]
    fn test_numeric_chapter_outranks_missing_on_either_side() {
        let numbered = chapter("n", None, Some("1"));
        let extra = chapter("x", None, Some("Extra"));
        let missing = chapter("m", None, None);
        assert_eq!(compare_newest_first(&numbered, &extra), Ordering::Less);
        assert_eq!(compare_newest_first(&extra, &numbered), Ordering::Greater);
        assert_eq!(compare_newest_first(&missing, &numbered), Ordering::Greater);
        assert_eq!(compare_newest_first(&extra, &missing), Ordering::Equal);
    }

    #[test]
    fn test_chapter_zero_is_numbered() {
        let mut chapters = vec![
            chapter("oneshot", None, None),
            chapter("prologue", None, Some("0")),
            chapter("c1", None, Some("1")),
        ];
        sort_newest_first(&mut chapters);
        assert_eq!(ids(&chapters), vec!["c1", "prologue", "oneshot"]);
    }

    #[test]
    fn test_sort_orders_and_keeps_ties_stable() {
        let mut chapters = vec![
            chapter("oneshot", None, None),
            chapter("c1", Some("1"), Some("1")),
            chapter("c3", Some("1"), Some("3")),
            chapter("extra", None, Some("Extra")),
            chapter("c2.5", Some("1"), Some("2.5")),
            chapter("c4", Some("2"), Some("4")),
        ];
        sort_newest_first(&mut chapters);
        assert_eq!(
            ids(&chapters),
            vec!["c4", "c3", "c2.5", "c1", "oneshot", "extra"]
        );
    }

    #[test]
    fn test_sort_handles_non_transitive_input() {
        // v2c1 > v1c5 by volume, v1c5 > c3 by chapter, c3 > v2c1 by chapter
        let mut chapters = vec![
            chapter("v1c5", Some("1"), Some("5")),
            chapter("c3", None, Some("3")),
            chapter("v2c1", Some("2"), Some("1")),
        ];
        sort_newest_first(&mut chapters);
        let once = chapters.clone();
        sort_newest_first(&mut chapters);
        assert_eq!(chapters, once);
        assert_eq!(chapters.len(), 3);
    }

    #[test]
    fn test_sorted_copy_leaves_input_alone() {
        let chapters = vec![chapter("c1", None, Some("1")), chapter("c2", None, Some("2"))];
        let sorted = sorted_newest_first(&chapters);
        assert_eq!(ids(&sorted), vec!["c2", "c1"]);
        assert_eq!(ids(&chapters), vec!["c1", "c2"]);
    }

    fn number_strategy() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some("Extra".to_string())),
            Just(Some("NaN".to_string())),
            (0u32..60).prop_map(|n| Some(n.to_string())),
            (0u32..60).prop_map(|n| Some(format!("{}.5", n))),
        ]
    }

    fn chapter_strategy() -> impl Strategy<Value = Chapter> {
        (number_strategy(), number_strategy(), 0i64..1000).prop_map(|(volume, number, at)| {
            Chapter {
                id: format!("{:?}-{:?}-{}", volume, number, at),
                title: None,
                chapter_number: number,
                volume_number: volume,
                created_at: at,
            }
        })
    }

    proptest! {
        #[test]
        fn prop_greater_volume_sorts_first(
            v1 in 1u32..50,
            dv in 1u32..50,
            c1 in number_strategy(),
            c2 in number_strategy(),
        ) {
            let newer = chapter("newer", Some((v1 + dv).to_string().as_str()), c1.as_deref());
            let older = chapter("older", Some(v1.to_string().as_str()), c2.as_deref());
            prop_assert_eq!(compare_newest_first(&newer, &older), Ordering::Less);

            let mut pair = vec![older.clone(), newer.clone()];
            sort_newest_first(&mut pair);
            prop_assert_eq!(pair[0].id.as_str(), "newer");
        }

        #[test]
        fn prop_numeric_chapter_sorts_before_non_numeric(
            number in 0u32..500,
            volume in prop_oneof![Just(None), Just(Some("4".to_string()))],
            junk in prop_oneof![Just(None), Just(Some("Extra".to_string())), Just(Some("NaN".to_string()))],
        ) {
            let numbered = chapter("numbered", volume.as_deref(), Some(number.to_string().as_str()));
            let unnumbered = chapter("unnumbered", volume.as_deref(), junk.as_deref());
            let mut pair = vec![unnumbered, numbered];
            sort_newest_first(&mut pair);
            prop_assert_eq!(pair[0].id.as_str(), "numbered");
        }

        #[test]
        fn prop_sort_is_idempotent(chapters in prop::collection::vec(chapter_strategy(), 0..40)) {
            let once = sorted_newest_first(&chapters);
            let twice = sorted_newest_first(&once);
            prop_assert_eq!(once.len(), chapters.len());
            prop_assert_eq!(twice, once);
        }
    }
}
