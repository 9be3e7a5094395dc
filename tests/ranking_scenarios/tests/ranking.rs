mod common;

use std::sync::Arc;

use common::{at, corpus, engine, profile, Lcg, TableEmbedder, QUERY};
use ranking_engine::{
    cosine_similarity, explain, rank_embedded, RankingConfig, FALLBACK_EXPLANATION,
};
use storage_corpus::{Profile, ProfileAttributes, ProfileCorpus, ProfileId};
use storage_feedback::{FeedbackEntry, MemoryFeedbackLog};

fn names(results: &[ranking_engine::RankedResult]) -> Vec<&str> {
    results.iter().map(|result| result.profile.name()).collect()
}

fn feedback(similarity: f32, selected: &[Profile]) -> FeedbackEntry {
    FeedbackEntry::new("earlier query", at(similarity), selected)
}

#[test]
fn three_profile_scenario_falls_back_to_all_in_similarity_order() {
    let corpus = corpus(&[0.9, 0.5, 0.2]);
    let report = rank_embedded(&corpus, "q", &QUERY, &[], 5, 0.4, &RankingConfig::default());

    assert!((report.threshold - 0.54).abs() < 1e-5);
    assert!(report.fallback_used);
    assert_eq!(names(&report.results), ["P0", "P1", "P2"]);
    assert!(report.results.iter().all(|result| result.boost == 0));
    let similarities: Vec<f32> = report.results.iter().map(|result| result.similarity).collect();
    for (actual, expected) in similarities.iter().zip([0.9, 0.5, 0.2]) {
        assert!((actual - expected).abs() < 1e-5);
    }
}

#[test]
fn empty_corpus_returns_empty_list() {
    let engine = engine(
        ProfileCorpus::empty(common::ENCODER, 2),
        TableEmbedder::new(vec![]),
        Arc::new(MemoryFeedbackLog::new()),
        RankingConfig::default(),
    );
    assert!(engine.search("anything at all").unwrap().is_empty());
}

#[test]
fn threshold_count_and_fallback_hold_across_random_corpora() {
    let config = RankingConfig::default();
    let mut rng = Lcg::new(7);
    for size in 1..=12 {
        for top_n in 1..=6 {
            let similarities: Vec<f32> = (0..size).map(|_| rng.next_similarity()).collect();
            let corpus = corpus(&similarities);
            let base = 0.4;
            let report = rank_embedded(&corpus, "q", &QUERY, &[], top_n, base, &config);

            let best = corpus
                .entries()
                .iter()
                .map(|entry| cosine_similarity(&QUERY, &entry.embedding))
                .fold(f32::NEG_INFINITY, f32::max);
            let expected_threshold = base.max(0.6 * best);
            assert!((report.threshold - expected_threshold).abs() < 1e-6);

            let passing = corpus
                .entries()
                .iter()
                .filter(|entry| cosine_similarity(&QUERY, &entry.embedding) >= report.threshold)
                .count();
            let count = report.results.len();
            assert!(count <= top_n.max(passing), "{similarities:?}");
            assert!(count <= size);

            if passing < top_n {
                assert!(report.fallback_used);
                assert_eq!(count, top_n.min(size));
            } else {
                assert!(!report.fallback_used);
                assert_eq!(count, passing);
                assert!(report
                    .results
                    .iter()
                    .all(|result| result.similarity >= report.threshold));
            }

            for pair in report.results.windows(2) {
                assert!(pair[0].similarity >= pair[1].similarity);
            }
        }
    }
}

#[test]
fn feedback_above_cutoff_boosts_every_selected_candidate() {
    let corpus = corpus(&[0.9, 0.5, 0.2]);
    let p1 = corpus.entries()[1].profile.clone();
    let p2 = corpus.entries()[2].profile.clone();
    let history = vec![feedback(0.95, &[p1, p2])];

    let report = rank_embedded(&corpus, "q", &QUERY, &history, 5, 0.4, &RankingConfig::default());
    assert_eq!(report.matched_feedback, 1);
    assert_eq!(names(&report.results), ["P1", "P2", "P0"]);
    assert_eq!(report.results[0].boost, 1);
    assert_eq!(report.results[1].boost, 1);
    assert_eq!(report.results[2].boost, 0);
}

#[test]
fn feedback_at_or_below_cutoff_contributes_nothing() {
    let corpus = corpus(&[0.9, 0.5, 0.2]);
    let p2 = corpus.entries()[2].profile.clone();
    let entry = feedback(0.8, &[p2]);

    let report = rank_embedded(
        &corpus,
        "q",
        &QUERY,
        &[entry.clone()],
        5,
        0.4,
        &RankingConfig::default(),
    );
    assert_eq!(report.matched_feedback, 0);
    assert!(report.results.iter().all(|result| result.boost == 0));

    // exactly at the cutoff is still excluded
    let config = RankingConfig {
        feedback_similarity_cutoff: cosine_similarity(&QUERY, &entry.query_embedding),
        ..RankingConfig::default()
    };
    let report = rank_embedded(&corpus, "q", &QUERY, &[entry], 5, 0.4, &config);
    assert_eq!(report.matched_feedback, 0);
    assert_eq!(names(&report.results), ["P0", "P1", "P2"]);
}

#[test]
fn higher_boost_outranks_higher_similarity() {
    let corpus = corpus(&[0.95, 0.9, 0.88, 0.86, 0.85, 0.84]);
    let entries = corpus.entries();
    let low = entries[5].profile.clone();
    let mid = entries[4].profile.clone();
    let history = vec![
        feedback(0.99, &[low.clone()]),
        feedback(0.97, &[low, mid.clone()]),
        feedback(0.5, &[mid]),
    ];

    let report = rank_embedded(&corpus, "q", &QUERY, &history, 5, 0.4, &RankingConfig::default());
    assert!(!report.fallback_used);
    assert_eq!(report.matched_feedback, 2);
    let ranked: Vec<(&str, u32)> = report
        .results
        .iter()
        .map(|result| (result.profile.name(), result.boost))
        .collect();
    assert_eq!(
        ranked,
        [("P5", 2), ("P4", 1), ("P0", 0), ("P1", 0), ("P2", 0), ("P3", 0)]
    );
}

#[test]
fn boosts_only_reorder_survivors() {
    let corpus = corpus(&[0.9, 0.85, 0.8, 0.75, 0.7, 0.1]);
    let outsider = corpus.entries()[5].profile.clone();
    let history = vec![feedback(0.99, &[outsider])];

    let report = rank_embedded(&corpus, "q", &QUERY, &history, 5, 0.4, &RankingConfig::default());
    assert_eq!(report.results.len(), 5);
    assert!(!names(&report.results).contains(&"P5"));
}

#[test]
fn legacy_feedback_matches_by_name_only_when_enabled() {
    let corpus = corpus(&[0.9, 0.5]);
    let mut legacy = feedback(0.95, &[corpus.entries()[1].profile.clone()]);
    legacy.selected_profiles[0].profile_id = None;

    let enabled = rank_embedded(
        &corpus,
        "q",
        &QUERY,
        &[legacy.clone()],
        5,
        0.4,
        &RankingConfig::default(),
    );
    assert_eq!(names(&enabled.results), ["P1", "P0"]);

    let config = RankingConfig {
        legacy_name_matching: false,
        ..RankingConfig::default()
    };
    let disabled = rank_embedded(&corpus, "q", &QUERY, &[legacy], 5, 0.4, &config);
    assert_eq!(names(&disabled.results), ["P0", "P1"]);
}

#[test]
fn equal_names_do_not_share_feedback_when_ids_are_known() {
    let twin = |position: &str| {
        let attributes = ProfileAttributes::new()
            .with("name", "Sam")
            .with("position", position);
        Profile::new(ProfileId::from_attributes(&attributes), attributes)
    };
    let baker = twin("Baker");
    let pilot = twin("Pilot");
    let corpus = ProfileCorpus::new(
        common::ENCODER,
        2,
        vec![
            storage_corpus::CorpusEntry {
                profile: pilot.clone(),
                embedding: at(0.9),
            },
            storage_corpus::CorpusEntry {
                profile: baker.clone(),
                embedding: at(0.6),
            },
        ],
    )
    .unwrap();
    let history = vec![feedback(0.99, &[baker.clone()])];

    let report = rank_embedded(&corpus, "q", &QUERY, &history, 5, 0.4, &RankingConfig::default());
    assert_eq!(report.results[0].profile.id, baker.id);
    assert_eq!(report.results[0].boost, 1);
    assert_eq!(report.results[1].profile.id, pilot.id);
    assert_eq!(report.results[1].boost, 0);
}

#[test]
fn blank_profiles_get_the_fallback_explanation() {
    let blank = profile("Nobody");
    assert_eq!(
        explain(&Profile::new(blank.id.clone(), ProfileAttributes::new()), "q"),
        FALLBACK_EXPLANATION
    );
    assert_eq!(FALLBACK_EXPLANATION, "Relevant based on profile analysis");

    // whitespace is a value, not an absence
    let attributes = ProfileAttributes::new()
        .with("name", "Nobody")
        .with("position", "   ");
    let whitespace = Profile::new(ProfileId::from_attributes(&attributes), attributes);
    assert_eq!(explain(&whitespace, "q"), "Works as    ");
}
