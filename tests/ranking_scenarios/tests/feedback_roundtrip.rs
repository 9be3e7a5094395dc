mod common;

use std::sync::Arc;

use common::{at, corpus, engine, TableEmbedder, QUERY};
use ranking_engine::RankingConfig;
use storage_feedback::{FeedbackLog, JsonlFeedbackLog, SelectedProfile};

#[test]
fn appended_entry_is_last_on_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feedback.jsonl");
    let corpus = corpus(&[0.9, 0.5, 0.2]);
    let selected = vec![
        corpus.entries()[2].profile.clone(),
        corpus.entries()[0].profile.clone(),
    ];
    let engine = engine(
        corpus,
        TableEmbedder::new(vec![("first", at(0.3)), ("second", QUERY.to_vec())]),
        Arc::new(JsonlFeedbackLog::new(&path)),
        RankingConfig::default(),
    );

    engine.submit_feedback("first", &selected[..1]).unwrap();
    let entry = engine.submit_feedback("second", &selected).unwrap();

    let reloaded = JsonlFeedbackLog::new(&path).load();
    assert_eq!(reloaded.len(), 2);
    let last = reloaded.last().unwrap();
    assert_eq!(last, &entry);
    assert_eq!(last.query, "second");
    let expected: Vec<SelectedProfile> = selected.iter().map(SelectedProfile::from).collect();
    assert_eq!(last.selected_profiles, expected);
}

#[test]
fn persisted_feedback_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("feedback.jsonl");
    let build = || {
        engine(
            corpus(&[0.9, 0.5, 0.2]),
            TableEmbedder::new(vec![("rust", QUERY.to_vec())]),
            Arc::new(JsonlFeedbackLog::new(&path)),
            RankingConfig::default(),
        )
    };

    let first = build();
    let results = first.search("rust").unwrap();
    let last = results.last().unwrap().profile.clone();
    first.submit_feedback("rust", &[last.clone()]).unwrap();
    drop(first);

    let restarted = build();
    let results = restarted.search("rust").unwrap();
    assert_eq!(results[0].profile.id, last.id);
    assert_eq!(results[0].boost, 1);
    assert_eq!(restarted.feedback_entries().len(), 1);
}

#[test]
fn legacy_document_keeps_boosting_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("user_feedback.json");
    let legacy = serde_json::json!({
        "feedback": [{
            "query": "rust",
            "query_embedding": QUERY,
            "selected_profiles": [{ "name": "P2", "position": "Engineer" }],
        }]
    });
    std::fs::write(&path, serde_json::to_vec_pretty(&legacy).unwrap()).unwrap();

    let engine = engine(
        corpus(&[0.9, 0.5, 0.2]),
        TableEmbedder::new(vec![("rust", QUERY.to_vec())]),
        Arc::new(JsonlFeedbackLog::new(&path)),
        RankingConfig::default(),
    );
    let results = engine.search("rust").unwrap();
    assert_eq!(results[0].profile.name(), "P2");
    assert_eq!(results[0].boost, 1);

    // the first append migrates the document; history is preserved
    let p0 = results[1].profile.clone();
    engine.submit_feedback("rust", &[p0]).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert_eq!(engine.feedback_entries().len(), 2);
}
