use ingestion_embedding::{Embedder, EmbeddingConfig, EmbeddingError, HashingEmbedder};

#[test]
fn embedding_is_deterministic_for_identical_text() {
    let config = EmbeddingConfig::new("encoder-a".into(), 16);
    let first = HashingEmbedder::new(config.clone()).expect("valid config");
    let second = HashingEmbedder::new(config.clone()).expect("valid config");
    let a = first.embed("staff engineer, payments").expect("embed");
    let b = second.embed("staff engineer, payments").expect("embed");
    assert_eq!(a, b);
    assert_eq!(first.encoder_id(), config.encoder_id);
}

#[test]
fn batch_preserves_order_and_dimensions() {
    let embedder = HashingEmbedder::new(EmbeddingConfig::new("encoder-b".into(), 8)).unwrap();
    let batch = embedder
        .embed_batch(&["first", "second", "third"])
        .expect("batch embed");
    assert_eq!(batch.len(), 3);
    assert!(batch.iter().all(|vector| vector.len() == 8));
    assert_eq!(batch[1], embedder.embed("second").unwrap());
}

struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn encoder_id(&self) -> &str {
        "offline"
    }

    fn dimensions(&self) -> usize {
        4
    }

    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Provider("model unavailable".into()))
    }
}

#[test]
fn batch_surfaces_provider_failures() {
    let err = FailingEmbedder.embed_batch(&["a", "b"]).unwrap_err();
    assert_eq!(err.to_string(), "embedding provider failure: model unavailable");
}
