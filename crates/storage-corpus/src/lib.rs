//! Vector corpus store: profiles, their embeddings, and on-disk loading.

pub mod corpus;
pub mod error;
pub mod profile;
pub mod store;

pub use corpus::{CorpusEntry, ProfileCorpus};
pub use error::CorpusError;
pub use profile::{assign_ids, Profile, ProfileAttributes, ProfileId, NAME_KEY};
pub use store::{load_records, load_snapshot, save_snapshot};
