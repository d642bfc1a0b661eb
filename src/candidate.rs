//! Candidate records and batch normalization.
//!
//! Raw candidate rows arrive from the retrieval layer in heterogeneous
//! shape: vectors may be missing, empty, degenerate, or of the wrong
//! length, and rows carry an open-ended bag of metadata. The
//! [`CandidateSetBuilder`] turns such a collection into a uniform batch
//! ready for scoring, reporting every dropped entry instead of aborting.

pub mod builder;
pub mod record;

pub use self::builder::{
    CandidateSetBuilder, NormalizedBatch, RejectedCandidate, RejectionReason,
};
pub use self::record::{CandidateRecord, Metadata, RawCandidate};
