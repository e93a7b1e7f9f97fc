//! Query model, normalization, and validation
//!
//! Raw query descriptions come in three shapes (plain structure, ORM
//! criteria, already-normalized descriptor); this module canonicalizes them
//! into [`QueryDescriptor`]s and validates the resulting batch before
//! anything goes over the wire.

pub mod descriptor;
pub mod errors;
pub mod names;
pub mod normalize;
pub mod sort;
pub mod validate;

pub use descriptor::{Batch, Modifier, Projection, QueryDescriptor, RawQuery, ResultTypeRef};
pub use errors::{QueryError, QueryResult};
pub use normalize::Normalizer;
pub use validate::BatchValidator;
