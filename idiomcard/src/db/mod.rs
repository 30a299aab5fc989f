//! Persistence layer: the idiom record store and the blob store for uploaded images.
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries, blob storage)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - records and requests)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌──────────────────────┐
//! │ SQLite / upload dir  │
//! └──────────────────────┘
//! ```
//!
//! Idiom records live in SQLite and are accessed through the [`handlers::Idioms`] repository,
//! created from a pooled connection or a transaction:
//!
//! ```ignore
//! let mut conn = pool.acquire().await?;
//! let mut idioms = Idioms::new(&mut conn);
//! let card = idioms.first_by_idiom("學而時習之").await?;
//! ```
//!
//! Migrations live in `migrations/` and are embedded via [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;
