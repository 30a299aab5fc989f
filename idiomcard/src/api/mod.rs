//! HTTP layer: request/response models and axum handlers.
//!
//! - **[`handlers`]**: one handler per workflow stage, plus read-only card listing
//! - **[`models`]**: typed request DTOs and response bodies
//!
//! # Routes
//!
//! | Path | Method | Stage |
//! |---|---|---|
//! | `/` | GET / POST | upload form / accept upload |
//! | `/scan/{key}` | GET | scan image |
//! | `/select` | POST | select text |
//! | `/get_idiom` | POST | look up explanations |
//! | `/generate_link` | POST | persist a card, answer with its link |
//! | `/card/{idiom}` | GET | render card |
//! | `/api/idioms` | GET | list persisted cards (JSON) |
//!
//! `/healthz` is registered directly in [`crate::build_router`].

pub mod handlers;
pub mod models;
