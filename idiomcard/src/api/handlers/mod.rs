//! HTTP request handlers, one module per part of the card workflow.
//!
//! - [`uploads`]: the upload form and accepting an image (stage 1)
//! - [`scans`]: recognizing the text of a stored image (stage 2)
//! - [`selections`]: carrying a selection forward and looking up explanations (stages 3 and 4)
//! - [`cards`]: persisting a card, rendering it, and listing persisted cards (stages 5 and 6)
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`]. Workflow failures turn into a redirect to `/` with a
//! notice, everything else into a plain-text status response.

pub mod cards;
pub mod scans;
pub mod selections;
pub mod uploads;
