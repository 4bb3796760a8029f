//! Prompt segmentation and token substitution.
//!
//! This crate turns an image-generation prompt plus a list of editable tokens
//! into an ordered partition of literal spans and token references, then lets
//! individual tokens be swapped for alternatives while the full text stays in
//! sync.
//!
//! ## What we do
//!
//! - Map token texts onto the prompt: longest text first, first
//!   case-insensitive word-bounded occurrence only, no overlaps
//! - Keep a [`PromptDocument`] whose raw text is always the concatenation of
//!   its segments
//! - Replace a token's text without re-segmenting, so boundaries from the last
//!   enhancement survive edits of any length
//! - Extract tokens offline from a fixed vocabulary when no remote provider
//!   can, via [`FallbackExtractor`]
//! - Tag tokens with a coarse [`RoleTag`] through an ordered
//!   [`RoleClassifier`]
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock, no randomness apart from whichever [`IdGenerator`] the
//! caller supplies. Same prompt + same tokens = same segments.
//!
//! ## Example
//!
//! ```
//! use segment::{segment, RoleTag, Segment, Token};
//!
//! let tokens = vec![Token::new("t1", "blue", RoleTag::Color, vec!["azure".into()])];
//! let segments = segment("a blue sky", &tokens);
//! assert_eq!(
//!     segments,
//!     vec![
//!         Segment::literal("a "),
//!         Segment::token_ref("t1"),
//!         Segment::literal(" sky"),
//!     ]
//! );
//! ```

mod claims;
mod config;
mod document;
mod engine;
mod error;
mod fallback;
mod ids;
mod role;
mod token;
mod vocabulary;

pub use crate::config::FallbackConfig;
pub use crate::document::{rebuild_raw, replace_token, PromptDocument, ResolvedSegment, TokenIndex};
pub use crate::engine::{place_tokens, segment, Placement};
pub use crate::error::SegmentError;
pub use crate::fallback::FallbackExtractor;
pub use crate::ids::{IdGenerator, RandomIds, SequentialIds};
pub use crate::role::{RoleClassifier, RoleRule, RoleTag};
pub use crate::token::{Segment, Token, TokenId};
