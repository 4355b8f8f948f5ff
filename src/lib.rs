//! Scryfall-style card search queries: parse once, evaluate per card.
//!
//! ```
//! use cardql::{CardRecord, ColorSet, parse};
//!
//! let query = parse("c<=wu t:creature mv<=3").unwrap();
//! let card = CardRecord::builder("Raffine's Informant")
//!     .type_line("Creature — Human Wizard")
//!     .colors(ColorSet::WHITE.union(ColorSet::BLUE))
//!     .mana_value(2.0)
//!     .build();
//! assert!(query.matches(&card));
//! ```

pub mod ast;
pub mod card;
pub mod color;
pub mod config;
pub mod error;
pub mod eval;
pub mod field;
pub mod parser;
pub mod search;
pub mod token;
pub mod types;

pub use ast::{CompareOp, Query, RegexLiteral, Value};
pub use card::{CardFace, CardRecord, CardRecordBuilder, PtValue, Rarity};
#[cfg(feature = "serialization")]
pub use card::{cards_from_json, load_cards};
pub use color::{
    Color, ColorSet, color_identity_label, compare_colors, is_strict_subset, is_strict_superset,
    is_subset, is_superset, parse_colors, sets_equal,
};
pub use config::{ParserSettings, SearchSettings};
pub use error::{LoadError, ParseError, ParseErrorKind};
pub use eval::{CardAccessor, evaluate};
pub use field::{Dispatch, FieldId, FieldKind};
pub use parser::{ParseOutcome, parse, parse_recovering, parse_with};
pub use search::{search, search_parallel, search_with};
pub use token::{Span, Token, TokenKind, tokenize};
pub use types::{CardType, Supertype, TypeLine};
