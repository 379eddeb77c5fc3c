//! Shared vocabulary for weft.
//!
//! This crate provides what the layout core and its host have to agree on:
//! the geometry scalars, the resolved [`Style`] values attached to runs of
//! content, and the capability interfaces through which the core reaches its
//! collaborators (text measurement, out-of-flow border queries and
//! hyphenation).

pub mod engine;
pub mod geom;
pub mod styles;

pub use self::engine::{
    Engine, FloatManager, FloatRef, Hyphenation, Hyphenator, NoFloats, TextMeasurer,
    WidgetRef,
};
pub use self::geom::{Abs, AbsUnit, Em, Extent, Point, Rect, Size};
pub use self::styles::{Lang, Style, StyleCache, TextAlign};
