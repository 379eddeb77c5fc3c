//! Resolved style values.
//!
//! A [`Style`] is the fully cascaded, immutable description of how a run of
//! content is to be laid out. The cascade itself happens outside of this
//! crate; the layout core only ever reads styles through shared [`Rc`]
//! handles obtained from a [`StyleCache`].

use std::rc::Rc;
use std::str::FromStr;

use ecow::EcoString;
use rustc_hash::FxHashMap;
use weft_utils::Scalar;

use crate::geom::{Abs, Em};

/// A resolved style for a run of inline content.
///
/// Styles are immutable and shared: the same `Rc<Style>` is attached to every
/// word created from the same run. The layout core never mutates a style.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Style {
    /// The font family stack, as resolved by the host.
    pub font_family: EcoString,
    /// The font size.
    pub font_size: Abs,
    /// The horizontal alignment of lines.
    pub align: TextAlign,
    /// The indent applied to the first line of a paragraph.
    pub text_indent: Em,
    /// Extra vertical space between lines.
    pub leading: Em,
    /// How much of a space's width it may gain during justification.
    pub space_stretch: Scalar,
    /// How much of a space's width it may lose during justification.
    pub space_shrink: Scalar,
    /// The language of the content, if known.
    pub lang: Option<Lang>,
    /// Whether words of this style may be hyphenated.
    pub hyphenate: bool,
    /// Whether lines may be broken within this style at all.
    pub wrap: bool,
    /// The bottom margin of inline widgets with this style.
    pub margin_bottom: Abs,
}

impl Style {
    /// The stretchability of a space with the given width.
    pub fn stretchability(&self, space: Abs) -> Abs {
        space * self.space_stretch.get()
    }

    /// The shrinkability of a space with the given width.
    pub fn shrinkability(&self, space: Abs) -> Abs {
        space * self.space_shrink.get()
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            font_family: EcoString::inline("serif"),
            font_size: Abs::px(16.0),
            align: TextAlign::Left,
            text_indent: Em::zero(),
            leading: Em::zero(),
            space_stretch: Scalar::new(0.5),
            space_shrink: Scalar::new(1.0 / 3.0),
            lang: None,
            hyphenate: false,
            wrap: true,
            margin_bottom: Abs::zero(),
        }
    }
}

/// The horizontal alignment of lines.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextAlign {
    /// Align lines at the left content edge.
    #[default]
    Left,
    /// Align lines at the right content edge.
    Right,
    /// Center lines between the content edges.
    Center,
    /// Stretch lines to fill the full content width.
    Justify,
}

/// An interning cache for styles.
///
/// Owned by the layout session that creates it; there is no process-wide
/// table. Interning the same attribute combination twice yields the same
/// shared handle, so word-level style comparisons are pointer comparisons.
#[derive(Debug, Default)]
pub struct StyleCache {
    map: FxHashMap<Style, Rc<Style>>,
}

impl StyleCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a style, returning a shared handle.
    pub fn intern(&mut self, style: Style) -> Rc<Style> {
        if let Some(rc) = self.map.get(&style) {
            return Rc::clone(rc);
        }
        let rc = Rc::new(style.clone());
        self.map.insert(style, Rc::clone(&rc));
        rc
    }

    /// The number of distinct styles interned so far.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// An identifier for a natural language.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Lang([u8; 3], u8);

impl Lang {
    pub const ENGLISH: Self = Self(*b"en ", 2);
    pub const FRENCH: Self = Self(*b"fr ", 2);
    pub const GERMAN: Self = Self(*b"de ", 2);
    pub const ITALIAN: Self = Self(*b"it ", 2);
    pub const PORTUGUESE: Self = Self(*b"pt ", 2);
    pub const SPANISH: Self = Self(*b"es ", 2);

    /// Return the language code as an all lowercase string slice.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0[..usize::from(self.1)]).unwrap_or_default()
    }
}

impl FromStr for Lang {
    type Err = &'static str;

    /// Construct a language from a two- or three-byte ISO 639-1/2/3 code.
    fn from_str(iso: &str) -> Result<Self, Self::Err> {
        let len = iso.len();
        if matches!(len, 2..=3) && iso.is_ascii() {
            let mut bytes = [b' '; 3];
            bytes[..len].copy_from_slice(iso.as_bytes());
            bytes.make_ascii_lowercase();
            Ok(Self(bytes, len as u8))
        } else {
            Err("expected two or three letter language code (ISO 639-1/2/3)")
        }
    }
}
