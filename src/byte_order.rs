//! Byte order handling for binary ROFF numerics.
//!
//! The ROFF format does not declare its byte order up front. Instead the `filedata` tag
//! carries a `byteswaptest` key whose on-disk value reveals whether the writer used the
//! opposite order. Since that key is only seen once decoding has started, the active byte
//! order lives in a [`DecodeContext`] that the tokenizer, the parser and every pending
//! array blob share, and which can be flipped at any time.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Byte order applied to fixed-width binary numeric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

impl Endianness {
    /// Returns the opposite byte order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use roffio::Endianness;
    ///
    /// assert_eq!(Endianness::Little.swapped(), Endianness::Big);
    /// assert_eq!(Endianness::Big.swapped(), Endianness::Little);
    /// ```
    #[inline]
    #[must_use]
    pub const fn swapped(self) -> Self {
        match self {
            Endianness::Little => Endianness::Big,
            Endianness::Big => Endianness::Little,
        }
    }
}

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endianness::Little => write!(f, "little"),
            Endianness::Big => write!(f, "big"),
        }
    }
}

/// Decode state shared by one tokenizer/parser pair.
///
/// Cloning the [`Rc`] hands out another view on the same cell, so a single
/// [`DecodeContext::swap`] is observed by the tokenizer (array sizes), the parser
/// (scalar values) and every pending array blob alike. A new pair gets a new context
/// and is unaffected by swaps made on another.
#[derive(Debug)]
pub struct DecodeContext {
    endianness: Cell<Endianness>,
}

impl DecodeContext {
    #[must_use]
    pub fn new(endianness: Endianness) -> Rc<Self> {
        Rc::new(DecodeContext {
            endianness: Cell::new(endianness),
        })
    }

    #[inline]
    pub fn endianness(&self) -> Endianness {
        self.endianness.get()
    }

    /// Flips the byte order used from now on.
    pub fn swap(&self) {
        let swapped = self.endianness.get().swapped();
        tracing::debug!(endianness = %swapped, "swapping byte order");
        self.endianness.set(swapped);
    }
}

/// A fixed-width number as it appears on the wire.
pub trait WireNumber: Sized + Copy {
    /// Number of bytes in the binary encoding.
    const WIDTH: usize;

    /// Decodes exactly [`Self::WIDTH`] bytes. Returns `None` for any other length.
    fn from_wire(bytes: &[u8], endianness: Endianness) -> Option<Self>;

    /// Appends the binary encoding to `out`.
    fn write_wire(self, endianness: Endianness, out: &mut Vec<u8>);

    /// Parses an ASCII literal.
    fn parse_text(text: &str) -> Option<Self>;
}

macro_rules! impl_wire_number {
    ($($ty:ty),*) => {
        $(
            impl WireNumber for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn from_wire(bytes: &[u8], endianness: Endianness) -> Option<Self> {
                    let array = bytes.try_into().ok()?;
                    Some(match endianness {
                        Endianness::Little => <$ty>::from_le_bytes(array),
                        Endianness::Big => <$ty>::from_be_bytes(array),
                    })
                }

                fn write_wire(self, endianness: Endianness, out: &mut Vec<u8>) {
                    match endianness {
                        Endianness::Little => out.extend_from_slice(&self.to_le_bytes()),
                        Endianness::Big => out.extend_from_slice(&self.to_be_bytes()),
                    }
                }

                fn parse_text(text: &str) -> Option<Self> {
                    text.parse().ok()
                }
            }
        )*
    };
}

impl_wire_number!(u8, i32, u32, f32, f64);

/// Decodes a run of fixed-width numbers. The caller guarantees `bytes.len()` is a
/// multiple of `T::WIDTH`.
pub(crate) fn decode_run<T: WireNumber>(bytes: &[u8], endianness: Endianness) -> Vec<T> {
    bytes
        .chunks_exact(T::WIDTH)
        .filter_map(|chunk| T::from_wire(chunk, endianness))
        .collect()
}
