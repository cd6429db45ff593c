//!
//! # Enum-String Mapping Module
//!
//! Primarily defines the [enumstr] macro and paired [EnumStr] trait,
//! for defining a mapping between an enum and its keyword-strings.
//! Interface-spec fields such as `signed|unsigned` and `wire|channel|master`
//! arrive as one of a small set of keywords; each such field is an [enumstr] enum.
//!
//! The [EnumStr] trait defines:
//! * `to_str(&self) -> &'static str` converts the enum to its keyword.
//! * `from_str(&str) -> Option<Self>` does the opposite, with an exact (case-sensitive) comparison.
//! * `from_str_nocase(&str) -> Option<Self>`, the case-insensitive flavor, provided by default.
//! * `keywords() -> String`, a `a | b | c` listing for diagnostics, provided by default.
//!
//! Example:
//!
//! ```rs
//! use regif21utils::enumstr;
//!
//! enumstr!(
//! /// # Reset Polarity
//! ResetPolarity {
//!     ActiveLow: "low",
//!     ActiveHigh: "high",
//!  }
//! );
//! ```
//!

///
/// # String-Enumeration Trait
///
/// While [EnumStr] can be implemented by any type, its primary intent is
/// for implementation by the [enumstr] macro.
///
pub trait EnumStr: std::marker::Sized + Copy + 'static {
    /// All variants, in declaration order
    const VARIANTS: &'static [Self];

    /// Convert to the paired keyword-string
    fn to_str(&self) -> &'static str;
    /// Create from a keyword-string, matching case *sensitively*
    fn from_str(txt: &str) -> Option<Self>;

    /// Create from a keyword-string, ignoring ASCII case
    fn from_str_nocase(txt: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.to_str().eq_ignore_ascii_case(txt))
    }
    /// Listing of all keywords, e.g. `input | output`
    fn keywords() -> String {
        let words: Vec<&str> = Self::VARIANTS.iter().map(|v| v.to_str()).collect();
        words.join(" | ")
    }
}

///
/// # Enum-String Pairing Macro
///
/// For creating an `enum` which:
/// * (a) Has paired keyword-values, as commonly arrive in text-format fields.
/// * (b) Automatically implements the [EnumStr] trait for conversions to and from these strings.
/// * (c) Automatically implements [std::fmt::Display], writing the keyword.
///
/// All variants are fieldless. Derived implementations include `serde::{Serialize,Deserialize}`,
/// so invoking modules must have both in scope.
///
#[macro_export]
macro_rules! enumstr {
    (   $(#[$meta: meta])*
        $enum_name: ident {
        $( $variant: ident : $strval: literal ),* $(,)?
    }) => {
        $(#[$meta])*
        #[allow(dead_code)]
        #[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $( #[doc=$strval]
                $variant ),*
        }
        impl $crate::EnumStr for $enum_name {
            const VARIANTS: &'static [Self] = &[ $( Self::$variant ),* ];

            /// Convert a [$enum_name] variant to its paired (static) keyword.
            fn to_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $strval),*,
                }
            }
            /// Create a [$enum_name] from one of its keywords.
            /// Returns `None` if input `txt` does not exactly match one of [$enum_name]'s keywords.
            fn from_str(txt: &str) -> Option<Self> {
                match txt {
                    $( $strval => Some(Self::$variant)),*,
                    _ => None,
                }
            }
        }
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}", $crate::EnumStr::to_str(self))
            }
        }
    }
}
