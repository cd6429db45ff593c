//!
//! # Regif21 Error-Helper Utilities
//!
//! ```rust
//! use regif21utils::error::{ErrorHelper, Unwrapper};
//!
//! /// Example implementer of [`ErrorHelper`], which tags each failure with a source line.
//! struct AtLine(usize);
//! impl ErrorHelper for AtLine {
//!     type Error = String;
//!
//!     fn err(&self, msg: impl Into<String>) -> Self::Error {
//!         format!("line {}: {}", self.0, msg.into())
//!     }
//! }
//! fn width(ctx: &AtLine, txt: &str) -> Result<u32, String> {
//!     let w: u32 = txt.parse::<u32>().unwrapper(ctx, "width must be a decimal integer")?;
//!     ctx.assert(w > 0, "width must be positive")?;
//!     Ok(w)
//! }
//! assert_eq!(width(&AtLine(3), "8"), Ok(8));
//! assert_eq!(width(&AtLine(3), "0"), Err("line 3: width must be positive".to_string()));
//! ```
//!

///
/// # ErrorHelper
///
/// Helper trait for re-use among the spec reader, allocator and writers.
/// Each implementer carries whatever context it reports upon failure
/// (a line number, a field, a signal name), and injects it in the required `err` method.
/// The remaining methods are provided in terms of `err`.
///
pub trait ErrorHelper {
    type Error;

    /// Create and return a [Self::Error] value.
    fn err(&self, msg: impl Into<String>) -> Self::Error;
    /// Return failure
    fn fail<T>(&self, msg: impl Into<String>) -> Result<T, Self::Error> {
        Err(self.err(msg))
    }
    /// Unwrap the [Option] `opt` if it is [Some], and return our error if not.
    fn unwrap<T>(&self, opt: Option<T>, msg: impl Into<String>) -> Result<T, Self::Error> {
        match opt {
            Some(val) => Ok(val),
            None => self.fail(msg),
        }
    }
    /// Assert a boolean condition. Returns through `self.fail` if it is not satisfied.
    fn assert(&self, b: bool, msg: impl Into<String>) -> Result<(), Self::Error> {
        match b {
            true => Ok(()),
            false => self.fail(msg),
        }
    }
}

///
/// # Unwrapper
///
/// Post-fix application of [`ErrorHelper`] handling to [`Option`]s and [`Result`]s.
/// The error (or absence) of the original is discarded in favor of the helper's error,
/// which carries the helper's context.
///
pub trait Unwrapper {
    type Ok;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper;
}

impl<T> Unwrapper for Option<T> {
    type Ok = T;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        helper.unwrap(self, msg)
    }
}

impl<T, E> Unwrapper for Result<T, E> {
    type Ok = T;
    fn unwrapper<H>(
        self,
        helper: &H,
        msg: impl Into<String>,
    ) -> Result<<Self as Unwrapper>::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        helper.unwrap(self.ok(), msg)
    }
}
