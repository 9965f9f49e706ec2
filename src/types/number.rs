//! Functions to manipulate Oracle Numbers:
//! NUMBER, NUMERIC, INT, SHORTINT, REAL, DOUBLE PRECISION, FLOAT and DECIMAL.

use super::{Ctx, text_from};
use crate::{Result, env::FormatKind, oci::*};
use libc::c_void;
use std::{cmp::Ordering, fmt, mem, ptr};

/// Integers that OCI converts to and from Oracle numbers natively.
pub trait Integer : Copy + Default {
    /// `OCI_NUMBER_SIGNED` or `OCI_NUMBER_UNSIGNED`
    const SIGN_FLAG : u32;
}

macro_rules! impl_int {
    ($flag:ident => $($t:ty),+) => {
        $(
            impl Integer for $t {
                const SIGN_FLAG : u32 = $flag;
            }
        )+
    };
}

impl_int!(OCI_NUMBER_SIGNED   => i8, i16, i32, i64, isize);
impl_int!(OCI_NUMBER_UNSIGNED => u8, u16, u32, u64, usize);

/// Marker trait for floating point numbers
pub trait Real : Copy + Default {}
impl Real for f32 {}
impl Real for f64 {}

/**
    Creates an OCI number initialized as zero.

    **Note** that an uninitialized `OCINumber` cannot be used as an output buffer.
    While that works on Windows, it fails with ORA-01458 on Linux.
*/
pub(crate) fn zero() -> OCINumber {
    let mut num = OCINumber::new();
    num.bytes[0] = 1;
    num.bytes[1] = 128;
    num
}

pub(crate) fn int_into_number<T: Integer>(val: T, err: *mut OCIError) -> Result<OCINumber> {
    let mut num = zero();
    catch!{err =>
        OCINumberFromInt(err, &val as *const T as *const c_void, mem::size_of::<T>() as u32, T::SIGN_FLAG, &mut num)
    }
    Ok( num )
}

pub(crate) fn real_into_number<T: Real>(val: T, err: *mut OCIError) -> Result<OCINumber> {
    let mut num = zero();
    catch!{err =>
        OCINumberFromReal(err, &val as *const T as *const c_void, mem::size_of::<T>() as u32, &mut num)
    }
    Ok( num )
}

pub(crate) fn to_int<T: Integer>(num: &OCINumber, err: *mut OCIError) -> Result<T> {
    let mut res = T::default();
    catch!{err =>
        OCINumberToInt(err, num, mem::size_of::<T>() as u32, T::SIGN_FLAG, &mut res as *mut T as *mut c_void)
    }
    Ok( res )
}

pub(crate) fn to_real<T: Real>(num: &OCINumber, err: *mut OCIError) -> Result<T> {
    let mut res = T::default();
    catch!{err =>
        OCINumberToReal(err, num, mem::size_of::<T>() as u32, &mut res as *mut T as *mut c_void)
    }
    Ok( res )
}

pub(crate) fn to_string(fmt: &str, num: &OCINumber, err: *mut OCIError) -> Result<String> {
    let mut txt = [0u8; 64];
    let mut txt_len = txt.len() as u32;
    catch!{err =>
        OCINumberToText(
            err, num,
            fmt.as_ptr(), fmt.len() as u32,
            ptr::null(), 0,
            &mut txt_len, txt.as_mut_ptr()
        )
    }
    Ok( text_from(&txt, txt_len as usize) )
}

pub(crate) fn from_string(txt: &str, fmt: &str, err: *mut OCIError) -> Result<OCINumber> {
    let mut num = zero();
    catch!{err =>
        OCINumberFromText(
            err,
            txt.as_ptr(), txt.len() as u32,
            fmt.as_ptr(), fmt.len() as u32,
            ptr::null(), 0,
            &mut num
        )
    }
    Ok( num )
}

/// Represents OTS types NUMBER, NUMERIC, INT, SHORTINT, REAL, DOUBLE PRECISION, FLOAT and DECIMAL.
#[derive(Clone, Copy)]
pub struct Number<'a> {
    ctx: &'a dyn Ctx,
    num: OCINumber,
}

impl fmt::Debug for Number<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_string("TM") {
            Ok(txt) => write!(f, "Number({})", txt),
            Err(_) => write!(f, "Number({:?})", &self.num.bytes[..self.len()]),
        }
    }
}

impl<'a> Number<'a> {
    /// Creates a new Number that is equal to zero.
    pub fn new(ctx: &'a dyn Ctx) -> Self {
        Self { ctx, num: zero() }
    }

    pub(crate) fn from_oci(num: OCINumber, ctx: &'a dyn Ctx) -> Self {
        Self { ctx, num }
    }

    pub(crate) fn as_oci(&self) -> &OCINumber {
        &self.num
    }

    pub(crate) fn as_oci_mut(&mut self) -> &mut OCINumber {
        &mut self.num
    }

    fn len(&self) -> usize {
        (self.num.bytes[0] as usize + 1).min(self.num.bytes.len())
    }

    /**
        Creates a new Number from an integer.

        # Example

        ```no_run
        use oracall::Number;

        let env = oracall::env()?;
        let num = Number::from_int(42, &env)?;

        assert_eq!(num.to_int::<i32>()?, 42);
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn from_int<T: Integer>(val: T, ctx: &'a dyn Ctx) -> Result<Self> {
        let num = int_into_number(val, ctx.err_ptr())?;
        Ok( Self { ctx, num } )
    }

    /// Creates a new Number from a floating point value.
    pub fn from_real<T: Real>(val: T, ctx: &'a dyn Ctx) -> Result<Self> {
        let num = real_into_number(val, ctx.err_ptr())?;
        Ok( Self { ctx, num } )
    }

    /**
        Converts text to a number according to the format. An empty format uses
        the context's numeric format.

        # Example

        ```no_run
        use oracall::Number;

        let env = oracall::env()?;
        let num = Number::from_string("6.4", "9.9", &env)?;
        let txt = num.to_string("TM9")?;

        assert_eq!(txt, "6.4");
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn from_string(txt: &str, fmt: &str, ctx: &'a dyn Ctx) -> Result<Self> {
        let fmt = if fmt.is_empty() { ctx.format(FormatKind::Numeric) } else { fmt.to_string() };
        let num = from_string(txt, &fmt, ctx.err_ptr())?;
        Ok( Self { ctx, num } )
    }

    /// Returns the number as an integer. Fractional digits are truncated.
    pub fn to_int<T: Integer>(&self) -> Result<T> {
        to_int(&self.num, self.ctx.err_ptr())
    }

    pub fn to_real<T: Real>(&self) -> Result<T> {
        to_real(&self.num, self.ctx.err_ptr())
    }

    /// Converts the number to text using the format. An empty format uses the context's numeric format.
    pub fn to_string(&self, fmt: &str) -> Result<String> {
        let fmt = if fmt.is_empty() { self.ctx.format(FormatKind::Numeric) } else { fmt.to_string() };
        to_string(&fmt, &self.num, self.ctx.err_ptr())
    }

    /// Compares this number to the `other` one.
    pub fn compare(&self, other: &Number) -> Result<Ordering> {
        let mut cmp = 0i32;
        catch!{self.ctx.err_ptr() =>
            OCINumberCmp(self.ctx.err_ptr(), &self.num, &other.num, &mut cmp)
        }
        Ok( cmp.cmp(&0) )
    }

    /// Returns a copy of this number.
    pub fn assign(&self) -> Result<Self> {
        let mut num = zero();
        catch!{self.ctx.err_ptr() =>
            OCINumberAssign(self.ctx.err_ptr(), &self.num, &mut num)
        }
        Ok( Self { ctx: self.ctx, num } )
    }

    /// Tests whether the number is zero.
    pub fn is_zero(&self) -> bool {
        self.num.bytes[0] == 1 && self.num.bytes[1] == 128
    }
}

impl fmt::Display for Number<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_string("") {
            Ok(txt) => f.write_str(&txt),
            Err(_) => Err(fmt::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_layout() {
        let num = zero();
        assert_eq!(num.bytes[0], 1);
        assert_eq!(num.bytes[1], 128);
        assert!(num.bytes[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn sign_flags() {
        assert_eq!(<i64 as Integer>::SIGN_FLAG, OCI_NUMBER_SIGNED);
        assert_eq!(<u16 as Integer>::SIGN_FLAG, OCI_NUMBER_UNSIGNED);
    }
}
