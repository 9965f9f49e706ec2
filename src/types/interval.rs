//! The Oracle interval data types: INTERVAL YEAR TO MONTH and INTERVAL DAY TO SECOND

use super::{Ctx, text_from};
use crate::{Result, oci::*};
use libc::size_t;
use std::{cmp::Ordering, fmt};

pub(crate) fn to_string(lfprec: u8, fsprec: u8, int: *const OCIInterval, ctx: &dyn Ctx) -> Result<String> {
    let mut txt = [0u8; 64];
    let mut txt_len = 0 as size_t;
    catch!{ctx.err_ptr() =>
        OCIIntervalToText(ctx.ctx_ptr(), ctx.err_ptr(), int, lfprec, fsprec, txt.as_mut_ptr(), txt.len() as size_t, &mut txt_len)
    }
    Ok( text_from(&txt, txt_len as usize) )
}

/// Copies the interval in `src` into the newly allocated descriptor.
pub(crate) fn from_interval<'a, T>(src: *const OCIInterval, ctx: &'a dyn Ctx) -> Result<Interval<'a, T>>
    where T: DescriptorType<OCIType=OCIInterval>
{
    let interval = Descriptor::<T>::new(ctx.env_ptr())?;
    catch!{ctx.err_ptr() =>
        OCIIntervalAssign(ctx.ctx_ptr(), ctx.err_ptr(), src, interval.get())
    }
    Ok( Interval { ctx, interval } )
}

/// Represents interval data types.
pub struct Interval<'a, T>
    where T: DescriptorType<OCIType=OCIInterval>
{
    ctx: &'a dyn Ctx,
    interval: Descriptor<T>,
}

impl<'a, T> Interval<'a, T>
    where T: DescriptorType<OCIType=OCIInterval>
{
    /// Returns a new interval descriptor. Its value is undefined until it is set.
    pub(crate) fn new(ctx: &'a dyn Ctx) -> Result<Self> {
        let interval = Descriptor::new(ctx.env_ptr())?;
        Ok( Self { ctx, interval } )
    }

    pub(crate) fn as_ptr(&self) -> *const OCIInterval {
        self.interval.get()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut OCIInterval {
        self.interval.get()
    }

    pub(crate) fn descriptor_ptr(&mut self) -> *mut *mut OCIInterval {
        self.interval.as_mut_ptr()
    }

    /**
        Creates an interval from text. The text must be in the interval literal form,
        e.g. `"+02-04"` for a year-to-month interval or `"+3 20:32:55.000000"` for a
        day-to-second one.

        # Example

        ```no_run
        use oracall::IntervalDS;

        let env = oracall::env()?;
        let int = IntervalDS::from_string("3 20:32:55.5", &env)?;

        assert_eq!(int.day_second()?, (3, 20, 32, 55, 500000000));
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn from_string(txt: &str, ctx: &'a dyn Ctx) -> Result<Self> {
        let interval = Descriptor::<T>::new(ctx.env_ptr())?;
        catch!{ctx.err_ptr() =>
            OCIIntervalFromText(ctx.ctx_ptr(), ctx.err_ptr(), txt.as_ptr(), txt.len() as size_t, interval.get())
        }
        Ok( Self { ctx, interval } )
    }

    /// Returns an interval that is the offset of the time zone ("+HH:MM" or a region name) from UTC.
    pub fn from_tz(tz: &str, ctx: &'a dyn Ctx) -> Result<Self> {
        let interval = Descriptor::<T>::new(ctx.env_ptr())?;
        catch!{ctx.err_ptr() =>
            OCIIntervalFromTZ(ctx.ctx_ptr(), ctx.err_ptr(), tz.as_ptr(), tz.len() as size_t, interval.get())
        }
        Ok( Self { ctx, interval } )
    }

    /// Returns a copy of this interval.
    pub fn assign(&self) -> Result<Self> {
        from_interval(self.as_ptr(), self.ctx)
    }

    /// Converts the interval to text with the leading field and the fractional second precisions.
    pub fn to_string(&self, lfprec: u8, fsprec: u8) -> Result<String> {
        to_string(lfprec, fsprec, self.as_ptr(), self.ctx)
    }

    pub fn compare(&self, other: &Self) -> Result<Ordering> {
        let mut res = 0i32;
        catch!{self.ctx.err_ptr() =>
            OCIIntervalCompare(self.ctx.ctx_ptr(), self.ctx.err_ptr(), self.as_ptr(), other.as_ptr(), &mut res)
        }
        Ok( res.cmp(&0) )
    }

    /// Adds the `other` interval to this one and returns the result.
    pub fn add(&self, other: &Self) -> Result<Self> {
        let interval = Descriptor::<T>::new(self.ctx.env_ptr())?;
        catch!{self.ctx.err_ptr() =>
            OCIIntervalAdd(self.ctx.ctx_ptr(), self.ctx.err_ptr(), self.as_ptr(), other.as_ptr(), interval.get())
        }
        Ok( Self { ctx: self.ctx, interval } )
    }

    /// Subtracts the `other` interval from this one and returns the result.
    pub fn sub(&self, other: &Self) -> Result<Self> {
        let interval = Descriptor::<T>::new(self.ctx.env_ptr())?;
        catch!{self.ctx.err_ptr() =>
            OCIIntervalSubtract(self.ctx.ctx_ptr(), self.ctx.err_ptr(), self.as_ptr(), other.as_ptr(), interval.get())
        }
        Ok( Self { ctx: self.ctx, interval } )
    }

    /// Checks whether this is a valid interval.
    pub fn is_valid(&self) -> Result<bool> {
        let mut invalid = 0u32;
        catch!{self.ctx.err_ptr() =>
            OCIIntervalCheck(self.ctx.ctx_ptr(), self.ctx.err_ptr(), self.as_ptr(), &mut invalid)
        }
        Ok( invalid == 0 )
    }
}

impl<'a> Interval<'a, OCIIntervalDayToSecond> {
    /// Creates an interval of days, hours, minutes, seconds and nanoseconds.
    pub fn with_day_second(dd: i32, hh: i32, mi: i32, ss: i32, ns: i32, ctx: &'a dyn Ctx) -> Result<Self> {
        let mut int = Self::new(ctx)?;
        int.set_day_second(dd, hh, mi, ss, ns)?;
        Ok( int )
    }

    /// Returns days, hours, minutes, seconds and nanoseconds of the interval.
    pub fn day_second(&self) -> Result<(i32, i32, i32, i32, i32)> {
        let (mut dd, mut hh, mut mi, mut ss, mut ns) = (0, 0, 0, 0, 0);
        catch!{self.ctx.err_ptr() =>
            OCIIntervalGetDaySecond(self.ctx.ctx_ptr(), self.ctx.err_ptr(), &mut dd, &mut hh, &mut mi, &mut ss, &mut ns, self.as_ptr())
        }
        Ok( (dd, hh, mi, ss, ns) )
    }

    pub fn set_day_second(&mut self, dd: i32, hh: i32, mi: i32, ss: i32, ns: i32) -> Result<()> {
        catch!{self.ctx.err_ptr() =>
            OCIIntervalSetDaySecond(self.ctx.ctx_ptr(), self.ctx.err_ptr(), dd, hh, mi, ss, ns, self.as_mut_ptr())
        }
        Ok(())
    }
}

impl<'a> Interval<'a, OCIIntervalYearToMonth> {
    /// Creates an interval of years and months.
    pub fn with_year_month(year: i32, month: i32, ctx: &'a dyn Ctx) -> Result<Self> {
        let mut int = Self::new(ctx)?;
        int.set_year_month(year, month)?;
        Ok( int )
    }

    /// Returns years and months of the interval.
    pub fn year_month(&self) -> Result<(i32, i32)> {
        let (mut year, mut month) = (0, 0);
        catch!{self.ctx.err_ptr() =>
            OCIIntervalGetYearMonth(self.ctx.ctx_ptr(), self.ctx.err_ptr(), &mut year, &mut month, self.as_ptr())
        }
        Ok( (year, month) )
    }

    pub fn set_year_month(&mut self, year: i32, month: i32) -> Result<()> {
        catch!{self.ctx.err_ptr() =>
            OCIIntervalSetYearMonth(self.ctx.ctx_ptr(), self.ctx.err_ptr(), year, month, self.as_mut_ptr())
        }
        Ok(())
    }
}

impl<T> fmt::Display for Interval<'_, T>
    where T: DescriptorType<OCIType=OCIInterval>
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_string(9, 6) {
            Ok(txt) => f.write_str(&txt),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl<T> fmt::Debug for Interval<'_, T>
    where T: DescriptorType<OCIType=OCIInterval>
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_string(9, 9) {
            Ok(txt) => write!(f, "Interval({})", txt),
            Err(_) => f.write_str("Interval(?)"),
        }
    }
}
