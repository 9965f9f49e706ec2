//! The Oracle time-stamp data types: TIMESTAMP, TIMESTAMP WITH TIME ZONE, TIMESTAMP WITH LOCAL TIME ZONE

use super::{Ctx, text_from, interval::Interval};
use crate::{Result, Error, err::LibError, env::FormatKind, oci::*};
use libc::size_t;
use std::{cmp::Ordering, fmt, ptr};

pub(crate) fn to_string(fmt: &str, fsprec: u8, ts: *const OCIDateTime, ctx: &dyn Ctx) -> Result<String> {
    let mut txt = [0u8; 128];
    let mut txt_len = txt.len() as u32;
    catch!{ctx.err_ptr() =>
        OCIDateTimeToText(
            ctx.ctx_ptr(), ctx.err_ptr(), ts,
            if fmt.is_empty() { ptr::null() } else { fmt.as_ptr() }, fmt.len() as u8, fsprec,
            ptr::null(), 0,
            &mut txt_len, txt.as_mut_ptr()
        )
    }
    Ok( text_from(&txt, txt_len as usize) )
}

/// Copies the timestamp in `src` into the newly allocated descriptor.
pub(crate) fn from_timestamp<'a, T>(src: *const OCIDateTime, ctx: &'a dyn Ctx) -> Result<Timestamp<'a, T>>
    where T: DescriptorType<OCIType=OCIDateTime>
{
    let datetime = Descriptor::<T>::new(ctx.env_ptr())?;
    catch!{ctx.err_ptr() =>
        OCIDateTimeAssign(ctx.ctx_ptr(), ctx.err_ptr(), src, datetime.get())
    }
    Ok( Timestamp { ctx, datetime } )
}

/// Represents datetime data types.
pub struct Timestamp<'a, T>
    where T: DescriptorType<OCIType=OCIDateTime>
{
    ctx: &'a dyn Ctx,
    datetime: Descriptor<T>,
}

impl<'a, T> Timestamp<'a, T>
    where T: DescriptorType<OCIType=OCIDateTime>
{
    /// Returns a new timestamp descriptor. Its value is undefined until it is set
    /// or fetched into.
    pub(crate) fn new(ctx: &'a dyn Ctx) -> Result<Self> {
        let datetime = Descriptor::new(ctx.env_ptr())?;
        Ok( Self { ctx, datetime } )
    }

    pub(crate) fn as_ptr(&self) -> *const OCIDateTime {
        self.datetime.get()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut OCIDateTime {
        self.datetime.get()
    }

    pub(crate) fn descriptor_ptr(&mut self) -> *mut *mut OCIDateTime {
        self.datetime.as_mut_ptr()
    }

    pub(crate) fn ctx(&self) -> &'a dyn Ctx {
        self.ctx
    }

    fn format_kind() -> FormatKind {
        if T::get_type() == OCI_DTYPE_TIMESTAMP {
            FormatKind::Timestamp
        } else {
            FormatKind::TimestampTz
        }
    }

    /**
        Creates a timestamp and populates its fields. Time zone, as a string, is represented in
        the format "\[+|-\]\[HH:MM\]". If the time zone is not specified, then the session default
        time zone is assumed. The time zone is ignored for timestamps that do not have one.

        # Example

        ```no_run
        use oracall::TimestampTZ;

        let env = oracall::env()?;
        let ts = TimestampTZ::with_date_and_time(1969, 7, 24, 16, 50, 35, 0, "UTC", &env)?;

        assert_eq!(ts.date_and_time()?, (1969, 7, 24, 16, 50, 35, 0));
        assert_eq!(ts.tz_name()?, "UTC");
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn with_date_and_time(year: i16, month: u8, day: u8, hour: u8, min: u8, sec: u8, fsec: u32, tz: &str, ctx: &'a dyn Ctx) -> Result<Self> {
        let datetime = Descriptor::<T>::new(ctx.env_ptr())?;
        catch!{ctx.err_ptr() =>
            OCIDateTimeConstruct(
                ctx.ctx_ptr(), ctx.err_ptr(), datetime.get(),
                year, month, day, hour, min, sec, fsec,
                tz.as_ptr(), tz.len() as size_t
            )
        }
        Ok( Self { ctx, datetime } )
    }

    /// Same as `with_date_and_time` without the time part.
    pub fn with_date(year: i16, month: u8, day: u8, ctx: &'a dyn Ctx) -> Result<Self> {
        Self::with_date_and_time(year, month, day, 0, 0, 0, 0, "", ctx)
    }

    /**
        Converts the given string to a timestamp according to the specified format.
        An empty format uses the context's timestamp format.

        # Example

        ```no_run
        use oracall::Timestamp;

        let env = oracall::env()?;
        let ts = Timestamp::from_string("1969-7-24 16:50:35.12", "YYYY-MM-DD HH24:MI:SS.FF", &env)?;

        assert_eq!(ts.date_and_time()?, (1969, 7, 24, 16, 50, 35, 120000000));
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn from_string(txt: &str, fmt: &str, ctx: &'a dyn Ctx) -> Result<Self> {
        let fmt = if fmt.is_empty() { ctx.format(Self::format_kind()) } else { fmt.to_string() };
        let datetime = Descriptor::<T>::new(ctx.env_ptr())?;
        catch!{ctx.err_ptr() =>
            OCIDateTimeFromText(
                ctx.ctx_ptr(), ctx.err_ptr(),
                txt.as_ptr(), txt.len() as size_t,
                fmt.as_ptr(), fmt.len() as u8,
                ptr::null(), 0,
                datetime.get()
            )
        }
        Ok( Self { ctx, datetime } )
    }

    /// Creates a timestamp from the system's current date and time.
    pub fn now(ctx: &'a dyn Ctx) -> Result<Self> {
        let datetime = Descriptor::<T>::new(ctx.env_ptr())?;
        catch!{ctx.err_ptr() =>
            OCIDateTimeSysTimeStamp(ctx.ctx_ptr(), ctx.err_ptr(), datetime.get())
        }
        Ok( Self { ctx, datetime } )
    }

    /// Returns a copy of this timestamp.
    pub fn assign(&self) -> Result<Self> {
        from_timestamp(self.as_ptr(), self.ctx)
    }

    /**
        Converts this timestamp into another datetime kind.

        # Example

        ```no_run
        use oracall::{Timestamp, TimestampTZ};

        let env = oracall::env()?;
        let tz = TimestampTZ::with_date_and_time(2022, 4, 1, 12, 0, 0, 0, "+00:00", &env)?;
        let ts : Timestamp = tz.convert_into()?;

        assert_eq!(ts.date()?, (2022, 4, 1));
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn convert_into<U>(&self) -> Result<Timestamp<'a, U>>
        where U: DescriptorType<OCIType=OCIDateTime>
    {
        let datetime = Descriptor::<U>::new(self.ctx.env_ptr())?;
        catch!{self.ctx.err_ptr() =>
            OCIDateTimeConvert(self.ctx.ctx_ptr(), self.ctx.err_ptr(), self.as_ptr(), datetime.get())
        }
        Ok( Timestamp { ctx: self.ctx, datetime } )
    }

    /// Adds an interval to this timestamp and returns the result.
    pub fn add<I>(&self, interval: &Interval<I>) -> Result<Self>
        where I: DescriptorType<OCIType=OCIInterval>
    {
        let datetime = Descriptor::<T>::new(self.ctx.env_ptr())?;
        catch!{self.ctx.err_ptr() =>
            OCIDateTimeIntervalAdd(self.ctx.ctx_ptr(), self.ctx.err_ptr(), self.as_ptr(), interval.as_ptr(), datetime.get())
        }
        Ok( Self { ctx: self.ctx, datetime } )
    }

    /// Subtracts an interval from this timestamp and returns the result.
    pub fn sub<I>(&self, interval: &Interval<I>) -> Result<Self>
        where I: DescriptorType<OCIType=OCIInterval>
    {
        let datetime = Descriptor::<T>::new(self.ctx.env_ptr())?;
        catch!{self.ctx.err_ptr() =>
            OCIDateTimeIntervalSub(self.ctx.ctx_ptr(), self.ctx.err_ptr(), self.as_ptr(), interval.as_ptr(), datetime.get())
        }
        Ok( Self { ctx: self.ctx, datetime } )
    }

    /**
        Returns the difference between this and the `other` timestamp as an interval.

        # Example

        ```no_run
        use oracall::{Timestamp, IntervalDS};

        let env = oracall::env()?;
        let t1 = Timestamp::with_date_and_time(1969, 7, 20, 20, 17, 40, 0, "", &env)?;
        let t2 = Timestamp::with_date_and_time(1969, 7, 24, 16, 50, 35, 0, "", &env)?;
        let diff : IntervalDS = t2.subtract(&t1)?;

        assert_eq!(diff.day_second()?, (3, 20, 32, 55, 0));
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn subtract<U, I>(&self, other: &Timestamp<U>) -> Result<Interval<'a, I>>
        where U: DescriptorType<OCIType=OCIDateTime>
            , I: DescriptorType<OCIType=OCIInterval>
    {
        let mut interval = Interval::<I>::new(self.ctx)?;
        catch!{self.ctx.err_ptr() =>
            OCIDateTimeSubtract(self.ctx.ctx_ptr(), self.ctx.err_ptr(), self.as_ptr(), other.as_ptr(), interval.as_mut_ptr())
        }
        Ok( interval )
    }

    /// Compares this timestamp to the `other` one.
    pub fn compare<U>(&self, other: &Timestamp<U>) -> Result<Ordering>
        where U: DescriptorType<OCIType=OCIDateTime>
    {
        let mut res = 0i32;
        catch!{self.ctx.err_ptr() =>
            OCIDateTimeCompare(self.ctx.ctx_ptr(), self.ctx.err_ptr(), self.as_ptr(), other.as_ptr(), &mut res)
        }
        Ok( res.cmp(&0) )
    }

    /// Returns the year, month and day of the timestamp.
    pub fn date(&self) -> Result<(i16, u8, u8)> {
        let mut year = 0i16;
        let mut month = 0u8;
        let mut day = 0u8;
        catch!{self.ctx.err_ptr() =>
            OCIDateTimeGetDate(self.ctx.ctx_ptr(), self.ctx.err_ptr(), self.as_ptr(), &mut year, &mut month, &mut day)
        }
        Ok( (year, month, day) )
    }

    /// Returns the hour, minute, second and the fractional second (in nanoseconds) of the timestamp.
    pub fn time(&self) -> Result<(u8, u8, u8, u32)> {
        let mut hour = 0u8;
        let mut min = 0u8;
        let mut sec = 0u8;
        let mut fsec = 0u32;
        catch!{self.ctx.err_ptr() =>
            OCIDateTimeGetTime(self.ctx.ctx_ptr(), self.ctx.err_ptr(), self.as_ptr(), &mut hour, &mut min, &mut sec, &mut fsec)
        }
        Ok( (hour, min, sec, fsec) )
    }

    pub fn date_and_time(&self) -> Result<(i16, u8, u8, u8, u8, u8, u32)> {
        let (year, month, day) = self.date()?;
        let (hour, min, sec, fsec) = self.time()?;
        Ok( (year, month, day, hour, min, sec, fsec) )
    }

    /**
        Returns the time zone name of the timestamp. Timestamps without a time zone
        fail with ORA-01878.
    */
    pub fn tz_name(&self) -> Result<String> {
        let mut txt = [0u8; 64];
        let mut txt_len = txt.len() as u32;
        catch!{self.ctx.err_ptr() =>
            OCIDateTimeGetTimeZoneName(self.ctx.ctx_ptr(), self.ctx.err_ptr(), self.as_ptr(), txt.as_mut_ptr(), &mut txt_len)
        }
        Ok( text_from(&txt, txt_len as usize) )
    }

    /// Returns the time zone hour and minute offset from UTC.
    pub fn tz_offset(&self) -> Result<(i8, i8)> {
        let mut hours = 0i8;
        let mut min = 0i8;
        catch!{self.ctx.err_ptr() =>
            OCIDateTimeGetTimeZoneOffset(self.ctx.ctx_ptr(), self.ctx.err_ptr(), self.as_ptr(), &mut hours, &mut min)
        }
        Ok( (hours, min) )
    }

    /// Checks whether this is a valid timestamp.
    pub fn is_valid(&self) -> Result<bool> {
        let mut invalid = 0u32;
        catch!{self.ctx.err_ptr() =>
            OCIDateTimeCheck(self.ctx.ctx_ptr(), self.ctx.err_ptr(), self.as_ptr(), &mut invalid)
        }
        Ok( invalid == 0 )
    }

    /**
        Converts the timestamp to text using the format and the fractional second precision.
        An empty format uses the context's timestamp format.
    */
    pub fn to_string(&self, fmt: &str, fsprec: u8) -> Result<String> {
        let fmt = if fmt.is_empty() { self.ctx.format(Self::format_kind()) } else { fmt.to_string() };
        to_string(&fmt, fsprec, self.as_ptr(), self.ctx)
    }

    /// Fails with `ArgInvalidValue` when the timestamp is not valid.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.is_valid()? {
            Ok(())
        } else {
            Err( Error::lib(LibError::ArgInvalidValue("timestamp")) )
        }
    }
}

impl<T> fmt::Display for Timestamp<'_, T>
    where T: DescriptorType<OCIType=OCIDateTime>
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_string("", 3) {
            Ok(txt) => f.write_str(&txt),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl<T> fmt::Debug for Timestamp<'_, T>
    where T: DescriptorType<OCIType=OCIDateTime>
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.date_and_time() {
            Ok((y, m, d, hh, mi, ss, ns)) => write!(f, "Timestamp({:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:09})", y, m, d, hh, mi, ss, ns),
            Err(_) => f.write_str("Timestamp(?)"),
        }
    }
}
