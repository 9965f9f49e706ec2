//! The Oracle DATE which represents the year, month, day, hour, minute, and second of the date.

use crate::{Result, Error, err::LibError, env::FormatKind, oci::*};
use super::{Ctx, text_from};
use std::{cmp::Ordering, fmt, ptr};

/// Represents Oracle DATE
#[derive(Clone)]
pub struct Date<'a> {
    ctx: &'a dyn Ctx,
    date: OCIDate,
}

impl fmt::Debug for Date<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let d = &self.date;
        write!(f, "Date({:04}-{:02}-{:02} {:02}:{:02}:{:02})", d.year, d.month, d.day, d.hour, d.min, d.sec)
    }
}

impl<'a> Date<'a> {
    /// Constructs a new date
    pub fn new(year: i16, month: u8, day: u8, ctx: &'a dyn Ctx) -> Self {
        Self { ctx, date: OCIDate { year, month, day, hour: 0, min: 0, sec: 0 } }
    }

    /// Constructs a new date with time
    pub fn with_time(year: i16, month: u8, day: u8, hour: u8, min: u8, sec: u8, ctx: &'a dyn Ctx) -> Self {
        Self { ctx, date: OCIDate { year, month, day, hour, min, sec } }
    }

    pub(crate) fn from_oci(date: OCIDate, ctx: &'a dyn Ctx) -> Self {
        Self { ctx, date }
    }

    pub(crate) fn as_oci(&self) -> &OCIDate {
        &self.date
    }

    pub(crate) fn as_oci_mut(&mut self) -> &mut OCIDate {
        &mut self.date
    }

    /**
        Converts a character string to a date type according to the specified format.
        An empty format uses the context's date format.

        # Example

        ```no_run
        let env = oracall::env()?;
        let date = oracall::Date::from_string("July 4, 1776", "MONTH DD, YYYY", &env)?;
        let (y, m, d) = date.date();

        assert_eq!(1776, y);
        assert_eq!(   7, m);
        assert_eq!(   4, d);
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn from_string(txt: &str, fmt: &str, ctx: &'a dyn Ctx) -> Result<Self> {
        let fmt = if fmt.is_empty() { ctx.format(FormatKind::Date) } else { fmt.to_string() };
        let mut date = OCIDate::default();
        catch!{ctx.err_ptr() =>
            OCIDateFromText(
                ctx.err_ptr(),
                txt.as_ptr(), txt.len() as u32,
                fmt.as_ptr(), fmt.len() as u8,
                ptr::null(), 0,
                &mut date
            )
        }
        Ok( Self { ctx, date } )
    }

    /// Constructs a new date from the client's system clock.
    pub fn now(ctx: &'a dyn Ctx) -> Result<Self> {
        let mut date = OCIDate::default();
        catch!{ctx.err_ptr() =>
            OCIDateSysDate(ctx.err_ptr(), &mut date)
        }
        Ok( Self { ctx, date } )
    }

    /// Returns the year, month and day of the date
    pub fn date(&self) -> (i16, u8, u8) {
        (self.date.year, self.date.month, self.date.day)
    }

    /// Returns the hour, minute and second of the date
    pub fn time(&self) -> (u8, u8, u8) {
        (self.date.hour, self.date.min, self.date.sec)
    }

    pub fn date_and_time(&self) -> (i16, u8, u8, u8, u8, u8) {
        let d = &self.date;
        (d.year, d.month, d.day, d.hour, d.min, d.sec)
    }

    pub fn set_date(&mut self, year: i16, month: u8, day: u8) {
        self.date.year = year;
        self.date.month = month;
        self.date.day = day;
    }

    pub fn set_time(&mut self, hour: u8, min: u8, sec: u8) {
        self.date.hour = hour;
        self.date.min = min;
        self.date.sec = sec;
    }

    /**
        Returns a string according to the specified format. An empty format uses
        the context's date format.

        # Example

        ```no_run
        let env = oracall::env()?;
        let date = oracall::Date::with_time(1969, 7, 20, 20, 17, 40, &env);
        let txt = date.to_string("Dy Mon DD, YYYY HH24:MI")?;

        assert_eq!(txt, "Sun Jul 20, 1969 20:17");
        # Ok::<(),oracall::Error>(())
        ```
    */
    pub fn to_string(&self, fmt: &str) -> Result<String> {
        let fmt = if fmt.is_empty() { self.ctx.format(FormatKind::Date) } else { fmt.to_string() };
        let mut txt = [0u8; 128];
        let mut txt_len = txt.len() as u32;
        catch!{self.ctx.err_ptr() =>
            OCIDateToText(
                self.ctx.err_ptr(), &self.date,
                fmt.as_ptr(), fmt.len() as u8,
                ptr::null(), 0,
                &mut txt_len, txt.as_mut_ptr()
            )
        }
        Ok( text_from(&txt, txt_len as usize) )
    }

    /// Adds or subtracts days from this date
    pub fn add_days(&self, num: i32) -> Result<Self> {
        let mut date = OCIDate::default();
        catch!{self.ctx.err_ptr() =>
            OCIDateAddDays(self.ctx.err_ptr(), &self.date, num, &mut date)
        }
        Ok( Self { ctx: self.ctx, date } )
    }

    /// Adds or subtracts months from this date. When the day of the month does not
    /// exist in the resulting month the last day of that month is used.
    pub fn add_months(&self, num: i32) -> Result<Self> {
        let mut date = OCIDate::default();
        catch!{self.ctx.err_ptr() =>
            OCIDateAddMonths(self.ctx.err_ptr(), &self.date, num, &mut date)
        }
        Ok( Self { ctx: self.ctx, date } )
    }

    /// Compares this date with the `other` one.
    pub fn compare(&self, other: &Date) -> Result<Ordering> {
        let mut res = 0i32;
        catch!{self.ctx.err_ptr() =>
            OCIDateCompare(self.ctx.err_ptr(), &self.date, &other.date, &mut res)
        }
        Ok( res.cmp(&0) )
    }

    /// Returns the number of days between this date and the `other` one.
    /// The result is negative when this date is earlier.
    pub fn days_from(&self, other: &Date) -> Result<i32> {
        let mut res = 0i32;
        catch!{self.ctx.err_ptr() =>
            OCIDateDaysBetween(self.ctx.err_ptr(), &self.date, &other.date, &mut res)
        }
        Ok( res )
    }

    /// Returns the last day of the month of this date
    pub fn month_last_day(&self) -> Result<Self> {
        let mut date = OCIDate::default();
        catch!{self.ctx.err_ptr() =>
            OCIDateLastDay(self.ctx.err_ptr(), &self.date, &mut date)
        }
        Ok( Self { ctx: self.ctx, date } )
    }

    /**
        Returns the date of the first weekday named by `weekday` that is later than this date.
        The weekday name is in the language of the session (e.g. "MONDAY").
    */
    pub fn next_week_day(&self, weekday: &str) -> Result<Self> {
        let mut date = OCIDate::default();
        catch!{self.ctx.err_ptr() =>
            OCIDateNextDay(self.ctx.err_ptr(), &self.date, weekday.as_ptr(), weekday.len() as u32, &mut date)
        }
        Ok( Self { ctx: self.ctx, date } )
    }

    /// Converts this date from the time zone `from_zone` to `to_zone` (e.g. "EST" to "GMT").
    pub fn zone_to_zone(&self, from_zone: &str, to_zone: &str) -> Result<Self> {
        let mut date = OCIDate::default();
        catch!{self.ctx.err_ptr() =>
            OCIDateZoneToZone(
                self.ctx.err_ptr(), &self.date,
                from_zone.as_ptr(), from_zone.len() as u32,
                to_zone.as_ptr(), to_zone.len() as u32,
                &mut date
            )
        }
        Ok( Self { ctx: self.ctx, date } )
    }

    /// Checks whether this is a valid date.
    pub fn is_valid(&self) -> Result<bool> {
        let mut invalid = 0u32;
        catch!{self.ctx.err_ptr() =>
            OCIDateCheck(self.ctx.err_ptr(), &self.date, &mut invalid)
        }
        Ok( invalid == 0 )
    }

    /// Fails with `ArgInvalidValue` when the date is not valid.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.is_valid()? {
            Ok(())
        } else {
            Err( Error::lib(LibError::ArgInvalidValue("date")) )
        }
    }
}

impl fmt::Display for Date<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_string("") {
            Ok(txt) => f.write_str(&txt),
            Err(_) => Err(fmt::Error),
        }
    }
}
