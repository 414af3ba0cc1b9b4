//! C ABI for the ephemeris facade.
//!
//! Every query takes an optional data-source path as a byte range
//! (`NULL` or zero length selects the built-in model) and writes its result
//! into a caller-owned `double` buffer in the fixed layout of
//! [`ephq_query::encode`]. A failed call writes nothing. Rise, set and
//! transit return a bare Julian Date with [`EPHQ_NO_EVENT`] on failure.
//!
//! The facade must be initialized first, with [`ephq_init`] or from Rust
//! through [`ephq_rs::init_with_engine`].

use std::cell::RefCell;
use std::os::raw::c_char;
use std::path::PathBuf;

use ephq_config::EphqConfig;
use ephq_core::{
    Atmosphere, BodyId, DataSource, Engine, EphemerisError, GeoLocation, HorizonEvent,
    SearchDirection, Session,
};
use ephq_query::{
    FlatLayout, GlobalEclipse, GroundPoint, LocalLunarEclipse, LocalOccultation,
    LocalSolarEclipse, PositionResult,
};
use ephq_rs::EphqError;
use ephq_time::{EngineDateString, JulianDatePair, UtcTime};

/// ABI version for downstream bindings.
pub const EPHQ_API_VERSION: u32 = 1;

/// Returned by rise/set/transit when no event could be found.
pub const EPHQ_NO_EVENT: f64 = -1.0;

/// Output lengths, in `double`s.
pub const EPHQ_JULIAN_PAIR_LEN: usize = <JulianDatePair as FlatLayout>::LEN;
pub const EPHQ_POSITION_LEN: usize = <PositionResult as FlatLayout>::LEN;
pub const EPHQ_GLOBAL_EVENT_LEN: usize = <GlobalEclipse as FlatLayout>::LEN;
pub const EPHQ_SOLAR_LOCAL_LEN: usize = <LocalSolarEclipse as FlatLayout>::LEN;
pub const EPHQ_GROUND_POINT_LEN: usize = <GroundPoint as FlatLayout>::LEN;
pub const EPHQ_LUNAR_LOCAL_LEN: usize = <LocalLunarEclipse as FlatLayout>::LEN;
pub const EPHQ_OCCULT_LOCAL_LEN: usize = <LocalOccultation as FlatLayout>::LEN;

/// C-facing status codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EphqStatus {
    Ok = 0,
    Conversion = 1,
    Engine = 2,
    NullPointer = 3,
    InvalidArgument = 4,
    NotInitialized = 5,
    BufferTooSmall = 6,
    Internal = 255,
}

impl EphqStatus {
    /// Fallback text for [`ephq_last_error`] when no richer error was recorded.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Ok => "",
            Self::Conversion => "conversion error",
            Self::Engine => "engine error",
            Self::NullPointer => "null pointer argument",
            Self::InvalidArgument => "invalid argument",
            Self::NotInitialized => "ephemeris not initialized",
            Self::BufferTooSmall => "output buffer too small",
            Self::Internal => "internal error",
        }
    }
}

impl From<&EphqError> for EphqStatus {
    fn from(value: &EphqError) -> Self {
        match value {
            EphqError::NotInitialized => Self::NotInitialized,
            EphqError::AlreadyInitialized | EphqError::Config(_) => Self::InvalidArgument,
            EphqError::Backend(_) => Self::Engine,
            EphqError::Ephemeris(EphemerisError::Conversion(_)) => Self::Conversion,
            EphqError::Ephemeris(EphemerisError::Engine(_)) => Self::Engine,
            _ => Self::Internal,
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Remember `err` for [`ephq_last_error`] and map it to a status.
fn record(err: &EphqError) -> EphqStatus {
    LAST_ERROR.with(|last| *last.borrow_mut() = err.to_string());
    EphqStatus::from(err)
}

fn clear_last_error() {
    LAST_ERROR.with(|last| last.borrow_mut().clear());
}

/// Give a failed call a message if [`record`] did not already.
fn note(status: EphqStatus) {
    LAST_ERROR.with(|last| {
        let mut last = last.borrow_mut();
        if last.is_empty() {
            *last = status.describe().to_string();
        }
    });
}

fn catch<T>(f: impl FnOnce() -> Result<T, EphqStatus>) -> Result<T, EphqStatus> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)).unwrap_or_else(|_| {
        log::error!("panic caught at the C boundary");
        Err(EphqStatus::Internal)
    })
}

/// Every failing call leaves its own message behind, never an older one.
fn ffi_boundary(f: impl FnOnce() -> Result<(), EphqStatus>) -> EphqStatus {
    clear_last_error();
    match catch(f) {
        Ok(()) => EphqStatus::Ok,
        Err(status) => {
            note(status);
            status
        }
    }
}

/// Like [`ffi_boundary`] for calls whose only channel is a bare `double`.
fn sentinel_boundary(f: impl FnOnce() -> Result<f64, EphqStatus>) -> f64 {
    clear_last_error();
    catch(f).unwrap_or_else(|status| {
        note(status);
        EPHQ_NO_EVENT
    })
}

/// Run `f` in a session on `source` against the initialized facade.
fn with_session<T>(
    source: &DataSource,
    f: impl FnOnce(&mut Session<'_, Box<dyn Engine>>) -> ephq_core::Result<T>,
) -> Result<T, EphqError> {
    Ok(ephq_rs::ephemeris()?.with_session_using(source, f)?)
}

// ---------------------------------------------------------------------------
// Argument decoding
// ---------------------------------------------------------------------------

/// Decode the optional data-source path.
///
/// On unix the bytes are taken as-is; elsewhere they must be UTF-8.
///
/// # Safety
/// `ptr` must be null or valid for `len` bytes.
unsafe fn data_source(ptr: *const u8, len: usize) -> Result<DataSource, EphqStatus> {
    if ptr.is_null() || len == 0 {
        return Ok(DataSource::BuiltIn);
    }
    // SAFETY: Caller guarantees `len` readable bytes at `ptr`.
    let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
    Ok(DataSource::from_path(Some(&path_from_bytes(bytes)?)))
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> Result<PathBuf, EphqStatus> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    Ok(PathBuf::from(OsStr::from_bytes(bytes)))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> Result<PathBuf, EphqStatus> {
    let text = std::str::from_utf8(bytes).map_err(|_| {
        log::warn!("rejected non-UTF-8 ephemeris path");
        EphqStatus::InvalidArgument
    })?;
    Ok(PathBuf::from(text))
}

/// Read the `[lon, lat, alt]` triple.
///
/// # Safety
/// `ptr` must be null or point to three readable doubles.
unsafe fn geo_location(ptr: *const f64) -> Result<GeoLocation, EphqStatus> {
    if ptr.is_null() {
        return Err(EphqStatus::NullPointer);
    }
    // SAFETY: Pointer is checked for null above; caller guarantees 3 values.
    let v = unsafe { std::slice::from_raw_parts(ptr, 3) };
    Ok(GeoLocation::new(v[0], v[1], v[2]))
}

fn direction(code: i32) -> Result<SearchDirection, EphqStatus> {
    SearchDirection::from_code(code).ok_or_else(|| {
        log::warn!("rejected search direction {code}");
        EphqStatus::InvalidArgument
    })
}

/// Flatten `value` into `out`.
///
/// # Safety
/// `out` must be valid for `out_len` writable doubles.
unsafe fn write_out<L: FlatLayout>(
    value: &L,
    out: *mut f64,
    out_len: usize,
) -> Result<(), EphqStatus> {
    if out_len < L::LEN {
        return Err(EphqStatus::BufferTooSmall);
    }
    // SAFETY: Caller checked `out` for null and guarantees `out_len` slots.
    let slots = unsafe { std::slice::from_raw_parts_mut(out, out_len) };
    value
        .write_flat(slots)
        .map(|_| ())
        .map_err(|_| EphqStatus::BufferTooSmall)
}

/// Copy `text` plus a terminating NUL into `out`.
///
/// # Safety
/// `out` must be valid for `capacity` writable bytes.
unsafe fn write_c_string(text: &str, out: *mut c_char, capacity: usize) -> Result<(), EphqStatus> {
    if out.is_null() {
        return Err(EphqStatus::NullPointer);
    }
    let bytes = text.as_bytes();
    if bytes.len() >= capacity {
        return Err(EphqStatus::BufferTooSmall);
    }
    // SAFETY: Pointer is checked for null above; len + 1 <= capacity.
    let dst = unsafe { std::slice::from_raw_parts_mut(out.cast::<u8>(), bytes.len() + 1) };
    dst[..bytes.len()].copy_from_slice(bytes);
    dst[bytes.len()] = 0;
    Ok(())
}

// ---------------------------------------------------------------------------
// Safe entry points (shared by the C functions and Rust callers)
// ---------------------------------------------------------------------------

pub fn ephq_utc_to_jd_internal(
    source: &DataSource,
    utc: &UtcTime,
) -> Result<JulianDatePair, EphqError> {
    with_session(source, |s| ephq_query::calendar_to_julian(s, utc))
}

pub fn ephq_jd_to_utc_internal(
    source: &DataSource,
    jd_ut1: f64,
) -> Result<EngineDateString, EphqError> {
    with_session(source, |s| Ok(ephq_query::julian_to_calendar(s, jd_ut1)))
}

pub fn ephq_position_internal(
    source: &DataSource,
    body: BodyId,
    jd_tt: f64,
    jd_ut1: f64,
    location: &GeoLocation,
    atmosphere: &Atmosphere,
) -> Result<PositionResult, EphqError> {
    with_session(source, |s| {
        ephq_query::compute_position(s, body, jd_tt, jd_ut1, location, atmosphere)
    })
}

pub fn ephq_position_live_internal(
    source: &DataSource,
    body: BodyId,
    jd_ut1: f64,
    location: &GeoLocation,
    atmosphere: &Atmosphere,
) -> Result<PositionResult, EphqError> {
    with_session(source, |s| {
        ephq_query::compute_position_ut(s, body, jd_ut1, location, atmosphere)
    })
}

pub fn ephq_event_internal(
    source: &DataSource,
    body: BodyId,
    jd_ut1: f64,
    location: &GeoLocation,
    atmosphere: &Atmosphere,
    event: HorizonEvent,
) -> Result<f64, EphqError> {
    with_session(source, |s| {
        ephq_query::find_event(s, body, jd_ut1, location, atmosphere, event)
    })
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Return the ABI version of this library.
#[unsafe(no_mangle)]
pub extern "C" fn ephq_api_version() -> u32 {
    EPHQ_API_VERSION
}

/// Initialize the facade with the Swiss Ephemeris backend.
///
/// The path becomes the default data source of Rust-side convenience
/// calls; C calls always pass their own.
///
/// # Safety
/// `ephe_path` must be null or valid for `ephe_path_len` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_init(ephe_path: *const u8, ephe_path_len: usize) -> EphqStatus {
    ffi_boundary(|| {
        // SAFETY: Forwarded caller contract.
        let source = unsafe { data_source(ephe_path, ephe_path_len) }?;
        let config = EphqConfig {
            ephe_path: source.path().map(PathBuf::from),
            ..EphqConfig::default()
        };
        ephq_rs::init(&config).map_err(|e| record(&e))
    })
}

/// `1` once the facade is initialized, else `0`.
#[unsafe(no_mangle)]
pub extern "C" fn ephq_is_initialized() -> u8 {
    u8::from(ephq_rs::is_initialized())
}

/// Copy the calling thread's last error message, NUL-terminated.
///
/// # Safety
/// `out` must be valid for `capacity` writable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_last_error(out: *mut c_char, capacity: usize) -> EphqStatus {
    let copied = catch(|| {
        LAST_ERROR.with(|last| {
            // SAFETY: Forwarded caller contract.
            unsafe { write_c_string(&last.borrow(), out, capacity) }
        })
    });
    copied.err().unwrap_or(EphqStatus::Ok)
}

// ---------------------------------------------------------------------------
// Time conversion
// ---------------------------------------------------------------------------

/// Gregorian UTC → `[tt, ut1]`.
///
/// # Safety
/// `ephe_path` must be null or valid for `ephe_path_len` bytes; `out` must
/// be valid for `out_len` doubles.
#[allow(clippy::too_many_arguments)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_utc_to_jd(
    ephe_path: *const u8,
    ephe_path_len: usize,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: f64,
    out: *mut f64,
    out_len: usize,
) -> EphqStatus {
    ffi_boundary(|| {
        if out.is_null() {
            return Err(EphqStatus::NullPointer);
        }
        // SAFETY: Forwarded caller contract.
        let source = unsafe { data_source(ephe_path, ephe_path_len) }?;
        let utc = UtcTime::new(year, month, day, hour, minute, second);
        let pair = ephq_utc_to_jd_internal(&source, &utc).map_err(|e| record(&e))?;
        // SAFETY: `out` checked for null above.
        unsafe { write_out(&pair, out, out_len) }
    })
}

/// UT1 Julian Date → `_Y_M_D_H_Mi_S.s_`, NUL-terminated.
///
/// # Safety
/// `ephe_path` must be null or valid for `ephe_path_len` bytes; `out` must
/// be valid for `capacity` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_jd_to_utc(
    ephe_path: *const u8,
    ephe_path_len: usize,
    jd_ut1: f64,
    out: *mut c_char,
    capacity: usize,
) -> EphqStatus {
    ffi_boundary(|| {
        if out.is_null() {
            return Err(EphqStatus::NullPointer);
        }
        // SAFETY: Forwarded caller contract.
        let source = unsafe { data_source(ephe_path, ephe_path_len) }?;
        let text = ephq_jd_to_utc_internal(&source, jd_ut1).map_err(|e| record(&e))?;
        // SAFETY: Forwarded caller contract.
        unsafe { write_c_string(text.as_str(), out, capacity) }
    })
}

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// Topocentric position: `[ra, dec, distance, azimuth, altitude, magnitude]`.
///
/// # Safety
/// `ephe_path` must be null or valid for `ephe_path_len` bytes; `geopos`
/// must point to three doubles; `out` must be valid for `out_len` doubles.
#[allow(clippy::too_many_arguments)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_position(
    ephe_path: *const u8,
    ephe_path_len: usize,
    body: i32,
    jd_tt: f64,
    jd_ut1: f64,
    geopos: *const f64,
    pressure_hpa: f64,
    temperature_c: f64,
    out: *mut f64,
    out_len: usize,
) -> EphqStatus {
    ffi_boundary(|| {
        if out.is_null() {
            return Err(EphqStatus::NullPointer);
        }
        // SAFETY: Forwarded caller contract.
        let source = unsafe { data_source(ephe_path, ephe_path_len) }?;
        // SAFETY: Forwarded caller contract.
        let location = unsafe { geo_location(geopos) }?;
        let atmosphere = Atmosphere::new(pressure_hpa, temperature_c);
        let pos = ephq_position_internal(
            &source,
            BodyId(body),
            jd_tt,
            jd_ut1,
            &location,
            &atmosphere,
        )
        .map_err(|e| record(&e))?;
        // SAFETY: `out` checked for null above.
        unsafe { write_out(&pos, out, out_len) }
    })
}

/// Position from UT1 alone; same layout as [`ephq_position`].
///
/// # Safety
/// Same contract as [`ephq_position`].
#[allow(clippy::too_many_arguments)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_position_live(
    ephe_path: *const u8,
    ephe_path_len: usize,
    body: i32,
    jd_ut1: f64,
    geopos: *const f64,
    pressure_hpa: f64,
    temperature_c: f64,
    out: *mut f64,
    out_len: usize,
) -> EphqStatus {
    ffi_boundary(|| {
        if out.is_null() {
            return Err(EphqStatus::NullPointer);
        }
        // SAFETY: Forwarded caller contract.
        let source = unsafe { data_source(ephe_path, ephe_path_len) }?;
        // SAFETY: Forwarded caller contract.
        let location = unsafe { geo_location(geopos) }?;
        let atmosphere = Atmosphere::new(pressure_hpa, temperature_c);
        let pos =
            ephq_position_live_internal(&source, BodyId(body), jd_ut1, &location, &atmosphere)
                .map_err(|e| record(&e))?;
        // SAFETY: `out` checked for null above.
        unsafe { write_out(&pos, out, out_len) }
    })
}

// ---------------------------------------------------------------------------
// Rise / set / transit
// ---------------------------------------------------------------------------

/// # Safety
/// `ephe_path` must be null or valid for `ephe_path_len` bytes; `geopos`
/// must point to three doubles.
unsafe fn horizon_event(
    ephe_path: *const u8,
    ephe_path_len: usize,
    body: i32,
    jd_ut1: f64,
    geopos: *const f64,
    atmosphere: Atmosphere,
    event: HorizonEvent,
) -> f64 {
    sentinel_boundary(|| {
        // SAFETY: Forwarded caller contract.
        let source = unsafe { data_source(ephe_path, ephe_path_len) }?;
        // SAFETY: Forwarded caller contract.
        let location = unsafe { geo_location(geopos) }?;
        ephq_event_internal(&source, BodyId(body), jd_ut1, &location, &atmosphere, event)
            .map_err(|e| {
                log::error!("{event:?} search for body {body} at {jd_ut1} failed: {e}");
                record(&e)
            })
    })
}

/// Next rise after `jd_ut1`, or [`EPHQ_NO_EVENT`].
///
/// # Safety
/// `ephe_path` must be null or valid for `ephe_path_len` bytes; `geopos`
/// must point to three doubles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_rise(
    ephe_path: *const u8,
    ephe_path_len: usize,
    body: i32,
    jd_ut1: f64,
    geopos: *const f64,
    pressure_hpa: f64,
    temperature_c: f64,
) -> f64 {
    let atmosphere = Atmosphere::new(pressure_hpa, temperature_c);
    // SAFETY: Forwarded caller contract.
    unsafe {
        horizon_event(ephe_path, ephe_path_len, body, jd_ut1, geopos, atmosphere, HorizonEvent::Rise)
    }
}

/// Next set after `jd_ut1`, or [`EPHQ_NO_EVENT`].
///
/// # Safety
/// Same contract as [`ephq_rise`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_set(
    ephe_path: *const u8,
    ephe_path_len: usize,
    body: i32,
    jd_ut1: f64,
    geopos: *const f64,
    pressure_hpa: f64,
    temperature_c: f64,
) -> f64 {
    let atmosphere = Atmosphere::new(pressure_hpa, temperature_c);
    // SAFETY: Forwarded caller contract.
    unsafe {
        horizon_event(ephe_path, ephe_path_len, body, jd_ut1, geopos, atmosphere, HorizonEvent::Set)
    }
}

/// Next upper meridian transit after `jd_ut1`, or [`EPHQ_NO_EVENT`].
///
/// # Safety
/// Same contract as [`ephq_rise`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_transit(
    ephe_path: *const u8,
    ephe_path_len: usize,
    body: i32,
    jd_ut1: f64,
    geopos: *const f64,
) -> f64 {
    // SAFETY: Forwarded caller contract.
    unsafe {
        horizon_event(
            ephe_path,
            ephe_path_len,
            body,
            jd_ut1,
            geopos,
            Atmosphere::default(),
            HorizonEvent::Transit,
        )
    }
}

// ---------------------------------------------------------------------------
// Eclipses and occultations
// ---------------------------------------------------------------------------

/// Global solar eclipse: 9 doubles.
///
/// # Safety
/// `ephe_path` must be null or valid for `ephe_path_len` bytes; `out` must
/// be valid for `out_len` doubles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_solar_global(
    ephe_path: *const u8,
    ephe_path_len: usize,
    jd_ut1: f64,
    direction_code: i32,
    out: *mut f64,
    out_len: usize,
) -> EphqStatus {
    ffi_boundary(|| {
        if out.is_null() {
            return Err(EphqStatus::NullPointer);
        }
        // SAFETY: Forwarded caller contract.
        let source = unsafe { data_source(ephe_path, ephe_path_len) }?;
        let dir = direction(direction_code)?;
        let found = with_session(&source, |s| ephq_query::search_solar_global(s, jd_ut1, dir))
            .map_err(|e| record(&e))?;
        // SAFETY: `out` checked for null above.
        unsafe { write_out(&found, out, out_len) }
    })
}

/// Local solar eclipse: 19 doubles.
///
/// # Safety
/// `ephe_path` must be null or valid for `ephe_path_len` bytes; `geopos`
/// must point to three doubles; `out` must be valid for `out_len` doubles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_solar_local(
    ephe_path: *const u8,
    ephe_path_len: usize,
    jd_ut1: f64,
    geopos: *const f64,
    direction_code: i32,
    out: *mut f64,
    out_len: usize,
) -> EphqStatus {
    ffi_boundary(|| {
        if out.is_null() {
            return Err(EphqStatus::NullPointer);
        }
        // SAFETY: Forwarded caller contract.
        let source = unsafe { data_source(ephe_path, ephe_path_len) }?;
        // SAFETY: Forwarded caller contract.
        let location = unsafe { geo_location(geopos) }?;
        let dir = direction(direction_code)?;
        let found = with_session(&source, |s| {
            ephq_query::search_solar_local(s, jd_ut1, &location, dir)
        })
        .map_err(|e| record(&e))?;
        // SAFETY: `out` checked for null above.
        unsafe { write_out(&found, out, out_len) }
    })
}

/// Central-line point of a solar eclipse at `jd_ut1`: `[lon, lat]`.
///
/// # Safety
/// `ephe_path` must be null or valid for `ephe_path_len` bytes; `out` must
/// be valid for `out_len` doubles.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_solar_where(
    ephe_path: *const u8,
    ephe_path_len: usize,
    jd_ut1: f64,
    out: *mut f64,
    out_len: usize,
) -> EphqStatus {
    ffi_boundary(|| {
        if out.is_null() {
            return Err(EphqStatus::NullPointer);
        }
        // SAFETY: Forwarded caller contract.
        let source = unsafe { data_source(ephe_path, ephe_path_len) }?;
        let point = with_session(&source, |s| ephq_query::solar_eclipse_ground_point(s, jd_ut1))
            .map_err(|e| record(&e))?;
        // SAFETY: `out` checked for null above.
        unsafe { write_out(&point, out, out_len) }
    })
}

/// Global lunar eclipse: 9 doubles.
///
/// # Safety
/// Same contract as [`ephq_solar_global`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_lunar_global(
    ephe_path: *const u8,
    ephe_path_len: usize,
    jd_ut1: f64,
    direction_code: i32,
    out: *mut f64,
    out_len: usize,
) -> EphqStatus {
    ffi_boundary(|| {
        if out.is_null() {
            return Err(EphqStatus::NullPointer);
        }
        // SAFETY: Forwarded caller contract.
        let source = unsafe { data_source(ephe_path, ephe_path_len) }?;
        let dir = direction(direction_code)?;
        let found = with_session(&source, |s| ephq_query::search_lunar_global(s, jd_ut1, dir))
            .map_err(|e| record(&e))?;
        // SAFETY: `out` checked for null above.
        unsafe { write_out(&found, out, out_len) }
    })
}

/// Local lunar eclipse: 22 doubles.
///
/// # Safety
/// Same contract as [`ephq_solar_local`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_lunar_local(
    ephe_path: *const u8,
    ephe_path_len: usize,
    jd_ut1: f64,
    geopos: *const f64,
    direction_code: i32,
    out: *mut f64,
    out_len: usize,
) -> EphqStatus {
    ffi_boundary(|| {
        if out.is_null() {
            return Err(EphqStatus::NullPointer);
        }
        // SAFETY: Forwarded caller contract.
        let source = unsafe { data_source(ephe_path, ephe_path_len) }?;
        // SAFETY: Forwarded caller contract.
        let location = unsafe { geo_location(geopos) }?;
        let dir = direction(direction_code)?;
        let found = with_session(&source, |s| {
            ephq_query::search_lunar_local(s, jd_ut1, &location, dir)
        })
        .map_err(|e| record(&e))?;
        // SAFETY: `out` checked for null above.
        unsafe { write_out(&found, out, out_len) }
    })
}

/// Global lunar occultation of `body`: 9 doubles.
///
/// # Safety
/// Same contract as [`ephq_solar_global`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_occult_global(
    ephe_path: *const u8,
    ephe_path_len: usize,
    jd_ut1: f64,
    body: i32,
    direction_code: i32,
    out: *mut f64,
    out_len: usize,
) -> EphqStatus {
    ffi_boundary(|| {
        if out.is_null() {
            return Err(EphqStatus::NullPointer);
        }
        // SAFETY: Forwarded caller contract.
        let source = unsafe { data_source(ephe_path, ephe_path_len) }?;
        let dir = direction(direction_code)?;
        let found = with_session(&source, |s| {
            ephq_query::search_occultation_global(s, jd_ut1, BodyId(body), dir)
        })
        .map_err(|e| record(&e))?;
        // SAFETY: `out` checked for null above.
        unsafe { write_out(&found, out, out_len) }
    })
}

/// Local lunar occultation of `body`: 15 doubles.
///
/// # Safety
/// Same contract as [`ephq_solar_local`].
#[allow(clippy::too_many_arguments)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ephq_occult_local(
    ephe_path: *const u8,
    ephe_path_len: usize,
    jd_ut1: f64,
    geopos: *const f64,
    body: i32,
    direction_code: i32,
    out: *mut f64,
    out_len: usize,
) -> EphqStatus {
    ffi_boundary(|| {
        if out.is_null() {
            return Err(EphqStatus::NullPointer);
        }
        // SAFETY: Forwarded caller contract.
        let source = unsafe { data_source(ephe_path, ephe_path_len) }?;
        // SAFETY: Forwarded caller contract.
        let location = unsafe { geo_location(geopos) }?;
        let dir = direction(direction_code)?;
        let found = with_session(&source, |s| {
            ephq_query::search_occultation_local(s, jd_ut1, &location, BodyId(body), dir)
        })
        .map_err(|e| record(&e))?;
        // SAFETY: `out` checked for null above.
        unsafe { write_out(&found, out, out_len) }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_stable() {
        assert_eq!(EphqStatus::Ok as i32, 0);
        assert_eq!(EphqStatus::Engine as i32, 2);
        assert_eq!(EphqStatus::BufferTooSmall as i32, 6);
        assert_eq!(EphqStatus::Internal as i32, 255);
    }

    #[test]
    fn error_kinds_map_to_status() {
        let conv = EphqError::Ephemeris(EphemerisError::Conversion("bad day".into()));
        let eng = EphqError::Ephemeris(EphemerisError::Engine("no event found".into()));
        assert_eq!(EphqStatus::from(&conv), EphqStatus::Conversion);
        assert_eq!(EphqStatus::from(&eng), EphqStatus::Engine);
        assert_eq!(
            EphqStatus::from(&EphqError::NotInitialized),
            EphqStatus::NotInitialized
        );
    }

    #[test]
    fn null_or_empty_path_is_built_in() {
        assert_eq!(
            unsafe { data_source(std::ptr::null(), 12) },
            Ok(DataSource::BuiltIn)
        );
        let path = b"/usr/share/ephe";
        assert_eq!(unsafe { data_source(path.as_ptr(), 0) }, Ok(DataSource::BuiltIn));
        assert_eq!(
            unsafe { data_source(path.as_ptr(), path.len()) },
            Ok(DataSource::Bundled("/usr/share/ephe".into()))
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_path_kept_byte_for_byte() {
        use std::os::unix::ffi::OsStrExt;

        let path = [0x2f, 0xff, 0xfe];
        let Ok(DataSource::Bundled(dir)) = (unsafe { data_source(path.as_ptr(), path.len()) })
        else {
            panic!("raw bytes should name a bundled directory");
        };
        assert_eq!(dir.as_os_str().as_bytes(), &path);
    }

    #[cfg(not(unix))]
    #[test]
    fn non_utf8_path_rejected() {
        let path = [0x2f, 0xff, 0xfe];
        assert_eq!(
            unsafe { data_source(path.as_ptr(), path.len()) },
            Err(EphqStatus::InvalidArgument)
        );
    }

    fn last_message() -> String {
        LAST_ERROR.with(|last| last.borrow().clone())
    }

    #[test]
    fn every_failure_replaces_the_last_message() {
        let status = ffi_boundary(|| Err(record(&EphqError::NotInitialized)));
        assert_eq!(status, EphqStatus::NotInitialized);
        assert_eq!(last_message(), EphqError::NotInitialized.to_string());

        assert_eq!(ffi_boundary(|| Err(EphqStatus::NullPointer)), EphqStatus::NullPointer);
        assert_eq!(last_message(), "null pointer argument");

        assert_eq!(
            sentinel_boundary(|| Err(EphqStatus::InvalidArgument)),
            EPHQ_NO_EVENT
        );
        assert_eq!(last_message(), "invalid argument");

        assert_eq!(ffi_boundary(|| Ok(())), EphqStatus::Ok);
        assert_eq!(last_message(), "");
    }

    #[test]
    fn panic_is_internal_with_message() {
        let status = ffi_boundary(|| panic!("boom"));
        assert_eq!(status, EphqStatus::Internal);
        assert_eq!(last_message(), "internal error");
    }

    #[test]
    fn direction_codes() {
        assert_eq!(direction(0), Ok(SearchDirection::Forward));
        assert_eq!(direction(1), Ok(SearchDirection::Backward));
        assert_eq!(direction(2), Err(EphqStatus::InvalidArgument));
    }

    #[test]
    fn short_buffer_is_rejected_untouched() {
        let pos = PositionResult {
            right_ascension_deg: 1.0,
            declination_deg: 2.0,
            distance_au: 3.0,
            azimuth_deg: 4.0,
            altitude_deg: 5.0,
            magnitude: 6.0,
        };
        let mut out = [9.0; 5];
        let r = unsafe { write_out(&pos, out.as_mut_ptr(), out.len()) };
        assert_eq!(r, Err(EphqStatus::BufferTooSmall));
        assert_eq!(out, [9.0; 5]);
    }

    #[test]
    fn c_string_needs_room_for_nul() {
        let mut buf = [1 as c_char; 4];
        assert_eq!(
            unsafe { write_c_string("abcd", buf.as_mut_ptr(), buf.len()) },
            Err(EphqStatus::BufferTooSmall)
        );
        unsafe { write_c_string("abc", buf.as_mut_ptr(), buf.len()) }.unwrap();
        assert_eq!(buf[3], 0);
    }
}
