//! Safe [`Engine`] implementation over the raw bindings.

use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use ephq_core::{
    Atmosphere, BodyId, CalcFlags, DataSource, EclipseSearch, EclipseWhere, Engine, EngineFault,
    Epoch, GeoLocation, HorizonEvent, LocalEclipseSearch, SearchDirection, SearchMode,
};
use ephq_time::{JulianDatePair, UtcTime};

use crate::ffi;
use crate::{SweError, claim, release};

type ErrorBuffer = [c_char; ffi::AS_MAXCH];

/// Exclusive handle on the Swiss Ephemeris library state.
#[derive(Debug)]
pub struct SwissEphemeris {
    _private: (),
}

impl SwissEphemeris {
    /// Claim the library. Fails while another handle is alive.
    pub fn acquire() -> Result<Self, SweError> {
        claim()?;
        log::debug!("swiss ephemeris acquired");
        Ok(Self { _private: () })
    }
}

impl Drop for SwissEphemeris {
    fn drop(&mut self) {
        // SAFETY: no pointers are passed; swe_close is idempotent.
        unsafe { ffi::swe_close() };
        release();
        log::debug!("swiss ephemeris released");
    }
}

/// Engine error text, or a placeholder when the library left it empty.
fn fault(code: i32, serr: &ErrorBuffer) -> EngineFault {
    let bytes: Vec<u8> = serr
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    let message = String::from_utf8_lossy(&bytes).into_owned();
    if message.is_empty() {
        EngineFault::new(code, "unspecified engine error")
    } else {
        EngineFault::new(code, message)
    }
}

fn check(code: i32, serr: &ErrorBuffer) -> Result<(), EngineFault> {
    if code < 0 { Err(fault(code, serr)) } else { Ok(()) }
}

impl Engine for SwissEphemeris {
    fn set_data_source(&mut self, source: &DataSource) {
        let path = source.path().map(|p| CString::new(p.to_string_lossy().as_bytes()));
        match path {
            Some(Ok(path)) => {
                // SAFETY: path is NUL-terminated; the library copies it.
                unsafe { ffi::swe_set_ephe_path(path.as_ptr()) }
            }
            Some(Err(_)) => {
                log::warn!("ephemeris path contains a NUL byte, using the default path");
                // SAFETY: NULL selects the library default.
                unsafe { ffi::swe_set_ephe_path(ptr::null()) }
            }
            // SAFETY: NULL selects the library default.
            None => unsafe { ffi::swe_set_ephe_path(ptr::null()) },
        }
    }

    fn close(&mut self) {
        // SAFETY: no arguments.
        unsafe { ffi::swe_close() }
    }

    fn set_topocentric(&mut self, location: &GeoLocation) {
        // SAFETY: plain values.
        unsafe {
            ffi::swe_set_topo(
                location.longitude_deg,
                location.latitude_deg,
                location.altitude_m,
            )
        }
    }

    fn utc_to_jd(&mut self, t: &UtcTime) -> Result<JulianDatePair, EngineFault> {
        let mut dret = [0.0_f64; 2];
        let mut serr: ErrorBuffer = [0; ffi::AS_MAXCH];
        // SAFETY: dret holds two doubles and serr AS_MAXCH chars, as required.
        let code = unsafe {
            ffi::swe_utc_to_jd(
                t.year,
                t.month as i32,
                t.day as i32,
                t.hour as i32,
                t.minute as i32,
                t.second,
                ffi::SE_GREG_CAL,
                dret.as_mut_ptr(),
                serr.as_mut_ptr(),
            )
        };
        if code == ffi::ERR {
            return Err(fault(code, &serr));
        }
        Ok(JulianDatePair::from_engine_order(dret))
    }

    fn jd_ut1_to_utc(&mut self, jd_ut1: f64) -> UtcTime {
        let (mut y, mut mo, mut d, mut h, mut mi) = (0, 0, 0, 0, 0);
        let mut s = 0.0;
        // SAFETY: every out-pointer refers to a live local.
        unsafe {
            ffi::swe_jdut1_to_utc(
                jd_ut1,
                ffi::SE_GREG_CAL,
                &mut y,
                &mut mo,
                &mut d,
                &mut h,
                &mut mi,
                &mut s,
            )
        };
        UtcTime::new(y, mo as u32, d as u32, h as u32, mi as u32, s)
    }

    fn delta_t(&mut self, jd_ut1: f64) -> f64 {
        // SAFETY: plain value.
        unsafe { ffi::swe_deltat(jd_ut1) }
    }

    fn calc(
        &mut self,
        epoch: Epoch,
        body: BodyId,
        flags: CalcFlags,
    ) -> Result<[f64; 6], EngineFault> {
        let mut xx = [0.0_f64; 6];
        let mut serr: ErrorBuffer = [0; ffi::AS_MAXCH];
        // SAFETY: xx holds six doubles, serr AS_MAXCH chars.
        let code = unsafe {
            match epoch {
                Epoch::Ut1(jd) => ffi::swe_calc_ut(
                    jd,
                    body.code(),
                    flags.bits(),
                    xx.as_mut_ptr(),
                    serr.as_mut_ptr(),
                ),
                Epoch::Terrestrial(jd) => ffi::swe_calc(
                    jd,
                    body.code(),
                    flags.bits(),
                    xx.as_mut_ptr(),
                    serr.as_mut_ptr(),
                ),
            }
        };
        check(code, &serr)?;
        Ok(xx)
    }

    fn azalt(
        &mut self,
        jd_ut1: f64,
        location: &GeoLocation,
        atmosphere: &Atmosphere,
        equatorial: [f64; 3],
    ) -> [f64; 3] {
        let mut geopos = location.to_array();
        let mut xin = equatorial;
        let mut xaz = [0.0_f64; 3];
        // SAFETY: all three arrays hold three doubles.
        unsafe {
            ffi::swe_azalt(
                jd_ut1,
                ffi::SE_EQU2HOR,
                geopos.as_mut_ptr(),
                atmosphere.pressure_hpa,
                atmosphere.temperature_c,
                xin.as_mut_ptr(),
                xaz.as_mut_ptr(),
            )
        };
        xaz
    }

    fn pheno(
        &mut self,
        epoch: Epoch,
        body: BodyId,
        flags: CalcFlags,
    ) -> Result<[f64; 20], EngineFault> {
        let mut attr = [0.0_f64; 20];
        let mut serr: ErrorBuffer = [0; ffi::AS_MAXCH];
        // SAFETY: attr holds twenty doubles, serr AS_MAXCH chars.
        let code = unsafe {
            match epoch {
                Epoch::Ut1(jd) => ffi::swe_pheno_ut(
                    jd,
                    body.code(),
                    flags.bits(),
                    attr.as_mut_ptr(),
                    serr.as_mut_ptr(),
                ),
                Epoch::Terrestrial(jd) => ffi::swe_pheno(
                    jd,
                    body.code(),
                    flags.bits(),
                    attr.as_mut_ptr(),
                    serr.as_mut_ptr(),
                ),
            }
        };
        check(code, &serr)?;
        Ok(attr)
    }

    fn rise_trans(
        &mut self,
        jd_ut1: f64,
        body: BodyId,
        flags: CalcFlags,
        event: HorizonEvent,
        location: &GeoLocation,
        atmosphere: &Atmosphere,
    ) -> Result<Option<f64>, EngineFault> {
        let mut geopos = location.to_array();
        let mut tret = [0.0_f64; 10];
        let mut serr: ErrorBuffer = [0; ffi::AS_MAXCH];
        // SAFETY: starname may be NULL for planets; tret and serr are
        // large enough for any output the library writes.
        let code = unsafe {
            ffi::swe_rise_trans(
                jd_ut1,
                body.code(),
                ptr::null_mut(),
                flags.bits(),
                event.code(),
                geopos.as_mut_ptr(),
                atmosphere.pressure_hpa,
                atmosphere.temperature_c,
                tret.as_mut_ptr(),
                serr.as_mut_ptr(),
            )
        };
        match code {
            ffi::CIRCUMPOLAR => Ok(None),
            c if c < 0 => Err(fault(c, &serr)),
            _ => Ok(Some(tret[0])),
        }
    }

    fn sol_eclipse_when_glob(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        direction: SearchDirection,
    ) -> Result<EclipseSearch, EngineFault> {
        let mut tret = [0.0_f64; 10];
        let mut serr: ErrorBuffer = [0; ffi::AS_MAXCH];
        // SAFETY: tret holds ten doubles, serr AS_MAXCH chars.
        let class = unsafe {
            ffi::swe_sol_eclipse_when_glob(
                jd_ut1,
                flags.bits(),
                0,
                tret.as_mut_ptr(),
                direction.code(),
                serr.as_mut_ptr(),
            )
        };
        check(class, &serr)?;
        Ok(EclipseSearch { class, tret })
    }

    fn sol_eclipse_when_loc(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        location: &GeoLocation,
        direction: SearchDirection,
    ) -> Result<LocalEclipseSearch, EngineFault> {
        let mut geopos = location.to_array();
        let mut tret = [0.0_f64; 10];
        let mut attr = [0.0_f64; 20];
        let mut serr: ErrorBuffer = [0; ffi::AS_MAXCH];
        // SAFETY: buffer sizes match the library's documented minimums.
        let class = unsafe {
            ffi::swe_sol_eclipse_when_loc(
                jd_ut1,
                flags.bits(),
                geopos.as_mut_ptr(),
                tret.as_mut_ptr(),
                attr.as_mut_ptr(),
                direction.code(),
                serr.as_mut_ptr(),
            )
        };
        check(class, &serr)?;
        Ok(LocalEclipseSearch { class, tret, attr })
    }

    fn sol_eclipse_where(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
    ) -> Result<EclipseWhere, EngineFault> {
        let mut geopos = [0.0_f64; 10];
        let mut attr = [0.0_f64; 20];
        let mut serr: ErrorBuffer = [0; ffi::AS_MAXCH];
        // SAFETY: geopos holds ten doubles, attr twenty, serr AS_MAXCH chars.
        let class = unsafe {
            ffi::swe_sol_eclipse_where(
                jd_ut1,
                flags.bits(),
                geopos.as_mut_ptr(),
                attr.as_mut_ptr(),
                serr.as_mut_ptr(),
            )
        };
        check(class, &serr)?;
        Ok(EclipseWhere {
            class,
            geopos,
            attr,
        })
    }

    fn lun_eclipse_when(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        direction: SearchDirection,
    ) -> Result<EclipseSearch, EngineFault> {
        let mut tret = [0.0_f64; 10];
        let mut serr: ErrorBuffer = [0; ffi::AS_MAXCH];
        // SAFETY: tret holds ten doubles, serr AS_MAXCH chars.
        let class = unsafe {
            ffi::swe_lun_eclipse_when(
                jd_ut1,
                flags.bits(),
                0,
                tret.as_mut_ptr(),
                direction.code(),
                serr.as_mut_ptr(),
            )
        };
        check(class, &serr)?;
        Ok(EclipseSearch { class, tret })
    }

    fn lun_eclipse_when_loc(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        location: &GeoLocation,
        direction: SearchDirection,
    ) -> Result<LocalEclipseSearch, EngineFault> {
        let mut geopos = location.to_array();
        let mut tret = [0.0_f64; 10];
        let mut attr = [0.0_f64; 20];
        let mut serr: ErrorBuffer = [0; ffi::AS_MAXCH];
        // SAFETY: buffer sizes match the library's documented minimums.
        let class = unsafe {
            ffi::swe_lun_eclipse_when_loc(
                jd_ut1,
                flags.bits(),
                geopos.as_mut_ptr(),
                tret.as_mut_ptr(),
                attr.as_mut_ptr(),
                direction.code(),
                serr.as_mut_ptr(),
            )
        };
        check(class, &serr)?;
        Ok(LocalEclipseSearch { class, tret, attr })
    }

    fn lun_occult_when_glob(
        &mut self,
        jd_ut1: f64,
        body: BodyId,
        flags: CalcFlags,
        direction: SearchDirection,
        mode: SearchMode,
    ) -> Result<EclipseSearch, EngineFault> {
        let backward = match mode {
            SearchMode::Exhaustive => direction.code(),
            SearchMode::SingleAttempt => direction.code() | ffi::SE_ECL_ONE_TRY,
        };
        let mut tret = [0.0_f64; 10];
        let mut serr: ErrorBuffer = [0; ffi::AS_MAXCH];
        // SAFETY: starname may be NULL for planets; tret holds ten doubles.
        let class = unsafe {
            ffi::swe_lun_occult_when_glob(
                jd_ut1,
                body.code(),
                ptr::null_mut(),
                flags.bits(),
                0,
                tret.as_mut_ptr(),
                backward,
                serr.as_mut_ptr(),
            )
        };
        check(class, &serr)?;
        Ok(EclipseSearch { class, tret })
    }

    fn lun_occult_when_loc(
        &mut self,
        jd_ut1: f64,
        body: BodyId,
        flags: CalcFlags,
        location: &GeoLocation,
        direction: SearchDirection,
    ) -> Result<LocalEclipseSearch, EngineFault> {
        let mut geopos = location.to_array();
        let mut tret = [0.0_f64; 10];
        let mut attr = [0.0_f64; 20];
        let mut serr: ErrorBuffer = [0; ffi::AS_MAXCH];
        // SAFETY: starname may be NULL; buffer sizes match the library's
        // documented minimums.
        let class = unsafe {
            ffi::swe_lun_occult_when_loc(
                jd_ut1,
                body.code(),
                ptr::null_mut(),
                flags.bits(),
                geopos.as_mut_ptr(),
                tret.as_mut_ptr(),
                attr.as_mut_ptr(),
                direction.code(),
                serr.as_mut_ptr(),
            )
        };
        check(class, &serr)?;
        Ok(LocalEclipseSearch { class, tret, attr })
    }
}
