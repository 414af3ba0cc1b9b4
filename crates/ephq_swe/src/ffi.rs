//! Raw declarations for the subset of `swephexp.h` the backend calls.
//!
//! `int32` in the C headers is a 32-bit `int` on every supported target.

#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_double};

pub type int32 = i32;

/// `AS_MAXCH`: capacity of every `serr` buffer.
pub const AS_MAXCH: usize = 256;

pub const SE_GREG_CAL: int32 = 1;
pub const SE_EQU2HOR: int32 = 1;
pub const SE_ECL_ONE_TRY: int32 = 32 * 1024;
pub const OK: int32 = 0;
pub const ERR: int32 = -1;
/// `swe_rise_trans` return for a body that never crosses the horizon.
pub const CIRCUMPOLAR: int32 = -2;

unsafe extern "C" {
    pub fn swe_set_ephe_path(path: *const c_char);
    pub fn swe_close();
    pub fn swe_set_topo(geolon: c_double, geolat: c_double, geoalt: c_double);

    pub fn swe_utc_to_jd(
        iyear: int32,
        imonth: int32,
        iday: int32,
        ihour: int32,
        imin: int32,
        dsec: c_double,
        gregflag: int32,
        dret: *mut c_double,
        serr: *mut c_char,
    ) -> int32;
    pub fn swe_jdut1_to_utc(
        tjd_ut: c_double,
        gregflag: int32,
        iyear: *mut int32,
        imonth: *mut int32,
        iday: *mut int32,
        ihour: *mut int32,
        imin: *mut int32,
        dsec: *mut c_double,
    );
    pub fn swe_deltat(tjd: c_double) -> c_double;

    pub fn swe_calc(
        tjd: c_double,
        ipl: int32,
        iflag: int32,
        xx: *mut c_double,
        serr: *mut c_char,
    ) -> int32;
    pub fn swe_calc_ut(
        tjd_ut: c_double,
        ipl: int32,
        iflag: int32,
        xx: *mut c_double,
        serr: *mut c_char,
    ) -> int32;
    pub fn swe_azalt(
        tjd_ut: c_double,
        calc_flag: int32,
        geopos: *mut c_double,
        atpress: c_double,
        attemp: c_double,
        xin: *mut c_double,
        xaz: *mut c_double,
    );
    pub fn swe_pheno(
        tjd: c_double,
        ipl: int32,
        iflag: int32,
        attr: *mut c_double,
        serr: *mut c_char,
    ) -> int32;
    pub fn swe_pheno_ut(
        tjd_ut: c_double,
        ipl: int32,
        iflag: int32,
        attr: *mut c_double,
        serr: *mut c_char,
    ) -> int32;
    pub fn swe_rise_trans(
        tjd_ut: c_double,
        ipl: int32,
        starname: *mut c_char,
        epheflag: int32,
        rsmi: int32,
        geopos: *mut c_double,
        atpress: c_double,
        attemp: c_double,
        tret: *mut c_double,
        serr: *mut c_char,
    ) -> int32;

    pub fn swe_sol_eclipse_when_glob(
        tjd_start: c_double,
        ifl: int32,
        ifltype: int32,
        tret: *mut c_double,
        backward: int32,
        serr: *mut c_char,
    ) -> int32;
    pub fn swe_sol_eclipse_when_loc(
        tjd_start: c_double,
        ifl: int32,
        geopos: *mut c_double,
        tret: *mut c_double,
        attr: *mut c_double,
        backward: int32,
        serr: *mut c_char,
    ) -> int32;
    pub fn swe_sol_eclipse_where(
        tjd: c_double,
        ifl: int32,
        geopos: *mut c_double,
        attr: *mut c_double,
        serr: *mut c_char,
    ) -> int32;
    pub fn swe_lun_eclipse_when(
        tjd_start: c_double,
        ifl: int32,
        ifltype: int32,
        tret: *mut c_double,
        backward: int32,
        serr: *mut c_char,
    ) -> int32;
    pub fn swe_lun_eclipse_when_loc(
        tjd_start: c_double,
        ifl: int32,
        geopos: *mut c_double,
        tret: *mut c_double,
        attr: *mut c_double,
        backward: int32,
        serr: *mut c_char,
    ) -> int32;
    pub fn swe_lun_occult_when_glob(
        tjd_start: c_double,
        ipl: int32,
        starname: *mut c_char,
        ifl: int32,
        ifltype: int32,
        tret: *mut c_double,
        backward: int32,
        serr: *mut c_char,
    ) -> int32;
    pub fn swe_lun_occult_when_loc(
        tjd_start: c_double,
        ipl: int32,
        starname: *mut c_char,
        ifl: int32,
        geopos: *mut c_double,
        tret: *mut c_double,
        attr: *mut c_double,
        backward: int32,
        serr: *mut c_char,
    ) -> int32;
}
