//! The primitive set of the numerical engine.
//!
//! Implementations wrap a concrete engine (see `ephq_swe`) or simulate one
//! (see [`crate::mock`]). Every method takes `&mut self`: the engine's
//! state is shared and mutable, so a handle is only ever used by the one
//! [`crate::Session`] that holds it.

use ephq_time::{JulianDatePair, UtcTime};

use crate::{
    Atmosphere, BodyId, CalcFlags, DataSource, EngineFault, Epoch, GeoLocation, HorizonEvent,
    SearchDirection, SearchMode,
};

/// Raw result of a global eclipse or occultation search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipseSearch {
    /// Classification bits (see [`crate::EclipseClass`]).
    pub class: i32,
    /// Event instants, UT1 Julian Dates. Unused slots are zero.
    pub tret: [f64; 10],
}

/// Raw result of a local eclipse or occultation search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalEclipseSearch {
    pub class: i32,
    pub tret: [f64; 10],
    /// Attributes; azimuths are in the engine's south-origin convention.
    pub attr: [f64; 20],
}

/// Raw result of the eclipse central-line query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EclipseWhere {
    pub class: i32,
    /// `geopos[0]` longitude, `geopos[1]` latitude of the central line.
    pub geopos: [f64; 10],
    pub attr: [f64; 20],
}

/// Primitives exposed by an ephemeris engine.
pub trait Engine: Send {
    /// Point the engine at a data source. Never fails; a bad path surfaces
    /// on the first calculation.
    fn set_data_source(&mut self, source: &DataSource);

    /// Release files and reset per-session state.
    fn close(&mut self);

    /// Set the topocentric observer used by `TOPOCTR` calculations.
    fn set_topocentric(&mut self, location: &GeoLocation);

    /// Gregorian UTC → UT1/TT pair.
    fn utc_to_jd(&mut self, t: &UtcTime) -> Result<JulianDatePair, EngineFault>;

    /// UT1 Julian Date → Gregorian UTC. Has no failure path.
    fn jd_ut1_to_utc(&mut self, jd_ut1: f64) -> UtcTime;

    /// ΔT (TT − UT1) in days at `jd_ut1`.
    fn delta_t(&mut self, jd_ut1: f64) -> f64;

    /// Body coordinates: `[lon/ra, lat/dec, distance, speeds...]`.
    fn calc(&mut self, epoch: Epoch, body: BodyId, flags: CalcFlags)
    -> Result<[f64; 6], EngineFault>;

    /// Equatorial `[ra, dec, dist]` → `[azimuth, true_alt, apparent_alt]`.
    ///
    /// Azimuth is measured from south.
    fn azalt(
        &mut self,
        jd_ut1: f64,
        location: &GeoLocation,
        atmosphere: &Atmosphere,
        equatorial: [f64; 3],
    ) -> [f64; 3];

    /// Phenomenon attributes. Index 4 is the apparent visual magnitude.
    fn pheno(&mut self, epoch: Epoch, body: BodyId, flags: CalcFlags)
    -> Result<[f64; 20], EngineFault>;

    /// Next rise, set or transit after `jd_ut1`; `Ok(None)` when the body
    /// does not cross the horizon.
    fn rise_trans(
        &mut self,
        jd_ut1: f64,
        body: BodyId,
        flags: CalcFlags,
        event: HorizonEvent,
        location: &GeoLocation,
        atmosphere: &Atmosphere,
    ) -> Result<Option<f64>, EngineFault>;

    fn sol_eclipse_when_glob(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        direction: SearchDirection,
    ) -> Result<EclipseSearch, EngineFault>;

    fn sol_eclipse_when_loc(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        location: &GeoLocation,
        direction: SearchDirection,
    ) -> Result<LocalEclipseSearch, EngineFault>;

    fn sol_eclipse_where(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
    ) -> Result<EclipseWhere, EngineFault>;

    fn lun_eclipse_when(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        direction: SearchDirection,
    ) -> Result<EclipseSearch, EngineFault>;

    fn lun_eclipse_when_loc(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        location: &GeoLocation,
        direction: SearchDirection,
    ) -> Result<LocalEclipseSearch, EngineFault>;

    fn lun_occult_when_glob(
        &mut self,
        jd_ut1: f64,
        body: BodyId,
        flags: CalcFlags,
        direction: SearchDirection,
        mode: SearchMode,
    ) -> Result<EclipseSearch, EngineFault>;

    fn lun_occult_when_loc(
        &mut self,
        jd_ut1: f64,
        body: BodyId,
        flags: CalcFlags,
        location: &GeoLocation,
        direction: SearchDirection,
    ) -> Result<LocalEclipseSearch, EngineFault>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn set_data_source(&mut self, source: &DataSource) {
        (**self).set_data_source(source)
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn set_topocentric(&mut self, location: &GeoLocation) {
        (**self).set_topocentric(location)
    }

    fn utc_to_jd(&mut self, t: &UtcTime) -> Result<JulianDatePair, EngineFault> {
        (**self).utc_to_jd(t)
    }

    fn jd_ut1_to_utc(&mut self, jd_ut1: f64) -> UtcTime {
        (**self).jd_ut1_to_utc(jd_ut1)
    }

    fn delta_t(&mut self, jd_ut1: f64) -> f64 {
        (**self).delta_t(jd_ut1)
    }

    fn calc(
        &mut self,
        epoch: Epoch,
        body: BodyId,
        flags: CalcFlags,
    ) -> Result<[f64; 6], EngineFault> {
        (**self).calc(epoch, body, flags)
    }

    fn azalt(
        &mut self,
        jd_ut1: f64,
        location: &GeoLocation,
        atmosphere: &Atmosphere,
        equatorial: [f64; 3],
    ) -> [f64; 3] {
        (**self).azalt(jd_ut1, location, atmosphere, equatorial)
    }

    fn pheno(
        &mut self,
        epoch: Epoch,
        body: BodyId,
        flags: CalcFlags,
    ) -> Result<[f64; 20], EngineFault> {
        (**self).pheno(epoch, body, flags)
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
        (**self).rise_trans(jd_ut1, body, flags, event, location, atmosphere)
    }

    fn sol_eclipse_when_glob(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        direction: SearchDirection,
    ) -> Result<EclipseSearch, EngineFault> {
        (**self).sol_eclipse_when_glob(jd_ut1, flags, direction)
    }

    fn sol_eclipse_when_loc(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        location: &GeoLocation,
        direction: SearchDirection,
    ) -> Result<LocalEclipseSearch, EngineFault> {
        (**self).sol_eclipse_when_loc(jd_ut1, flags, location, direction)
    }

    fn sol_eclipse_where(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
    ) -> Result<EclipseWhere, EngineFault> {
        (**self).sol_eclipse_where(jd_ut1, flags)
    }

    fn lun_eclipse_when(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        direction: SearchDirection,
    ) -> Result<EclipseSearch, EngineFault> {
        (**self).lun_eclipse_when(jd_ut1, flags, direction)
    }

    fn lun_eclipse_when_loc(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        location: &GeoLocation,
        direction: SearchDirection,
    ) -> Result<LocalEclipseSearch, EngineFault> {
        (**self).lun_eclipse_when_loc(jd_ut1, flags, location, direction)
    }

    fn lun_occult_when_glob(
        &mut self,
        jd_ut1: f64,
        body: BodyId,
        flags: CalcFlags,
        direction: SearchDirection,
        mode: SearchMode,
    ) -> Result<EclipseSearch, EngineFault> {
        (**self).lun_occult_when_glob(jd_ut1, body, flags, direction, mode)
    }

    fn lun_occult_when_loc(
        &mut self,
        jd_ut1: f64,
        body: BodyId,
        flags: CalcFlags,
        location: &GeoLocation,
        direction: SearchDirection,
    ) -> Result<LocalEclipseSearch, EngineFault> {
        (**self).lun_occult_when_loc(jd_ut1, body, flags, location, direction)
    }
}
