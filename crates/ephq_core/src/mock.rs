//! Deterministic in-memory engine.
//!
//! `MockEngine` handles are cheap clones over one shared state, the same
//! way every caller of the real engine shares one set of C globals. Keep a
//! clone to inspect the call log or inject failures while a facade owns
//! another.
//!
//! Values are synthetic but stable:
//! - `calc`: ra `(10 + 40·body) mod 360`, dec = topocentric latitude,
//!   distance `1 + altitude/1000`
//! - `azalt`: raw azimuth = ra, true altitude = dec, +0.5° refraction when
//!   pressure is positive
//! - `pheno`: magnitude `-1 + 0.5·body`
//! - `rise_trans`: rise +0.25 d, transit +0.5 d, set +0.75 d; no event
//!   poleward of ±80°
//! - eclipse searches: maximum 10 days ahead (or behind), later slots
//!   0.01 d apart; local solar azimuth 200°, local lunar azimuth 350°
//!
//! Only the ten bodies of [`BodyId::PLANETS`] are known.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ephq_time::{JulianDatePair, SECONDS_PER_DAY, UtcTime};
use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::engine::{EclipseSearch, EclipseWhere, Engine, LocalEclipseSearch};
use crate::{
    Atmosphere, BodyId, CalcFlags, DataSource, EclipseClass, EngineFault, Epoch, GeoLocation,
    HorizonEvent, SearchDirection, SearchMode,
};

/// ΔT used for every date.
pub const MOCK_DELTA_T_DAYS: f64 = 69.184 / SECONDS_PER_DAY;

/// Days between the search start and the event maximum.
pub const MOCK_EVENT_LEAD_DAYS: f64 = 10.0;

/// Raw azimuth reported for the Sun by the local solar eclipse search.
pub const MOCK_SOLAR_LOCAL_AZIMUTH: f64 = 200.0;

/// Raw azimuth reported for the Moon by the local lunar eclipse search.
pub const MOCK_LUNAR_LOCAL_AZIMUTH: f64 = 350.0;

/// Central-line point reported by `sol_eclipse_where`.
pub const MOCK_GROUND_POINT: [f64; 2] = [-75.5, 40.25];

/// Identifies one engine primitive in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    SetDataSource,
    Close,
    SetTopocentric,
    UtcToJd,
    JdToUtc,
    DeltaT,
    Calc,
    Azalt,
    Pheno,
    RiseTrans,
    SolEclipseWhenGlob,
    SolEclipseWhenLoc,
    SolEclipseWhere,
    LunEclipseWhen,
    LunEclipseWhenLoc,
    LunOccultWhenGlob,
    LunOccultWhenLoc,
}

/// One logged primitive call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Call {
    pub primitive: Primitive,
    pub flags: Option<CalcFlags>,
    pub epoch: Option<Epoch>,
}

struct Rendezvous {
    parties: usize,
    arrived: usize,
    timeout: Duration,
}

#[derive(Default)]
struct State {
    source: Option<DataSource>,
    topo: Option<GeoLocation>,
    calls: Vec<Call>,
    closes: usize,
    failing: HashSet<Primitive>,
    search_modes: Vec<SearchMode>,
    occulted: Vec<(Primitive, BodyId)>,
    rendezvous: Option<Rendezvous>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    topo_arrived: Condvar,
}

/// In-memory engine with shared, inspectable state.
#[derive(Clone, Default)]
pub struct MockEngine {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for MockEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("MockEngine")
            .field("source", &state.source)
            .field("topo", &state.topo)
            .field("calls", &state.calls.len())
            .field("closes", &state.closes)
            .finish()
    }
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Primitives called so far, in order.
    pub fn calls(&self) -> Vec<Primitive> {
        self.shared.state.lock().calls.iter().map(|c| c.primitive).collect()
    }

    /// Full call records, in order.
    pub fn call_log(&self) -> Vec<Call> {
        self.shared.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.shared.state.lock().calls.clear();
    }

    pub fn count(&self, primitive: Primitive) -> usize {
        self.shared
            .state
            .lock()
            .calls
            .iter()
            .filter(|c| c.primitive == primitive)
            .count()
    }

    /// Flags passed to every call of `primitive`.
    pub fn flags_of(&self, primitive: Primitive) -> Vec<CalcFlags> {
        self.shared
            .state
            .lock()
            .calls
            .iter()
            .filter(|c| c.primitive == primitive)
            .filter_map(|c| c.flags)
            .collect()
    }

    /// Modes passed to the global occultation search.
    pub fn search_modes(&self) -> Vec<SearchMode> {
        self.shared.state.lock().search_modes.clone()
    }

    /// Bodies passed to `primitive`, in call order (occultation searches).
    pub fn occulted_bodies(&self, primitive: Primitive) -> Vec<BodyId> {
        self.shared
            .state
            .lock()
            .occulted
            .iter()
            .filter(|(p, _)| *p == primitive)
            .map(|&(_, body)| body)
            .collect()
    }

    pub fn closes(&self) -> usize {
        self.shared.state.lock().closes
    }

    /// The data source currently configured, if any.
    pub fn data_source(&self) -> Option<DataSource> {
        self.shared.state.lock().source.clone()
    }

    /// The topocentric location currently configured, if any.
    pub fn topocentric(&self) -> Option<GeoLocation> {
        self.shared.state.lock().topo
    }

    /// Make `primitive` report a fault until switched off again.
    pub fn set_failing(&self, primitive: Primitive, failing: bool) {
        let mut state = self.shared.state.lock();
        if failing {
            state.failing.insert(primitive);
        } else {
            state.failing.remove(&primitive);
        }
    }

    /// Hold each `set_topocentric` caller until `parties` callers have set
    /// their location, or `timeout` elapses.
    ///
    /// With independent locks over clones of one engine this forces the
    /// interleaving that leaks one caller's location into another's
    /// calculation. Behind a single lock the waiter simply times out.
    pub fn set_topo_rendezvous(&self, parties: usize, timeout: Duration) {
        self.shared.state.lock().rendezvous = Some(Rendezvous {
            parties,
            arrived: 0,
            timeout,
        });
    }

    pub fn clear_topo_rendezvous(&self) {
        self.shared.state.lock().rendezvous = None;
        self.shared.topo_arrived.notify_all();
    }

    fn log(
        &self,
        primitive: Primitive,
        flags: Option<CalcFlags>,
        epoch: Option<Epoch>,
    ) -> MutexGuard<'_, State> {
        let mut state = self.shared.state.lock();
        state.calls.push(Call {
            primitive,
            flags,
            epoch,
        });
        state
    }

    /// Log the call, then apply the injected-failure and data-source checks.
    fn enter(
        &self,
        primitive: Primitive,
        flags: Option<CalcFlags>,
        epoch: Option<Epoch>,
    ) -> Result<MutexGuard<'_, State>, EngineFault> {
        let state = self.log(primitive, flags, epoch);
        if state.failing.contains(&primitive) {
            return Err(EngineFault::err(format!("injected {primitive:?} failure")));
        }
        if state.source.is_none() {
            return Err(EngineFault::err("ephemeris data source not set"));
        }
        Ok(state)
    }
}

fn check_body(body: BodyId) -> Result<(), EngineFault> {
    if (0..=9).contains(&body.0) {
        Ok(())
    } else {
        Err(EngineFault::err(format!("illegal planet number {}", body.0)))
    }
}

fn event_base(jd_ut1: f64, direction: SearchDirection) -> f64 {
    match direction {
        SearchDirection::Forward => jd_ut1 + MOCK_EVENT_LEAD_DAYS,
        SearchDirection::Backward => jd_ut1 - MOCK_EVENT_LEAD_DAYS,
    }
}

fn event_instants(base: f64, slots: usize) -> [f64; 10] {
    let mut tret = [0.0; 10];
    for (i, t) in tret.iter_mut().enumerate().take(slots) {
        *t = base + i as f64 * 0.01;
    }
    tret
}

fn local_attributes(azimuth: f64) -> [f64; 20] {
    let mut attr = [0.0; 20];
    for (i, a) in attr.iter_mut().enumerate().take(11) {
        *a = i as f64 * 0.1;
    }
    attr[4] = azimuth;
    attr[5] = 30.0;
    attr
}

impl Engine for MockEngine {
    fn set_data_source(&mut self, source: &DataSource) {
        let mut state = self.log(Primitive::SetDataSource, None, None);
        state.source = Some(source.clone());
    }

    fn close(&mut self) {
        let mut state = self.log(Primitive::Close, None, None);
        state.source = None;
        state.topo = None;
        state.closes += 1;
    }

    fn set_topocentric(&mut self, location: &GeoLocation) {
        let mut state = self.log(Primitive::SetTopocentric, None, None);
        state.topo = Some(*location);

        let Some(rv) = state.rendezvous.as_mut() else {
            return;
        };
        rv.arrived += 1;
        let parties = rv.parties;
        let deadline = Instant::now() + rv.timeout;
        self.shared.topo_arrived.notify_all();
        while state.rendezvous.as_ref().is_some_and(|rv| rv.arrived < parties) {
            if self
                .shared
                .topo_arrived
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                break;
            }
        }
    }

    fn utc_to_jd(&mut self, t: &UtcTime) -> Result<JulianDatePair, EngineFault> {
        let state = self.log(Primitive::UtcToJd, None, None);
        if state.failing.contains(&Primitive::UtcToJd) {
            return Err(EngineFault::err("injected UtcToJd failure"));
        }
        t.validate().map_err(|e| EngineFault::err(e.to_string()))?;
        let ut1 = t.to_jd();
        Ok(JulianDatePair::new(ut1, ut1 + MOCK_DELTA_T_DAYS))
    }

    fn jd_ut1_to_utc(&mut self, jd_ut1: f64) -> UtcTime {
        let _state = self.log(Primitive::JdToUtc, None, Some(Epoch::Ut1(jd_ut1)));
        UtcTime::from_jd(jd_ut1)
    }

    fn delta_t(&mut self, jd_ut1: f64) -> f64 {
        let _state = self.log(Primitive::DeltaT, None, Some(Epoch::Ut1(jd_ut1)));
        MOCK_DELTA_T_DAYS
    }

    fn calc(
        &mut self,
        epoch: Epoch,
        body: BodyId,
        flags: CalcFlags,
    ) -> Result<[f64; 6], EngineFault> {
        let state = self.enter(Primitive::Calc, Some(flags), Some(epoch))?;
        check_body(body)?;
        let (lat, alt) = if flags.contains(CalcFlags::TOPOCTR) {
            let topo = state
                .topo
                .ok_or_else(|| EngineFault::err("geographic position has not been set"))?;
            (topo.latitude_deg, topo.altitude_m)
        } else {
            (0.0, 0.0)
        };
        let ra = ((10 + 40 * body.0) % 360) as f64;
        Ok([ra, lat, 1.0 + alt / 1000.0, 0.0, 0.0, 0.0])
    }

    fn azalt(
        &mut self,
        jd_ut1: f64,
        _location: &GeoLocation,
        atmosphere: &Atmosphere,
        equatorial: [f64; 3],
    ) -> [f64; 3] {
        let _state = self.log(Primitive::Azalt, None, Some(Epoch::Ut1(jd_ut1)));
        let refraction = if atmosphere.pressure_hpa > 0.0 { 0.5 } else { 0.0 };
        [equatorial[0], equatorial[1], equatorial[1] + refraction]
    }

    fn pheno(
        &mut self,
        epoch: Epoch,
        body: BodyId,
        flags: CalcFlags,
    ) -> Result<[f64; 20], EngineFault> {
        let _state = self.enter(Primitive::Pheno, Some(flags), Some(epoch))?;
        check_body(body)?;
        let mut attr = [0.0; 20];
        attr[4] = -1.0 + 0.5 * body.0 as f64;
        Ok(attr)
    }

    fn rise_trans(
        &mut self,
        jd_ut1: f64,
        body: BodyId,
        flags: CalcFlags,
        event: HorizonEvent,
        location: &GeoLocation,
        _atmosphere: &Atmosphere,
    ) -> Result<Option<f64>, EngineFault> {
        let _state = self.enter(Primitive::RiseTrans, Some(flags), Some(Epoch::Ut1(jd_ut1)))?;
        check_body(body)?;
        if location.latitude_deg.abs() > 80.0 {
            return Ok(None);
        }
        let offset = match event {
            HorizonEvent::Rise => 0.25,
            HorizonEvent::Transit => 0.5,
            HorizonEvent::Set => 0.75,
        };
        Ok(Some(jd_ut1 + offset))
    }

    fn sol_eclipse_when_glob(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        direction: SearchDirection,
    ) -> Result<EclipseSearch, EngineFault> {
        let _state = self.enter(
            Primitive::SolEclipseWhenGlob,
            Some(flags),
            Some(Epoch::Ut1(jd_ut1)),
        )?;
        Ok(EclipseSearch {
            class: (EclipseClass::TOTAL | EclipseClass::CENTRAL).bits(),
            tret: event_instants(event_base(jd_ut1, direction), 8),
        })
    }

    fn sol_eclipse_when_loc(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        _location: &GeoLocation,
        direction: SearchDirection,
    ) -> Result<LocalEclipseSearch, EngineFault> {
        let _state = self.enter(
            Primitive::SolEclipseWhenLoc,
            Some(flags),
            Some(Epoch::Ut1(jd_ut1)),
        )?;
        Ok(LocalEclipseSearch {
            class: (EclipseClass::PARTIAL | EclipseClass::VISIBLE).bits(),
            tret: event_instants(event_base(jd_ut1, direction), 5),
            attr: local_attributes(MOCK_SOLAR_LOCAL_AZIMUTH),
        })
    }

    fn sol_eclipse_where(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
    ) -> Result<EclipseWhere, EngineFault> {
        let _state = self.enter(
            Primitive::SolEclipseWhere,
            Some(flags),
            Some(Epoch::Ut1(jd_ut1)),
        )?;
        let mut geopos = [0.0; 10];
        geopos[0] = MOCK_GROUND_POINT[0];
        geopos[1] = MOCK_GROUND_POINT[1];
        Ok(EclipseWhere {
            class: (EclipseClass::TOTAL | EclipseClass::CENTRAL).bits(),
            geopos,
            attr: [0.0; 20],
        })
    }

    fn lun_eclipse_when(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        direction: SearchDirection,
    ) -> Result<EclipseSearch, EngineFault> {
        let _state = self.enter(Primitive::LunEclipseWhen, Some(flags), Some(Epoch::Ut1(jd_ut1)))?;
        Ok(EclipseSearch {
            class: EclipseClass::PENUMBRAL.bits(),
            tret: event_instants(event_base(jd_ut1, direction), 8),
        })
    }

    fn lun_eclipse_when_loc(
        &mut self,
        jd_ut1: f64,
        flags: CalcFlags,
        _location: &GeoLocation,
        direction: SearchDirection,
    ) -> Result<LocalEclipseSearch, EngineFault> {
        let _state = self.enter(
            Primitive::LunEclipseWhenLoc,
            Some(flags),
            Some(Epoch::Ut1(jd_ut1)),
        )?;
        Ok(LocalEclipseSearch {
            class: (EclipseClass::PENUMBRAL | EclipseClass::VISIBLE).bits(),
            tret: event_instants(event_base(jd_ut1, direction), 10),
            attr: local_attributes(MOCK_LUNAR_LOCAL_AZIMUTH),
        })
    }

    fn lun_occult_when_glob(
        &mut self,
        jd_ut1: f64,
        body: BodyId,
        flags: CalcFlags,
        direction: SearchDirection,
        mode: SearchMode,
    ) -> Result<EclipseSearch, EngineFault> {
        let mut state = self.enter(
            Primitive::LunOccultWhenGlob,
            Some(flags),
            Some(Epoch::Ut1(jd_ut1)),
        )?;
        state.search_modes.push(mode);
        state.occulted.push((Primitive::LunOccultWhenGlob, body));
        check_body(body)?;
        Ok(EclipseSearch {
            class: (EclipseClass::TOTAL | EclipseClass::CENTRAL).bits(),
            tret: event_instants(event_base(jd_ut1, direction), 8),
        })
    }

    fn lun_occult_when_loc(
        &mut self,
        jd_ut1: f64,
        body: BodyId,
        flags: CalcFlags,
        _location: &GeoLocation,
        direction: SearchDirection,
    ) -> Result<LocalEclipseSearch, EngineFault> {
        let mut state = self.enter(
            Primitive::LunOccultWhenLoc,
            Some(flags),
            Some(Epoch::Ut1(jd_ut1)),
        )?;
        state.occulted.push((Primitive::LunOccultWhenLoc, body));
        check_body(body)?;
        Ok(LocalEclipseSearch {
            class: (EclipseClass::TOTAL | EclipseClass::VISIBLE).bits(),
            tret: event_instants(event_base(jd_ut1, direction), 10),
            attr: [0.0; 20],
        })
    }
}
