//! Runs of consecutive eclipses or occultations.
//!
//! A run keeps one local search "ahead" of the global searches. Each
//! global event is matched against the pending local event; on a match
//! ([`is_visible_locally`]) the local circumstances are attached together
//! with the Sun's or Moon's rise and set around the event, and the next
//! local search starts after the current event. Every step runs in its own
//! session.

use ephq_core::{
    Atmosphere, BodyId, DataSource, Engine, Ephemeris, GeoLocation, HorizonEvent, Result,
    SearchDirection, Session,
};
use log::debug;

use crate::eclipse::{
    is_visible_locally, search_lunar_global, search_lunar_local, search_solar_global,
    search_solar_local,
};
use crate::eclipse_types::{GlobalEclipse, LocalLunarEclipse, LocalOccultation, LocalSolarEclipse};
use crate::occultation::{search_occultation_global, search_occultation_local};
use crate::riseset::horizon_crossing;

/// Days an occultation run steps past the previous maximum.
const OCCULTATION_STEP_DAYS: f64 = 2.0;

/// Local circumstances of an event seen from the observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalView<L> {
    pub event: L,
    /// Rise of the Sun (solar) or Moon (lunar, occultation) preceding `set`.
    pub rise: Option<f64>,
    /// First set of the same body after the event begins.
    pub set: Option<f64>,
}

/// One event of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesEntry<L> {
    pub global: GlobalEclipse,
    /// Present when the event is visible from the observer.
    pub local: Option<LocalView<L>>,
}

/// How one kind of event is searched and stepped.
trait EventKind<E: Engine> {
    type Local: Copy;

    /// Body whose rise and set are reported with a local event.
    const HORIZON_BODY: BodyId;

    fn global(&self, session: &mut Session<'_, E>, start: f64) -> Result<GlobalEclipse>;
    fn local(&self, session: &mut Session<'_, E>, start: f64) -> Result<Self::Local>;
    fn local_maximum(local: &Self::Local) -> f64;
    /// Where the set search begins for a visible event.
    fn set_search_from(global: &GlobalEclipse, local: &Self::Local) -> f64;
    /// Start of the search for the following event.
    fn next_start(global: &GlobalEclipse, direction: SearchDirection) -> f64;
}

struct Solar {
    location: GeoLocation,
    direction: SearchDirection,
}

impl<E: Engine> EventKind<E> for Solar {
    type Local = LocalSolarEclipse;
    const HORIZON_BODY: BodyId = BodyId::SUN;

    fn global(&self, session: &mut Session<'_, E>, start: f64) -> Result<GlobalEclipse> {
        search_solar_global(session, start, self.direction)
    }

    fn local(&self, session: &mut Session<'_, E>, start: f64) -> Result<LocalSolarEclipse> {
        search_solar_local(session, start, &self.location, self.direction)
    }

    fn local_maximum(local: &LocalSolarEclipse) -> f64 {
        local.maximum()
    }

    fn set_search_from(_global: &GlobalEclipse, local: &LocalSolarEclipse) -> f64 {
        local.first_contact()
    }

    fn next_start(global: &GlobalEclipse, direction: SearchDirection) -> f64 {
        let (begin, end) = global.solar_span();
        if direction.is_backward() { begin } else { end }
    }
}

struct Lunar {
    location: GeoLocation,
    direction: SearchDirection,
}

impl<E: Engine> EventKind<E> for Lunar {
    type Local = LocalLunarEclipse;
    const HORIZON_BODY: BodyId = BodyId::MOON;

    fn global(&self, session: &mut Session<'_, E>, start: f64) -> Result<GlobalEclipse> {
        search_lunar_global(session, start, self.direction)
    }

    fn local(&self, session: &mut Session<'_, E>, start: f64) -> Result<LocalLunarEclipse> {
        search_lunar_local(session, start, &self.location, self.direction)
    }

    fn local_maximum(local: &LocalLunarEclipse) -> f64 {
        local.maximum()
    }

    fn set_search_from(global: &GlobalEclipse, _local: &LocalLunarEclipse) -> f64 {
        global.penumbral_span().0
    }

    fn next_start(global: &GlobalEclipse, direction: SearchDirection) -> f64 {
        let (begin, end) = global.penumbral_span();
        if direction.is_backward() { begin } else { end }
    }
}

struct Occultation {
    body: BodyId,
    location: GeoLocation,
    direction: SearchDirection,
}

impl<E: Engine> EventKind<E> for Occultation {
    type Local = LocalOccultation;
    const HORIZON_BODY: BodyId = BodyId::MOON;

    fn global(&self, session: &mut Session<'_, E>, start: f64) -> Result<GlobalEclipse> {
        search_occultation_global(session, start, self.body, self.direction)
    }

    fn local(&self, session: &mut Session<'_, E>, start: f64) -> Result<LocalOccultation> {
        search_occultation_local(session, start, &self.location, self.body, self.direction)
    }

    fn local_maximum(local: &LocalOccultation) -> f64 {
        local.maximum()
    }

    fn set_search_from(global: &GlobalEclipse, _local: &LocalOccultation) -> f64 {
        global.solar_span().0
    }

    fn next_start(global: &GlobalEclipse, direction: SearchDirection) -> f64 {
        if direction.is_backward() {
            global.maximum() - OCCULTATION_STEP_DAYS
        } else {
            global.maximum() + OCCULTATION_STEP_DAYS
        }
    }
}

fn run<E: Engine, K: EventKind<E>>(
    eph: &Ephemeris<E>,
    source: &DataSource,
    kind: &K,
    location: &GeoLocation,
    start: f64,
    direction: SearchDirection,
    count: usize,
) -> Result<Vec<SeriesEntry<K::Local>>> {
    let mut entries = Vec::new();
    if count == 0 {
        return Ok(entries);
    }

    let mut start = start;
    let mut pending = eph.with_session_using(source, |s| kind.local(s, start))?;

    while entries.len() < count {
        let entry = eph.with_session_using(source, |s| -> Result<SeriesEntry<K::Local>> {
            let global = kind.global(s, start)?;
            start = K::next_start(&global, direction);

            if !is_visible_locally(global.maximum(), K::local_maximum(&pending)) {
                return Ok(SeriesEntry {
                    global,
                    local: None,
                });
            }

            let event = pending;
            let atmosphere = Atmosphere::default();
            let set = horizon_crossing(
                s,
                K::HORIZON_BODY,
                K::set_search_from(&global, &event),
                location,
                &atmosphere,
                HorizonEvent::Set,
            )?;
            let rise = match set {
                Some(set) => horizon_crossing(
                    s,
                    K::HORIZON_BODY,
                    set - 1.0,
                    location,
                    &atmosphere,
                    HorizonEvent::Rise,
                )?,
                None => None,
            };
            pending = kind.local(s, start)?;
            Ok(SeriesEntry {
                global,
                local: Some(LocalView { event, rise, set }),
            })
        })?;
        debug!(
            "series step {}: max {} (local: {})",
            entries.len(),
            entry.global.maximum(),
            entry.local.is_some()
        );
        entries.push(entry);
    }
    Ok(entries)
}

/// `count` consecutive solar eclipses from `start_ut1`.
pub fn solar_eclipse_series<E: Engine>(
    eph: &Ephemeris<E>,
    source: &DataSource,
    start_ut1: f64,
    location: &GeoLocation,
    direction: SearchDirection,
    count: usize,
) -> Result<Vec<SeriesEntry<LocalSolarEclipse>>> {
    let kind = Solar {
        location: *location,
        direction,
    };
    run(eph, source, &kind, location, start_ut1, direction, count)
}

/// `count` consecutive lunar eclipses from `start_ut1`.
pub fn lunar_eclipse_series<E: Engine>(
    eph: &Ephemeris<E>,
    source: &DataSource,
    start_ut1: f64,
    location: &GeoLocation,
    direction: SearchDirection,
    count: usize,
) -> Result<Vec<SeriesEntry<LocalLunarEclipse>>> {
    let kind = Lunar {
        location: *location,
        direction,
    };
    run(eph, source, &kind, location, start_ut1, direction, count)
}

/// `count` consecutive lunar occultations of `body` from `start_ut1`.
pub fn occultation_series<E: Engine>(
    eph: &Ephemeris<E>,
    source: &DataSource,
    start_ut1: f64,
    location: &GeoLocation,
    body: BodyId,
    direction: SearchDirection,
    count: usize,
) -> Result<Vec<SeriesEntry<LocalOccultation>>> {
    let kind = Occultation {
        body,
        location: *location,
        direction,
    };
    run(eph, source, &kind, location, start_ut1, direction, count)
}
