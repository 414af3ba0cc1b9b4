//! Serialized engine sessions.
//!
//! The engine's data source, topocentric location and close call are all
//! process-wide. [`Ephemeris`] owns the engine behind one lock and hands it
//! out only as a [`Session`]: lock → configure data source → caller's work →
//! close → unlock. Closing happens in `Drop`, so it runs exactly once on
//! success, on an early `?` return, and on unwinding.

use log::trace;
use parking_lot::{Mutex, MutexGuard};

use crate::{CalcFlags, DataSource, EphemerisError, Engine, GeoLocation, Result};

/// An engine plus the lock that serializes every use of it.
pub struct Ephemeris<E: Engine> {
    engine: Mutex<E>,
    default_source: DataSource,
}

impl<E: Engine> std::fmt::Debug for Ephemeris<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ephemeris")
            .field("default_source", &self.default_source)
            .field("locked", &self.engine.is_locked())
            .finish()
    }
}

impl<E: Engine> Ephemeris<E> {
    /// Wrap `engine`, using the built-in model unless told otherwise.
    pub fn new(engine: E) -> Self {
        Self::with_default_source(engine, DataSource::BuiltIn)
    }

    pub fn with_default_source(engine: E, default_source: DataSource) -> Self {
        Self {
            engine: Mutex::new(engine),
            default_source,
        }
    }

    pub fn default_source(&self) -> &DataSource {
        &self.default_source
    }

    /// Run `f` inside a session on the default data source.
    pub fn with_session<T>(&self, f: impl FnOnce(&mut Session<'_, E>) -> T) -> T {
        self.with_session_using(&self.default_source, f)
    }

    /// Run `f` inside a session on `source`.
    ///
    /// Blocks while another session is open.
    pub fn with_session_using<T>(
        &self,
        source: &DataSource,
        f: impl FnOnce(&mut Session<'_, E>) -> T,
    ) -> T {
        let mut session = Session::open(self.engine.lock(), source);
        f(&mut session)
    }

    /// Give the engine back. No session can be open at this point.
    pub fn into_inner(self) -> E {
        self.engine.into_inner()
    }
}

/// Exclusive, configured access to the engine for one request.
pub struct Session<'a, E: Engine> {
    engine: MutexGuard<'a, E>,
    source: DataSource,
    observer: Option<GeoLocation>,
}

impl<'a, E: Engine> Session<'a, E> {
    fn open(mut engine: MutexGuard<'a, E>, source: &DataSource) -> Self {
        trace!("session open ({source:?})");
        engine.set_data_source(source);
        Self {
            engine,
            source: source.clone(),
            observer: None,
        }
    }

    pub fn data_source(&self) -> &DataSource {
        &self.source
    }

    /// The data-source bit for this session's calculations.
    pub fn source_flags(&self) -> CalcFlags {
        CalcFlags::for_source(&self.source)
    }

    /// Push the observer into the engine's topocentric state.
    ///
    /// The engine forgets it on close, so every session sets it again.
    pub fn apply_observer(&mut self, location: &GeoLocation) {
        self.engine.set_topocentric(location);
        self.observer = Some(*location);
    }

    /// The observer applied in this session, if any.
    pub fn observer(&self) -> Option<&GeoLocation> {
        self.observer.as_ref()
    }

    /// The observer applied in this session, or an error if there is none.
    pub fn require_observer(&self) -> Result<GeoLocation> {
        self.observer.ok_or_else(|| {
            EphemerisError::Engine("observer location not applied in this session".into())
        })
    }

    /// The engine's primitives.
    pub fn engine(&mut self) -> &mut E {
        &mut self.engine
    }
}

impl<E: Engine> Drop for Session<'_, E> {
    fn drop(&mut self) {
        self.engine.close();
        trace!("session closed");
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::mock::{MockEngine, Primitive};
    use crate::{BodyId, Epoch};

    #[test]
    fn session_configures_then_closes_once() {
        let mock = MockEngine::new();
        let eph = Ephemeris::new(mock.clone());
        let flags = eph.with_session(|s| {
            assert_eq!(mock.data_source(), Some(DataSource::BuiltIn));
            s.source_flags()
        });
        assert_eq!(flags, CalcFlags::MOSEPH);
        assert_eq!(mock.closes(), 1);
        assert_eq!(mock.calls(), vec![Primitive::SetDataSource, Primitive::Close]);
    }

    #[test]
    fn session_closes_on_error_return() {
        let mock = MockEngine::new();
        mock.set_failing(Primitive::Calc, true);
        let eph = Ephemeris::new(mock.clone());
        let result: Result<[f64; 6]> = eph.with_session(|s| {
            let flags = s.source_flags();
            Ok(s.engine().calc(Epoch::Terrestrial(2_451_545.0), BodyId::SUN, flags)?)
        });
        assert!(matches!(result, Err(EphemerisError::Engine(_))));
        assert_eq!(mock.closes(), 1);
        assert_eq!(mock.calls().last(), Some(&Primitive::Close));
    }

    #[test]
    fn session_closes_on_panic() {
        let mock = MockEngine::new();
        let eph = Ephemeris::new(mock.clone());
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            eph.with_session(|_| panic!("boom"));
        }));
        assert!(outcome.is_err());
        assert_eq!(mock.closes(), 1);
        // The lock is usable again afterwards.
        eph.with_session(|_| ());
        assert_eq!(mock.closes(), 2);
    }

    #[test]
    fn explicit_source_overrides_default() {
        let mock = MockEngine::new();
        let eph = Ephemeris::with_default_source(
            mock.clone(),
            DataSource::Bundled(PathBuf::from("/srv/ephe")),
        );
        eph.with_session_using(&DataSource::BuiltIn, |s| {
            assert_eq!(s.data_source(), &DataSource::BuiltIn);
        });
        eph.with_session(|s| {
            assert_eq!(s.source_flags(), CalcFlags::SWIEPH);
        });
    }

    #[test]
    fn observer_is_per_session() {
        let mock = MockEngine::new();
        let eph = Ephemeris::new(mock.clone());
        eph.with_session(|s| {
            assert!(s.require_observer().is_err());
            s.apply_observer(&GeoLocation::new(1.0, 2.0, 3.0));
            assert_eq!(s.require_observer().unwrap().latitude_deg, 2.0);
        });
        assert_eq!(mock.topocentric(), None);
        eph.with_session(|s| assert!(s.observer().is_none()));
    }

    #[test]
    fn sessions_do_not_overlap() {
        let mock = MockEngine::new();
        let eph = Arc::new(Ephemeris::new(mock.clone()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let eph = Arc::clone(&eph);
                thread::spawn(move || {
                    for _ in 0..25 {
                        eph.with_session(|s| s.apply_observer(&GeoLocation::new(0.0, 0.0, 0.0)));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let calls = mock.calls();
        assert_eq!(calls.len(), 300);
        for chunk in calls.chunks(3) {
            assert_eq!(
                chunk,
                [Primitive::SetDataSource, Primitive::SetTopocentric, Primitive::Close]
            );
        }
    }
}
