//! C ABI tests over the in-memory engine.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr;
use std::sync::{Mutex, MutexGuard, OnceLock};

use ephq_core::mock::{MOCK_DELTA_T_DAYS, MockEngine, Primitive};
use ephq_core::{CalcFlags, DataSource};
use ephq_ffi_c::*;

static MOCK: OnceLock<MockEngine> = OnceLock::new();
// Failure injection touches the shared engine; tests take turns.
static TURN: Mutex<()> = Mutex::new(());

fn setup() -> (&'static MockEngine, MutexGuard<'static, ()>) {
    let guard = TURN.lock().unwrap_or_else(|e| e.into_inner());
    let mock = MOCK.get_or_init(|| {
        let mock = MockEngine::new();
        ephq_rs::init_with_engine(Box::new(mock.clone()), DataSource::BuiltIn)
            .expect("facade init");
        mock
    });
    (mock, guard)
}

const UT: f64 = 2_460_409.25;
const GEOPOS: [f64; 3] = [-122.42, 37.77, 16.0];
const EPHE: &[u8] = b"/usr/share/ephe";

fn last_error() -> String {
    let mut buf = [0 as c_char; 256];
    let status = unsafe { ephq_last_error(buf.as_mut_ptr(), buf.len()) };
    assert_eq!(status, EphqStatus::Ok);
    unsafe { CStr::from_ptr(buf.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

#[test]
fn reports_initialized() {
    let _t = setup();
    assert_eq!(ephq_is_initialized(), 1);
    assert_eq!(ephq_api_version(), EPHQ_API_VERSION);
    assert_eq!(
        unsafe { ephq_init(ptr::null(), 0) },
        EphqStatus::InvalidArgument
    );
}

#[test]
fn utc_to_jd_writes_engine_order() {
    let _t = setup();
    let mut out = [0.0; EPHQ_JULIAN_PAIR_LEN];
    let status = unsafe {
        ephq_utc_to_jd(ptr::null(), 0, 2000, 1, 1, 12, 0, 0.0, out.as_mut_ptr(), out.len())
    };
    assert_eq!(status, EphqStatus::Ok);
    let [tt, ut1] = out;
    assert!((ut1 - 2_451_545.0).abs() < 1e-9);
    assert!((tt - ut1 - MOCK_DELTA_T_DAYS).abs() < 1e-9);
}

#[test]
fn invalid_date_is_conversion_and_leaves_buffer() {
    let _t = setup();
    let mut out = [7.0; 2];
    let status = unsafe {
        ephq_utc_to_jd(ptr::null(), 0, 2023, 2, 30, 0, 0, 0.0, out.as_mut_ptr(), out.len())
    };
    assert_eq!(status, EphqStatus::Conversion);
    assert_eq!(out, [7.0; 2]);
    assert!(last_error().starts_with("conversion error"));
}

#[test]
fn jd_to_utc_text() {
    let _t = setup();
    let mut buf = [0 as c_char; 32];
    let status = unsafe { ephq_jd_to_utc(ptr::null(), 0, UT, buf.as_mut_ptr(), buf.len()) };
    assert_eq!(status, EphqStatus::Ok);
    let text = unsafe { CStr::from_ptr(buf.as_ptr()) }.to_str().unwrap();
    assert_eq!(text, "_2024_4_8_18_0_0.0_");

    let mut tiny = [0 as c_char; 4];
    let status = unsafe { ephq_jd_to_utc(ptr::null(), 0, UT, tiny.as_mut_ptr(), tiny.len()) };
    assert_eq!(status, EphqStatus::BufferTooSmall);
}

#[test]
fn position_layout() {
    let _t = setup();
    let mut out = [0.0; EPHQ_POSITION_LEN];
    let status = unsafe {
        ephq_position(
            ptr::null(),
            0,
            1,
            UT + MOCK_DELTA_T_DAYS,
            UT,
            GEOPOS.as_ptr(),
            0.0,
            0.0,
            out.as_mut_ptr(),
            out.len(),
        )
    };
    assert_eq!(status, EphqStatus::Ok);
    assert_eq!(out[..2], [50.0, 37.77]);
    assert!((out[2] - 1.016).abs() < 1e-12);
    assert_eq!(out[3..], [230.0, 37.77, -0.5]);
}

#[test]
fn live_position_equals_explicit_position() {
    let _t = setup();
    let mut live = [0.0; EPHQ_POSITION_LEN];
    let mut explicit = [0.0; EPHQ_POSITION_LEN];
    unsafe {
        assert_eq!(
            ephq_position_live(
                ptr::null(),
                0,
                4,
                UT,
                GEOPOS.as_ptr(),
                1013.25,
                15.0,
                live.as_mut_ptr(),
                live.len()
            ),
            EphqStatus::Ok
        );
        assert_eq!(
            ephq_position(
                ptr::null(),
                0,
                4,
                UT + MOCK_DELTA_T_DAYS,
                UT,
                GEOPOS.as_ptr(),
                1013.25,
                15.0,
                explicit.as_mut_ptr(),
                explicit.len()
            ),
            EphqStatus::Ok
        );
    }
    assert_eq!(live, explicit);
}

#[test]
fn bundled_path_selects_installed_tables() {
    let (mock, _t) = setup();
    mock.clear_calls();
    let mut out = [0.0; EPHQ_POSITION_LEN];
    let status = unsafe {
        ephq_position_live(
            EPHE.as_ptr(),
            EPHE.len(),
            0,
            UT,
            GEOPOS.as_ptr(),
            0.0,
            0.0,
            out.as_mut_ptr(),
            out.len(),
        )
    };
    assert_eq!(status, EphqStatus::Ok);
    let flags = mock.flags_of(Primitive::Calc);
    assert!(!flags.is_empty());
    assert!(flags.iter().all(|f| f.contains(CalcFlags::SWIEPH)));
    assert!(mock.data_source().is_none(), "session left open");
}

#[test]
fn horizon_events_and_sentinel() {
    let _t = setup();
    unsafe {
        assert_eq!(ephq_rise(ptr::null(), 0, 0, UT, GEOPOS.as_ptr(), 0.0, 0.0), UT + 0.25);
        assert_eq!(ephq_transit(ptr::null(), 0, 0, UT, GEOPOS.as_ptr()), UT + 0.5);
        assert_eq!(ephq_set(ptr::null(), 0, 0, UT, GEOPOS.as_ptr(), 0.0, 0.0), UT + 0.75);

        let pole = [0.0, 89.5, 0.0];
        assert_eq!(
            ephq_rise(ptr::null(), 0, 0, UT, pole.as_ptr(), 0.0, 0.0),
            EPHQ_NO_EVENT
        );
        assert!(last_error().contains("no event found"));

        assert_eq!(ephq_rise(ptr::null(), 0, 0, UT, ptr::null(), 0.0, 0.0), EPHQ_NO_EVENT);
    }
}

#[test]
fn eclipse_layouts() {
    let _t = setup();
    unsafe {
        let mut global = [0.0; EPHQ_GLOBAL_EVENT_LEN];
        assert_eq!(
            ephq_solar_global(ptr::null(), 0, UT, 0, global.as_mut_ptr(), global.len()),
            EphqStatus::Ok
        );
        assert_eq!(global[0], 5.0); // TOTAL | CENTRAL
        assert_eq!(global[1], UT + 10.0);

        let mut local = [0.0; EPHQ_SOLAR_LOCAL_LEN];
        assert_eq!(
            ephq_solar_local(
                ptr::null(),
                0,
                UT,
                GEOPOS.as_ptr(),
                0,
                local.as_mut_ptr(),
                local.len()
            ),
            EphqStatus::Ok
        );
        assert_eq!(local[10], 20.0); // sun azimuth, rotated
        assert!((0.0..360.0).contains(&local[17]));

        let mut point = [0.0; EPHQ_GROUND_POINT_LEN];
        assert_eq!(
            ephq_solar_where(ptr::null(), 0, UT + 10.0, point.as_mut_ptr(), point.len()),
            EphqStatus::Ok
        );
        assert_eq!(point, [-75.5, 40.25]);

        let mut lunar = [0.0; EPHQ_GLOBAL_EVENT_LEN];
        assert_eq!(
            ephq_lunar_global(ptr::null(), 0, UT, 1, lunar.as_mut_ptr(), lunar.len()),
            EphqStatus::Ok
        );
        assert_eq!(lunar[1], UT - 10.0);

        let mut lunar_local = [0.0; EPHQ_LUNAR_LOCAL_LEN];
        assert_eq!(
            ephq_lunar_local(
                ptr::null(),
                0,
                UT,
                GEOPOS.as_ptr(),
                0,
                lunar_local.as_mut_ptr(),
                lunar_local.len()
            ),
            EphqStatus::Ok
        );
        assert_eq!(lunar_local[15], 170.0); // moon azimuth, rotated
    }
}

#[test]
fn occultation_layouts() {
    let (mock, _t) = setup();
    unsafe {
        let mut global = [0.0; EPHQ_GLOBAL_EVENT_LEN];
        assert_eq!(
            ephq_occult_global(ptr::null(), 0, UT, 3, 0, global.as_mut_ptr(), global.len()),
            EphqStatus::Ok
        );
        assert_eq!(
            mock.search_modes().last(),
            Some(&ephq_core::SearchMode::SingleAttempt)
        );

        let mut local = [0.0; EPHQ_OCCULT_LOCAL_LEN];
        assert_eq!(
            ephq_occult_local(
                ptr::null(),
                0,
                UT,
                GEOPOS.as_ptr(),
                3,
                0,
                local.as_mut_ptr(),
                local.len()
            ),
            EphqStatus::Ok
        );
        assert!((0.0..360.0).contains(&local[11]));
        assert!((0.0..360.0).contains(&local[13]));
    }
}

#[test]
fn secondary_failure_writes_nothing() {
    let (mock, _t) = setup();
    mock.set_failing(Primitive::Calc, true);
    let mut local = [-3.0; EPHQ_SOLAR_LOCAL_LEN];
    let status = unsafe {
        ephq_solar_local(
            ptr::null(),
            0,
            UT,
            GEOPOS.as_ptr(),
            0,
            local.as_mut_ptr(),
            local.len(),
        )
    };
    mock.set_failing(Primitive::Calc, false);
    assert_eq!(status, EphqStatus::Engine);
    assert!(local.iter().all(|&v| v == -3.0));
    assert!(last_error().starts_with("engine error"));
}

#[test]
fn argument_errors() {
    let _t = setup();
    let mut out = [0.0; EPHQ_GLOBAL_EVENT_LEN];
    unsafe {
        assert_eq!(
            ephq_solar_global(ptr::null(), 0, UT, 2, out.as_mut_ptr(), out.len()),
            EphqStatus::InvalidArgument
        );
        assert_eq!(
            ephq_solar_global(ptr::null(), 0, UT, 0, ptr::null_mut(), 9),
            EphqStatus::NullPointer
        );
        assert_eq!(
            ephq_solar_global(ptr::null(), 0, UT, 0, out.as_mut_ptr(), 8),
            EphqStatus::BufferTooSmall
        );
        assert_eq!(
            ephq_solar_local(ptr::null(), 0, UT, ptr::null(), 0, out.as_mut_ptr(), out.len()),
            EphqStatus::NullPointer
        );
    }
}

#[test]
fn argument_errors_replace_an_earlier_engine_message() {
    let _t = setup();
    let mut bad = [0.0; 2];
    let status = unsafe {
        ephq_utc_to_jd(ptr::null(), 0, 2023, 2, 30, 0, 0, 0.0, bad.as_mut_ptr(), bad.len())
    };
    assert_eq!(status, EphqStatus::Conversion);
    assert!(last_error().starts_with("conversion error"));

    let mut out = [0.0; EPHQ_GLOBAL_EVENT_LEN];
    unsafe {
        assert_eq!(
            ephq_solar_global(ptr::null(), 0, UT, 0, out.as_mut_ptr(), 8),
            EphqStatus::BufferTooSmall
        );
    }
    assert_eq!(last_error(), "output buffer too small");

    unsafe {
        assert_eq!(
            ephq_lunar_global(ptr::null(), 0, UT, 7, out.as_mut_ptr(), out.len()),
            EphqStatus::InvalidArgument
        );
    }
    assert_eq!(last_error(), "invalid argument");
}

#[cfg(unix)]
#[test]
fn non_utf8_path_selects_installed_tables() {
    let (mock, _t) = setup();
    mock.clear_calls();
    let path = b"/opt/\xffephe";
    let mut out = [0.0; EPHQ_GLOBAL_EVENT_LEN];
    let status = unsafe {
        ephq_solar_global(path.as_ptr(), path.len(), UT, 0, out.as_mut_ptr(), out.len())
    };
    assert_eq!(status, EphqStatus::Ok);
    assert_eq!(
        mock.flags_of(Primitive::SolEclipseWhenGlob),
        vec![CalcFlags::SWIEPH]
    );
}
