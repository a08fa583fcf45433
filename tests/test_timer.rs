use arcade_core::error::{CoreError, InvalidArgument};
use arcade_core::timer::*;

fn collect(s: &mut Scheduler<char>, dt: f64) -> Vec<char> {
    let mut fired = Vec::new();
    s.tick(dt, |_, _, e| {
        fired.push(e);
        Ok(())
    })
    .unwrap();
    fired
}

// ── schedule / tick ───────────────────────────────────────────────────────────

#[test]
fn one_shot_fires_once_when_due() {
    let mut s = Scheduler::new();
    s.schedule(100.0, false, 'a').unwrap();
    assert!(collect(&mut s, 50.0).is_empty());
    assert_eq!(collect(&mut s, 50.0), vec!['a']);
    assert!(collect(&mut s, 100.0).is_empty());
    assert!(s.is_empty());
}

#[test]
fn repeating_fires_every_period() {
    let mut s = Scheduler::new();
    let h = s.schedule(100.0, true, 'r').unwrap();
    let mut total = 0;
    for _ in 0..3 {
        total += collect(&mut s, 100.0).len();
    }
    assert_eq!(total, 3);
    assert!(s.is_pending(h));
}

#[test]
fn long_tick_fires_repeating_timer_once() {
    let mut s = Scheduler::new();
    s.schedule(100.0, true, 'r').unwrap();
    assert_eq!(collect(&mut s, 350.0), vec!['r']);
}

#[test]
fn zero_delay_fires_on_next_tick() {
    let mut s = Scheduler::new();
    s.schedule(0.0, false, 'z').unwrap();
    assert_eq!(collect(&mut s, 0.0), vec!['z']);
}

#[test]
fn due_timers_fire_in_registration_order() {
    let mut s = Scheduler::new();
    s.schedule(30.0, false, 'a').unwrap();
    s.schedule(10.0, false, 'b').unwrap();
    s.schedule(20.0, false, 'c').unwrap();
    assert_eq!(collect(&mut s, 50.0), vec!['a', 'b', 'c']);
}

#[test]
fn negative_delay_is_rejected() {
    let mut s: Scheduler<char> = Scheduler::new();
    let err = s.schedule(-1.0, false, 'x').unwrap_err();
    assert!(matches!(err, CoreError::InvalidArgument(InvalidArgument::NegativeDelay { .. })));
    assert!(s.is_empty());
}

#[test]
fn nan_delay_is_rejected() {
    let mut s: Scheduler<char> = Scheduler::new();
    assert!(s.schedule(f64::NAN, true, 'x').is_err());
}

#[test]
fn negative_tick_is_rejected() {
    let mut s: Scheduler<char> = Scheduler::new();
    assert!(s.tick(-5.0, |_, _, _| Ok(())).is_err());
}

// ── cancel ────────────────────────────────────────────────────────────────────

#[test]
fn cancel_pending_timer() {
    let mut s = Scheduler::new();
    let h = s.schedule(10.0, false, 'a').unwrap();
    assert!(s.cancel(h));
    assert!(!s.cancel(h));
    assert!(collect(&mut s, 100.0).is_empty());
}

#[test]
fn cancel_after_one_shot_fired_is_harmless() {
    let mut s = Scheduler::new();
    let h = s.schedule(10.0, false, 'a').unwrap();
    collect(&mut s, 10.0);
    assert!(!s.cancel(h));
}

#[test]
fn cancel_inside_callback_skips_later_due_timer() {
    let mut s = Scheduler::new();
    s.schedule(10.0, false, 'a').unwrap();
    let b = s.schedule(10.0, false, 'b').unwrap();
    let mut fired = Vec::new();
    s.tick(10.0, |s, _, e| {
        fired.push(e);
        if e == 'a' {
            s.cancel(b);
        }
        Ok(())
    })
    .unwrap();
    assert_eq!(fired, vec!['a']);
    assert!(!s.is_pending(b));
}

#[test]
fn repeating_timer_can_cancel_itself() {
    let mut s = Scheduler::new();
    s.schedule(10.0, true, 'r').unwrap();
    s.tick(10.0, |s, h, _| {
        s.cancel(h);
        Ok(())
    })
    .unwrap();
    assert!(s.is_empty());
}

#[test]
fn cancel_where_keeps_non_matching() {
    let mut s = Scheduler::new();
    s.schedule(10.0, true, 'a').unwrap();
    s.schedule(10.0, false, 'b').unwrap();
    s.schedule(10.0, true, 'a').unwrap();
    assert_eq!(s.cancel_where(|e| *e == 'a'), 2);
    assert_eq!(s.len(), 1);
    assert_eq!(collect(&mut s, 10.0), vec!['b']);
}

// ── scheduling from a callback ────────────────────────────────────────────────

#[test]
fn timer_scheduled_in_callback_waits_for_next_tick() {
    let mut s = Scheduler::new();
    s.schedule(10.0, false, 'a').unwrap();
    let mut fired = Vec::new();
    s.tick(10.0, |s, _, e| {
        fired.push(e);
        s.schedule(0.0, false, 'c')?;
        Ok(())
    })
    .unwrap();
    assert_eq!(fired, vec!['a']);
    assert_eq!(collect(&mut s, 0.0), vec!['c']);
}

#[test]
fn set_delay_changes_next_period() {
    let mut s = Scheduler::new();
    let h = s.schedule(100.0, true, 'r').unwrap();
    s.tick(100.0, |s, h, _| {
        s.set_delay(h, 300.0)?;
        Ok(())
    })
    .unwrap();
    assert!(collect(&mut s, 200.0).is_empty());
    assert_eq!(collect(&mut s, 100.0), vec!['r']);
    assert!(s.is_pending(h));
}

#[test]
fn set_delay_on_gone_timer_reports_false() {
    let mut s = Scheduler::new();
    let h = s.schedule(10.0, false, 'a').unwrap();
    s.cancel(h);
    assert_eq!(s.set_delay(h, 20.0), Ok(false));
    assert!(s.set_delay(h, -1.0).is_err());
}

#[test]
fn callback_error_aborts_tick() {
    let mut s = Scheduler::new();
    s.schedule(10.0, false, 'a').unwrap();
    s.schedule(10.0, false, 'b').unwrap();
    let mut fired = Vec::new();
    let result = s.tick(10.0, |_, _, e| {
        fired.push(e);
        Err(InvalidArgument::NegativeDelay { delay_ms: -1.0 }.into())
    });
    assert!(result.is_err());
    assert_eq!(fired, vec!['a']);
}
