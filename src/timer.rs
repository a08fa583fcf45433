/// Frame-clock scheduler for delayed and repeating events.
///
/// Timers carry a plain event value instead of a closure; the owner of the
/// scheduler decides what an event means when it fires.  This keeps all
/// mutable game state in one place and lets a firing event cancel or
/// schedule other timers through the `&mut Scheduler` it is handed.
use crate::error::{CoreError, InvalidArgument};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Clone, Debug)]
struct Timer<T> {
    handle: TimerHandle,
    delay_ms: f64,
    elapsed_ms: f64,
    repeat: bool,
    event: T,
}

#[derive(Clone, Debug)]
pub struct Scheduler<T> {
    /// Kept in registration order; ties fire in this order.
    timers: Vec<Timer<T>>,
    next_handle: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Scheduler { timers: Vec::new(), next_handle: 1 }
    }
}

fn check_delay(delay_ms: f64) -> Result<(), CoreError> {
    if !delay_ms.is_finite() || delay_ms < 0.0 {
        return Err(InvalidArgument::NegativeDelay { delay_ms }.into());
    }
    Ok(())
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `event` to fire once `delay_ms` of ticked time has passed.
    /// A repeating timer starts over with the same delay after each firing.
    pub fn schedule(
        &mut self,
        delay_ms: f64,
        repeat: bool,
        event: T,
    ) -> Result<TimerHandle, CoreError> {
        check_delay(delay_ms)?;
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.timers.push(Timer { handle, delay_ms, elapsed_ms: 0.0, repeat, event });
        Ok(handle)
    }

    /// Remove a pending timer.  Returns `false` if it already fired (one-shot)
    /// or was cancelled before; calling it again is harmless.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    /// Cancel every pending timer whose event matches; returns how many went.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| !pred(&t.event));
        before - self.timers.len()
    }

    /// Change the delay used for the next firing of a pending timer.
    /// Spawner-style timers redraw a fresh random delay after every firing.
    pub fn set_delay(&mut self, handle: TimerHandle, delay_ms: f64) -> Result<bool, CoreError> {
        check_delay(delay_ms)?;
        match self.timers.iter_mut().find(|t| t.handle == handle) {
            Some(timer) => {
                timer.delay_ms = delay_ms;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Advance every pending timer by `dt_ms` and fire the ones that are due,
    /// in registration order.
    ///
    /// `on_fire` may cancel or schedule timers.  A timer cancelled by an
    /// earlier firing in the same tick does not fire; timers scheduled during
    /// the tick start counting from the next tick.  The first error aborts
    /// the tick.
    pub fn tick<F>(&mut self, dt_ms: f64, mut on_fire: F) -> Result<(), CoreError>
    where
        F: FnMut(&mut Self, TimerHandle, T) -> Result<(), CoreError>,
    {
        check_delay(dt_ms)?;
        let mut due = Vec::new();
        for timer in &mut self.timers {
            timer.elapsed_ms += dt_ms;
            if timer.elapsed_ms >= timer.delay_ms {
                due.push(timer.handle);
            }
        }

        for handle in due {
            let Some(index) = self.timers.iter().position(|t| t.handle == handle) else {
                continue; // cancelled by an earlier firing
            };
            let event = if self.timers[index].repeat {
                let timer = &mut self.timers[index];
                timer.elapsed_ms = 0.0;
                timer.event.clone()
            } else {
                self.timers.remove(index).event
            };
            on_fire(self, handle, event)?;
        }
        Ok(())
    }
}
