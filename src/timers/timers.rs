use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct InnerTimer {
    start: Option<Instant>,
    elapsed: Duration,
    subtimers: SubTimersMap,
}

impl InnerTimer {
    fn reset(&mut self) {
        self.start = None;
        self.elapsed = Duration::ZERO;
        self.subtimers.clear();
    }

    fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(instant) = self.start.take() {
            self.elapsed += instant.elapsed();
        }
    }

    fn suspend(&mut self) {
        //save current elapsed and suspend
        //subtimers if this timer appears active
        if let Some(instant) = self.start {
            self.elapsed += instant.elapsed();
            self.subtimers.suspend();
        }
    }

    fn resume(&mut self) {
        //resume if this timer appears active.
        //just refresh start time to now.
        if self.start.is_some() {
            self.start = Some(Instant::now());
            self.subtimers.resume();
        }
    }

    // includes time accumulated by a timer that is still running
    fn elapsed(&self) -> Duration {
        match self.start {
            Some(instant) => self.elapsed + instant.elapsed(),
            None => self.elapsed,
        }
    }
}

#[derive(Debug, Default)]
struct SubTimersMap(HashMap<&'static str, InnerTimer>);

impl Deref for SubTimersMap {
    type Target = HashMap<&'static str, InnerTimer>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl DerefMut for SubTimersMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl SubTimersMap {
    fn reset_subtimer(&mut self, key: &'static str) {
        self.entry(key).or_default().reset();
    }

    fn start_subtimer(&mut self, key: &'static str) {
        self.entry(key).or_default().start();
    }

    //this function suspends every timer in the
    //collection.   Used for notimeit!
    fn suspend(&mut self) {
        for t in self.values_mut() {
            t.suspend();
        }
    }

    fn resume(&mut self) {
        for t in self.values_mut() {
            t.resume();
        }
    }

    fn total_time(&self) -> Duration {
        self.values()
            .fold(Duration::ZERO, |acc, t| acc + t.elapsed())
    }

    fn find(&self, path: &[&'static str]) -> Option<&InnerTimer> {
        let (first, rest) = path.split_first()?;
        let timer = self.get(first)?;
        if rest.is_empty() {
            Some(timer)
        } else {
            timer.subtimers.find(rest)
        }
    }

    fn write_to(&self, out: &mut dyn std::io::Write, depth: usize) -> std::io::Result<()> {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort();
        for key in keys {
            let val = &self[key];
            let tabs = format!("{: <1$}", "", 4 * depth);
            writeln!(out, "{}{} : {:?}", tabs, key, val.elapsed())?;
            val.subtimers.write_to(out, depth + 1)?;
        }
        Ok(())
    }
}

/// Nested wall clock timers, keyed by name.
#[derive(Default, Debug)]
pub struct Timers {
    stack: Vec<&'static str>,
    subtimers: SubTimersMap,
}

impl Timers {
    fn mut_active_timer(&mut self) -> Option<&mut InnerTimer> {
        let (first, rest) = self.stack.split_first()?;
        let mut active_timer = self.subtimers.get_mut(first)?;
        for key in rest {
            active_timer = active_timer.subtimers.get_mut(key)?;
        }
        Some(active_timer)
    }

    pub fn reset_timer(&mut self, key: &'static str) {
        self.subtimers.reset_subtimer(key);
    }

    /// starts a timer with name `key` as the current timer
    pub fn start_as_current(&mut self, key: &'static str) {
        if let Some(active) = self.mut_active_timer() {
            // child of current active timer
            active.subtimers.start_subtimer(key);
        } else {
            // nothing active, create one at root
            self.subtimers.start_subtimer(key);
        }
        self.stack.push(key);
    }

    /// stops the current timer
    pub fn stop_current(&mut self) {
        if let Some(active) = self.mut_active_timer() {
            active.stop();
        }
        self.stack.pop();
    }

    //Suspend every timer in the collection.   Used for notimeit!
    pub fn suspend(&mut self) {
        self.subtimers.suspend();
    }

    //Resume every timer in the collection.   Used for notimeit!
    pub fn resume(&mut self) {
        self.subtimers.resume();
    }

    /// Total time over all root level timers
    pub fn total_time(&self) -> Duration {
        self.subtimers.total_time()
    }

    /// Elapsed time for a nested timer, e.g. `&["solve", "polish"]`
    pub fn elapsed(&self, path: &[&'static str]) -> Duration {
        self.subtimers
            .find(path)
            .map_or(Duration::ZERO, |t| t.elapsed())
    }

    /// Write the timer tree to an output stream
    pub fn print(&self, out: &mut dyn std::io::Write) -> std::io::Result<()> {
        self.subtimers.write_to(out, 0)
    }
}

macro_rules! timeit {
    ($timer:ident => $key:literal; $($tt:tt)+) => {

        $timer.start_as_current($key);
        $(
            $tt
        )+
        $timer.stop_current();
    }
}
pub(crate) use timeit;

macro_rules! notimeit {
    ($timer:ident; $($tt:tt)+) => {

        $timer.suspend();
        $(
            $tt
        )+
        $timer.resume();
    }
}
pub(crate) use notimeit;

#[test]
fn test_timers_nesting() {
    let mut timers = Timers::default();

    timeit! {timers => "outer"; {
        timeit!{timers => "inner"; {
            std::thread::sleep(Duration::from_millis(2));
        }}
        // a running timer reports its time so far
        assert!(timers.elapsed(&["outer"]) >= Duration::from_millis(2));
    }}

    let outer = timers.elapsed(&["outer"]);
    let inner = timers.elapsed(&["outer", "inner"]);
    assert!(inner >= Duration::from_millis(2));
    assert!(outer >= inner);
    assert_eq!(timers.total_time(), outer);
    assert_eq!(timers.elapsed(&["missing"]), Duration::ZERO);

    let mut buf = Vec::new();
    timers.print(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("outer"));
    assert!(text.contains("    inner"));
}
