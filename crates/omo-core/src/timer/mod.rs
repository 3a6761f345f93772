mod countdown;
mod stopwatch;

pub use countdown::{Countdown, CountdownState};
pub use stopwatch::{Stopwatch, StopwatchState};
