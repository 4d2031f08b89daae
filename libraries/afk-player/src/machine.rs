//! Controller state machine
//!
//! All controller state changes go through [`transition`], a pure table of
//! `state × trigger → (next state, ticker change, persist?)`. Anything not in
//! the table is an [`PlaybackError::IllegalTransition`].

use crate::error::{PlaybackError, Result};
use serde::{Deserialize, Serialize};

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    /// Nothing requested yet (or torn down / between tracks)
    Idle,

    /// Waiting for the media resource to start; `attempt` counts from 1
    Attempting { attempt: u32 },

    Playing,

    Paused,

    /// Last attempt was rejected after `attempts` tries
    Failed { attempts: u32 },
}

/// Inputs to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    /// A new playback request (play_at, next, previous, resume)
    Request,

    /// Fallback chain moves on to its next candidate
    Retry,

    /// Media resource reports playback started
    Started,

    /// Media resource rejected the request
    Rejected,

    Pause,

    /// Natural end of the current track
    Ended,

    /// Page hidden (tab switch, pagehide)
    Hidden,

    Visible,

    /// Page entering the back/forward cache
    Suspend,

    Teardown,
}

/// What the persistence timer should do after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerChange {
    Keep,
    Start,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: PlayerState,
    pub ticker: TickerChange,
    /// Write the current snapshot through to the store
    pub persist: bool,
}

impl Transition {
    fn to(next: PlayerState) -> Self {
        Self {
            next,
            ticker: TickerChange::Keep,
            persist: false,
        }
    }

    fn ticker(mut self, ticker: TickerChange) -> Self {
        self.ticker = ticker;
        self
    }

    fn persist(mut self) -> Self {
        self.persist = true;
        self
    }
}

/// Look up the transition for `trigger` in `state`
pub fn transition(state: PlayerState, trigger: Trigger) -> Result<Transition> {
    use PlayerState::{Attempting, Failed, Idle, Paused, Playing};
    use TickerChange::{Start, Stop};

    let t = match (state, trigger) {
        // One request in flight at a time
        (Attempting { .. }, Trigger::Request) => return Err(illegal(state, trigger)),
        (Playing, Trigger::Request) => Transition::to(Attempting { attempt: 1 }).ticker(Stop),
        (Idle | Paused | Failed { .. }, Trigger::Request) => {
            Transition::to(Attempting { attempt: 1 })
        }

        (Failed { attempts }, Trigger::Retry) => Transition::to(Attempting {
            attempt: attempts + 1,
        }),

        (Attempting { .. }, Trigger::Started) => Transition::to(Playing).ticker(Start).persist(),
        (Attempting { attempt }, Trigger::Rejected) => {
            Transition::to(Failed { attempts: attempt })
        }

        (Playing, Trigger::Pause) => Transition::to(Paused).ticker(Stop).persist(),
        (Paused | Idle | Failed { .. }, Trigger::Pause) => Transition::to(state),

        (Playing, Trigger::Ended) => Transition::to(Idle).ticker(Stop),

        (Playing, Trigger::Hidden) => Transition::to(Playing).ticker(Stop).persist(),
        (Paused, Trigger::Hidden) => Transition::to(Paused).persist(),
        (_, Trigger::Hidden) => Transition::to(state),

        (Playing, Trigger::Visible) => Transition::to(Playing).ticker(Start),
        (_, Trigger::Visible) => Transition::to(state),

        (Playing, Trigger::Suspend) => Transition::to(Paused).ticker(Stop).persist(),
        (Paused, Trigger::Suspend) => Transition::to(Paused).persist(),
        (_, Trigger::Suspend) => Transition::to(state).ticker(Stop),

        (Playing | Paused, Trigger::Teardown) => Transition::to(Idle).ticker(Stop).persist(),
        (_, Trigger::Teardown) => Transition::to(Idle).ticker(Stop),

        _ => return Err(illegal(state, trigger)),
    };

    Ok(t)
}

fn illegal(state: PlayerState, trigger: Trigger) -> PlaybackError {
    PlaybackError::IllegalTransition { state, trigger }
}
