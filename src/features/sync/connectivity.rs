//! Online/offline tracking.
//!
//! The monitor turns a stream of connectivity readings into transitions.
//! Only `offline -> online` is actionable: it is what starts a drain.

/// Source of the current connectivity state.
pub trait ConnectivitySignal {
    fn is_online(&self) -> bool;
}

/// A signal that always reports the same state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticSignal(pub bool);

impl ConnectivitySignal for StaticSignal {
    fn is_online(&self) -> bool {
        self.0
    }
}

/// A change in connectivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    CameOnline,
    WentOffline,
}

/// Two-state machine fed by connectivity readings.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    online: bool,
}

impl ConnectivityMonitor {
    /// Start in the state the signal currently reports.
    #[must_use]
    pub fn from_signal(signal: &dyn ConnectivitySignal) -> Self {
        Self::new(signal.is_online())
    }

    #[must_use]
    pub const fn new(online: bool) -> Self {
        Self { online }
    }

    #[must_use]
    pub const fn is_online(&self) -> bool {
        self.online
    }

    /// Record a reading. Returns the transition, if the state changed.
    pub fn observe(&mut self, online: bool) -> Option<Transition> {
        if online == self.online {
            return None;
        }
        self.online = online;

        let transition = if online {
            Transition::CameOnline
        } else {
            Transition::WentOffline
        };
        tracing::info!(?transition, "connectivity changed");
        Some(transition)
    }
}
