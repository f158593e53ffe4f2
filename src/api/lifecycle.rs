//! Host application lifecycle signal

use std::fmt;

/// Foreground/background transition reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleSignal {
    #[default]
    Foreground,
    Background,
}

impl fmt::Display for LifecycleSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleSignal::Foreground => f.write_str("Foreground"),
            LifecycleSignal::Background => f.write_str("Background"),
        }
    }
}
