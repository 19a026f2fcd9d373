//! Domain types providing compile-time safety and self-documentation
//!
//! strace reports a single id per line. With `-f` that id is the kernel task
//! id, so it doubles as both process and thread id unless we attached to a
//! known process.

use std::fmt;

/// Process ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(pub u32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PID:{}", self.0)
    }
}

/// Thread ID as printed at the start of every strace line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tid(pub u32);

impl Tid {
    /// The pid used for a thread when no attached process is known.
    #[must_use]
    pub fn as_pid(self) -> Pid {
        Pid(self.0)
    }
}

impl fmt::Display for Tid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TID:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Pid(42).to_string(), "PID:42");
        assert_eq!(Tid(7).to_string(), "TID:7");
    }

    #[test]
    fn test_tid_as_pid() {
        assert_eq!(Tid(1234).as_pid(), Pid(1234));
    }
}
