//! The closed set of bus topics and subscription patterns.
//!
//! Topic strings are hierarchical (`category.group.event`).  Patterns are
//! either an exact topic string or a `prefix.*` wildcard; both are checked
//! against the enumeration when a module registers.

use std::fmt;
use std::str::FromStr;

use crate::{BusError, BusResult};

/// Which side of the bus a topic belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// Emitted by modules, consumed by the engine.
    Request,
    /// Emitted by the engine after commit, consumed by modules.
    Notify,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    // ── notify ────────────────────────────────────────────────────────────
    StartSimulation,
    Tick,
    Midnight,
    EndSimulation,
    AgentHealth,
    AgentActivity,
    AgentLocation,
    TestBooked,
    TestResult,
    QuarantineStarted,
    QuarantineStopped,

    // ── request ───────────────────────────────────────────────────────────
    RequestHealth,
    RequestActivity,
    RequestLocation,
    RequestBookTest,
    RequestTestResult,
    RequestQuarantineStart,
    RequestQuarantineStop,
}

impl Topic {
    pub const ALL: [Topic; 18] = [
        Topic::StartSimulation,
        Topic::Tick,
        Topic::Midnight,
        Topic::EndSimulation,
        Topic::AgentHealth,
        Topic::AgentActivity,
        Topic::AgentLocation,
        Topic::TestBooked,
        Topic::TestResult,
        Topic::QuarantineStarted,
        Topic::QuarantineStopped,
        Topic::RequestHealth,
        Topic::RequestActivity,
        Topic::RequestLocation,
        Topic::RequestBookTest,
        Topic::RequestTestResult,
        Topic::RequestQuarantineStart,
        Topic::RequestQuarantineStop,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Topic::StartSimulation => "notify.time.start_simulation",
            Topic::Tick => "notify.time.tick",
            Topic::Midnight => "notify.time.midnight",
            Topic::EndSimulation => "notify.time.end_simulation",
            Topic::AgentHealth => "notify.agent.health",
            Topic::AgentActivity => "notify.agent.activity",
            Topic::AgentLocation => "notify.agent.location",
            Topic::TestBooked => "notify.testing.booked",
            Topic::TestResult => "notify.testing.result",
            Topic::QuarantineStarted => "notify.quarantine.start",
            Topic::QuarantineStopped => "notify.quarantine.stop",
            Topic::RequestHealth => "request.agent.health",
            Topic::RequestActivity => "request.agent.activity",
            Topic::RequestLocation => "request.agent.location",
            Topic::RequestBookTest => "request.testing.book_test",
            Topic::RequestTestResult => "request.testing.result",
            Topic::RequestQuarantineStart => "request.quarantine.start",
            Topic::RequestQuarantineStop => "request.quarantine.stop",
        }
    }

    pub fn category(self) -> Category {
        if self.as_str().starts_with("request.") { Category::Request } else { Category::Notify }
    }

    /// Position in [`Topic::ALL`]; used for table indexing.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = BusError;

    fn from_str(s: &str) -> BusResult<Topic> {
        Topic::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| BusError::UnknownPattern(s.to_owned()))
    }
}

// ── TopicPattern ──────────────────────────────────────────────────────────────

/// A validated subscription pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopicPattern {
    Exact(Topic),
    /// `prefix.*`; the stored prefix keeps its trailing dot.
    Prefix(String),
}

impl TopicPattern {
    /// Parse and validate a subscription pattern.
    ///
    /// # Errors
    ///
    /// [`BusError::UnknownPattern`] if the pattern names no topic, and
    /// [`BusError::NotSubscribable`] if it reaches any request topic.
    pub fn parse(pattern: &str) -> BusResult<TopicPattern> {
        let parsed = match pattern.strip_suffix('*') {
            Some(prefix) if prefix.ends_with('.') => TopicPattern::Prefix(prefix.to_owned()),
            Some(_) => return Err(BusError::UnknownPattern(pattern.to_owned())),
            None => TopicPattern::Exact(pattern.parse()?),
        };
        let topics = parsed.topics();
        if topics.is_empty() {
            return Err(BusError::UnknownPattern(pattern.to_owned()));
        }
        if topics.iter().any(|t| t.category() == Category::Request) {
            return Err(BusError::NotSubscribable(pattern.to_owned()));
        }
        Ok(parsed)
    }

    pub fn matches(&self, topic: Topic) -> bool {
        match self {
            TopicPattern::Exact(t) => *t == topic,
            TopicPattern::Prefix(p) => topic.as_str().starts_with(p.as_str()),
        }
    }

    /// Every topic this pattern selects, in enumeration order.
    pub fn topics(&self) -> Vec<Topic> {
        Topic::ALL.into_iter().filter(|&t| self.matches(t)).collect()
    }
}
