//! Request tickets for matching asynchronous responses to the state that
//! issued them.

use std::fmt;

/// Identifies one outstanding request and the generation it was issued under.
///
/// A response is only applied if its ticket's generation is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub id: u64,
    pub generation: u64,
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.id, self.generation)
    }
}

/// Hands out tickets and tracks the current generation.
#[derive(Debug, Clone, Default)]
pub struct TicketIssuer {
    next_id: u64,
    generation: u64,
}

impl TicketIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket under the current generation.
    pub fn issue(&mut self) -> Ticket {
        let ticket = Ticket {
            id: self.next_id,
            generation: self.generation,
        };
        self.next_id += 1;
        ticket
    }

    /// Start a new generation. Tickets issued before this are stale.
    pub fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Check if a ticket was issued under the current generation.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.generation == self.generation
    }
}
