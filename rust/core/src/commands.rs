// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synchronous command queue with an explicit recompute barrier
//!
//! Mutations are queued with [`CommandQueue::push`] and only reach the host on
//! [`CommandQueue::flush`], which applies them in order and then regenerates
//! the document. Derived reads go through [`CommandQueue::derived`], which
//! refuses to hand out the document while mutations are still queued.

use crate::document::{CommandOutput, HostCommand, HostDocument};
use crate::error::{Error, HostError, Result};
use crate::host::HostId;

/// Handle to the outcome of a queued command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(usize);

/// Outcome of one flushed command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub ticket: Ticket,
    pub command: &'static str,
    pub result: std::result::Result<CommandOutput, HostError>,
}

/// Per-command outcomes of one barrier, in submission order
#[derive(Debug, Clone, Default)]
pub struct FlushReport {
    outcomes: Vec<CommandOutcome>,
}

impl FlushReport {
    pub fn outcome(&self, ticket: Ticket) -> Option<&CommandOutcome> {
        self.outcomes.iter().find(|o| o.ticket == ticket)
    }

    /// Id created by the command behind `ticket`, if it was accepted
    pub fn created(&self, ticket: Ticket) -> Option<HostId> {
        self.outcome(ticket)?
            .result
            .as_ref()
            .ok()
            .and_then(CommandOutput::created_id)
    }

    /// Result of the command behind `ticket`
    pub fn result(&self, ticket: Ticket) -> Result<CommandOutput> {
        match self.outcome(ticket) {
            Some(outcome) => outcome.result.clone().map_err(Error::from),
            None => Err(Error::MissingOutcome(ticket.0)),
        }
    }

    pub fn accepted_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn rejected(&self) -> impl Iterator<Item = &CommandOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Queue of host mutations bound to one document
pub struct CommandQueue<'d, D: HostDocument + ?Sized> {
    document: &'d mut D,
    pending: Vec<(Ticket, HostCommand)>,
    next_ticket: usize,
    barriers: usize,
}

impl<'d, D: HostDocument + ?Sized> CommandQueue<'d, D> {
    pub fn new(document: &'d mut D) -> Self {
        Self {
            document,
            pending: Vec::new(),
            next_ticket: 0,
            barriers: 0,
        }
    }

    /// Queue a mutation; nothing reaches the host until [`Self::flush`]
    pub fn push(&mut self, command: HostCommand) -> Ticket {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.pending.push((ticket, command));
        ticket
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Number of barriers passed so far
    #[inline]
    pub fn barriers(&self) -> usize {
        self.barriers
    }

    /// Apply every queued command in order, then regenerate.
    ///
    /// Individual rejections are recorded in the report; only a failed
    /// regeneration is an error.
    pub fn flush(&mut self) -> Result<FlushReport> {
        let mut outcomes = Vec::with_capacity(self.pending.len());

        for (ticket, command) in self.pending.drain(..) {
            let result = self.document.apply(&command);
            if let Err(err) = &result {
                tracing::debug!(command = command.name(), error = %err, "Host rejected command");
            }
            outcomes.push(CommandOutcome {
                ticket,
                command: command.name(),
                result,
            });
        }

        self.document.regenerate()?;
        self.barriers += 1;

        Ok(FlushReport { outcomes })
    }

    /// Read access for derived geometry; fails while mutations are queued
    pub fn derived(&self) -> Result<&D> {
        if self.pending.is_empty() {
            Ok(&*self.document)
        } else {
            Err(Error::StaleGeometry {
                pending: self.pending.len(),
            })
        }
    }

    /// Read access for data that does not depend on regeneration (levels,
    /// loadable types)
    pub fn document(&self) -> &D {
        &*self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{GridFamily, HostGridLine, HostLevel, NamedType, TypeCategory};
    use crate::units::Xyz;

    /// Counts grid lines; only regenerated lines are visible
    #[derive(Default)]
    struct CountingDocument {
        applied: usize,
        visible: usize,
        regenerations: usize,
    }

    impl HostDocument for CountingDocument {
        fn apply(&mut self, command: &HostCommand) -> std::result::Result<CommandOutput, HostError> {
            match command {
                HostCommand::AddGridLine { point, .. } if point.z < 0.0 => {
                    Err(HostError::rejected(command.name(), "below wall base"))
                }
                HostCommand::AddGridLine { .. } => {
                    self.applied += 1;
                    Ok(CommandOutput::Created(HostId(self.applied as i64)))
                }
                _ => Ok(CommandOutput::Modified),
            }
        }

        fn regenerate(&mut self) -> std::result::Result<(), HostError> {
            self.visible = self.applied;
            self.regenerations += 1;
            Ok(())
        }

        fn levels(&self) -> Vec<HostLevel> {
            Vec::new()
        }

        fn element_types(&self, _category: TypeCategory) -> Vec<NamedType> {
            Vec::new()
        }

        fn min_symbol_height(&self, _symbol: HostId) -> Option<f64> {
            None
        }

        fn grid_lines(&self, _wall: HostId, _family: GridFamily) -> Vec<HostGridLine> {
            Vec::new()
        }

        fn panel_ids(&self, _wall: HostId) -> Vec<HostId> {
            (0..self.visible as i64).map(HostId).collect()
        }

        fn wall_orientation(&self, _wall: HostId) -> Option<Xyz> {
            None
        }
    }

    fn add_line(z: f64) -> HostCommand {
        HostCommand::AddGridLine {
            wall: HostId(1),
            family: GridFamily::U,
            point: Xyz::new(0.0, 0.0, z),
        }
    }

    #[test]
    fn test_derived_reads_blocked_until_flush() {
        let mut doc = CountingDocument::default();
        let mut queue = CommandQueue::new(&mut doc);

        queue.push(add_line(1.0));
        assert!(matches!(
            queue.derived(),
            Err(Error::StaleGeometry { pending: 1 })
        ));

        queue.flush().unwrap();
        let derived = queue.derived().unwrap();
        assert_eq!(derived.panel_ids(HostId(1)).len(), 1);
        assert_eq!(queue.barriers(), 1);
    }

    #[test]
    fn test_rejections_are_recorded_not_fatal() {
        let mut doc = CountingDocument::default();
        let mut queue = CommandQueue::new(&mut doc);

        let ok = queue.push(add_line(2.0));
        let bad = queue.push(add_line(-2.0));
        let report = queue.flush().unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(report.accepted_count(), 1);
        assert_eq!(report.created(ok), Some(HostId(1)));
        assert!(report.created(bad).is_none());
        assert!(matches!(
            report.result(bad),
            Err(Error::Host(HostError::MutationRejected { .. }))
        ));
        assert_eq!(report.rejected().count(), 1);
    }

    #[test]
    fn test_flush_always_regenerates() {
        let mut doc = CountingDocument::default();
        {
            let mut queue = CommandQueue::new(&mut doc);
            let report = queue.flush().unwrap();
            assert!(report.is_empty());
            queue.flush().unwrap();
        }
        assert_eq!(doc.regenerations, 2);
    }
}
