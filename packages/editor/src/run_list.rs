//! Gapless sequence of text extents, each tagged with a property value.
//!
//! The list is never empty: the last run (the tail) always exists and is
//! the one new text extends. Runs before the tail only change through
//! rollback.

use crate::errors::{WriteError, WriteResult};

/// Character position in the document text
pub type Cp = u32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run<P> {
    pub first: Cp,
    pub lim: Cp,
    pub prop: P,
}

impl<P> Run<P> {
    pub fn is_empty(&self) -> bool {
        self.first == self.lim
    }
}

#[derive(Debug, Clone)]
struct Breakpoint<P> {
    done: usize,
    lim: Cp,
    prop: P,
}

/// What a rollback removed
#[derive(Debug)]
pub struct Rolledback<P> {
    /// Runs appended after the breakpoint, in order
    pub discarded: Vec<Run<P>>,
    /// Value the restored tail carried just before the rollback
    pub displaced: P,
}

#[derive(Debug, Clone)]
pub struct RunList<P> {
    done: Vec<Run<P>>,
    tail: Run<P>,
    breakpoint: Option<Breakpoint<P>>,
}

impl<P: Clone> RunList<P> {
    pub fn new(prop: P) -> Self {
        Self {
            done: Vec::new(),
            tail: Run {
                first: 0,
                lim: 0,
                prop,
            },
            breakpoint: None,
        }
    }

    pub fn len(&self) -> usize {
        self.done.len() + 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Run<P>> {
        self.done.iter().chain(std::iter::once(&self.tail))
    }

    pub fn tail(&self) -> &Run<P> {
        &self.tail
    }

    pub fn tail_prop_mut(&mut self) -> &mut P {
        &mut self.tail.prop
    }

    /// End of the covered text
    pub fn end(&self) -> Cp {
        self.tail.lim
    }

    pub fn extend(&mut self, lim: Cp) {
        self.tail.lim = lim;
    }

    /// Append a run starting where the tail ends, carrying a copy of the
    /// tail's value.
    pub fn push_run(&mut self) -> WriteResult<()> {
        self.done.try_reserve(1)?;
        let next = Run {
            first: self.tail.lim,
            lim: self.tail.lim,
            prop: self.tail.prop.clone(),
        };
        let prev = std::mem::replace(&mut self.tail, next);
        self.done.push(prev);
        Ok(())
    }

    /// Like [`push_run`](Self::push_run), but an empty tail is reused
    /// rather than left behind covering no text.
    pub fn start_new_run(&mut self) -> WriteResult<()> {
        if self.tail.is_empty() {
            return Ok(());
        }
        self.push_run()
    }

    pub fn has_breakpoint(&self) -> bool {
        self.breakpoint.is_some()
    }

    pub fn breakpoint(&mut self) -> WriteResult<()> {
        if self.breakpoint.is_some() {
            tracing::warn!(runs = self.len(), "breakpoint already pending");
            return Err(WriteError::BreakpointPending);
        }
        self.breakpoint = Some(Breakpoint {
            done: self.done.len(),
            lim: self.tail.lim,
            prop: self.tail.prop.clone(),
        });
        Ok(())
    }

    pub fn commit(&mut self) {
        self.breakpoint = None;
    }

    /// Restore the list to its shape and tail at the breakpoint
    pub fn rollback(&mut self) -> WriteResult<Rolledback<P>> {
        let bp = self.breakpoint.take().ok_or(WriteError::NoBreakpoint)?;

        let mut discarded = Vec::new();
        if self.done.len() > bp.done {
            discarded = self.done.split_off(bp.done);
            let old_tail = discarded.remove(0);
            discarded.push(std::mem::replace(&mut self.tail, old_tail));
        }

        self.tail.lim = bp.lim;
        let displaced = std::mem::replace(&mut self.tail.prop, bp.prop);
        Ok(Rolledback {
            discarded,
            displaced,
        })
    }

    /// Drop every run and start over with a single empty one.
    ///
    /// Returns the dropped runs.
    pub fn reset(&mut self, prop: P) -> Vec<Run<P>> {
        let mut old = std::mem::take(&mut self.done);
        old.push(std::mem::replace(
            &mut self.tail,
            Run {
                first: 0,
                lim: 0,
                prop,
            },
        ));
        self.breakpoint = None;
        old
    }

    /// Runs are contiguous from zero
    pub fn is_gapless(&self) -> bool {
        let mut expected = 0;
        for run in self.iter() {
            if run.first != expected || run.lim < run.first {
                return false;
            }
            expected = run.lim;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_new_run_reuses_empty_tail() {
        let mut list = RunList::new('a');
        list.start_new_run().unwrap();
        assert_eq!(list.len(), 1);

        list.extend(4);
        list.start_new_run().unwrap();
        *list.tail_prop_mut() = 'b';
        list.extend(6);

        let runs: Vec<_> = list.iter().cloned().collect();
        assert_eq!(
            runs,
            vec![
                Run { first: 0, lim: 4, prop: 'a' },
                Run { first: 4, lim: 6, prop: 'b' },
            ]
        );
        assert!(list.is_gapless());
    }

    #[test]
    fn test_push_run_always_appends() {
        let mut list = RunList::new(1);
        list.push_run().unwrap();
        list.push_run().unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.is_gapless());
    }

    #[test]
    fn test_rollback_restores_tail() {
        let mut list = RunList::new('a');
        list.extend(3);
        list.breakpoint().unwrap();

        list.extend(5);
        *list.tail_prop_mut() = 'z';
        list.start_new_run().unwrap();
        *list.tail_prop_mut() = 'b';
        list.extend(9);

        let rolled = list.rollback().unwrap();
        assert_eq!(rolled.displaced, 'z');
        assert_eq!(rolled.discarded.len(), 1);
        assert_eq!(rolled.discarded[0].prop, 'b');
        assert_eq!(list.len(), 1);
        assert_eq!(list.tail(), &Run { first: 0, lim: 3, prop: 'a' });
    }

    #[test]
    fn test_rollback_without_new_runs() {
        let mut list = RunList::new(0u8);
        list.breakpoint().unwrap();
        list.extend(10);
        let rolled = list.rollback().unwrap();
        assert!(rolled.discarded.is_empty());
        assert_eq!(list.end(), 0);
    }

    #[test]
    fn test_nested_breakpoint_is_an_error() {
        let mut list = RunList::new(0u8);
        list.breakpoint().unwrap();
        assert!(matches!(list.breakpoint(), Err(WriteError::BreakpointPending)));
        list.commit();
        assert!(matches!(list.rollback(), Err(WriteError::NoBreakpoint)));
    }

    #[test]
    fn test_reset_returns_old_runs() {
        let mut list = RunList::new(0u8);
        list.extend(2);
        list.push_run().unwrap();
        let old = list.reset(7);
        assert_eq!(old.len(), 2);
        assert_eq!(list.len(), 1);
        assert_eq!(list.tail().prop, 7);
    }
}
