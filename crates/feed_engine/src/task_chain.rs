//! Sequential runner of (work, continuation) steps over an owned state.
//!
//! Each step's work is built from the state as it stands after the
//! previous continuation ran, so later steps can depend on earlier ones.
//! Steps never overlap.

use std::collections::VecDeque;

use futures_util::future::BoxFuture;

/// Continuation verdict: run the next step or finish now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// How a chain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEnd {
    /// Every step ran.
    Exhausted,
    /// A continuation returned [`Flow::Stop`] after `executed` steps.
    Stopped { executed: usize },
}

type Work<'a, S, W> = Box<dyn FnOnce(&S) -> BoxFuture<'a, W> + Send + 'a>;
type Then<'a, S, W> = Box<dyn FnOnce(&mut S, W) -> Flow + Send + 'a>;

pub struct TaskChain<'a, S, W> {
    steps: VecDeque<(Work<'a, S, W>, Then<'a, S, W>)>,
}

impl<'a, S, W> Default for TaskChain<'a, S, W> {
    fn default() -> Self {
        Self {
            steps: VecDeque::new(),
        }
    }
}

impl<'a, S, W> TaskChain<'a, S, W>
where
    S: Send + 'a,
    W: Send + 'a,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step; steps run in the order they were added.
    pub fn add<F, C>(&mut self, work: F, then: C) -> &mut Self
    where
        F: FnOnce(&S) -> BoxFuture<'a, W> + Send + 'a,
        C: FnOnce(&mut S, W) -> Flow + Send + 'a,
    {
        self.steps.push_back((Box::new(work), Box::new(then)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Runs the steps one at a time and hands the state back when the
    /// chain ends, which happens exactly once.
    pub async fn execute(mut self, mut state: S) -> (S, ChainEnd) {
        let mut executed = 0;
        while let Some((work, then)) = self.steps.pop_front() {
            let pending = work(&state);
            let output = pending.await;
            executed += 1;
            if then(&mut state, output) == Flow::Stop {
                return (state, ChainEnd::Stopped { executed });
            }
        }
        (state, ChainEnd::Exhausted)
    }
}
