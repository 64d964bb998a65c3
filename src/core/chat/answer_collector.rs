// Question/answer collector.
//
// A small explicit state machine: the service feeds it message events and a
// single timeout event, and it tells the service what to do next. No I/O here.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    /// Waiting for the answer to question `i`.
    AwaitingAnswer(usize),
    Complete,
    Cancelled,
}

/// What the caller should do after feeding a message in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorStep {
    /// Wrong author, or the collector already stopped.
    Ignored,
    /// Answer stored; post question `i` next.
    AskNext(usize),
    /// Last answer stored; stop listening.
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorOutcome {
    Complete(Vec<String>),
    Cancelled { collected: usize, expected: usize },
}

pub struct AnswerCollector {
    author_id: u64,
    expected: usize,
    answers: Vec<String>,
    state: CollectorState,
}

impl AnswerCollector {
    pub fn new(author_id: u64, expected: usize) -> Self {
        let state = if expected == 0 {
            CollectorState::Complete
        } else {
            CollectorState::AwaitingAnswer(0)
        };

        Self {
            author_id,
            expected,
            answers: Vec::with_capacity(expected),
            state,
        }
    }

    pub fn state(&self) -> CollectorState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        matches!(self.state, CollectorState::AwaitingAnswer(_))
    }

    pub fn on_message(&mut self, author_id: u64, content: &str) -> CollectorStep {
        let index = match self.state {
            CollectorState::AwaitingAnswer(index) => index,
            _ => return CollectorStep::Ignored,
        };

        if author_id != self.author_id {
            return CollectorStep::Ignored;
        }

        self.answers.push(content.to_string());
        let next = index + 1;

        if next == self.expected {
            self.state = CollectorState::Complete;
            CollectorStep::Finished
        } else {
            self.state = CollectorState::AwaitingAnswer(next);
            CollectorStep::AskNext(next)
        }
    }

    /// The timer fired (or the event stream closed) before all answers arrived.
    pub fn on_timeout(&mut self) {
        if self.is_listening() {
            self.state = CollectorState::Cancelled;
        }
    }

    pub fn finish(self) -> CollectorOutcome {
        match self.state {
            CollectorState::Complete => CollectorOutcome::Complete(self.answers),
            // Finishing while still listening means nobody signalled the end;
            // treat it like a timeout.
            CollectorState::Cancelled | CollectorState::AwaitingAnswer(_) => {
                CollectorOutcome::Cancelled {
                    collected: self.answers.len(),
                    expected: self.expected,
                }
            }
        }
    }
}
