//! Observer that records the notification stream for assertions.

use treesieve_model::{ViewKey, ViewObserver};

/// One recorded view notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    AboutToInsert {
        parent: Option<ViewKey>,
        first: usize,
        last: usize,
    },
    Inserted {
        parent: Option<ViewKey>,
        first: usize,
        last: usize,
    },
    AboutToRemove {
        parent: Option<ViewKey>,
        first: usize,
        last: usize,
    },
    Removed {
        parent: Option<ViewKey>,
        first: usize,
        last: usize,
    },
    AboutToMove {
        src_parent: Option<ViewKey>,
        first: usize,
        last: usize,
        dst_parent: Option<ViewKey>,
        dst_row: usize,
    },
    Moved {
        src_parent: Option<ViewKey>,
        first: usize,
        last: usize,
        dst_parent: Option<ViewKey>,
        dst_row: usize,
    },
    DataChanged {
        parent: Option<ViewKey>,
        first: usize,
        last: usize,
    },
    AboutToReset,
    Reset,
}

/// [`ViewObserver`] that appends every notification to an ordered log.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    /// The log, oldest first.
    pub events: Vec<ViewEvent>,
}

impl Recorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the log.
    pub fn take(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of structural edits recorded (completion halves only).
    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    ViewEvent::Inserted { .. } | ViewEvent::Removed { .. } | ViewEvent::Moved { .. }
                )
            })
            .count()
    }

    /// Check that every announce half is immediately confirmed by its
    /// completion half with identical arguments.
    #[must_use]
    pub fn brackets_paired(&self) -> bool {
        let mut i = 0;
        while i < self.events.len() {
            let expected = match &self.events[i] {
                ViewEvent::AboutToInsert { parent, first, last } => Some(ViewEvent::Inserted {
                    parent: *parent,
                    first: *first,
                    last: *last,
                }),
                ViewEvent::AboutToRemove { parent, first, last } => Some(ViewEvent::Removed {
                    parent: *parent,
                    first: *first,
                    last: *last,
                }),
                ViewEvent::AboutToMove {
                    src_parent,
                    first,
                    last,
                    dst_parent,
                    dst_row,
                } => Some(ViewEvent::Moved {
                    src_parent: *src_parent,
                    first: *first,
                    last: *last,
                    dst_parent: *dst_parent,
                    dst_row: *dst_row,
                }),
                ViewEvent::AboutToReset => Some(ViewEvent::Reset),
                _ => None,
            };
            if let Some(expected) = expected {
                match self.events.get(i + 1) {
                    Some(next) if *next == expected => i += 2,
                    _ => return false,
                }
            } else {
                i += 1;
            }
        }
        true
    }
}

impl ViewObserver for Recorder {
    fn rows_about_to_be_inserted(&mut self, parent: Option<ViewKey>, first: usize, last: usize) {
        self.events.push(ViewEvent::AboutToInsert { parent, first, last });
    }

    fn rows_inserted(&mut self, parent: Option<ViewKey>, first: usize, last: usize) {
        self.events.push(ViewEvent::Inserted { parent, first, last });
    }

    fn rows_about_to_be_removed(&mut self, parent: Option<ViewKey>, first: usize, last: usize) {
        self.events.push(ViewEvent::AboutToRemove { parent, first, last });
    }

    fn rows_removed(&mut self, parent: Option<ViewKey>, first: usize, last: usize) {
        self.events.push(ViewEvent::Removed { parent, first, last });
    }

    fn rows_about_to_be_moved(
        &mut self,
        src_parent: Option<ViewKey>,
        first: usize,
        last: usize,
        dst_parent: Option<ViewKey>,
        dst_row: usize,
    ) {
        self.events.push(ViewEvent::AboutToMove {
            src_parent,
            first,
            last,
            dst_parent,
            dst_row,
        });
    }

    fn rows_moved(
        &mut self,
        src_parent: Option<ViewKey>,
        first: usize,
        last: usize,
        dst_parent: Option<ViewKey>,
        dst_row: usize,
    ) {
        self.events.push(ViewEvent::Moved {
            src_parent,
            first,
            last,
            dst_parent,
            dst_row,
        });
    }

    fn data_changed(&mut self, parent: Option<ViewKey>, first: usize, last: usize) {
        self.events.push(ViewEvent::DataChanged { parent, first, last });
    }

    fn view_about_to_reset(&mut self) {
        self.events.push(ViewEvent::AboutToReset);
    }

    fn view_reset(&mut self) {
        self.events.push(ViewEvent::Reset);
    }
}
