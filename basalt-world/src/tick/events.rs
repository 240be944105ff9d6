//! Double-buffered block events (piston arms, note-block pitches).
//!
//! Two ping-pong buffers indexed by an active flag: `add_event` appends to
//! the active buffer, `process_events` swaps and drains the now-inactive
//! one, repeating until both are empty because handlers may emit follow-up
//! events.

use basalt_utils::{BlockId, BlockPos};

/// One deferred, animatable block-state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEvent {
    /// Target position.
    pub pos: BlockPos,
    /// Expected block; stale events for replaced blocks are dropped by the
    /// handler.
    pub block_id: BlockId,
    /// Block-specific event id (piston: 0 extend / 1 retract).
    pub event_id: i32,
    /// Block-specific parameter (piston: facing index).
    pub event_param: i32,
}

/// The ping-pong event queue.
pub struct BlockEventQueue {
    buffers: [Vec<BlockEvent>; 2],
    active: usize,
}

impl BlockEventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffers: [Vec::new(), Vec::new()],
            active: 0,
        }
    }

    /// Appends an event, dropping exact duplicates already queued this
    /// phase.
    pub fn add_event(&mut self, event: BlockEvent) {
        if !self.buffers[self.active].contains(&event) {
            self.buffers[self.active].push(event);
        }
    }

    /// Pending event count in the active buffer.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffers[self.active].len()
    }

    /// Drains every event through `handler`, swapping buffers until both
    /// are empty. Events whose handler returned `true` are collected for
    /// client dispatch.
    pub fn process_events(
        &mut self,
        mut handler: impl FnMut(&BlockEvent) -> bool,
    ) -> Vec<BlockEvent> {
        let mut client_events = Vec::new();
        while !self.buffers[self.active].is_empty() {
            let current = self.active;
            self.active ^= 1;
            let batch = std::mem::take(&mut self.buffers[current]);
            for event in &batch {
                if handler(event) {
                    client_events.push(*event);
                }
            }
        }
        client_events
    }
}

impl Default for BlockEventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(x: i32, id: i32, param: i32) -> BlockEvent {
        BlockEvent {
            pos: BlockPos::new(x, 64, 0),
            block_id: BlockId(33),
            event_id: id,
            event_param: param,
        }
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut queue = BlockEventQueue::new();
        queue.add_event(event(0, 0, 2));
        queue.add_event(event(0, 0, 2));
        assert_eq!(queue.pending(), 1);
        // A differing parameter is a distinct event.
        queue.add_event(event(0, 0, 3));
        assert_eq!(queue.pending(), 2);
    }

    #[test]
    fn handler_cascade_drains_both_buffers() {
        let mut queue = BlockEventQueue::new();
        queue.add_event(event(0, 0, 0));

        // The first handled event enqueues a follow-up; processing
        // continues until quiescent.
        let mut spawned = false;
        let mut handled = Vec::new();
        let mut follow_ups = Vec::new();
        let client = queue.process_events(|e| {
            handled.push(e.pos.x);
            if !spawned {
                spawned = true;
                follow_ups.push(event(1, 0, 0));
            }
            true
        });
        // Emulate the world loop: follow-ups recorded during handling are
        // queued and processed on the same call in the real pipeline; here
        // they land in the next call.
        for e in follow_ups {
            queue.add_event(e);
        }
        let client2 = queue.process_events(|_| false);
        assert_eq!(handled, vec![0]);
        assert_eq!(client.len(), 1);
        assert!(client2.is_empty());
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn only_accepted_events_reach_clients() {
        let mut queue = BlockEventQueue::new();
        queue.add_event(event(0, 0, 0));
        queue.add_event(event(1, 1, 0));
        let client = queue.process_events(|e| e.event_id == 0);
        assert_eq!(client.len(), 1);
        assert_eq!(client[0].pos.x, 0);
    }
}
