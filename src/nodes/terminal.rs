// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::catalog::{HandlerRef, Payload, Signals};
use crate::config::consts::DEFAULT_TRANSCRIPT_LIMIT;
use crate::model::Message;
use crate::traits::CatalogNode;

const EVENTS: &[&str] = &["send"];
const HANDLERS: &[&str] = &["received"];

/// One line of a terminal session.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    Sent(Message),
    Received(Payload),
}

/// The newest entries of a session. Positions count every entry ever recorded,
/// so they stay valid after older entries are dropped.
#[derive(Debug)]
struct Transcript {
    entries: VecDeque<TranscriptEntry>,
    dropped: usize,
    limit: usize,
}

impl Transcript {
    fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push_back(entry);
        self.trim();
    }

    fn trim(&mut self) {
        while self.entries.len() > self.limit {
            self.entries.pop_front();
            self.dropped += 1;
        }
    }
}

/// The user side of the console.
///
/// Messages typed by the user leave through the `send` event; anything
/// delivered to the `received` handler is appended to the transcript. Only the
/// newest `transcript_limit` entries are kept.
pub struct Terminal {
    signals: Signals,
    transcript: Mutex<Transcript>,
}

impl Terminal {
    pub fn new() -> Self {
        Self::with_transcript_limit(DEFAULT_TRANSCRIPT_LIMIT)
    }

    /// A terminal keeping at most `limit` transcript entries (at least one).
    pub fn with_transcript_limit(limit: usize) -> Self {
        Self {
            signals: Signals::new(EVENTS),
            transcript: Mutex::new(Transcript {
                entries: VecDeque::new(),
                dropped: 0,
                limit: limit.max(1),
            }),
        }
    }

    /// Record `message` and raise `send`. Returns the number of handlers reached.
    pub fn send(&self, message: Message) -> usize {
        self.lock_transcript()
            .push(TranscriptEntry::Sent(message.clone()));
        self.signals.emit_named(EVENTS[0], &Payload::Message(message))
    }

    /// The retained entries, oldest first.
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.lock_transcript().entries.iter().cloned().collect()
    }

    /// Retained entries from position `start` on.
    pub fn transcript_since(&self, start: usize) -> Vec<TranscriptEntry> {
        let transcript = self.lock_transcript();
        let skip = start.saturating_sub(transcript.dropped);
        transcript.entries.iter().skip(skip).cloned().collect()
    }

    /// Number of entries recorded this session, dropped ones included.
    pub fn transcript_len(&self) -> usize {
        let transcript = self.lock_transcript();
        transcript.dropped + transcript.entries.len()
    }

    pub fn transcript_limit(&self) -> usize {
        self.lock_transcript().limit
    }

    /// Change the limit, dropping the oldest entries beyond it.
    pub fn set_transcript_limit(&self, limit: usize) {
        let mut transcript = self.lock_transcript();
        transcript.limit = limit.max(1);
        transcript.trim();
    }

    fn lock_transcript(&self) -> MutexGuard<'_, Transcript> {
        self.transcript.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogNode for Terminal {
    fn kind(&self) -> &'static str {
        "terminal"
    }

    fn signals(&self) -> &Signals {
        &self.signals
    }

    fn handlers(&self) -> &'static [&'static str] {
        HANDLERS
    }

    fn invoke(&self, _handler: HandlerRef, payload: &Payload) {
        self.lock_transcript()
            .push(TranscriptEntry::Received(payload.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::signal::test_support::RecordingNode;
    use crate::model::DeviceIdentifier;
    use std::sync::Arc;

    #[test]
    fn test_send_records_and_emits() {
        let terminal = Terminal::new();
        let sink: Arc<dyn CatalogNode> = RecordingNode::new();
        let event = terminal.signals().resolve("send").unwrap();
        let handler = HandlerRef::resolve(sink.as_ref(), "onCommand").unwrap();
        terminal.signals().connect(event, &sink, handler);

        let command = Message::new(DeviceIdentifier::new("sat1"), "reboot");
        assert_eq!(terminal.send(command.clone()), 1);
        assert_eq!(terminal.transcript(), vec![TranscriptEntry::Sent(command)]);
    }

    #[test]
    fn test_received_payloads_are_appended() {
        let terminal = Arc::new(Terminal::new());
        let handler = HandlerRef::resolve(terminal.as_ref(), "received").unwrap();

        terminal.invoke(handler, &Payload::Text("link up".to_string()));
        terminal.invoke(handler, &Payload::Empty);

        assert_eq!(terminal.transcript_len(), 2);
        assert_eq!(terminal.transcript_since(1), vec![TranscriptEntry::Received(Payload::Empty)]);
        assert!(terminal.transcript_since(5).is_empty());
    }

    #[test]
    fn test_transcript_keeps_newest_entries() {
        let terminal = Terminal::with_transcript_limit(3);
        for n in 0..5u64 {
            terminal.send(Message::new(DeviceIdentifier::new("sat1"), "ping").with_attribute("seq", n));
        }

        assert_eq!(terminal.transcript_len(), 5);
        let kept: Vec<u64> = terminal
            .transcript()
            .iter()
            .filter_map(|entry| match entry {
                TranscriptEntry::Sent(m) => m.attribute("seq").and_then(|v| v.as_uint()),
                TranscriptEntry::Received(_) => None,
            })
            .collect();
        assert_eq!(kept, vec![2, 3, 4]);
        assert_eq!(terminal.transcript_since(4).len(), 1);
        assert_eq!(terminal.transcript_since(0).len(), 3);

        terminal.set_transcript_limit(1);
        assert_eq!(terminal.transcript().len(), 1);
        assert_eq!(terminal.transcript_len(), 5);
        assert_eq!(terminal.transcript_limit(), 1);
    }
}
