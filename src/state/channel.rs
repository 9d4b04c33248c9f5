//! Per-channel state: detach flags and the message backlog.

/// A channel the bouncer user has joined.
///
/// The detached flag and buffer policy are toggled by the join/part/attach
/// collaborator; the relay only reads them. The backlog is bounded by the
/// external retention policy, not here.
#[derive(Debug)]
pub struct Channel {
    name: String,
    detached: bool,
    keep_buffer: bool,
    buffer: Vec<String>,
}

impl Channel {
    /// Create a channel in the attached, no-persistent-buffer state.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detached: false,
            keep_buffer: false,
            buffer: Vec::new(),
        }
    }

    /// The channel name as joined.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the user has detached from this channel.
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Toggle the detached flag (join/part/attach collaborator).
    pub fn set_detached(&mut self, detached: bool) {
        self.detached = detached;
    }

    /// Whether this channel buffers all traffic regardless of attachment.
    pub fn keep_buffer(&self) -> bool {
        self.keep_buffer
    }

    /// Toggle the keep-buffer policy flag.
    pub fn set_keep_buffer(&mut self, keep: bool) {
        self.keep_buffer = keep;
    }

    /// Append one formatted line to the backlog.
    pub fn add_buffer(&mut self, line: String) {
        self.buffer.push(line);
    }

    /// The buffered backlog, oldest first.
    pub fn buffer(&self) -> &[String] {
        &self.buffer
    }

    /// Drain the backlog for replay on re-attach.
    pub fn take_buffer(&mut self) -> Vec<String> {
        std::mem::take(&mut self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_preserves_order() {
        let mut chan = Channel::new("#x");
        chan.add_buffer("first".to_string());
        chan.add_buffer("second".to_string());
        assert_eq!(chan.buffer(), ["first", "second"]);

        let drained = chan.take_buffer();
        assert_eq!(drained, ["first", "second"]);
        assert!(chan.buffer().is_empty());
    }

    #[test]
    fn flags_default_off() {
        let chan = Channel::new("#x");
        assert!(!chan.is_detached());
        assert!(!chan.keep_buffer());
    }
}
