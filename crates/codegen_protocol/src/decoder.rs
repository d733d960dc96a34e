use crate::action::ActionRecord;
use crate::frame::FrameBuffer;

/// Incremental decoder from assistant text deltas to action records.
///
/// One decoder is scoped to one provider call. Frames that balance but do not
/// decode as a known action are skipped so later frames stay recoverable.
#[derive(Debug, Default)]
pub struct ActionDecoder {
    frames: FrameBuffer,
    skipped: usize,
}

impl ActionDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one text delta and returns every record it completes.
    pub fn feed(&mut self, delta: &str) -> Vec<ActionRecord> {
        self.frames
            .feed(delta)
            .into_iter()
            .filter_map(|frame| self.decode(&frame))
            .collect()
    }

    fn decode(&mut self, frame: &str) -> Option<ActionRecord> {
        match ActionRecord::from_frame(frame) {
            Ok(record) => Some(record),
            Err(error) => {
                self.skipped += 1;
                tracing::warn!(
                    %error,
                    frame = %preview(frame),
                    "skipping frame that is not an action record"
                );
                None
            }
        }
    }

    /// Number of frames dropped because they were not action records.
    #[must_use]
    pub fn skipped_frames(&self) -> usize {
        self.skipped
    }

    /// Text buffered while waiting for a frame to close.
    #[must_use]
    pub fn pending(&self) -> &str {
        self.frames.pending()
    }
}

fn preview(frame: &str) -> String {
    const LIMIT: usize = 120;
    if frame.chars().count() <= LIMIT {
        return frame.to_owned();
    }
    let mut shortened: String = frame.chars().take(LIMIT).collect();
    shortened.push('…');
    shortened
}
