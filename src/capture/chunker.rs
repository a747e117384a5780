use super::{BufferSink, BufferTimestamp, SignalBuffer};

/// Downmix interleaved multi-channel input to mono while applying the
/// provided converter, so buffers look the same regardless of the
/// microphone's channel layout.
pub(super) fn downmix_into<T, F>(buf: &mut Vec<f32>, data: &[T], channels: usize, mut convert: F)
where
    T: Copy,
    F: FnMut(T) -> f32,
{
    if channels <= 1 {
        buf.extend(data.iter().copied().map(&mut convert));
        return;
    }

    // Average each interleaved frame into one mono sample.
    let mut acc = 0.0f32;
    let mut count = 0usize;
    for sample in data.iter().copied() {
        acc += convert(sample);
        count += 1;
        if count == channels {
            buf.push(acc / channels as f32);
            acc = 0.0;
            count = 0;
        }
    }
    if count > 0 {
        buf.push(acc / count as f32);
    }
}

/// Reassembles whatever slice sizes the device delivers into exact
/// fixed-size buffers, stamping each with its frame position in the session.
///
/// A trailing partial buffer at session end is dropped, never delivered.
pub(crate) struct FrameChunker {
    frame_samples: usize,
    sample_rate: u32,
    pending: Vec<f32>,
    scratch: Vec<f32>,
    position: u64,
    sink: BufferSink,
}

impl FrameChunker {
    pub(crate) fn new(frame_samples: usize, sample_rate: u32, sink: BufferSink) -> Self {
        let frame_samples = frame_samples.max(1);
        Self {
            frame_samples,
            sample_rate,
            pending: Vec::with_capacity(frame_samples),
            scratch: Vec::new(),
            position: 0,
            sink,
        }
    }

    pub(crate) fn push<T, F>(&mut self, data: &[T], channels: usize, convert: F)
    where
        T: Copy,
        F: FnMut(T) -> f32,
    {
        self.scratch.clear();
        downmix_into(&mut self.scratch, data, channels, convert);
        self.pending.extend_from_slice(&self.scratch);

        while self.pending.len() >= self.frame_samples {
            let samples: Vec<f32> = self.pending.drain(..self.frame_samples).collect();
            let timestamp = BufferTimestamp {
                sample_position: self.position,
                sample_rate: self.sample_rate,
            };
            self.position += self.frame_samples as u64;
            (self.sink)(SignalBuffer { samples, timestamp });
        }
    }
}
