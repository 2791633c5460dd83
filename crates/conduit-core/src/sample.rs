//! Sample formats and wire conversion.
//!
//! Audio crosses the framework boundary as interleaved 16-bit integer,
//! 32-bit integer, or 32-bit float samples. Processing happens in `f32`,
//! normalized so that each format's full-scale value maps to 1.0:
//!
//! | Format | Full scale | Range after conversion |
//! |--------|------------|------------------------|
//! | `I16` | 32768 | [-1.0, 32767/32768] |
//! | `I32` | 2147483648 | [-1.0, ~1.0] |
//! | `F32` | 1.0 | unchanged |
//!
//! Converting back rounds to the nearest integer and saturates, so a 16-bit
//! buffer survives a float round trip exactly.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use libm::roundf;

/// Interleaved sample encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleFormat {
    /// Signed 16-bit integer PCM.
    I16,
    /// Signed 32-bit integer PCM.
    I32,
    /// 32-bit IEEE float.
    F32,
}

impl SampleFormat {
    /// Returns the value that maps to 1.0 in the float domain.
    pub const fn full_scale(self) -> f32 {
        match self {
            SampleFormat::I16 => 32_768.0,
            SampleFormat::I32 => 2_147_483_648.0,
            SampleFormat::F32 => 1.0,
        }
    }

    /// Returns the encoded size of one sample in bytes.
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            SampleFormat::I16 => 2,
            SampleFormat::I32 | SampleFormat::F32 => 4,
        }
    }

    /// Returns a short lowercase name (`"i16"`, `"i32"`, `"f32"`).
    pub const fn name(self) -> &'static str {
        match self {
            SampleFormat::I16 => "i16",
            SampleFormat::I32 => "i32",
            SampleFormat::F32 => "f32",
        }
    }

    /// Parses a name produced by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<SampleFormat> {
        match name {
            "i16" => Some(SampleFormat::I16),
            "i32" => Some(SampleFormat::I32),
            "f32" => Some(SampleFormat::F32),
            _ => None,
        }
    }
}

/// Stream description exchanged with loadable modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Bits per sample (16 or 32).
    pub bit_depth: u16,
    /// Period size in frames.
    pub buffer_size: u32,
}

impl AudioFormat {
    /// Returns the sample format implied by the bit depth.
    ///
    /// 16-bit streams are integer PCM; 32-bit streams are float, the
    /// framework's working format. Other depths are not supported.
    pub const fn sample_format(&self) -> Option<SampleFormat> {
        match self.bit_depth {
            16 => Some(SampleFormat::I16),
            32 => Some(SampleFormat::F32),
            _ => None,
        }
    }

    /// Returns the byte size of one interleaved frame, if the depth is supported.
    pub const fn bytes_per_frame(&self) -> Option<usize> {
        match self.sample_format() {
            Some(format) => Some(format.bytes_per_sample() * self.channels as usize),
            None => None,
        }
    }
}

/// Borrowed, format-tagged view of interleaved samples.
#[derive(Debug, Clone, Copy)]
pub enum Samples<'a> {
    /// 16-bit integer samples.
    I16(&'a [i16]),
    /// 32-bit integer samples.
    I32(&'a [i32]),
    /// 32-bit float samples.
    F32(&'a [f32]),
}

impl<'a> Samples<'a> {
    /// Returns the encoding of this view.
    pub const fn format(&self) -> SampleFormat {
        match self {
            Samples::I16(_) => SampleFormat::I16,
            Samples::I32(_) => SampleFormat::I32,
            Samples::F32(_) => SampleFormat::F32,
        }
    }

    /// Returns the number of samples (not frames).
    pub const fn len(&self) -> usize {
        match self {
            Samples::I16(s) => s.len(),
            Samples::I32(s) => s.len(),
            Samples::F32(s) => s.len(),
        }
    }

    /// Returns true if the view holds no samples.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a sub-view over `range`, or `None` if it is out of bounds.
    pub fn get(&self, range: Range<usize>) -> Option<Samples<'a>> {
        match *self {
            Samples::I16(s) => s.get(range).map(Samples::I16),
            Samples::I32(s) => s.get(range).map(Samples::I32),
            Samples::F32(s) => s.get(range).map(Samples::F32),
        }
    }
}

impl<'a> From<&'a [i16]> for Samples<'a> {
    fn from(s: &'a [i16]) -> Self {
        Samples::I16(s)
    }
}

impl<'a> From<&'a [i32]> for Samples<'a> {
    fn from(s: &'a [i32]) -> Self {
        Samples::I32(s)
    }
}

impl<'a> From<&'a [f32]> for Samples<'a> {
    fn from(s: &'a [f32]) -> Self {
        Samples::F32(s)
    }
}

/// Mutable, format-tagged view of interleaved samples.
#[derive(Debug)]
pub enum SamplesMut<'a> {
    /// 16-bit integer samples.
    I16(&'a mut [i16]),
    /// 32-bit integer samples.
    I32(&'a mut [i32]),
    /// 32-bit float samples.
    F32(&'a mut [f32]),
}

impl SamplesMut<'_> {
    /// Returns the encoding of this view.
    pub const fn format(&self) -> SampleFormat {
        match self {
            SamplesMut::I16(_) => SampleFormat::I16,
            SamplesMut::I32(_) => SampleFormat::I32,
            SamplesMut::F32(_) => SampleFormat::F32,
        }
    }

    /// Returns the number of samples (not frames).
    pub const fn len(&self) -> usize {
        match self {
            SamplesMut::I16(s) => s.len(),
            SamplesMut::I32(s) => s.len(),
            SamplesMut::F32(s) => s.len(),
        }
    }

    /// Returns true if the view holds no samples.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reborrows as an immutable view.
    pub fn as_samples(&self) -> Samples<'_> {
        match self {
            SamplesMut::I16(s) => Samples::I16(s),
            SamplesMut::I32(s) => Samples::I32(s),
            SamplesMut::F32(s) => Samples::F32(s),
        }
    }

    /// Returns a mutable sub-view over `range`, or `None` if it is out of bounds.
    pub fn get_mut(&mut self, range: Range<usize>) -> Option<SamplesMut<'_>> {
        match self {
            SamplesMut::I16(s) => s.get_mut(range).map(SamplesMut::I16),
            SamplesMut::I32(s) => s.get_mut(range).map(SamplesMut::I32),
            SamplesMut::F32(s) => s.get_mut(range).map(SamplesMut::F32),
        }
    }

    /// Fills the view with silence.
    pub fn fill_silence(&mut self) {
        match self {
            SamplesMut::I16(s) => s.fill(0),
            SamplesMut::I32(s) => s.fill(0),
            SamplesMut::F32(s) => s.fill(0.0),
        }
    }
}

impl<'a> From<&'a mut [i16]> for SamplesMut<'a> {
    fn from(s: &'a mut [i16]) -> Self {
        SamplesMut::I16(s)
    }
}

impl<'a> From<&'a mut [i32]> for SamplesMut<'a> {
    fn from(s: &'a mut [i32]) -> Self {
        SamplesMut::I32(s)
    }
}

impl<'a> From<&'a mut [f32]> for SamplesMut<'a> {
    fn from(s: &'a mut [f32]) -> Self {
        SamplesMut::F32(s)
    }
}

/// Convert wire samples into normalized floats.
///
/// Converts `min(input.len(), output.len())` samples.
pub fn to_f32(input: Samples<'_>, output: &mut [f32]) {
    match input {
        Samples::I16(src) => {
            let scale = 1.0 / SampleFormat::I16.full_scale();
            for (dst, &s) in output.iter_mut().zip(src) {
                *dst = f32::from(s) * scale;
            }
        }
        Samples::I32(src) => {
            let scale = 1.0 / SampleFormat::I32.full_scale();
            for (dst, &s) in output.iter_mut().zip(src) {
                *dst = s as f32 * scale;
            }
        }
        Samples::F32(src) => {
            let n = src.len().min(output.len());
            output[..n].copy_from_slice(&src[..n]);
        }
    }
}

/// Convert normalized floats back into wire samples.
///
/// Integer formats round to nearest and saturate at the format's limits.
/// Converts `min(input.len(), output.len())` samples.
pub fn from_f32(input: &[f32], output: SamplesMut<'_>) {
    match output {
        SamplesMut::I16(dst) => {
            let scale = SampleFormat::I16.full_scale();
            for (d, &s) in dst.iter_mut().zip(input) {
                *d = roundf(s * scale).clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16;
            }
        }
        SamplesMut::I32(dst) => {
            let scale = SampleFormat::I32.full_scale();
            for (d, &s) in dst.iter_mut().zip(input) {
                // `as` saturates at i32::MIN/MAX
                *d = roundf(s * scale) as i32;
            }
        }
        SamplesMut::F32(dst) => {
            let n = dst.len().min(input.len());
            dst[..n].copy_from_slice(&input[..n]);
        }
    }
}

/// Owned, format-tagged sample buffer.
///
/// Refilling a `SampleVec` with data of the same format reuses the existing
/// allocation as long as the capacity suffices, which lets pre-sized
/// buffers be recycled on the audio thread.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleVec {
    /// 16-bit integer samples.
    I16(Vec<i16>),
    /// 32-bit integer samples.
    I32(Vec<i32>),
    /// 32-bit float samples.
    F32(Vec<f32>),
}

impl SampleVec {
    /// Creates an empty buffer of `format` with room for `capacity` samples.
    pub fn with_capacity(format: SampleFormat, capacity: usize) -> Self {
        match format {
            SampleFormat::I16 => SampleVec::I16(Vec::with_capacity(capacity)),
            SampleFormat::I32 => SampleVec::I32(Vec::with_capacity(capacity)),
            SampleFormat::F32 => SampleVec::F32(Vec::with_capacity(capacity)),
        }
    }

    /// Creates a zero-filled buffer of `len` samples.
    pub fn silence(format: SampleFormat, len: usize) -> Self {
        match format {
            SampleFormat::I16 => SampleVec::I16(vec![0; len]),
            SampleFormat::I32 => SampleVec::I32(vec![0; len]),
            SampleFormat::F32 => SampleVec::F32(vec![0.0; len]),
        }
    }

    /// Returns the encoding of this buffer.
    pub const fn format(&self) -> SampleFormat {
        match self {
            SampleVec::I16(_) => SampleFormat::I16,
            SampleVec::I32(_) => SampleFormat::I32,
            SampleVec::F32(_) => SampleFormat::F32,
        }
    }

    /// Returns the number of samples currently held.
    pub fn len(&self) -> usize {
        match self {
            SampleVec::I16(v) => v.len(),
            SampleVec::I32(v) => v.len(),
            SampleVec::F32(v) => v.len(),
        }
    }

    /// Returns true if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of samples the buffer can hold without reallocating.
    pub fn capacity(&self) -> usize {
        match self {
            SampleVec::I16(v) => v.capacity(),
            SampleVec::I32(v) => v.capacity(),
            SampleVec::F32(v) => v.capacity(),
        }
    }

    /// Returns true if `len` samples of `format` fit without reallocating.
    pub fn fits(&self, format: SampleFormat, len: usize) -> bool {
        self.format() == format && self.capacity() >= len
    }

    /// Replaces the contents with a copy of `src`.
    ///
    /// Reuses the allocation if [`fits`](Self::fits) holds for `src`.
    pub fn copy_from(&mut self, src: Samples<'_>) {
        match (self, src) {
            (SampleVec::I16(v), Samples::I16(s)) => {
                v.clear();
                v.extend_from_slice(s);
            }
            (SampleVec::I32(v), Samples::I32(s)) => {
                v.clear();
                v.extend_from_slice(s);
            }
            (SampleVec::F32(v), Samples::F32(s)) => {
                v.clear();
                v.extend_from_slice(s);
            }
            (this, Samples::I16(s)) => *this = SampleVec::I16(s.to_vec()),
            (this, Samples::I32(s)) => *this = SampleVec::I32(s.to_vec()),
            (this, Samples::F32(s)) => *this = SampleVec::F32(s.to_vec()),
        }
    }

    /// Resizes to `len` zeroed samples of `format` and returns a mutable view.
    ///
    /// Reuses the allocation if [`fits`](Self::fits) holds.
    pub fn prepare(&mut self, format: SampleFormat, len: usize) -> SamplesMut<'_> {
        if self.format() != format {
            *self = SampleVec::with_capacity(format, len);
        }
        match self {
            SampleVec::I16(v) => {
                v.clear();
                v.resize(len, 0);
                SamplesMut::I16(v)
            }
            SampleVec::I32(v) => {
                v.clear();
                v.resize(len, 0);
                SamplesMut::I32(v)
            }
            SampleVec::F32(v) => {
                v.clear();
                v.resize(len, 0.0);
                SamplesMut::F32(v)
            }
        }
    }

    /// Returns an immutable view of the contents.
    pub fn as_samples(&self) -> Samples<'_> {
        match self {
            SampleVec::I16(v) => Samples::I16(v),
            SampleVec::I32(v) => Samples::I32(v),
            SampleVec::F32(v) => Samples::F32(v),
        }
    }

    /// Returns a mutable view of the contents.
    pub fn as_samples_mut(&mut self) -> SamplesMut<'_> {
        match self {
            SampleVec::I16(v) => SamplesMut::I16(v),
            SampleVec::I32(v) => SamplesMut::I32(v),
            SampleVec::F32(v) => SamplesMut::F32(v),
        }
    }

    /// Decodes little-endian bytes into samples of `format`.
    ///
    /// Trailing bytes that do not form a whole sample are ignored.
    pub fn decode_le(&mut self, format: SampleFormat, bytes: &[u8]) {
        let len = bytes.len() / format.bytes_per_sample();
        match self.prepare(format, len) {
            SamplesMut::I16(dst) => {
                for (d, chunk) in dst.iter_mut().zip(bytes.chunks_exact(2)) {
                    *d = i16::from_le_bytes([chunk[0], chunk[1]]);
                }
            }
            SamplesMut::I32(dst) => {
                for (d, chunk) in dst.iter_mut().zip(bytes.chunks_exact(4)) {
                    *d = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                }
            }
            SamplesMut::F32(dst) => {
                for (d, chunk) in dst.iter_mut().zip(bytes.chunks_exact(4)) {
                    *d = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
                }
            }
        }
    }

    /// Encodes the samples as little-endian bytes into `out`.
    ///
    /// Returns the number of bytes written, bounded by `out.len()`.
    pub fn encode_le(&self, out: &mut [u8]) -> usize {
        let mut written = 0;
        match self {
            SampleVec::I16(v) => {
                for (chunk, s) in out.chunks_exact_mut(2).zip(v) {
                    chunk.copy_from_slice(&s.to_le_bytes());
                    written += 2;
                }
            }
            SampleVec::I32(v) => {
                for (chunk, s) in out.chunks_exact_mut(4).zip(v) {
                    chunk.copy_from_slice(&s.to_le_bytes());
                    written += 4;
                }
            }
            SampleVec::F32(v) => {
                for (chunk, s) in out.chunks_exact_mut(4).zip(v) {
                    chunk.copy_from_slice(&s.to_le_bytes());
                    written += 4;
                }
            }
        }
        written
    }
}
