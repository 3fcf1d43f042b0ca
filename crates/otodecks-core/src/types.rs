//! Frame and buffer types
//!
//! Everything after the decoder works on stereo frames: mono files are
//! duplicated into both channels and wider files keep their first two.

use std::ops::{AddAssign, Index, MulAssign};

/// Engine rate when no output device could be opened (48kHz)
///
/// With a device, the engine runs at whatever rate the device negotiated and
/// tracks are converted to it on load.
pub const DEFAULT_SAMPLE_RATE: u32 = 48000;

/// Decks in the player
pub const NUM_DECKS: usize = 2;

/// One sample of one channel
pub type Sample = f32;

/// Left/right pair for one instant of audio
///
/// Laid out as `[left, right]`, so a run of frames casts to interleaved
/// samples with bytemuck and can be copied straight into a stereo device.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StereoSample {
    pub left: Sample,
    pub right: Sample,
}

impl StereoSample {
    #[inline]
    pub const fn new(left: Sample, right: Sample) -> Self {
        Self { left, right }
    }

    #[inline]
    pub const fn silence() -> Self {
        Self::new(0.0, 0.0)
    }

    /// `value` on both channels
    #[inline]
    pub const fn mono(value: Sample) -> Self {
        Self::new(value, value)
    }

    /// Straight-line blend toward `next`; `t = 0` gives `self`, `t = 1` gives `next`
    #[inline]
    pub fn lerp(&self, next: &Self, t: Sample) -> Self {
        Self::new(
            self.left + (next.left - self.left) * t,
            self.right + (next.right - self.right) * t,
        )
    }

    /// Larger absolute value of the two channels
    #[inline]
    pub fn peak(&self) -> Sample {
        self.left.abs().max(self.right.abs())
    }

    /// Limit both channels to the device range [-1, 1]
    #[inline]
    pub fn clamp_unit(&self) -> Self {
        Self::new(self.left.clamp(-1.0, 1.0), self.right.clamp(-1.0, 1.0))
    }
}

impl AddAssign for StereoSample {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.left += rhs.left;
        self.right += rhs.right;
    }
}

impl MulAssign<Sample> for StereoSample {
    #[inline]
    fn mul_assign(&mut self, gain: Sample) {
        self.left *= gain;
        self.right *= gain;
    }
}

/// Reusable block of frames for the render path
///
/// Allocated once at full size. The callback then only moves the working
/// length with [`StereoBuffer::set_len_from_capacity`], which never allocates.
#[derive(Debug, Clone, Default)]
pub struct StereoBuffer {
    frames: Vec<StereoSample>,
}

impl StereoBuffer {
    /// `len` frames of silence
    pub fn silence(len: usize) -> Self {
        Self::from_vec(vec![StereoSample::silence(); len])
    }

    pub fn from_vec(frames: Vec<StereoSample>) -> Self {
        Self { frames }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Change the working length without reallocating
    ///
    /// `len` must not exceed the length the buffer was created with.
    #[inline]
    pub fn set_len_from_capacity(&mut self, len: usize) {
        debug_assert!(len <= self.frames.capacity(), "buffer would reallocate");
        self.frames.resize(len, StereoSample::silence());
    }

    pub fn fill_silence(&mut self) {
        self.frames.fill(StereoSample::silence());
    }

    #[inline]
    pub fn as_slice(&self) -> &[StereoSample] {
        &self.frames
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [StereoSample] {
        &mut self.frames
    }

    /// Loudest channel value anywhere in the block
    pub fn peak(&self) -> Sample {
        self.frames.iter().fold(0.0, |peak, frame| peak.max(frame.peak()))
    }
}

impl Index<usize> for StereoBuffer {
    type Output = StereoSample;

    #[inline]
    fn index(&self, index: usize) -> &StereoSample {
        &self.frames[index]
    }
}

/// Which deck (0 is the top deck, 1 the bottom one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeckId(pub usize);

impl DeckId {
    /// Panics when `index` is not below [`NUM_DECKS`]
    pub fn new(index: usize) -> Self {
        assert!(index < NUM_DECKS, "no deck {} (have {})", index, NUM_DECKS);
        Self(index)
    }

    /// Number shown to the user ("Deck 1", "Deck 2")
    pub fn display_number(&self) -> usize {
        self.0 + 1
    }
}
