//! Deterministic voice selection.
//!
//! Every user gets a stable voice: gender, speaking rate and pitch are picked
//! from fixed tables by a pseudo-random sequence seeded with a hash of the
//! user's voice identity. The same identity always yields the same voice, and
//! re-rolling the identity (`rand` command) yields a new one.

use serde::{Deserialize, Serialize};

const GENDERS: [VoiceGender; 3] = [VoiceGender::Neutral, VoiceGender::Male, VoiceGender::Female];
const SPEAKING_RATES: [f64; 4] = [0.75, 1.0, 1.3, 1.7];
const PITCHES: [f64; 5] = [-15.0, -8.0, 0.0, 8.0, 15.0];

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Voice gender as understood by SSML backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoiceGender {
    Neutral,
    Male,
    Female,
}

/// Synthesis parameters derived from a voice identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub gender: VoiceGender,
    /// 1.0 is the backend's normal rate.
    pub speaking_rate: f64,
    /// Semitones relative to the backend's default pitch.
    pub pitch: f64,
}

impl VoiceProfile {
    /// Derive the profile for a voice identity.
    #[must_use]
    pub fn from_identity(identity: &str) -> Self {
        let mut rng = SplitMix64::new(fnv1a(identity.as_bytes()));
        Self {
            gender: GENDERS[rng.below(GENDERS.len())],
            speaking_rate: SPEAKING_RATES[rng.below(SPEAKING_RATES.len())],
            pitch: PITCHES[rng.below(PITCHES.len())],
        }
    }
}

/// One "read this text aloud" request handed to a speech backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    /// BCP-47 language tag, e.g. `ja-JP`.
    pub language: String,
    /// Opaque per-user identity the voice profile is derived from.
    pub voice_identity: String,
}

impl SpeechRequest {
    pub fn new(
        text: impl Into<String>,
        language: impl Into<String>,
        voice_identity: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
            voice_identity: voice_identity.into(),
        }
    }

    /// Voice parameters for this request.
    #[must_use]
    pub fn profile(&self) -> VoiceProfile {
        VoiceProfile::from_identity(&self.voice_identity)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
    })
}

/// Small, portable PRNG; the sequence must never change between releases
/// or every user's voice would change with it.
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    const fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}
