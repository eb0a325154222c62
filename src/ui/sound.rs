/// Sound cues: short procedural tone sequences played through rodio.
///
/// Each game event maps to a cue (a list of notes). Playback is
/// fire-and-forget on a detached Sink, so the game loop never waits.
///
/// Build without the "sound" feature (or run with `--no-sound`) to disable
/// audio; the stub SoundEngine does nothing.

use escape_grid::sim::event::GameEvent;
use escape_grid::sim::session::Phase;

/// (frequency Hz, duration ms). Frequency 0 is a rest.
pub type Note = (f32, u64);

const CUE_STEP: &[Note] = &[(660.0, 25)];
const CUE_BUMP: &[Note] = &[(140.0, 90)];
const CUE_OFF_GRID: &[Note] = &[(220.0, 60), (150.0, 90)];
const CUE_COIN: &[Note] = &[(1047.0, 45), (1319.0, 45), (1568.0, 70)];
const CUE_MISS: &[Note] = &[(300.0, 80), (250.0, 80)];
const CUE_FAKE_COIN: &[Note] = &[(1047.0, 45), (0.0, 20), (370.0, 140)];
const CUE_SPRING: &[Note] = &[(520.0, 40), (880.0, 40), (520.0, 60)];
const CUE_DISARM: &[Note] = &[(784.0, 60), (988.0, 90)];
const CUE_SCAN_HIT: &[Note] = &[(1200.0, 50), (0.0, 30), (1200.0, 50), (0.0, 30), (1200.0, 50)];
const CUE_SCAN_CLEAR: &[Note] = &[(900.0, 70)];
const CUE_REFUSED: &[Note] = &[(110.0, 120)];
const CUE_RESET: &[Note] = &[(392.0, 50), (523.0, 50), (659.0, 80)];
const CUE_WON: &[Note] = &[(523.0, 100), (659.0, 100), (784.0, 100), (1047.0, 250)];
const CUE_LOST: &[Note] = &[(440.0, 120), (370.0, 120), (311.0, 120), (261.0, 250)];

/// Cue for an event, if it has one. Phase changes into a terminal phase
/// get a fanfare; returning to Playing is covered by the reset cue.
pub fn cue_for(event: &GameEvent) -> Option<&'static [Note]> {
    Some(match event {
        GameEvent::PlayerMoved { .. } => CUE_STEP,
        GameEvent::HitWall => CUE_BUMP,
        GameEvent::WentOffGrid => CUE_OFF_GRID,
        GameEvent::PrizePicked { .. } => CUE_COIN,
        GameEvent::EmptyPickup => CUE_MISS,
        GameEvent::TrapSprung { .. } => CUE_SPRING,
        GameEvent::DecoyTriggered => CUE_FAKE_COIN,
        GameEvent::DecoyDisarmed => CUE_DISARM,
        GameEvent::Scanned { decoy_ahead: true } => CUE_SCAN_HIT,
        GameEvent::Scanned { decoy_ahead: false } => CUE_SCAN_CLEAR,
        GameEvent::ScanRefused => CUE_REFUSED,
        GameEvent::BoardReset { .. } => CUE_RESET,
        GameEvent::PhaseChanged { phase: Phase::Won } => CUE_WON,
        GameEvent::PhaseChanged { phase: Phase::Playing } => return None,
        GameEvent::PhaseChanged { .. } => CUE_LOST,
        GameEvent::TimeExpired
        | GameEvent::AllPrizesCollected
        | GameEvent::SessionEnded { .. } => return None,
    })
}

/// A frame's events usually carry one interesting cue; play the last one
/// so a win fanfare is not cut off by the coin chime that caused it.
pub fn pick_cue(events: &[GameEvent]) -> Option<&'static [Note]> {
    events.iter().rev().find_map(cue_for)
}

#[cfg(feature = "sound")]
mod inner {
    use std::time::Duration;

    use rodio::source::{SineWave, Source};
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Note;

    const VOLUME: f32 = 0.2;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!(error = %e, "no audio output, sound disabled");
                    return None;
                }
            };
            Some(SoundEngine { _stream: stream, handle })
        }

        pub fn play(&self, cue: &[Note]) {
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            for &(freq, ms) in cue {
                let len = Duration::from_millis(ms);
                if freq > 0.0 {
                    sink.append(SineWave::new(freq).take_duration(len).amplify(VOLUME));
                } else {
                    sink.append(SineWave::new(1.0).take_duration(len).amplify(0.0));
                }
            }
            sink.detach();
        }
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _cue: &[Note]) {}
}
