use crate::audio::pcm::{AudioPcm, MIX_CHANNELS, MIX_SAMPLE_RATE};
use crate::config::AudioConfig;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::db_to_gain;

/// Parameters for combining a voice track with a music bed.
///
/// Leveling is RMS based: the voice is scaled to `voice_target_rms` and the music to
/// `voice_target_rms` shifted by `music_offset_db`, so the balance does not depend on how loud
/// the sources were mastered.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioMixSpec {
    pub lead_in_sec: f64,
    pub lead_out_sec: f64,
    pub music_fade_in_sec: f64,
    pub music_fade_out_sec: f64,
    pub voice_fade_sec: f64,
    pub voice_target_rms: f64,
    pub music_offset_db: f64,
}

impl AudioMixSpec {
    pub fn from_config(cfg: &AudioConfig) -> Self {
        Self {
            lead_in_sec: cfg.lead_in_sec,
            lead_out_sec: cfg.lead_out_sec,
            music_fade_in_sec: cfg.music_fade_in_sec,
            music_fade_out_sec: cfg.music_fade_out_sec,
            voice_fade_sec: cfg.voice_fade_sec,
            voice_target_rms: cfg.voice_target_rms,
            music_offset_db: cfg.music_offset_db,
        }
    }

    /// RMS level the music bed is normalized to.
    pub fn music_target_rms(&self) -> f64 {
        self.voice_target_rms * db_to_gain(self.music_offset_db)
    }
}

/// Result of a mix: one stereo track at [`MIX_SAMPLE_RATE`].
#[derive(Clone, Debug)]
pub struct MixedTrack {
    pub pcm: AudioPcm,
    /// Where the voice starts inside `pcm`.
    pub voice_offset_sec: f64,
    /// Length of the voice alone, at the mix rate.
    pub voice_duration_sec: f64,
    /// Whole music copies concatenated to cover the track (1 when the music was only cut).
    pub music_copies: usize,
}

impl MixedTrack {
    pub fn duration_sec(&self) -> f64 {
        self.pcm.duration_sec()
    }
}

/// Mix the affirmation voice over a looped, leveled and faded music bed.
///
/// The result is exactly `affirmation + lead_in + lead_out` long (in whole sample frames) and
/// the voice starts `lead_in` seconds in.
#[tracing::instrument(skip_all, fields(voice_sec = affirmation.duration_sec(), music_sec = music.duration_sec()))]
pub fn mix(
    affirmation: &AudioPcm,
    music: &AudioPcm,
    spec: &AudioMixSpec,
) -> ReelResult<MixedTrack> {
    ensure_non_empty(affirmation, "affirmation")?;
    ensure_non_empty(music, "music")?;

    let mut voice = affirmation.to_mix_layout()?;
    let music = music.to_mix_layout()?;

    let lead_in = voice.secs_to_frames(spec.lead_in_sec);
    let lead_out = voice.secs_to_frames(spec.lead_out_sec);
    let total = voice.frames() + lead_in + lead_out;

    let (mut bed, music_copies) = music.tile_to_frames(total)?;

    level_to(&mut voice, spec.voice_target_rms);
    level_to(&mut bed, spec.music_target_rms());

    bed.apply_fades(spec.music_fade_in_sec, spec.music_fade_out_sec);
    voice.apply_fades(spec.voice_fade_sec, spec.voice_fade_sec);

    bed.overlay_at(&voice, lead_in)?;
    bed.clamp();

    tracing::debug!(
        total_frames = total,
        music_copies,
        "mixed voice over music bed"
    );
    Ok(MixedTrack {
        pcm: bed,
        voice_offset_sec: lead_in as f64 / f64::from(MIX_SAMPLE_RATE),
        voice_duration_sec: voice.duration_sec(),
        music_copies,
    })
}

/// Single-track variant: the voice preceded by `padding_sec` of silence.
#[tracing::instrument(skip_all, fields(voice_sec = voice.duration_sec()))]
pub fn prepare_voice_only(
    voice: &AudioPcm,
    padding_sec: f64,
    voice_fade_sec: f64,
) -> ReelResult<MixedTrack> {
    ensure_non_empty(voice, "affirmation")?;

    let mut voice = voice.to_mix_layout()?;
    voice.apply_fades(voice_fade_sec, voice_fade_sec);

    let lead_in = voice.secs_to_frames(padding_sec);
    let mut track = AudioPcm::silence(MIX_SAMPLE_RATE, MIX_CHANNELS, lead_in + voice.frames());
    track.overlay_at(&voice, lead_in)?;
    track.clamp();

    Ok(MixedTrack {
        pcm: track,
        voice_offset_sec: lead_in as f64 / f64::from(MIX_SAMPLE_RATE),
        voice_duration_sec: voice.duration_sec(),
        music_copies: 0,
    })
}

fn level_to(pcm: &mut AudioPcm, target_rms: f64) {
    let current = pcm.rms();
    if current > 0.0 {
        pcm.apply_gain(target_rms / current);
    }
}

fn ensure_non_empty(pcm: &AudioPcm, what: &str) -> ReelResult<()> {
    if pcm.frames() == 0 || pcm.sample_rate == 0 {
        return Err(ReelError::invalid_asset(format!(
            "{what} audio has zero duration"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
