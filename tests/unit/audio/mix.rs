use super::*;

fn tone(secs: f64, amp: f32, channels: u16, sample_rate: u32) -> AudioPcm {
    let frames = (secs * f64::from(sample_rate)).round() as usize;
    let mut v = Vec::with_capacity(frames * usize::from(channels));
    for i in 0..frames {
        let s = if i % 2 == 0 { amp } else { -amp };
        for _ in 0..channels {
            v.push(s);
        }
    }
    AudioPcm {
        sample_rate,
        channels,
        interleaved_f32: v,
    }
}

fn spec() -> AudioMixSpec {
    AudioMixSpec::from_config(&AudioConfig::default())
}

fn window_rms(pcm: &AudioPcm, from_sec: f64, to_sec: f64) -> f64 {
    let a = pcm.secs_to_frames(from_sec) * 2;
    let b = pcm.secs_to_frames(to_sec) * 2;
    crate::foundation::math::rms(&pcm.interleaved_f32[a..b])
}

#[test]
fn ten_second_voice_over_four_second_music_is_sixteen_seconds() {
    let voice = tone(10.0, 0.3, 1, 44_100);
    let music = tone(4.0, 0.8, 2, 44_100);
    let out = mix(&voice, &music, &spec()).unwrap();

    assert_eq!(out.pcm.frames(), 16 * 44_100);
    assert!((out.duration_sec() - 16.0).abs() < 1.0 / 44_100.0);
    assert_eq!(out.music_copies, 4);
    assert!((out.voice_offset_sec - 3.0).abs() < 1e-9);
    assert!((out.voice_duration_sec - 10.0).abs() < 1e-9);
    assert_eq!(out.pcm.channels, 2);
    assert_eq!(out.pcm.sample_rate, MIX_SAMPLE_RATE);
}

#[test]
fn duration_tracks_voice_plus_padding_for_odd_lengths() {
    for (voice_sec, channels) in [(1.234, 2), (7.5, 1), (0.01, 2)] {
        let voice = tone(voice_sec, 0.2, channels, 44_100);
        let music = tone(30.0, 0.5, 2, 44_100);
        let out = mix(&voice, &music, &spec()).unwrap();
        let expected = voice_sec + 6.0;
        assert!(
            (out.duration_sec() - expected).abs() <= 1.5 / 44_100.0,
            "voice {voice_sec}s -> {}s",
            out.duration_sec()
        );
        assert_eq!(out.music_copies, 1);
    }
}

#[test]
fn tracks_at_another_rate_are_rejected() {
    let voice = tone(1.0, 0.2, 2, 48_000);
    let music = tone(4.0, 0.5, 2, 44_100);
    assert!(matches!(
        mix(&voice, &music, &spec()),
        Err(ReelError::InvalidAsset(_))
    ));
}

#[test]
fn voice_dominates_music_after_leveling() {
    // Loud music, quiet voice: leveling must still favour the voice.
    let voice = tone(4.0, 0.05, 2, 44_100);
    let music = tone(20.0, 0.9, 2, 44_100);
    let s = AudioMixSpec {
        music_fade_in_sec: 0.0,
        ..spec()
    };
    let out = mix(&voice, &music, &s).unwrap();

    let lead_in_only = window_rms(&out.pcm, 0.5, 2.9);
    let with_voice = window_rms(&out.pcm, 4.0, 6.0);
    assert!((lead_in_only - s.music_target_rms()).abs() < 1e-3);
    assert!(with_voice > 3.0 * lead_in_only);
}

#[test]
fn lead_in_region_has_no_voice_and_edges_are_faded() {
    let voice = tone(2.0, 0.5, 2, 44_100);
    let music = tone(2.0, 0.5, 2, 44_100);
    let out = mix(&voice, &music, &spec()).unwrap();
    let n = out.pcm.interleaved_f32.len();
    assert_eq!(out.pcm.interleaved_f32[0], 0.0);
    assert_eq!(out.pcm.interleaved_f32[n - 1], 0.0);
}

#[test]
fn zero_duration_audio_is_invalid() {
    let empty = AudioPcm::silence(44_100, 2, 0);
    let music = tone(4.0, 0.5, 2, 44_100);
    assert!(matches!(
        mix(&empty, &music, &spec()),
        Err(ReelError::InvalidAsset(_))
    ));
    assert!(matches!(
        mix(&music, &empty, &spec()),
        Err(ReelError::InvalidAsset(_))
    ));
    assert!(matches!(
        prepare_voice_only(&empty, 1.0, 0.1),
        Err(ReelError::InvalidAsset(_))
    ));
}

#[test]
fn silent_music_is_left_untouched_by_leveling() {
    let voice = tone(1.0, 0.5, 2, 44_100);
    let music = AudioPcm::silence(44_100, 2, 44_100);
    let out = mix(&voice, &music, &spec()).unwrap();
    assert!(window_rms(&out.pcm, 0.0, 2.9) == 0.0);
}

#[test]
fn voice_only_is_prefixed_with_padding() {
    let voice = tone(5.0, 0.4, 1, 44_100);
    let out = prepare_voice_only(&voice, 1.0, 0.1).unwrap();
    assert_eq!(out.pcm.frames(), 6 * 44_100);
    assert_eq!(out.music_copies, 0);
    assert_eq!(window_rms(&out.pcm, 0.0, 0.99), 0.0);
    assert!(window_rms(&out.pcm, 2.0, 3.0) > 0.3);
}
