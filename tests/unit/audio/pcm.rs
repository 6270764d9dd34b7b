use super::*;

fn ramp(frames: usize, channels: u16, sample_rate: u32) -> AudioPcm {
    let mut v = Vec::new();
    for i in 0..frames {
        for _ in 0..channels {
            v.push(i as f32);
        }
    }
    AudioPcm {
        sample_rate,
        channels,
        interleaved_f32: v,
    }
}

#[test]
fn mono_is_duplicated_to_stereo() {
    let mono = AudioPcm {
        sample_rate: 44_100,
        channels: 1,
        interleaved_f32: vec![0.1, 0.2, 0.3],
    };
    let st = mono.to_mix_layout().unwrap();
    assert_eq!(st.channels, 2);
    assert_eq!(st.interleaved_f32, vec![0.1, 0.1, 0.2, 0.2, 0.3, 0.3]);
}

#[test]
fn more_than_two_channels_is_invalid() {
    let surround = AudioPcm::silence(MIX_SAMPLE_RATE, 6, 10);
    assert!(matches!(
        surround.to_mix_layout(),
        Err(ReelError::InvalidAsset(_))
    ));
}

#[test]
fn tracks_not_decoded_at_the_mix_rate_are_rejected() {
    let src = ramp(480, 2, 48_000);
    assert!(matches!(
        src.to_mix_layout(),
        Err(ReelError::InvalidAsset(_))
    ));
    let ok = ramp(441, 2, MIX_SAMPLE_RATE).to_mix_layout().unwrap();
    assert_eq!(ok.frames(), 441);
}

#[test]
fn tile_concatenates_whole_copies_then_truncates() {
    let music = ramp(4, 2, 1);
    let (tiled, copies) = music.tile_to_frames(10).unwrap();
    assert_eq!(copies, 3);
    assert_eq!(tiled.frames(), 10);
    let left: Vec<f32> = tiled.interleaved_f32.iter().step_by(2).copied().collect();
    assert_eq!(left, vec![0.0, 1.0, 2.0, 3.0, 0.0, 1.0, 2.0, 3.0, 0.0, 1.0]);
}

#[test]
fn tile_of_long_buffer_only_truncates() {
    let music = ramp(20, 2, 1);
    let (cut, copies) = music.tile_to_frames(7).unwrap();
    assert_eq!(copies, 1);
    assert_eq!(cut.frames(), 7);
    assert!(AudioPcm::silence(1, 2, 0).tile_to_frames(3).is_err());
}

#[test]
fn fades_start_and_end_at_zero() {
    let mut pcm = AudioPcm {
        sample_rate: 10,
        channels: 2,
        interleaved_f32: vec![1.0; 40],
    };
    pcm.apply_fades(0.5, 0.5);
    assert_eq!(pcm.interleaved_f32[0], 0.0);
    assert_eq!(pcm.interleaved_f32[39], 0.0);
    // Middle of the buffer is untouched.
    assert_eq!(pcm.interleaved_f32[20], 1.0);
    // Fade-in is monotonic.
    assert!(pcm.interleaved_f32[2] < pcm.interleaved_f32[4]);
}

#[test]
fn overlay_adds_at_offset_and_drops_overflow() {
    let mut bed = AudioPcm::silence(4, 2, 4);
    let voice = AudioPcm {
        sample_rate: 4,
        channels: 2,
        interleaved_f32: vec![0.5; 6],
    };
    bed.overlay_at(&voice, 2).unwrap();
    assert_eq!(bed.interleaved_f32, vec![0.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.5, 0.5]);

    let other_rate = AudioPcm::silence(8, 2, 1);
    assert!(bed.overlay_at(&other_rate, 0).is_err());
}

#[test]
fn gain_and_rms() {
    let mut pcm = AudioPcm {
        sample_rate: 4,
        channels: 2,
        interleaved_f32: vec![0.5, -0.5, 0.5, -0.5],
    };
    assert!((pcm.rms() - 0.5).abs() < 1e-9);
    pcm.apply_gain(0.2);
    assert!((pcm.rms() - 0.1).abs() < 1e-6);
}

#[test]
fn f32le_file_roundtrip_via_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mix.f32le");
    let pcm = AudioPcm {
        sample_rate: 44_100,
        channels: 2,
        interleaved_f32: vec![0.25, -1.0, 0.0, 0.75],
    };
    pcm.write_f32le(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(AudioPcm::from_f32le_bytes(&bytes, 44_100, 2).unwrap(), pcm);
    assert!(AudioPcm::from_f32le_bytes(&[0, 1, 2], 44_100, 2).is_err());
}
