use std::path::Path;

use super::*;

#[test]
fn text_limits_count_characters() {
    assert!(check_text("header", "Daily", MAX_HEADER).is_ok());
    assert!(check_text("header", &"é".repeat(100), MAX_HEADER).is_ok());
    assert!(check_text("header", &"a".repeat(101), MAX_HEADER).is_err());
    assert!(check_text("author", &"a".repeat(51), MAX_AUTHOR).is_err());
    assert!(check_text("body", "   ", MAX_BODY).is_err());
}

#[test]
fn blank_subtitle_is_treated_as_absent() {
    assert!(check_optional_text("subtitle", None, MAX_SUBTITLE).is_ok());
    assert!(check_optional_text("subtitle", Some(" "), MAX_SUBTITLE).is_ok());
    assert!(check_optional_text("subtitle", Some(&"x".repeat(101)), MAX_SUBTITLE).is_err());
}

#[test]
fn only_mp3_and_wav_audio_is_accepted() {
    assert!(check_audio_ext("affirmation", Path::new("a/voice.mp3")).is_ok());
    assert!(check_audio_ext("affirmation", Path::new("voice.WAV")).is_ok());
    assert!(check_audio_ext("music", Path::new("song.ogg")).is_err());
    assert!(check_audio_ext("music", Path::new("song")).is_err());
}

#[test]
fn default_output_names() {
    assert_eq!(
        video_output_name(1_700_000_000, Path::new("uploads/morning.mp3")),
        "processed_1700000000_morning.mp4"
    );
    assert_eq!(image_output_name(1_700_000_000), "processed1700000000image.png");
}
