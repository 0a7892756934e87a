//! Pure subtitle formatting functions.
//!
//! Converts (text, start, end, sequence number) into a rendered cue string
//! in one of the supported subtitle text formats. No side effects, no
//! shared state; the cue sequence counter lives with the caller.

/// Subtitle text format selected by the client.
///
/// Unknown format names deliberately fall through to [`Passthrough`]:
/// the cue text is relayed unchanged rather than rejecting the session.
///
/// [`Passthrough`]: SubtitleFormat::Passthrough
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubtitleFormat {
    #[default]
    WebVtt,
    Srt,
    TtmlV2,
    /// Unrecognized format name: cue text is sent as-is.
    Passthrough,
}

impl SubtitleFormat {
    /// Map a client-supplied format name to a format.
    ///
    /// Known names are `webvtt`, `srt` and `ttmlv2`; anything else is
    /// passthrough (fallback, no error).
    pub fn parse(name: &str) -> Self {
        match name {
            "webvtt" => SubtitleFormat::WebVtt,
            "srt" => SubtitleFormat::Srt,
            "ttmlv2" => SubtitleFormat::TtmlV2,
            _ => SubtitleFormat::Passthrough,
        }
    }

    /// Format name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            SubtitleFormat::WebVtt => "webvtt",
            SubtitleFormat::Srt => "srt",
            SubtitleFormat::TtmlV2 => "ttmlv2",
            SubtitleFormat::Passthrough => "passthrough",
        }
    }
}

/// Format a time offset in seconds as `HH:MM:SS.mmm`.
///
/// Sub-components are truncated, not rounded. Hours are zero-padded to two
/// digits; session durations keep them well below three.
///
/// # Examples
/// ```
/// use subwire::subtitle::format_timestamp;
/// assert_eq!(format_timestamp(125.250), "00:02:05.250");
/// ```
pub fn format_timestamp(seconds: f64) -> String {
    let hours = (seconds / 3600.0) as u64;
    let minutes = ((seconds % 3600.0) / 60.0) as u64;
    let secs = (seconds % 60.0) as u64;
    let millis = ((seconds - seconds.trunc()) * 1000.0) as u64;
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

/// Render one subtitle cue in the given format.
///
/// `seq` is the 1-based cue sequence number; only SRT renders it, but the
/// caller's counter advances for every emitted cue regardless of format.
/// Text is not escaped for any format — cues are relayed verbatim.
pub fn format_cue(format: SubtitleFormat, text: &str, start: f64, end: f64, seq: u64) -> String {
    let start_ts = format_timestamp(start);
    let end_ts = format_timestamp(end);

    match format {
        SubtitleFormat::WebVtt => format!("{} --> {}\n{}\n\n", start_ts, end_ts, text),
        SubtitleFormat::Srt => format!(
            "{}\n{} --> {}\n{}\n\n",
            seq,
            start_ts.replace('.', ","),
            end_ts.replace('.', ","),
            text
        ),
        SubtitleFormat::TtmlV2 => {
            format!("<p begin=\"{}\" end=\"{}\">{}</p>\n", start_ts, end_ts, text)
        }
        SubtitleFormat::Passthrough => text.to_string(),
    }
}
