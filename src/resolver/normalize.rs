// Format normalization - raw backend payloads to the canonical model
//
// Pure functions, no I/O, deterministic. Platform responses carry no
// discriminant field, so the mapping is an ordered (field, transform)
// table; the first known array field that yields formats wins.

use serde_json::Value;

use super::errors::ResolveError;
use super::models::{Backend, MediaFormat, ResolvedMedia, IMAGE_EXTS};

/// Placeholder title when a backend sends none
const DEFAULT_TITLE: &str = "Media found";

/// Label tokens marking a format as audio-only (substring, case-insensitive)
const AUDIO_TOKENS: &[&str] = &["mp3", "m4a", "audio"];

/// Extensions accepted by the CDN-echo heuristic
const MEDIA_EXTS: &[&str] = &[
    "mp4", "webm", "mov", "mp3", "m4a", "jpg", "jpeg", "png", "gif", "webp",
];

/// Map a raw backend payload into the canonical model.
///
/// `source_url` is the URL the resolution started from; it feeds the
/// echoed-input guard and is carried into the result unchanged.
pub fn normalize(
    payload: &Value,
    backend: Backend,
    source_url: &str,
) -> Result<ResolvedMedia, ResolveError> {
    match backend {
        Backend::Wide => normalize_wide(payload, source_url),
        Backend::Platform => normalize_platform(payload, source_url),
    }
}

fn nonempty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_str(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| nonempty_str(&item[*key]))
}

/// Shared display-label helper.
///
/// Prefers an explicit label-like field, else composes "WxH" from
/// numeric dimensions, else falls back to `default`. Bare-numeric
/// labels are read as vertical pixel counts and get a trailing `p`.
/// Audio/video markers are appended only when not already present so
/// the helper is safe to re-apply.
fn display_label(
    item: &Value,
    default: &str,
    ext: &str,
    has_audio: bool,
    has_video: bool,
) -> String {
    let mut label = first_str(item, &["label", "resolution", "text", "quality"])
        .or_else(|| {
            match (item["width"].as_u64(), item["height"].as_u64()) {
                (Some(w), Some(h)) => Some(format!("{}x{}", w, h)),
                _ => None,
            }
        })
        .unwrap_or_else(|| default.to_string());

    if !label.is_empty() && label.chars().all(|c| c.is_ascii_digit()) {
        label.push('p');
    }

    if has_video && !has_audio && !label.ends_with("(No Audio)") {
        label.push_str(" (No Audio)");
    } else if has_audio && !has_video && !label.contains('[') {
        label = format!("{} [{}]", label, ext);
    }
    label
}

/// Does a label name an audio-only rendition?
fn label_is_audio(item: &Value) -> bool {
    let text = first_str(item, &["label", "resolution", "text", "quality"])
        .unwrap_or_default()
        .to_lowercase();
    AUDIO_TOKENS.iter().any(|token| text.contains(token))
}

/// Lowercased, so downstream extension checks see one casing
fn ext_of_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let ext = path.rsplit('.').next()?.to_lowercase();
    MEDIA_EXTS.contains(&ext.as_str()).then_some(ext)
}

/// Guard against a backend echoing the input URL back as a "result".
/// Accepts the candidate when it differs from the source, or when it
/// looks like a CDN asset. Placeholder heuristic; precision here is
/// best-effort.
fn looks_like_result(candidate: &str, source_url: &str) -> bool {
    candidate != source_url
        || candidate.to_lowercase().contains("cdn")
        || ext_of_url(candidate).is_some()
}

// ---------------------------------------------------------------------------
// Wide payloads: already target-shaped, pass through with defaults.

fn normalize_wide(payload: &Value, source_url: &str) -> Result<ResolvedMedia, ResolveError> {
    let title = nonempty_str(&payload["title"]).unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let thumbnail = nonempty_str(&payload["thumbnail"]);

    let mut formats = Vec::new();
    if let Some(items) = payload["formats"].as_array() {
        for item in items {
            // Entries without a URL are useless to the selector
            let url = match nonempty_str(&item["url"]) {
                Some(url) => url,
                None => continue,
            };
            let ext = nonempty_str(&item["ext"]).unwrap_or_else(|| "mp4".to_string());
            let is_image = IMAGE_EXTS.contains(&ext.as_str());
            let has_video = item["has_video"].as_bool().unwrap_or(!is_image);
            let has_audio = item["has_audio"].as_bool().unwrap_or(!is_image);
            formats.push(MediaFormat {
                label: display_label(item, &ext.to_uppercase(), &ext, has_audio, has_video),
                url,
                ext,
                has_audio,
                has_video,
                filesize: item["filesize"].as_u64(),
            });
        }
    }

    // No usable format list: degrade to the single direct URL
    if formats.is_empty() {
        if let Some(url) = nonempty_str(&payload["url"]) {
            let ext = nonempty_str(&payload["ext"]).unwrap_or_else(|| "mp4".to_string());
            formats.push(implicit_format(url, ext));
        }
    }

    if formats.is_empty() {
        return Err(ResolveError::EmptyResult);
    }

    Ok(ResolvedMedia {
        title,
        thumbnail,
        source_url: source_url.to_string(),
        formats,
    })
}

fn implicit_format(url: String, ext: String) -> MediaFormat {
    let is_image = IMAGE_EXTS.contains(&ext.as_str());
    let is_audio = AUDIO_TOKENS.contains(&ext.as_str());
    let (has_audio, has_video) = if is_image {
        (false, false)
    } else if is_audio {
        (true, false)
    } else {
        (true, true)
    };
    MediaFormat {
        label: display_label(&Value::Null, "Best available", &ext, has_audio, has_video),
        url,
        ext,
        has_audio,
        has_video,
        filesize: None,
    }
}

// ---------------------------------------------------------------------------
// Platform payloads: one of several mutually-exclusive array fields.

type ItemTransform = fn(usize, &Value) -> Option<MediaFormat>;

/// Known array fields in priority order
const ARRAY_FIELDS: &[(&str, ItemTransform)] = &[
    ("downloads", link_item),
    ("medias", audio_item),
    ("data", link_item),
    ("links", link_item),
    ("videos", link_item),
    ("images", image_item),
];

/// Generic video/link arrays: mp4 unless the label names an audio type
fn link_item(_index: usize, item: &Value) -> Option<MediaFormat> {
    let url = first_str(item, &["url", "link"])?;
    let is_audio = label_is_audio(item);
    let ext = if is_audio { "mp3" } else { "mp4" };
    let (has_audio, has_video) = if is_audio { (true, false) } else { (true, true) };
    Some(MediaFormat {
        label: display_label(item, "HD", ext, has_audio, has_video),
        url,
        ext: ext.to_string(),
        has_audio,
        has_video,
        filesize: item["size"].as_u64(),
    })
}

/// Audio-media arrays (music platforms)
fn audio_item(_index: usize, item: &Value) -> Option<MediaFormat> {
    let url = nonempty_str(&item["url"])?;
    let ext = nonempty_str(&item["extension"]).unwrap_or_else(|| "mp3".to_string());
    Some(MediaFormat {
        label: display_label(item, "Audio", &ext, true, false),
        url,
        ext,
        has_audio: true,
        has_video: false,
        filesize: item["size"].as_u64(),
    })
}

/// Image galleries: positional labels
fn image_item(index: usize, item: &Value) -> Option<MediaFormat> {
    let url = first_str(item, &["url", "link"])?;
    Some(MediaFormat {
        label: format!("Image {}", index + 1),
        url,
        ext: "jpg".to_string(),
        has_audio: false,
        has_video: false,
        filesize: None,
    })
}

fn normalize_platform(payload: &Value, source_url: &str) -> Result<ResolvedMedia, ResolveError> {
    let mut formats = Vec::new();
    let mut array_thumbnail = None;

    for (field, transform) in ARRAY_FIELDS {
        let items = match payload[*field].as_array() {
            Some(items) => items,
            None => continue,
        };
        formats = items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| transform(index, item))
            .collect();
        if !formats.is_empty() {
            array_thumbnail = items.first().and_then(|item| nonempty_str(&item["thumbnail"]));
            break;
        }
    }

    // No known array: accept a direct media URL unless it just echoes
    // the input back.
    if formats.is_empty() {
        if let Some(url) = first_str(payload, &["url", "link", "video"]) {
            if looks_like_result(&url, source_url) {
                let ext = ext_of_url(&url).unwrap_or_else(|| "mp4".to_string());
                formats.push(implicit_format(url, ext));
            }
        }
    }

    if formats.is_empty() {
        return Err(ResolveError::EmptyResult);
    }

    let title = first_str(payload, &["title", "filename"])
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let thumbnail = nonempty_str(&payload["thumbnail"]).or(array_thumbnail);

    Ok(ResolvedMedia {
        title,
        thumbnail,
        source_url: source_url.to_string(),
        formats,
    })
}
