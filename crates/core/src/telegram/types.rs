use crate::{ConverterError, ConverterResult};
use serde::Deserialize;

/// Envelope wrapping every Bot API response.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> ConverterResult<T> {
        if !self.ok {
            return Err(ConverterError::Telegram(
                self.description.unwrap_or_else(|| "unknown error".into()),
            ));
        }
        self.result
            .ok_or_else(|| ConverterError::Telegram("response is missing result".into()))
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
}

/// Any non-photo attachment; only the file id is needed to send it back.
#[derive(Clone, Debug, Deserialize)]
pub struct FileRef {
    pub file_id: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub photo: Option<Vec<PhotoSize>>,
    pub video: Option<FileRef>,
    pub document: Option<FileRef>,
    pub audio: Option<FileRef>,
    pub voice: Option<FileRef>,
    pub animation: Option<FileRef>,
}

impl Message {
    /// The first attachment present, checked in [`MediaKind::ALL`] order.
    ///
    /// Photos arrive as several sizes; the last one is the largest.
    pub fn media(&self) -> Option<(MediaKind, &str)> {
        MediaKind::ALL.into_iter().find_map(|kind| {
            let file_id = match kind {
                MediaKind::Photo => self
                    .photo
                    .as_ref()
                    .and_then(|sizes| sizes.last())
                    .map(|p| p.file_id.as_str()),
                MediaKind::Video => self.video.as_ref().map(|f| f.file_id.as_str()),
                MediaKind::Document => self.document.as_ref().map(|f| f.file_id.as_str()),
                MediaKind::Audio => self.audio.as_ref().map(|f| f.file_id.as_str()),
                MediaKind::Voice => self.voice.as_ref().map(|f| f.file_id.as_str()),
                MediaKind::Animation => self.animation.as_ref().map(|f| f.file_id.as_str()),
            };
            file_id.map(|id| (kind, id))
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Photo,
    Video,
    Document,
    Audio,
    Voice,
    Animation,
}

impl MediaKind {
    pub const ALL: [MediaKind; 6] = [
        MediaKind::Photo,
        MediaKind::Video,
        MediaKind::Document,
        MediaKind::Audio,
        MediaKind::Voice,
        MediaKind::Animation,
    ];

    /// Bot API method used to send this kind.
    pub fn method(self) -> &'static str {
        match self {
            MediaKind::Photo => "sendPhoto",
            MediaKind::Video => "sendVideo",
            MediaKind::Document => "sendDocument",
            MediaKind::Audio => "sendAudio",
            MediaKind::Voice => "sendVoice",
            MediaKind::Animation => "sendAnimation",
        }
    }

    /// Request field carrying the file id.
    pub fn field(self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
            MediaKind::Audio => "audio",
            MediaKind::Voice => "voice",
            MediaKind::Animation => "animation",
        }
    }
}
