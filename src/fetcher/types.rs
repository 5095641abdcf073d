use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Charset {
    Utf8,
    EucKr,
    Windows1252,
    ShiftJis,
    Gb2312,
    Big5,
    Other(String),
}

impl Charset {
    pub fn from_encoding(encoding: &'static encoding_rs::Encoding) -> Self {
        use std::ptr;

        if ptr::eq(encoding, encoding_rs::UTF_8) {
            Self::Utf8
        } else if ptr::eq(encoding, encoding_rs::EUC_KR) {
            Self::EucKr
        } else if ptr::eq(encoding, encoding_rs::WINDOWS_1252) {
            Self::Windows1252
        } else if ptr::eq(encoding, encoding_rs::SHIFT_JIS) {
            Self::ShiftJis
        } else if ptr::eq(encoding, encoding_rs::GBK) || ptr::eq(encoding, encoding_rs::GB18030) {
            Self::Gb2312
        } else if ptr::eq(encoding, encoding_rs::BIG5) {
            Self::Big5
        } else {
            Self::Other(encoding.name().to_string())
        }
    }

    pub fn encoding(&self) -> &'static encoding_rs::Encoding {
        match self {
            Self::Utf8 => encoding_rs::UTF_8,
            Self::EucKr => encoding_rs::EUC_KR,
            Self::Windows1252 => encoding_rs::WINDOWS_1252,
            Self::ShiftJis => encoding_rs::SHIFT_JIS,
            Self::Gb2312 => encoding_rs::GBK,
            Self::Big5 => encoding_rs::BIG5,
            Self::Other(name) => {
                encoding_rs::Encoding::for_label(name.as_bytes()).unwrap_or(encoding_rs::UTF_8)
            }
        }
    }
}

#[derive(Debug)]
pub struct PageResponse {
    pub url_final: Url,
    pub status: StatusCode,
    pub body_utf8: String,
    pub charset: Charset,
    pub fetched_at: DateTime<Utc>,
}
