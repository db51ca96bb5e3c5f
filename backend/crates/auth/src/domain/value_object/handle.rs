//! Handle Value Object
//!
//! ハンドルはアカウントを識別する**公開識別子**。
//! ログイン、プロフィール表示、管理画面の検索に使用される。
//!
//! ## 設計方針
//! - ASCII 英数字と `_` のみ許可
//! - 大文字入力は表示用に保持し、一意性判定は小文字の canonical で行う
//! - NFKC 正規化 → trim → 検証 の順で処理
//!
//! ## 不変条件
//! - 長さ: 3〜30文字（正規化後）
//! - 文字種: `[A-Za-z0-9_]`

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

pub const HANDLE_MIN_LENGTH: usize = 3;
pub const HANDLE_MAX_LENGTH: usize = 30;

/// Error returned when handle validation fails
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("Username is required")]
    Empty,

    #[error("Username must be at least {min} characters (got {length})")]
    TooShort { length: usize, min: usize },

    #[error("Username must be at most {max} characters (got {length})")]
    TooLong { length: usize, max: usize },

    #[error("Invalid character '{char}' at position {position}. Only letters, digits and _ are allowed")]
    InvalidCharacter { char: char, position: usize },
}

/// Validated account handle
///
/// # Storage
/// - `original`: 入力値（NFKC 正規化・trim 済み、大文字小文字を保持）
/// - `canonical`: 一意性チェック用の小文字形
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Handle {
    original: String,
    canonical: String,
}

impl Handle {
    pub fn new(input: impl AsRef<str>) -> Result<Self, HandleError> {
        let original: String = input.as_ref().nfkc().collect::<String>().trim().to_string();
        Self::validate(&original)?;
        let canonical = original.to_ascii_lowercase();
        Ok(Self {
            original,
            canonical,
        })
    }

    /// 表示用（大文字小文字を保持）
    #[inline]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// 一意性チェック用（小文字）
    #[inline]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Create from database value (assumes already validated)
    pub fn from_db(original: impl Into<String>) -> Self {
        let original = original.into();
        let canonical = original.to_ascii_lowercase();
        Self {
            original,
            canonical,
        }
    }

    fn validate(value: &str) -> Result<(), HandleError> {
        if value.is_empty() {
            return Err(HandleError::Empty);
        }

        let length = value.chars().count();
        if length < HANDLE_MIN_LENGTH {
            return Err(HandleError::TooShort {
                length,
                min: HANDLE_MIN_LENGTH,
            });
        }
        if length > HANDLE_MAX_LENGTH {
            return Err(HandleError::TooLong {
                length,
                max: HANDLE_MAX_LENGTH,
            });
        }

        if let Some((position, char)) = value
            .chars()
            .enumerate()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(HandleError::InvalidCharacter { char, position });
        }

        Ok(())
    }
}

impl TryFrom<String> for Handle {
    type Error = HandleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Handle> for String {
    fn from(handle: Handle) -> Self {
        handle.original
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.original)
    }
}
