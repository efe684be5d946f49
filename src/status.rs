//! Status data model for the streaming and REST APIs.
//!
//! This module contains the types deserialized from Twitter status payloads,
//! along with the logic for resolving a status's canonical text and for
//! scanning its mention entities for a particular user.

use serde::Deserialize;

/// A Twitter user as embedded in status payloads and credential lookups.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Numeric user ID.
    pub id: u64,
    /// Handle without the leading @.
    pub screen_name: String,
}

/// A user mention entity with its position in the status text.
#[derive(Debug, Clone, Deserialize)]
pub struct UserMention {
    /// Numeric ID of the mentioned user.
    pub id: u64,
    /// Handle of the mentioned user without the leading @.
    pub screen_name: String,
    /// Code point offsets of the mention: inclusive start, exclusive end.
    pub indices: (usize, usize),
}

/// Entities attached to a status. Only mentions are of interest here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entities {
    #[serde(default)]
    pub user_mentions: Vec<UserMention>,
}

/// The extended payload nested inside compatibility-mode statuses that exceed
/// the classic length limit.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtendedTweet {
    pub full_text: String,
    pub display_text_range: Option<(usize, usize)>,
    pub entities: Option<Entities>,
}

/// A status received from the streaming API or a REST lookup.
///
/// The streaming API delivers statuses in compatibility mode (`text` plus an
/// optional nested `extended_tweet`), while REST lookups made in extended mode
/// return `full_text` at the top level. Both shapes deserialize into this one
/// type, and [`Status::resolved_text`] hides the difference.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    /// Numeric status ID.
    pub id: u64,
    /// Compatibility-mode text, possibly truncated.
    pub text: Option<String>,
    /// Full text, present on REST lookups made in extended mode.
    pub full_text: Option<String>,
    /// Code point range of the displayable part of the text.
    pub display_text_range: Option<(usize, usize)>,
    /// Extended payload, present on streamed statuses over the classic limit.
    pub extended_tweet: Option<ExtendedTweet>,
    /// The status author.
    pub user: User,
    #[serde(default)]
    pub entities: Entities,
    /// ID of the status this one replies to, if any.
    pub in_reply_to_status_id: Option<u64>,
    #[serde(default)]
    pub is_quote_status: bool,
    /// The original status when this one is a retweet.
    pub retweeted_status: Option<Box<Status>>,
}

/// Summary of how a particular user appears in a status's mention entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MentionScan {
    /// Number of mention entities referring to the user.
    pub count: usize,
    /// Indices of the first such mention, if any.
    pub first_indices: Option<(usize, usize)>,
}

impl Status {
    /// Returns the mention entities for this status.
    ///
    /// Statuses over the classic length limit carry their complete entity set
    /// inside the extended payload; the top-level entities only cover the
    /// truncated text. The extended set is preferred when present.
    pub fn user_mentions(&self) -> &[UserMention] {
        if let Some(extended) = &self.extended_tweet {
            if let Some(entities) = &extended.entities {
                return &entities.user_mentions;
            }
        }
        &self.entities.user_mentions
    }

    /// Scans the mention entities for mentions of the given user.
    ///
    /// # Parameters
    ///
    /// - `user_id`: Numeric ID of the user to look for
    ///
    /// # Returns
    ///
    /// A [`MentionScan`] with the mention count and, when the user is
    /// mentioned at least once, the indices of the first mention.
    pub fn mentions_of(&self, user_id: u64) -> MentionScan {
        let mut count = 0;
        let mut first_indices = None;

        for mention in self.user_mentions() {
            if mention.id == user_id {
                count += 1;
                if first_indices.is_none() {
                    first_indices = Some(mention.indices);
                }
            }
        }

        MentionScan {
            count,
            first_indices,
        }
    }

    /// Returns the status text in whatever form the payload carried it,
    /// without applying any display range.
    pub fn raw_text(&self) -> &str {
        if let Some(text) = &self.text {
            return text;
        }
        if let Some(full_text) = &self.full_text {
            return full_text;
        }
        if let Some(extended) = &self.extended_tweet {
            return &extended.full_text;
        }
        ""
    }

    /// Resolves the canonical text of this status.
    ///
    /// The richest available form wins: a top-level `full_text` (REST extended
    /// mode), then a nested `extended_tweet`, then the compatibility `text`.
    /// Whenever a display range accompanies the chosen text, the text is cut
    /// down to that range. When no range is available and `strip_mention` is
    /// given, those code points are removed instead, which drops a leading
    /// mention together with the separator that follows it.
    ///
    /// # Parameters
    ///
    /// - `strip_mention`: Inclusive code point range of a mention to remove
    ///   when the payload carries no display range
    ///
    /// # Returns
    ///
    /// The resolved text as an owned string.
    pub fn resolved_text(&self, strip_mention: Option<(usize, usize)>) -> String {
        if let Some(full_text) = &self.full_text {
            return match self.display_text_range {
                Some((start, end)) => slice_code_points(full_text, start, end),
                None => full_text.clone(),
            };
        }

        if let Some(extended) = &self.extended_tweet {
            return match extended.display_text_range {
                Some((start, end)) => slice_code_points(&extended.full_text, start, end),
                None => extended.full_text.clone(),
            };
        }

        let text = self.text.as_deref().unwrap_or_default();
        if let Some((start, end)) = self.display_text_range {
            return slice_code_points(text, start, end);
        }
        if let Some((start, end)) = strip_mention {
            return strip_code_points(text, start, end);
        }
        text.to_string()
    }
}

/// Slices `text` by code point offsets `[start, end)`.
///
/// Twitter ranges count code points, not bytes, so byte slicing would split
/// multibyte characters. Out-of-range bounds are clamped.
pub(crate) fn slice_code_points(text: &str, start: usize, end: usize) -> String {
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

/// Removes the code points `[start, end]` (inclusive) from `text` and returns
/// the remainder. Out-of-range bounds are clamped.
pub(crate) fn strip_code_points(text: &str, start: usize, end: usize) -> String {
    text.chars()
        .enumerate()
        .filter(|(position, _)| *position < start || *position > end)
        .map(|(_, character)| character)
        .collect()
}
