//! Upload filename convention
//!
//! Stored uploads are named `<token>_<owner>.<ext>`, where `token` is 32 random hex
//! characters. Every derivative hangs off the base name (the stored filename minus
//! its extension):
//!
//! - `<base>-thumb.png` for images
//! - `<base>-thumb-1.png` .. `<base>-thumb-N.png` for video screenshots
//! - `<base>-palette.png` (transient) and `<base>-animation.gif` for video previews
//!
//! Ownership is recovered from the filename alone, so the convention is parsed
//! only here. Changing the layout means changing this module and nothing else.

use crate::constants::PARTIAL_SUFFIX;
use uuid::Uuid;

const OWNER_SEPARATOR: char = '_';
const MAX_OWNER_ID_LEN: usize = 64;

/// Owner ids are embedded verbatim in filenames, so only `[A-Za-z0-9-]` is allowed.
///
/// Ids ending in a derivative suffix (`-thumb`, `-thumb-2`, `-palette`, `-animation`)
/// are refused: their stored names would read as derivatives and have no owner.
pub fn is_valid_owner_id(owner_id: &str) -> bool {
    !owner_id.is_empty()
        && owner_id.len() <= MAX_OWNER_ID_LEN
        && owner_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !is_derivative(&format!("t{OWNER_SEPARATOR}{owner_id}.x"))
}

/// Builds a fresh stored filename for `owner_id`.
///
/// Returns `None` when the owner id or the extension cannot be embedded safely.
pub fn stored_filename(owner_id: &str, extension: &str) -> Option<String> {
    let token = Uuid::new_v4().simple().to_string();
    compose(&token, owner_id, extension)
}

fn compose(token: &str, owner_id: &str, extension: &str) -> Option<String> {
    if !is_valid_owner_id(owner_id) {
        return None;
    }

    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    Some(format!("{token}{OWNER_SEPARATOR}{owner_id}.{extension}"))
}

/// Lowercased extension of a client-supplied filename, if it has one.
pub fn extension_of(filename: &str) -> Option<String> {
    let (stem, extension) = filename.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}

/// Filename without its extension; the prefix shared by all derivatives.
pub fn base_name(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((base, _)) if !base.is_empty() => base,
        _ => filename,
    }
}

/// Identity of the user who uploaded `filename`. Derivative names have no owner.
pub fn owner_of(filename: &str) -> Option<&str> {
    if is_derivative(filename) {
        return None;
    }
    let (token, owner_id) = base_name(filename).split_once(OWNER_SEPARATOR)?;
    if token.is_empty() || !is_valid_owner_id(owner_id) {
        return None;
    }
    Some(owner_id)
}

/// True for names produced by the derivative pipeline, including in-progress writes.
pub fn is_derivative(filename: &str) -> bool {
    if filename.ends_with(PARTIAL_SUFFIX) {
        return true;
    }
    let base = base_name(filename);
    base.ends_with("-thumb")
        || base.ends_with("-palette")
        || base.ends_with("-animation")
        || base
            .rsplit_once("-thumb-")
            .is_some_and(|(_, n)| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// True for files that exist only while a derivative is being produced: `.part`
/// writes and the GIF palette.
pub fn is_transient(filename: &str) -> bool {
    filename.ends_with(PARTIAL_SUFFIX) || base_name(filename).ends_with("-palette")
}

/// True for a single path component that cannot escape its directory.
pub fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.contains("..")
        && !name.contains(|c: char| matches!(c, '/' | '\\' | '\0'))
}

pub fn image_thumbnail(base: &str) -> String {
    format!("{base}-thumb.png")
}

/// Screenshots are numbered from 1.
pub fn video_screenshot(base: &str, index: usize) -> String {
    format!("{base}-thumb-{index}.png")
}

pub fn palette(base: &str) -> String {
    format!("{base}-palette.png")
}

pub fn animation(base: &str) -> String {
    format!("{base}-animation.gif")
}

/// In-progress name for `name`; still contains the base so a cascade delete catches leftovers.
pub fn partial(name: &str) -> String {
    format!("{name}{PARTIAL_SUFFIX}")
}
