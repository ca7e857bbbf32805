//! Resolves command arguments to wallet entities.
//!
//! An argument is either the 1-based position shown by the listing commands or a prefix of
//! the entity's UUID (at least four hex characters).

use cofrinho_domain::{Displayable, Identifiable};

use crate::cli::core::CommandError;

const MIN_PREFIX_LEN: usize = 4;

/// Selection by list position or id prefix over any identifiable collection.
pub fn resolve<'a, T>(items: &'a [T], arg: &str, kind: &str) -> Result<&'a T, CommandError>
where
    T: Identifiable + Displayable,
{
    let arg = arg.trim();
    if let Ok(position) = arg.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|idx| items.get(idx))
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!(
                    "no {kind} at position {position} (there are {})",
                    items.len()
                ))
            });
    }

    let needle = arg.to_ascii_lowercase();
    if needle.len() < MIN_PREFIX_LEN || !needle.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        return Err(CommandError::InvalidArguments(format!(
            "`{arg}` is neither a {kind} position nor an id prefix"
        )));
    }

    let mut matches = items
        .iter()
        .filter(|item| item.id().to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(item), None) => Ok(item),
        (None, _) => Err(CommandError::InvalidArguments(format!(
            "no {kind} matches `{arg}`"
        ))),
        (Some(first), Some(second)) => Err(CommandError::InvalidArguments(format!(
            "`{arg}` is ambiguous: {}, {}",
            first.display_label(),
            second.display_label()
        ))),
    }
}
