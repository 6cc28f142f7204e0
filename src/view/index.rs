use maud::{Markup, html};

use crate::HTMX_PATH;
use crate::error::AppError;
use crate::storage::Storage;

pub const DEFAULT_INDEX_TITLE: &str = "Leaderboard";

/// Resolve a tournament-specific title from query input.
///
/// # Errors
/// Returns an error if parsing the tournament id fails or the storage
/// lookup fails.
pub async fn try_resolve_index_title(
    storage: &dyn Storage,
    tournament_str: &str,
) -> Result<String, AppError> {
    let tournament_id = tournament_str
        .trim()
        .parse::<i64>()
        .map_err(|e| AppError::Parse(e.to_string()))?;
    let tournament = storage.get_tournament(tournament_id).await?;
    Ok(tournament.name)
}

pub async fn resolve_index_title_or_default(
    storage: &dyn Storage,
    tournament_str: &str,
) -> String {
    match try_resolve_index_title(storage, tournament_str).await {
        Ok(title) => title,
        Err(_) => DEFAULT_INDEX_TITLE.to_string(),
    }
}

#[must_use]
pub fn render_index_template(title: &str) -> Markup {
    html! {
        (maud::DOCTYPE)
        head {
            meta charset="UTF-8";
            meta name="viewport" content="width=device-width, initial-scale=1.0";
            link rel="stylesheet" href="static/styles.css";
            title { (title) }
            script src=(HTMX_PATH) defer {}
            script src="static/leaderboard.js" defer {}
        }
        body {
            h1 {
                (title)
            }
            div id="leaderboard" {
                img alt="Result loading..." class="htmx-indicator" width="150" src="https://htmx.org//img/bars.svg" {}
            }
        }
    }
}
