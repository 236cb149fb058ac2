use std::sync::{Arc, OnceLock};

use geodata::{CollectionKind, GeoDataSource, canton_has_districts};
use navigator::CANTONS;
use tracing::{debug, warn};

use crate::mode::{QuizModeDefinition, communities_mode, cantons_mode, districts_mode};

/// Every quiz mode the application offers.
///
/// The listing is built on first access and then kept for the life of the
/// catalog; `modes` never fetches twice. A district collection that cannot
/// be loaded leaves only the two country-wide modes.
pub struct QuizModeCatalog {
    source: Arc<dyn GeoDataSource>,
    modes: OnceLock<Vec<QuizModeDefinition>>,
}

impl QuizModeCatalog {
    pub fn new(source: Arc<dyn GeoDataSource>) -> Self {
        Self {
            source,
            modes: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &dyn GeoDataSource {
        self.source.as_ref()
    }

    pub fn modes(&self) -> &[QuizModeDefinition] {
        self.modes.get_or_init(|| build_modes(self.source.as_ref()))
    }

    pub fn mode(&self, id: &str) -> Option<&QuizModeDefinition> {
        self.modes().iter().find(|m| m.id == id)
    }
}

impl std::fmt::Debug for QuizModeCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizModeCatalog")
            .field("built", &self.modes.get().is_some())
            .finish_non_exhaustive()
    }
}

fn build_modes(source: &dyn GeoDataSource) -> Vec<QuizModeDefinition> {
    let mut modes = vec![cantons_mode(), communities_mode()];
    match source.fetch(CollectionKind::Districts) {
        Ok(districts) => {
            // Only cantons that actually have districts get a district quiz.
            for (canton, _) in CANTONS {
                if canton_has_districts(&districts, canton) {
                    modes.push(districts_mode(canton));
                }
            }
        }
        Err(err) => warn!(error = %err, "district quiz modes unavailable"),
    }
    debug!(modes = modes.len(), "quiz mode catalog built");
    modes
}
