use serde::Deserialize;

use crate::{
    error::PipelineError,
    management::SessionContext,
    types::{Destination, OrderMode},
};

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PickForm {
    pub playlist_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderForm {
    pub song_sorting: Option<String>,
}

impl OrderForm {
    pub fn order(&self) -> OrderMode {
        OrderMode::from_form(self.song_sorting.as_deref())
    }
}

/// Destination choice: either one of the listed playlists or a new name.
#[derive(Debug, Clone, Deserialize)]
pub struct DestinationForm {
    pub playlist_id: Option<String>,
    #[serde(alias = "playlist_name")]
    pub new_playlist_name: Option<String>,
    pub song_sorting: Option<String>,
}

impl DestinationForm {
    pub fn order(&self) -> OrderMode {
        OrderMode::from_form(self.song_sorting.as_deref())
    }

    /// Validates the choice against the destinations shown to this session.
    ///
    /// The snapshot id of an existing playlist is taken from that listing,
    /// never from the form.
    pub fn destination(&self, context: &SessionContext) -> Result<Destination, PipelineError> {
        if let Some(id) = non_blank(self.playlist_id.as_deref()) {
            let playlist = context
                .destination(id)
                .ok_or_else(|| PipelineError::input(format!("unknown playlist {}", id)))?;
            return Ok(Destination::Existing {
                playlist_id: playlist.id.clone(),
                name: playlist.display_name.clone(),
                snapshot_id: playlist.snapshot_id.clone(),
            });
        }

        match non_blank(self.new_playlist_name.as_deref()) {
            Some(name) => Ok(Destination::New {
                name: name.to_string(),
            }),
            None => Err(PipelineError::input("no destination playlist chosen")),
        }
    }
}

pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
