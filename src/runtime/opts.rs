use std::rc::Rc;

use crate::runtime::target::SoundPlayer;

/// Host services and settings shared by every transition of a set.
#[derive(Clone)]
pub struct TransitionOpts {
    /// Receives sound items; `None` silences them.
    pub sound_player: Option<Rc<dyn SoundPlayer>>,
    /// Multiplier applied to every sound item's volume.
    pub sound_volume: f64,
}

impl Default for TransitionOpts {
    fn default() -> Self {
        Self {
            sound_player: None,
            sound_volume: 1.0,
        }
    }
}

impl std::fmt::Debug for TransitionOpts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionOpts")
            .field("sound_player", &self.sound_player.is_some())
            .field("sound_volume", &self.sound_volume)
            .finish()
    }
}

impl TransitionOpts {
    /// Route sound items to `player`.
    pub fn with_sound_player(mut self, player: impl SoundPlayer + 'static) -> Self {
        self.sound_player = Some(Rc::new(player));
        self
    }

    /// Scale every sound item's volume.
    pub fn with_sound_volume(mut self, volume: f64) -> Self {
        self.sound_volume = volume;
        self
    }
}
