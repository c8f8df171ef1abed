use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Background music as a looping playlist. The deck holds the playback state
/// a host audio backend mirrors; it does not decode or output sound.
#[derive(Debug, Clone, Default)]
pub struct MusicDeck {
    playlist: Vec<String>,
    current: usize,
    state: PlaybackState,
}

impl MusicDeck {
    pub fn new(playlist: Vec<String>) -> Self {
        Self {
            playlist,
            current: 0,
            state: PlaybackState::Stopped,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_track(&self) -> Option<&str> {
        self.playlist.get(self.current).map(String::as_str)
    }

    pub fn playlist(&self) -> &[String] {
        &self.playlist
    }

    /// Starts the current track from the stopped state; no-op with an empty
    /// playlist.
    pub fn play(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        self.state = PlaybackState::Playing;
        info!(track = self.current_track().unwrap_or_default(), "music_playing");
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
            info!(track = self.current_track().unwrap_or_default(), "music_paused");
        }
    }

    /// Pauses while playing and resumes while paused.
    pub fn toggle_pause(&mut self) -> PlaybackState {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => {
                self.state = PlaybackState::Playing;
                info!(track = self.current_track().unwrap_or_default(), "music_resumed");
            }
            PlaybackState::Stopped => {}
        }
        self.state
    }

    /// Stops the current track and starts the next one, wrapping around.
    pub fn next_track(&mut self) -> Option<&str> {
        if self.playlist.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.playlist.len();
        self.state = PlaybackState::Stopped;
        self.play();
        self.current_track()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> MusicDeck {
        MusicDeck::new(vec!["intro".to_string(), "trap".to_string()])
    }

    #[test]
    fn toggle_pauses_and_resumes() {
        let mut deck = deck();
        deck.play();
        assert_eq!(deck.toggle_pause(), PlaybackState::Paused);
        assert_eq!(deck.toggle_pause(), PlaybackState::Playing);
    }

    #[test]
    fn toggle_does_not_start_a_stopped_deck() {
        let mut deck = deck();
        assert_eq!(deck.toggle_pause(), PlaybackState::Stopped);
    }

    #[test]
    fn next_track_wraps_and_plays() {
        let mut deck = deck();
        deck.play();
        deck.pause();
        assert_eq!(deck.next_track(), Some("trap"));
        assert_eq!(deck.state(), PlaybackState::Playing);
        assert_eq!(deck.next_track(), Some("intro"));
    }

    #[test]
    fn empty_playlist_never_plays() {
        let mut deck = MusicDeck::default();
        deck.play();
        assert_eq!(deck.state(), PlaybackState::Stopped);
        assert_eq!(deck.next_track(), None);
    }
}
