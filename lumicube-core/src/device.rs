//! Device context
//!
//! All state the command dispatcher and the render loop act on: the mode
//! and selection, the effect and playlist tables, and the collaborators
//! for storage, time and power. The scheduler owns exactly one context and
//! lends it to the dispatcher for each received frame.

use heapless::Vec;
use lumicube_hal::{ConfigStorage, PowerControl, RealTimeClock, StorageError};
use lumicube_protocol::MAX_LONG_OCTET_STRING_LEN;

use crate::config::DeviceConfig;
use crate::effect::EffectRegistry;
use crate::persistence::{Persistence, PersistenceError, MAX_TEXT_LEN};
use crate::playlist::{CatalogError, PlaylistCatalog, PlaylistSelector, SelectError};
use crate::state::{DeviceState, DirtyFlags, Mode, PowerAction};
use crate::zcl::value::name_list_len;

pub struct DeviceContext<'a, S, C, P> {
    pub(crate) config: DeviceConfig,
    pub(crate) state: DeviceState,
    pub(crate) selector: PlaylistSelector,
    pub(crate) effects: EffectRegistry<'a>,
    pub(crate) playlists: PlaylistCatalog<'a>,
    pub(crate) persistence: Persistence<S>,
    pub(crate) clock: C,
    pub(crate) power: P,
    pub(crate) address: u64,
    pub(crate) alarm_mask: bool,
    pub(crate) text: Vec<u8, MAX_TEXT_LEN>,
    /// The active effect must be initialised before the next draw
    pub(crate) needs_init: bool,
}

impl<'a, S, C, P> DeviceContext<'a, S, C, P>
where
    S: ConfigStorage,
    C: RealTimeClock,
    P: PowerControl,
{
    /// Create a context
    ///
    /// Fails if the tables are empty or a playlist names an unknown effect.
    pub fn new(
        config: DeviceConfig,
        effects: EffectRegistry<'a>,
        playlists: PlaylistCatalog<'a>,
        storage: S,
        clock: C,
        power: P,
    ) -> Result<Self, CatalogError> {
        playlists.check_effects(effects.len())?;
        if effects.len() > 256 || name_list_len(&effects) > MAX_LONG_OCTET_STRING_LEN {
            return Err(CatalogError::TooLarge);
        }

        let mut selector = PlaylistSelector::new();
        let mut state = DeviceState::new();
        state.effect = selector
            .select(&playlists, 0)
            .map_err(|_| CatalogError::Empty)?;

        Ok(Self {
            address: config.factory_address,
            config,
            state,
            selector,
            effects,
            playlists,
            persistence: Persistence::new(storage),
            clock,
            power,
            alarm_mask: false,
            text: Vec::new(),
            needs_init: false,
        })
    }

    /// Restore the stored configuration after power on
    ///
    /// The stored effect, playlist and text are applied by the first
    /// [`Self::sync_from_storage`].
    pub fn boot(&mut self) {
        self.address = match self.persistence.read_address() {
            Ok(address) => address,
            Err(PersistenceError::Storage(StorageError::NotFound)) => self.config.factory_address,
            Err(e) => {
                warn!("Failed to read device address: {:?}", e);
                self.config.factory_address
            }
        };

        let mode = match self.persistence.read_mode() {
            Ok(mode) => mode,
            Err(PersistenceError::Storage(StorageError::NotFound)) => {
                debug!("No stored mode, starting idle");
                Mode::Idle
            }
            Err(e) => {
                warn!("Failed to read stored mode: {:?}, starting idle", e);
                Mode::Idle
            }
        };

        if mode != Mode::Sleep {
            self.power.start();
        }
        self.state.mode = mode;
        self.state.dirty.mark(DirtyFlags::all());
        info!("Booted in mode {:?}", mode);
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn text(&self) -> &[u8] {
        &self.text
    }

    pub fn selector(&self) -> &PlaylistSelector {
        &self.selector
    }

    pub fn playlists(&self) -> &PlaylistCatalog<'a> {
        &self.playlists
    }

    pub fn effects(&self) -> &EffectRegistry<'a> {
        &self.effects
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn power(&self) -> &P {
        &self.power
    }

    pub fn storage_mut(&mut self) -> &mut S {
        self.persistence.storage_mut()
    }

    /// Whether the active effect is waiting for initialisation
    pub fn needs_init(&self) -> bool {
        self.needs_init
    }

    fn apply_power(&mut self, action: PowerAction) {
        match action {
            PowerAction::Start => self.power.start(),
            PowerAction::Shutdown => self.power.shutdown(),
            PowerAction::None => {}
        }
    }

    /// Persist and enter a new operating mode
    pub fn set_mode(&mut self, mode: Mode) {
        if self.state.mode == mode {
            return;
        }
        if let Err(e) = self.persistence.store_mode(mode) {
            warn!("Failed to store mode: {:?}", e);
        }
        self.state.dirty.mark(DirtyFlags::MODE);
        if let Some(action) = self.state.enter(mode) {
            self.apply_power(action);
        }
        info!("Mode changed to {:?}", mode);
    }

    /// Run a single effect now, without persisting the choice
    pub fn change_effect(&mut self, effect: u8) -> Result<(), SelectError> {
        if effect as usize >= self.effects.len() {
            return Err(SelectError::EffectOutOfRange);
        }
        if let Some(action) = self.state.enter(Mode::Effect) {
            self.apply_power(action);
        }
        self.state.effect = effect;
        self.selector.clear_custom_data();
        self.needs_init = true;
        info!("Effect changed to {}", effect);
        Ok(())
    }

    /// Play a playlist now, without persisting the choice
    pub fn change_playlist(&mut self, playlist: u8) -> Result<(), SelectError> {
        let effect = self.selector.start_playlist(&self.playlists, playlist)?;
        if let Some(action) = self.state.enter(Mode::Playlist) {
            self.apply_power(action);
        }
        self.state.playlist = playlist;
        self.state.effect = effect;
        self.needs_init = true;
        info!("Playlist changed to {}", playlist);
        Ok(())
    }

    pub fn store_effect(&mut self, effect: u8) {
        if let Err(e) = self.persistence.store_effect(effect) {
            warn!("Failed to store effect: {:?}", e);
        }
        self.state.dirty.mark(DirtyFlags::EFFECT);
    }

    pub fn store_playlist(&mut self, playlist: u8) {
        if let Err(e) = self.persistence.store_playlist(playlist) {
            warn!("Failed to store playlist: {:?}", e);
        }
        self.state.dirty.mark(DirtyFlags::PLAYLIST);
    }

    pub fn store_text(&mut self, text: &[u8]) {
        if let Err(e) = self.persistence.store_text(text) {
            warn!("Failed to store effect text: {:?}", e);
        }
        self.state.dirty.mark(DirtyFlags::TEXT);
    }

    pub fn store_address(&mut self, address: u64) {
        self.address = address;
        if let Err(e) = self.persistence.store_address(address) {
            warn!("Failed to store device address: {:?}", e);
        }
    }

    /// Stored playlist, falling back to the active one
    pub(crate) fn stored_playlist(&mut self) -> u8 {
        self.persistence
            .read_playlist()
            .unwrap_or(self.state.playlist)
    }

    /// Stored effect, falling back to the active one
    pub(crate) fn stored_effect(&mut self) -> u8 {
        self.persistence.read_effect().unwrap_or(self.state.effect)
    }

    /// Apply stored configuration that changed since the last sync
    ///
    /// Storage is only read for aspects whose dirty flag, or the mode
    /// flag, is set. All flags are cleared afterwards.
    pub fn sync_from_storage(&mut self) {
        let dirty = self.state.dirty;
        if dirty.is_empty() {
            return;
        }

        if dirty.intersects(DirtyFlags::TEXT | DirtyFlags::MODE) {
            match self.persistence.read_text() {
                Ok(text) => self.text = text,
                Err(e) => warn!("Failed to read effect text: {:?}", e),
            }
        }

        if self.state.mode == Mode::Playlist
            && dirty.intersects(DirtyFlags::PLAYLIST | DirtyFlags::MODE)
        {
            self.use_stored_playlist();
        }

        let dynamic_text = self
            .effects
            .descriptor(self.state.effect)
            .is_some_and(|d| d.dynamic_text);
        if self.state.mode == Mode::Effect
            && (dirty.intersects(DirtyFlags::EFFECT | DirtyFlags::MODE)
                || (dirty.contains(DirtyFlags::TEXT) && dynamic_text))
        {
            self.use_stored_effect();
        }

        self.state.dirty.clear_all();
    }

    fn use_stored_playlist(&mut self) {
        let mut playlist = self.persistence.read_playlist().unwrap_or(0);
        if playlist as usize >= self.playlists.len() {
            playlist = 0;
        }
        match self.selector.start_playlist(&self.playlists, playlist) {
            Ok(effect) => {
                self.state.playlist = playlist;
                self.state.effect = effect;
                self.needs_init = true;
                debug!("Using stored playlist {}", playlist);
            }
            Err(e) => error!("Stored playlist unusable: {:?}", e),
        }
    }

    fn use_stored_effect(&mut self) {
        let mut effect = self.persistence.read_effect().unwrap_or(0);
        if effect as usize >= self.effects.len() {
            effect = 0;
        }
        self.state.effect = effect;
        self.selector.clear_custom_data();
        self.needs_init = true;
        debug!("Using stored effect {}", effect);
    }

    /// Move to the next playlist entry after its duration expired
    pub fn advance_playlist(&mut self) {
        match self.selector.advance(&self.playlists, self.state.playlist) {
            Ok(effect) => {
                self.state.effect = effect;
                trace!("Playlist advanced to entry {}", self.selector.index());
            }
            Err(e) => error!("Playlist advance failed: {:?}", e),
        }
    }
}
