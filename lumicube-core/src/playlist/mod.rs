//! Playlists
//!
//! All playlists share one flat master sequence. A playlist is the
//! contiguous range from its start index up to the next playlist's start,
//! or to the end of the master sequence for the last one.

use core::ops::Range;

use lumicube_protocol::MAX_LONG_OCTET_STRING_LEN;

/// One step of the master sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaylistEntry {
    /// Effect registry index
    pub effect: u8,
    /// Ticks to run before advancing
    pub duration: u16,
    /// Opaque data handed to the effect
    pub data: Option<&'static [u8]>,
}

impl PlaylistEntry {
    pub const fn new(effect: u8, duration: u16) -> Self {
        Self {
            effect,
            duration,
            data: None,
        }
    }

    pub const fn with_data(mut self, data: &'static [u8]) -> Self {
        self.data = Some(data);
        self
    }
}

/// Playlist table errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CatalogError {
    /// No playlists, no master entries, or no effects
    Empty,
    /// More than 256 master entries, playlists or effects, or a name list
    /// that does not fit a long octet string
    TooLarge,
    /// First playlist does not start at 0, or starts are not ascending
    BadStart,
    /// An entry refers to an effect that does not exist
    UnknownEffect,
}

/// Selection errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SelectError {
    PlaylistOutOfRange,
    EffectOutOfRange,
    IndexOutOfRange,
}

/// Master sequence plus playlist boundaries
#[derive(Debug, Clone, Copy)]
pub struct PlaylistCatalog<'a> {
    master: &'a [PlaylistEntry],
    starts: &'a [u8],
    names_json: &'a [u8],
}

impl<'a> PlaylistCatalog<'a> {
    /// Validate and wrap a playlist table
    ///
    /// `starts` holds the first master index of every playlist in
    /// ascending order. `names_json` is reported verbatim as the playlist
    /// name list.
    pub fn new(
        master: &'a [PlaylistEntry],
        starts: &'a [u8],
        names_json: &'a [u8],
    ) -> Result<Self, CatalogError> {
        if master.is_empty() || starts.is_empty() {
            return Err(CatalogError::Empty);
        }
        if master.len() > 256
            || starts.len() > 256
            || names_json.len() > MAX_LONG_OCTET_STRING_LEN
        {
            return Err(CatalogError::TooLarge);
        }
        if starts[0] != 0 {
            return Err(CatalogError::BadStart);
        }
        let ascending = starts.windows(2).all(|w| w[0] < w[1]);
        let last_in_range = starts.iter().all(|&s| (s as usize) < master.len());
        if !ascending || !last_in_range {
            return Err(CatalogError::BadStart);
        }
        Ok(Self {
            master,
            starts,
            names_json,
        })
    }

    /// Check every entry against the effect count
    pub fn check_effects(&self, effect_count: usize) -> Result<(), CatalogError> {
        if effect_count == 0 {
            return Err(CatalogError::Empty);
        }
        if self.master.iter().any(|e| e.effect as usize >= effect_count) {
            return Err(CatalogError::UnknownEffect);
        }
        Ok(())
    }

    /// Number of playlists
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn master(&self) -> &'a [PlaylistEntry] {
        self.master
    }

    pub fn names_json(&self) -> &'a [u8] {
        self.names_json
    }

    /// Master index range of a playlist
    pub fn range(&self, playlist: u8) -> Option<Range<usize>> {
        let p = playlist as usize;
        let start = *self.starts.get(p)? as usize;
        let end = self
            .starts
            .get(p + 1)
            .map_or(self.master.len(), |&s| s as usize);
        Some(start..end)
    }

    /// Entries of a playlist
    pub fn entries(&self, playlist: u8) -> &'a [PlaylistEntry] {
        self.range(playlist).map_or(&[], |r| &self.master[r])
    }
}

/// Tracks the playing master entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaylistSelector {
    index: u8,
    duration: u16,
    custom_data: Option<&'static [u8]>,
}

impl PlaylistSelector {
    pub const fn new() -> Self {
        Self {
            index: 0,
            duration: 0,
            custom_data: None,
        }
    }

    /// Master index of the playing entry
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Duration of the playing entry
    pub fn duration(&self) -> u16 {
        self.duration
    }

    pub fn custom_data(&self) -> Option<&'static [u8]> {
        self.custom_data
    }

    /// Forget the entry data when an effect runs on its own
    pub fn clear_custom_data(&mut self) {
        self.custom_data = None;
    }

    /// Play master entry `index`, returning its effect id
    pub fn select(&mut self, catalog: &PlaylistCatalog<'_>, index: usize) -> Result<u8, SelectError> {
        let entry = catalog
            .master
            .get(index)
            .ok_or(SelectError::IndexOutOfRange)?;
        self.index = index as u8;
        self.duration = entry.duration;
        self.custom_data = entry.data;
        Ok(entry.effect)
    }

    /// Play the first entry of a playlist
    pub fn start_playlist(
        &mut self,
        catalog: &PlaylistCatalog<'_>,
        playlist: u8,
    ) -> Result<u8, SelectError> {
        let range = catalog
            .range(playlist)
            .ok_or(SelectError::PlaylistOutOfRange)?;
        self.select(catalog, range.start)
    }

    /// Move to the next entry, wrapping within the playlist
    pub fn advance(&mut self, catalog: &PlaylistCatalog<'_>, playlist: u8) -> Result<u8, SelectError> {
        let range = catalog
            .range(playlist)
            .ok_or(SelectError::PlaylistOutOfRange)?;
        let next = self.index as usize + 1;
        if next >= range.end || next < range.start {
            self.select(catalog, range.start)
        } else {
            self.select(catalog, next)
        }
    }

    /// Offset of the playing entry within its playlist
    pub fn position(&self, catalog: &PlaylistCatalog<'_>, playlist: u8) -> u8 {
        catalog
            .range(playlist)
            .map_or(0, |r| (self.index as usize).saturating_sub(r.start) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static DATA: [u8; 2] = [0xCA, 0xFE];
    static MASTER: [PlaylistEntry; 5] = [
        PlaylistEntry::new(0, 100),
        PlaylistEntry::new(1, 200),
        PlaylistEntry::new(2, 300).with_data(&DATA),
        PlaylistEntry::new(3, 50),
        PlaylistEntry::new(4, 60),
    ];
    static STARTS: [u8; 2] = [0, 3];

    fn catalog() -> PlaylistCatalog<'static> {
        PlaylistCatalog::new(&MASTER, &STARTS, b"[\"a\",\"b\"]").unwrap()
    }

    #[test]
    fn test_ranges() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.range(0), Some(0..3));
        assert_eq!(catalog.range(1), Some(3..5));
        assert_eq!(catalog.range(2), None);
        assert_eq!(catalog.entries(1).len(), 2);
    }

    #[test]
    fn test_select_sets_duration_and_data() {
        let catalog = catalog();
        let mut selector = PlaylistSelector::new();
        assert_eq!(selector.select(&catalog, 2), Ok(2));
        assert_eq!(selector.duration(), 300);
        assert_eq!(selector.custom_data(), Some(&DATA[..]));
        assert_eq!(selector.select(&catalog, 9), Err(SelectError::IndexOutOfRange));
    }

    #[test]
    fn test_wrap_stays_in_playlist() {
        let catalog = catalog();
        let mut selector = PlaylistSelector::new();
        selector.start_playlist(&catalog, 0).unwrap();
        assert_eq!(selector.advance(&catalog, 0), Ok(1));
        assert_eq!(selector.advance(&catalog, 0), Ok(2));
        assert_eq!(selector.position(&catalog, 0), 2);
        // Last entry wraps to A, never into the next playlist
        assert_eq!(selector.advance(&catalog, 0), Ok(0));
        assert_eq!(selector.index(), 0);
    }

    #[test]
    fn test_wrap_at_end_of_master() {
        let catalog = catalog();
        let mut selector = PlaylistSelector::new();
        assert_eq!(selector.start_playlist(&catalog, 1), Ok(3));
        assert_eq!(selector.advance(&catalog, 1), Ok(4));
        assert_eq!(selector.advance(&catalog, 1), Ok(3));
        assert_eq!(selector.position(&catalog, 1), 0);
    }

    #[test]
    fn test_catalog_validation() {
        assert_eq!(
            PlaylistCatalog::new(&[], &STARTS, b"").unwrap_err(),
            CatalogError::Empty
        );
        assert_eq!(
            PlaylistCatalog::new(&MASTER, &[1, 3], b"").unwrap_err(),
            CatalogError::BadStart
        );
        assert_eq!(
            PlaylistCatalog::new(&MASTER, &[0, 3, 3], b"").unwrap_err(),
            CatalogError::BadStart
        );
        assert_eq!(
            PlaylistCatalog::new(&MASTER, &[0, 5], b"").unwrap_err(),
            CatalogError::BadStart
        );
        static NAMES: [u8; MAX_LONG_OCTET_STRING_LEN + 1] = [b' '; MAX_LONG_OCTET_STRING_LEN + 1];
        assert_eq!(
            PlaylistCatalog::new(&MASTER, &STARTS, &NAMES).unwrap_err(),
            CatalogError::TooLarge
        );
        assert!(PlaylistCatalog::new(&MASTER, &STARTS, &NAMES[1..]).is_ok());
        assert_eq!(catalog().check_effects(4), Err(CatalogError::UnknownEffect));
        assert_eq!(catalog().check_effects(5), Ok(()));
    }
}
